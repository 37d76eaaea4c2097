use crate::theme::{CodeTheme, TokenColorRule, parse_hex_color};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub padding: f64,
    pub line_height_factor: f64,
    pub char_width_factor: f64,
    pub min_width: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            padding: 20.0,
            line_height_factor: 1.55,
            char_width_factor: 0.6,
            min_width: 400.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Raster scale for PNG output.
    pub png_scale: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { png_scale: 2.0 }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: CodeTheme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
    pub syntaxes_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeOverrides {
    font_family: Option<String>,
    background: Option<String>,
    foreground: Option<String>,
    token_colors: Option<Vec<TokenColorRule>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    padding: Option<f64>,
    line_height_factor: Option<f64>,
    char_width_factor: Option<f64>,
    min_width: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    png_scale: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_overrides: Option<ThemeOverrides>,
    layout: Option<LayoutConfigFile>,
    render: Option<RenderConfigFile>,
    syntaxes_dir: Option<PathBuf>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    let is_json5 = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json5"))
        .unwrap_or(false);
    let parsed: ConfigFile = if is_json5 {
        json5::from_str(&contents)?
    } else {
        serde_json::from_str(&contents)?
    };

    if let Some(theme_name) = parsed.theme.as_deref() {
        config.theme = CodeTheme::by_name(theme_name)
            .ok_or_else(|| anyhow::anyhow!("Unknown theme `{theme_name}`"))?;
    }

    if let Some(overrides) = parsed.theme_overrides {
        if let Some(v) = overrides.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = overrides.background {
            ensure_color("background", &v)?;
            config.theme.background = v;
        }
        if let Some(v) = overrides.foreground {
            ensure_color("foreground", &v)?;
            config.theme.foreground = v;
        }
        if let Some(v) = overrides.token_colors {
            config.theme.token_colors = v;
        }
    }

    if let Some(layout) = parsed.layout {
        if let Some(v) = layout.padding {
            config.layout.padding = non_negative("layout.padding", v)?;
        }
        if let Some(v) = layout.line_height_factor {
            config.layout.line_height_factor = positive("layout.lineHeightFactor", v)?;
        }
        if let Some(v) = layout.char_width_factor {
            config.layout.char_width_factor = positive("layout.charWidthFactor", v)?;
        }
        if let Some(v) = layout.min_width {
            config.layout.min_width = non_negative("layout.minWidth", v)?;
        }
    }

    if let Some(render) = parsed.render {
        if let Some(v) = render.png_scale {
            config.render.png_scale = positive("render.pngScale", f64::from(v))? as f32;
        }
    }

    if let Some(dir) = parsed.syntaxes_dir {
        // Relative folders are resolved against the config file.
        config.syntaxes_dir = Some(match path.parent() {
            Some(parent) if dir.is_relative() => parent.join(dir),
            _ => dir,
        });
    }

    Ok(config)
}

fn ensure_color(key: &str, value: &str) -> anyhow::Result<()> {
    if parse_hex_color(value).is_none() {
        anyhow::bail!("`{key}` must be a #RRGGBB or #RRGGBBAA colour, got `{value}`");
    }
    Ok(())
}

fn positive(key: &str, value: f64) -> anyhow::Result<f64> {
    if !value.is_finite() || value <= 0.0 {
        anyhow::bail!("`{key}` must be a positive number, got {value}");
    }
    Ok(value)
}

fn non_negative(key: &str, value: f64) -> anyhow::Result<f64> {
    if !value.is_finite() || value < 0.0 {
        anyhow::bail!("`{key}` must be a non-negative number, got {value}");
    }
    Ok(value)
}
