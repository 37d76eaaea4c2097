use serde::{Deserialize, Serialize};
use std::str::FromStr;
use syntect::highlighting::{
    Color, ScopeSelectors, StyleModifier, Theme as SyntectTheme, ThemeItem, ThemeSettings,
};

pub const DEFAULT_FONT_FAMILY: &str = "'Google Sans Code', monospace";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeKind {
    Dark,
    Light,
}

/// One scope → colour rule, in the shape of a TextMate `tokenColors` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenColorRule {
    pub name: String,
    pub scope: Vec<String>,
    pub foreground: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeTheme {
    pub name: String,
    pub kind: ThemeKind,
    pub font_family: String,
    pub background: String,
    pub foreground: String,
    pub token_colors: Vec<TokenColorRule>,
}

fn rule(name: &str, scope: &[&str], foreground: &str) -> TokenColorRule {
    TokenColorRule {
        name: name.to_string(),
        scope: scope.iter().map(|s| s.to_string()).collect(),
        foreground: foreground.to_string(),
    }
}

impl CodeTheme {
    pub fn custom_dark() -> Self {
        Self {
            name: "custom-dark".to_string(),
            kind: ThemeKind::Dark,
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            background: "#00000000".to_string(),
            foreground: "#C9CDE1".to_string(),
            token_colors: vec![
                rule("Comment", &["comment", "punctuation.definition.comment"], "#565f89"),
                rule("Keywords", &["keyword", "storage.type", "storage.modifier"], "#738EDF"),
                rule("Operators", &["keyword.operator"], "#C9CDE1"),
                rule("Punctuation", &["punctuation", "meta.brace", "meta.delimiter"], "#C9CDE1"),
                rule("Strings", &["string", "string.quoted"], "#B9CAF4"),
                rule(
                    "Variables",
                    &["variable", "variable.other", "variable.language"],
                    "#AFBDFF",
                ),
                rule("Functions", &["entity.name.function", "meta.function-call"], "#AFBDFF"),
                rule("Numbers", &["constant.numeric"], "#B9CAF4"),
                rule(
                    "Classes",
                    &["entity.name.class", "entity.name.type", "support.class", "support.type"],
                    "#AFBDFF",
                ),
                rule(
                    "Properties",
                    &["variable.other.property", "support.type.property_name"],
                    "#C9CDE1",
                ),
                rule("Tags", &["entity.name.tag", "meta.tag.sgml"], "#C9CDE1"),
                rule("Attributes", &["entity.other.attribute-name"], "#C9CDE1"),
            ],
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "custom-dark" | "dark" | "default" => Some(Self::custom_dark()),
            _ => None,
        }
    }

    /// Background colour, or `None` when it is fully transparent.
    pub fn visible_background(&self) -> Option<&str> {
        match parse_hex_color(&self.background) {
            Some(color) if color.a == 0 => None,
            Some(_) => Some(self.background.as_str()),
            None => None,
        }
    }

    /// Builds the engine-side theme. Rules with an unparsable selector or
    /// colour are skipped with a warning.
    pub fn to_syntect(&self) -> SyntectTheme {
        let settings = ThemeSettings {
            foreground: parse_hex_color(&self.foreground),
            background: parse_hex_color(&self.background),
            ..ThemeSettings::default()
        };

        let mut scopes = Vec::new();
        for token_rule in &self.token_colors {
            let Some(foreground) = parse_hex_color(&token_rule.foreground) else {
                tracing::warn!(
                    rule = %token_rule.name,
                    color = %token_rule.foreground,
                    "skipping theme rule with invalid colour"
                );
                continue;
            };
            for selector in &token_rule.scope {
                match ScopeSelectors::from_str(selector) {
                    Ok(scope) => scopes.push(ThemeItem {
                        scope,
                        style: StyleModifier {
                            foreground: Some(foreground),
                            background: None,
                            font_style: None,
                        },
                    }),
                    Err(err) => {
                        tracing::warn!(rule = %token_rule.name, %selector, %err, "skipping invalid scope selector");
                    }
                }
            }
        }

        SyntectTheme {
            name: Some(self.name.clone()),
            author: None,
            settings,
            scopes,
        }
    }
}

impl Default for CodeTheme {
    fn default() -> Self {
        Self::custom_dark()
    }
}

/// Parses `#RGB`, `#RRGGBB` or `#RRGGBBAA`.
pub fn parse_hex_color(value: &str) -> Option<Color> {
    let hex = value.trim().strip_prefix('#')?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |idx: usize| u8::from_str_radix(&hex[idx..idx + 2], 16).ok();
    match hex.len() {
        3 => {
            let mut expanded = String::with_capacity(6);
            for c in hex.chars() {
                expanded.push(c);
                expanded.push(c);
            }
            parse_hex_color(&format!("#{expanded}"))
        }
        6 => Some(Color {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
            a: 0xFF,
        }),
        8 => Some(Color {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
            a: channel(6)?,
        }),
        _ => None,
    }
}

pub fn color_to_hex(color: Color) -> String {
    if color.a == 0xFF {
        format!("#{:02X}{:02X}{:02X}", color.r, color.g, color.b)
    } else {
        format!("#{:02X}{:02X}{:02X}{:02X}", color.r, color.g, color.b, color.a)
    }
}
