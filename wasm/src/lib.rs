use codeshot::{RenderOptions, render_html_with_options, render_with_options};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CodeRenderOptions {
    #[serde(default = "default_language")]
    language: String,
    font_family: Option<String>,
    /// Raw input-box text; clamped the same way as the CLI.
    font_size: Option<String>,
    background: Option<String>,
}

impl Default for CodeRenderOptions {
    fn default() -> Self {
        Self {
            language: default_language(),
            font_family: None,
            font_size: None,
            background: None,
        }
    }
}

fn default_language() -> String {
    codeshot::language::DEFAULT_LANGUAGE.to_string()
}

fn build_render_options(options: &CodeRenderOptions) -> RenderOptions {
    let mut render_options = RenderOptions::default();
    if let Some(font_family) = &options.font_family {
        render_options.theme.font_family = font_family.clone();
    }
    if let Some(background) = &options.background {
        render_options.theme.background = background.clone();
    }
    if let Some(font_size) = &options.font_size {
        render_options = render_options.with_font_size(font_size);
    }
    render_options
}

fn parse_options(options_json: Option<String>) -> Result<CodeRenderOptions, JsValue> {
    match options_json {
        Some(raw_options) => serde_json::from_str::<CodeRenderOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string())),
        None => Ok(CodeRenderOptions::default()),
    }
}

#[wasm_bindgen]
pub fn render_code_svg(code: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = parse_options(options_json)?;
    render_with_options(code, &options.language, &build_render_options(&options))
        .map_err(|error| JsValue::from_str(&error.to_string()))
}

#[wasm_bindgen]
pub fn render_code_html(code: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = parse_options(options_json)?;
    render_html_with_options(code, &options.language, &build_render_options(&options))
        .map_err(|error| JsValue::from_str(&error.to_string()))
}
