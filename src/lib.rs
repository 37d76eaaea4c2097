#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod highlight;
pub mod ir;
pub mod language;
pub mod layout;
pub mod layout_dump;
pub mod render;
pub mod session;
pub mod state;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, RenderConfig, load_config};
pub use error::{ExportError, StateError, TokenizeError};
pub use export::ExportFormat;
pub use highlight::Highlighter;
pub use ir::{FontSize, HighlightedCode, SourceDocument, Token};
pub use layout::{SvgDocument, TextRun, compute_layout};
pub use render::{render_html, render_svg};
pub use session::{Completion, Session};
pub use theme::CodeTheme;

/// Options for the one-shot helpers below.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub theme: CodeTheme,
    pub layout: LayoutConfig,
    pub font_size: FontSize,
}

impl RenderOptions {
    pub fn with_font_size(mut self, input: &str) -> Self {
        self.font_size = FontSize::parse_lenient(input);
        self
    }
}

/// Highlights `code` and lays it out as a standalone SVG document.
pub fn render_with_options(
    code: &str,
    language: &str,
    options: &RenderOptions,
) -> Result<String, TokenizeError> {
    let doc = SourceDocument::new(code, language);
    let highlighter = Highlighter::new(&options.theme);
    let highlighted = highlighter.highlight(&doc)?;
    let layout = compute_layout(&doc, &highlighted, options.font_size, &options.theme, &options.layout);
    Ok(render_svg(&layout))
}

/// Highlights `code` into the HTML preview fragment.
pub fn render_html_with_options(
    code: &str,
    language: &str,
    options: &RenderOptions,
) -> Result<String, TokenizeError> {
    let doc = SourceDocument::new(code, language);
    let highlighter = Highlighter::new(&options.theme);
    let highlighted = highlighter.highlight(&doc)?;
    Ok(render_html(&highlighted, &options.theme))
}
