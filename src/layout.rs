//! Positions highlighted tokens on a monospace grid.
//!
//! Every glyph is assumed to be `char_width_factor × font_size` wide, so the
//! canvas is always large enough for the longest line. The result is a pure
//! function of the document, the font size and the token colours.

use crate::config::LayoutConfig;
use crate::ir::{FontSize, HighlightedCode, SourceDocument};
use crate::theme::CodeTheme;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextRun {
    pub x: f64,
    pub y: f64,
    pub color: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SvgDocument {
    pub width: f64,
    pub height: f64,
    pub font_family: String,
    pub font_size: FontSize,
    pub background: Option<String>,
    pub runs: Vec<TextRun>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutMetrics {
    pub line_height: f64,
    pub char_width: f64,
    pub padding: f64,
}

impl LayoutMetrics {
    pub fn new(font_size: FontSize, config: &LayoutConfig) -> Self {
        let size = font_size.as_f64();
        Self {
            line_height: size * config.line_height_factor,
            char_width: size * config.char_width_factor,
            padding: config.padding,
        }
    }

    pub fn canvas_size(&self, longest_line: usize, line_count: usize, min_width: f64) -> (f64, f64) {
        let width = (longest_line as f64 * self.char_width + self.padding * 2.0).max(min_width);
        let height = line_count as f64 * self.line_height + self.padding * 2.0;
        (width, height)
    }

    /// Baseline of the `index`-th line (0-based).
    pub fn baseline(&self, index: usize, font_size: FontSize) -> f64 {
        index as f64 * self.line_height + self.padding + font_size.as_f64()
    }
}

pub fn compute_layout(
    doc: &SourceDocument,
    code: &HighlightedCode,
    font_size: FontSize,
    theme: &CodeTheme,
    config: &LayoutConfig,
) -> SvgDocument {
    let metrics = LayoutMetrics::new(font_size, config);
    let line_count = doc.line_count().max(code.line_count());
    let (width, height) = metrics.canvas_size(doc.longest_line_chars(), line_count, config.min_width);

    let mut runs = Vec::new();
    for (idx, line) in code.lines.iter().enumerate() {
        let y = metrics.baseline(idx, font_size);
        let mut cursor_x = metrics.padding;
        for token in line {
            if token.text.is_empty() {
                continue;
            }
            runs.push(TextRun {
                x: cursor_x,
                y,
                color: token.color.clone(),
                text: token.text.clone(),
            });
            cursor_x += token.char_len() as f64 * metrics.char_width;
        }
    }

    SvgDocument {
        width,
        height,
        font_family: theme.font_family.clone(),
        font_size,
        background: theme.visible_background().map(str::to_string),
        runs,
    }
}
