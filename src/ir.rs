use serde::{Deserialize, Serialize};
use std::fmt;

/// Tabs are replaced by this many spaces before highlighting.
pub const TAB_WIDTH: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    pub text: String,
    pub language: String,
}

impl SourceDocument {
    pub fn new(text: &str, language: &str) -> Self {
        Self {
            text: normalize_tabs(text),
            language: language.trim().to_string(),
        }
    }

    /// Lines as the layout sees them: split on `\n`, so empty text is a
    /// single empty line and a trailing newline adds an empty last line.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
    }

    pub fn line_count(&self) -> usize {
        self.lines().count()
    }

    pub fn longest_line_chars(&self) -> usize {
        self.lines()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0)
    }
}

pub fn normalize_tabs(text: &str) -> String {
    text.replace('\t', &" ".repeat(TAB_WIDTH))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub color: String,
}

impl Token {
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightedCode {
    pub lines: Vec<Vec<Token>>,
}

impl HighlightedCode {
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Appends a run to the last line, merging it into the previous token
    /// when both share a colour.
    pub fn push_token(&mut self, text: &str, color: String) {
        if text.is_empty() {
            return;
        }
        let Some(line) = self.lines.last_mut() else {
            self.lines.push(vec![Token {
                text: text.to_string(),
                color,
            }]);
            return;
        };
        match line.last_mut() {
            Some(prev) if prev.color == color => prev.text.push_str(text),
            _ => line.push(Token {
                text: text.to_string(),
                color,
            }),
        }
    }
}

/// Font size in pixels, always within `[MIN, MAX]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct FontSize(u32);

impl FontSize {
    pub const DEFAULT: FontSize = FontSize(11);
    pub const MIN: u32 = 6;
    pub const MAX: u32 = 400;

    pub fn new(px: u32) -> Self {
        Self(px.clamp(Self::MIN, Self::MAX))
    }

    /// Lenient parse of user input. A leading integer is taken the way a
    /// browser `parseInt` would (`"14px"` → 14, `"12.7"` → 12); anything
    /// without one falls back to [`FontSize::DEFAULT`]. Zero and negative
    /// values clamp to [`FontSize::MIN`].
    pub fn parse_lenient(input: &str) -> Self {
        let trimmed = input.trim();
        let (negative, rest) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, &trimmed[1..]),
            Some(b'+') => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };
        let digits: &str = {
            let end = rest
                .char_indices()
                .find(|(_, c)| !c.is_ascii_digit())
                .map(|(idx, _)| idx)
                .unwrap_or(rest.len());
            &rest[..end]
        };
        if digits.is_empty() {
            return Self::DEFAULT;
        }
        if negative {
            return Self(Self::MIN);
        }
        match digits.parse::<u32>() {
            Ok(px) => Self::new(px),
            // Only overflow can fail here.
            Err(_) => Self(Self::MAX),
        }
    }

    pub fn px(self) -> u32 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.0)
    }
}

impl Default for FontSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<u32> for FontSize {
    fn from(px: u32) -> Self {
        Self::new(px)
    }
}

impl From<FontSize> for u32 {
    fn from(size: FontSize) -> Self {
        size.0
    }
}

impl fmt::Display for FontSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tabs_become_four_spaces() {
        let doc = SourceDocument::new("\tx\t= 1;", "javascript");
        assert_eq!(doc.text, "    x    = 1;");
    }

    #[test]
    fn line_splitting_matches_newline_count() {
        assert_eq!(SourceDocument::new("", "js").line_count(), 1);
        assert_eq!(SourceDocument::new("a\n", "js").line_count(), 2);
        let doc = SourceDocument::new("ab\r\nabcd\nx", "js");
        assert_eq!(doc.line_count(), 3);
        assert_eq!(doc.longest_line_chars(), 4);
    }

    #[test]
    fn longest_line_counts_chars_not_bytes() {
        let doc = SourceDocument::new("héllo\nab", "js");
        assert_eq!(doc.longest_line_chars(), 5);
    }

    #[test]
    fn font_size_fallbacks() {
        assert_eq!(FontSize::parse_lenient("").px(), 11);
        assert_eq!(FontSize::parse_lenient("abc").px(), 11);
        assert_eq!(FontSize::parse_lenient("NaN").px(), 11);
        assert_eq!(FontSize::parse_lenient("0").px(), 6);
        assert_eq!(FontSize::parse_lenient("-4").px(), 6);
        assert_eq!(FontSize::parse_lenient("3").px(), 6);
        assert_eq!(FontSize::parse_lenient(" 14px").px(), 14);
        assert_eq!(FontSize::parse_lenient("12.7").px(), 12);
        assert_eq!(FontSize::parse_lenient("20").px(), 20);
        assert_eq!(FontSize::parse_lenient("99999999999999").px(), 400);
    }

    #[test]
    fn adjacent_same_colour_tokens_merge() {
        let mut code = HighlightedCode::default();
        code.lines.push(Vec::new());
        code.push_token("let", "#738EDF".to_string());
        code.push_token(" ", "#C9CDE1".to_string());
        code.push_token("x", "#C9CDE1".to_string());
        code.push_token("", "#FFFFFF".to_string());
        assert_eq!(code.lines[0].len(), 2);
        assert_eq!(code.lines[0][1].text, " x");
    }
}
