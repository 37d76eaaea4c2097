use crate::ir::HighlightedCode;
use crate::layout::SvgDocument;
use crate::theme::CodeTheme;

pub fn render_svg(doc: &SvgDocument) -> String {
    let mut svg = String::new();
    let width = fmt_num(doc.width);
    let height = fmt_num(doc.height);

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));

    if let Some(background) = &doc.background {
        svg.push_str(&format!(
            "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
            escape_attr(background)
        ));
    }

    let font_family = escape_attr(&doc.font_family);
    for run in &doc.runs {
        svg.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{}\" fill=\"{}\" font-family=\"{}\" font-size=\"{}px\" xml:space=\"preserve\">{}</text>",
            run.x,
            fmt_num(run.y),
            escape_attr(&run.color),
            font_family,
            doc.font_size,
            escape_xml(&run.text)
        ));
    }

    svg.push_str("</svg>");
    svg
}

/// Preview markup: one `<span class="line">` per line, one coloured span per
/// token.
pub fn render_html(code: &HighlightedCode, theme: &CodeTheme) -> String {
    let mut html = String::new();
    html.push_str(&format!(
        "<pre class=\"shiki {}\" style=\"background-color:{};color:{}\" tabindex=\"0\"><code>",
        escape_attr(&theme.name),
        escape_attr(&theme.background),
        escape_attr(&theme.foreground)
    ));
    for (idx, line) in code.lines.iter().enumerate() {
        if idx > 0 {
            html.push('\n');
        }
        html.push_str("<span class=\"line\">");
        for token in line {
            html.push_str(&format!(
                "<span style=\"color:{}\">{}</span>",
                escape_attr(&token.color),
                escape_attr(&token.text)
            ));
        }
        html.push_str("</span>");
    }
    html.push_str("</code></pre>");
    html
}

/// Two decimals at most, trailing zeros dropped (`45.50` → `45.5`, `400.00` → `400`).
pub(crate) fn fmt_num(value: f64) -> String {
    let fixed = format!("{value:.2}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Escapes `&`, `<` and `>`. Characters XML 1.0 does not allow are
/// replaced one-for-one with U+FFFD, so glyph counts stay the same.
pub fn escape_xml(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c if is_xml_char(c) => out.push(c),
            _ => out.push(char::REPLACEMENT_CHARACTER),
        }
    }
    out
}

fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
}

/// For double-quoted attribute values and HTML text.
fn escape_attr(input: &str) -> String {
    escape_xml(input).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::ir::{FontSize, SourceDocument, Token};
    use crate::layout::compute_layout;

    fn one_token(text: &str) -> HighlightedCode {
        HighlightedCode {
            lines: vec![vec![Token {
                text: text.to_string(),
                color: "#ffffff".to_string(),
            }]],
        }
    }

    #[test]
    fn escapes_markup_in_text_nodes() {
        let doc = SourceDocument::new("a&b", "javascript");
        let layout = compute_layout(
            &doc,
            &one_token("a&b"),
            FontSize::new(10),
            &CodeTheme::custom_dark(),
            &LayoutConfig::default(),
        );
        let svg = render_svg(&layout);
        assert!(svg.contains(
            "<text x=\"20.00\" y=\"30\" fill=\"#ffffff\" font-family=\"'Google Sans Code', monospace\" font-size=\"10px\" xml:space=\"preserve\">a&amp;b</text>"
        ));
        assert!(svg.starts_with(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"400\" height=\"55.5\" viewBox=\"0 0 400 55.5\">"
        ));
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn transparent_background_has_no_rect() {
        let doc = SourceDocument::new("x", "javascript");
        let mut theme = CodeTheme::custom_dark();
        let layout = compute_layout(&doc, &one_token("x"), FontSize::DEFAULT, &theme, &LayoutConfig::default());
        assert!(!render_svg(&layout).contains("<rect"));

        theme.background = "#1A1B26".to_string();
        let layout = compute_layout(&doc, &one_token("x"), FontSize::DEFAULT, &theme, &LayoutConfig::default());
        assert!(render_svg(&layout).contains("<rect width=\"100%\" height=\"100%\" fill=\"#1A1B26\"/>"));
    }

    #[test]
    fn control_characters_are_replaced_per_glyph() {
        assert_eq!(escape_xml("a\u{0C}b\u{01}<"), "a\u{FFFD}b\u{FFFD}&lt;");
        assert_eq!(escape_xml("\u{FFFE}\u{FFFF}\t"), "\u{FFFD}\u{FFFD}\t");
        assert_eq!(escape_xml("héllo 😀"), "héllo 😀");
        assert_eq!(escape_attr("say \"hi\" & 'bye'"), "say &quot;hi&quot; &amp; 'bye'");
    }

    #[test]
    fn number_formatting() {
        assert_eq!(fmt_num(400.0), "400");
        assert_eq!(fmt_num(45.5), "45.5");
        assert_eq!(fmt_num(17.050000000000001), "17.05");
        assert_eq!(fmt_num(65.14999999999999), "65.15");
        assert_eq!(fmt_num(-0.0001), "0");
    }

    #[test]
    fn html_preview_structure() {
        let code = HighlightedCode {
            lines: vec![
                vec![Token {
                    text: "if a < b".to_string(),
                    color: "#738EDF".to_string(),
                }],
                Vec::new(),
            ],
        };
        let html = render_html(&code, &CodeTheme::custom_dark());
        assert_eq!(
            html,
            "<pre class=\"shiki custom-dark\" style=\"background-color:#00000000;color:#C9CDE1\" tabindex=\"0\"><code><span class=\"line\"><span style=\"color:#738EDF\">if a &lt; b</span></span>\n<span class=\"line\"></span></code></pre>"
        );
    }
}
