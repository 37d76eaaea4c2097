use crate::config::RenderConfig;
use crate::error::ExportError;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ExportFormat {
    Svg,
    Pdf,
    Png,
    Html,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Svg => "svg",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Png => "png",
            ExportFormat::Html => "html",
        }
    }

    /// Text formats go to stdout when no output path is given.
    pub fn streams_to_stdout(self) -> bool {
        matches!(self, ExportFormat::Svg | ExportFormat::Html)
    }
}

/// `highlighted-code-<language>.svg`, `code-export-<language>.pdf`, ...
pub fn export_file_name(format: ExportFormat, language: &str) -> String {
    let language: String = language
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '-' })
        .collect();
    let language = if language.is_empty() { "text".to_string() } else { language };
    match format {
        ExportFormat::Pdf => format!("code-export-{language}.pdf"),
        other => format!("highlighted-code-{language}.{}", other.extension()),
    }
}

/// Resolves where an export lands: an explicit file, a directory (joined with
/// the export file name), or the export file name in the working directory.
/// `None` means stdout.
pub fn resolve_output_path(
    output: Option<&Path>,
    format: ExportFormat,
    language: &str,
) -> Option<PathBuf> {
    match output {
        Some(path) if path == Path::new("-") => None,
        Some(path) if path.is_dir() => Some(path.join(export_file_name(format, language))),
        Some(path) => Some(path.to_path_buf()),
        None if format.streams_to_stdout() => None,
        None => Some(PathBuf::from(export_file_name(format, language))),
    }
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<(), ExportError> {
    write_text(svg, output)
}

pub fn write_output_html(html: &str, output: Option<&Path>) -> Result<(), ExportError> {
    write_text(html, output)
}

fn write_text(contents: &str, output: Option<&Path>) -> Result<(), ExportError> {
    match output {
        Some(path) => {
            std::fs::write(path, contents)?;
            tracing::info!(path = %path.display(), bytes = contents.len(), "wrote output");
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(contents.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

/// Single-page PDF sized to the SVG (1 SVG unit = 1pt).
#[cfg(feature = "pdf")]
pub fn write_output_pdf(svg: &str, output: &Path) -> Result<(), ExportError> {
    use svg2pdf::usvg;

    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    let tree =
        usvg::Tree::from_str(svg, &opt).map_err(|err| ExportError::InvalidSvg(err.to_string()))?;

    let size = tree.size();
    if size.width() <= 0.0 || size.height() <= 0.0 {
        return Err(ExportError::InvalidSize {
            width: size.width(),
            height: size.height(),
        });
    }

    let pdf = svg2pdf::to_pdf(
        &tree,
        svg2pdf::ConversionOptions::default(),
        svg2pdf::PageOptions::default(),
    )
    .map_err(|err| ExportError::Pdf(err.to_string()))?;

    std::fs::write(output, &pdf)?;
    tracing::info!(
        path = %output.display(),
        width = size.width(),
        height = size.height(),
        bytes = pdf.len(),
        "wrote PDF"
    );
    Ok(())
}

#[cfg(not(feature = "pdf"))]
pub fn write_output_pdf(_svg: &str, _output: &Path) -> Result<(), ExportError> {
    Err(ExportError::Unsupported { format: "PDF" })
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<(), ExportError> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();

    let tree =
        usvg::Tree::from_str(svg, &opt).map_err(|err| ExportError::InvalidSvg(err.to_string()))?;
    let scale = render_cfg.png_scale;
    let size = tree.size();
    let width = (size.width() * scale).ceil() as u32;
    let height = (size.height() * scale).ceil() as u32;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or(ExportError::Pixmap { width, height })?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap_mut,
    );
    pixmap
        .save_png(output)
        .map_err(|err| ExportError::Png(err.to_string()))?;
    tracing::info!(path = %output.display(), width, height, "wrote PNG");
    Ok(())
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(_svg: &str, _output: &Path, _render_cfg: &RenderConfig) -> Result<(), ExportError> {
    Err(ExportError::Unsupported { format: "PNG" })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="400" height="55.5" viewBox="0 0 400 55.5"><rect width="100%" height="100%" fill="#1A1B26"/></svg>"##;

    #[test]
    fn file_names_follow_language() {
        assert_eq!(export_file_name(ExportFormat::Svg, "rust"), "highlighted-code-rust.svg");
        assert_eq!(export_file_name(ExportFormat::Pdf, "rust"), "code-export-rust.pdf");
        assert_eq!(export_file_name(ExportFormat::Png, "c++"), "highlighted-code-c--.png");
        assert_eq!(export_file_name(ExportFormat::Html, ""), "highlighted-code-text.html");
    }

    #[test]
    fn output_path_resolution() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(resolve_output_path(None, ExportFormat::Svg, "go"), None);
        assert_eq!(
            resolve_output_path(None, ExportFormat::Pdf, "go"),
            Some(PathBuf::from("code-export-go.pdf"))
        );
        assert_eq!(
            resolve_output_path(Some(dir.path()), ExportFormat::Svg, "go"),
            Some(dir.path().join("highlighted-code-go.svg"))
        );
        assert_eq!(
            resolve_output_path(Some(Path::new("-")), ExportFormat::Html, "go"),
            None
        );
    }

    #[test]
    fn svg_written_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.svg");
        write_output_svg(SVG, Some(&path)).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), SVG);
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn pdf_export_produces_a_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.pdf");
        write_output_pdf(SVG, &path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn pdf_page_matches_svg_canvas() {
        let code = "x".repeat(100);
        let options = crate::RenderOptions::default().with_font_size("11");
        let svg = crate::render_with_options(&code, "javascript", &options).unwrap();
        assert!(svg.contains("width=\"700\" height=\"57.05\""));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wide.pdf");
        write_output_pdf(&svg, &path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        let media_box = b"MediaBox [0 0 700 57.05]";
        assert!(bytes.windows(media_box.len()).any(|w| w == media_box));
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn pdf_export_rejects_invalid_svg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.pdf");
        let err = write_output_pdf("not an svg", &path).unwrap_err();
        assert!(matches!(err, ExportError::InvalidSvg(_)));
        assert!(!path.exists());
    }

    #[cfg(feature = "png")]
    #[test]
    fn png_export_scales_canvas() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        write_output_png(SVG, &path, &RenderConfig { png_scale: 2.0 }).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"\x89PNG"));
    }
}
