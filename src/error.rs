use std::path::PathBuf;
use thiserror::Error;

/// Failure to turn source text into coloured tokens.
#[derive(Debug, Error)]
pub enum TokenizeError {
    #[error("unsupported language `{0}`")]
    UnsupportedLanguage(String),
    #[error("failed to tokenize line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: syntect::parsing::ParsingError,
    },
    #[error("failed to load syntax definitions from {path}: {message}")]
    SyntaxFolder { path: PathBuf, message: String },
}

/// Failure while writing an SVG/PDF/PNG/HTML artifact.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("nothing to export: no SVG has been rendered yet")]
    NothingRendered,
    #[error("invalid SVG: {0}")]
    InvalidSvg(String),
    #[error("invalid SVG dimensions: {width}x{height}")]
    InvalidSize { width: f32, height: f32 },
    #[error("PDF conversion failed: {0}")]
    Pdf(String),
    #[error("failed to allocate {width}x{height} pixmap")]
    Pixmap { width: u32, height: u32 },
    #[error("failed to encode PNG: {0}")]
    Png(String),
    #[error("{format} export is not enabled in this build")]
    Unsupported { format: &'static str },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failure while reading or writing persisted settings.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed to access state file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("state file {path} is not a JSON object: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
