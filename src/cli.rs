use crate::config::{Config, load_config};
use crate::error::ExportError;
use crate::export::{
    ExportFormat, resolve_output_path, write_output_html, write_output_pdf, write_output_png,
    write_output_svg,
};
use crate::highlight::Highlighter;
use crate::language::LANGUAGES;
use crate::layout_dump::write_layout_dump;
use crate::session::Session;
use crate::state::{JsonFileStore, Settings, StateStore};
use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "codeshot", version, about = "Render syntax-highlighted code as SVG, PDF or PNG")]
pub struct Args {
    /// Input source file or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file or directory. SVG/HTML default to stdout, PDF/PNG to the export file name.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: ExportFormat,

    /// Language key (see --listLanguages)
    #[arg(short = 'l', long = "language")]
    pub language: Option<String>,

    /// Font size in pixels; invalid values fall back to 11, small ones clamp to 6
    #[arg(short = 's', long = "fontSize", allow_hyphen_values = true)]
    pub font_size: Option<String>,

    /// Config file (JSON or JSON5)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Settings file remembering the last code, language and font size
    #[arg(long = "state")]
    pub state: Option<PathBuf>,

    /// Write the computed layout as JSON
    #[arg(long = "dumpLayout")]
    pub dump_layout: Option<PathBuf>,

    /// Print the language table and exit
    #[arg(long = "listLanguages")]
    pub list_languages: bool,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing();

    let config = load_config(args.config.as_deref())?;
    let highlighter = build_highlighter(&config)?;

    if args.list_languages {
        print_languages(&highlighter);
        return Ok(());
    }

    let input = if args.input.is_some() || args.state.is_none() {
        Some(read_input(args.input.as_deref())?)
    } else {
        None
    };
    let settings = resolve_settings(&args, input)?;

    let session = Session::new(highlighter, config.layout.clone());
    let request = session.begin_render(&settings);
    let result = session
        .run(&request)
        .with_context(|| format!("Failed to highlight code as `{}`", settings.language))?;
    session.complete(request.seq(), Ok(result));
    let output = session.output().ok_or(ExportError::NothingRendered)?;

    if let Some(path) = args.dump_layout.as_deref() {
        write_layout_dump(path, &output.layout)?;
    }

    let target = resolve_output_path(args.output.as_deref(), args.output_format, &settings.language);
    match args.output_format {
        ExportFormat::Svg => write_output_svg(&output.svg, target.as_deref())?,
        ExportFormat::Html => write_output_html(&output.html, target.as_deref())?,
        ExportFormat::Pdf => {
            let path = ensure_output(target, "pdf")?;
            write_output_pdf(&output.svg, &path)?;
        }
        ExportFormat::Png => {
            let path = ensure_output(target, "png")?;
            write_output_png(&output.svg, &path, &config.render)?;
        }
    }

    Ok(())
}

fn init_tracing() {
    // Logs go to stderr so SVG/HTML on stdout stay clean.
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "codeshot=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(io::stderr),
        )
        .try_init();
}

fn build_highlighter(config: &Config) -> Result<Highlighter> {
    match config.syntaxes_dir.as_deref() {
        Some(dir) => Ok(Highlighter::with_syntax_folder(&config.theme, dir)?),
        None => Ok(Highlighter::new(&config.theme)),
    }
}

/// CLI values override the stored settings; with `--state` the merged
/// settings are written back.
fn resolve_settings(args: &Args, input: Option<String>) -> Result<Settings> {
    let apply = |settings: &mut Settings| {
        if let Some(code) = input {
            settings.code = code;
        }
        if let Some(language) = &args.language {
            settings.language = language.clone();
        }
        if let Some(font_size) = &args.font_size {
            settings.font_size = font_size.clone();
        }
    };

    match args.state.as_deref() {
        Some(path) => {
            let store = JsonFileStore::open(path)?;
            let mut state = StateStore::load(store);
            state.update(apply)?;
            Ok(state.get().clone())
        }
        None => {
            let mut settings = Settings::default();
            apply(&mut settings);
            settings.code = crate::ir::normalize_tabs(&settings.code);
            Ok(settings)
        }
    }
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()));
        }
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn ensure_output(output: Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    output.ok_or_else(|| anyhow::anyhow!("Output path required for {} output", ext))
}

fn print_languages(highlighter: &Highlighter) {
    for entry in LANGUAGES.iter() {
        let status = if highlighter.supports(entry.key) {
            "available"
        } else {
            "needs syntaxesDir"
        };
        println!("{:<12} {:<12} {}", entry.key, entry.label, status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags() {
        let args = Args::try_parse_from([
            "codeshot", "-i", "main.rs", "-e", "pdf", "-l", "rust", "-s", "14", "--state",
            "state.json",
        ])
        .unwrap();
        assert_eq!(args.output_format, ExportFormat::Pdf);
        assert_eq!(args.language.as_deref(), Some("rust"));
        assert_eq!(args.font_size.as_deref(), Some("14"));
        assert_eq!(args.state, Some(PathBuf::from("state.json")));
    }

    #[test]
    fn negative_font_size_is_accepted_as_text() {
        let args = Args::try_parse_from(["codeshot", "-s", "-3"]).unwrap();
        assert_eq!(args.font_size.as_deref(), Some("-3"));
    }

    #[test]
    fn cli_values_override_and_persist() {
        let dir = tempfile::tempdir().unwrap();
        let state_path = dir.path().join("state.json");
        let args = Args::try_parse_from([
            "codeshot",
            "-l",
            "python",
            "--state",
            state_path.to_str().unwrap(),
        ])
        .unwrap();
        let settings = resolve_settings(&args, Some("\tprint(1)".to_string())).unwrap();
        assert_eq!(settings.code, "    print(1)");
        assert_eq!(settings.language, "python");
        assert_eq!(settings.font_size, "11");

        let args =
            Args::try_parse_from(["codeshot", "--state", state_path.to_str().unwrap()]).unwrap();
        let settings = resolve_settings(&args, None).unwrap();
        assert_eq!(settings.code, "    print(1)");
        assert_eq!(settings.language, "python");
    }

    #[test]
    fn without_state_defaults_apply() {
        let args = Args::try_parse_from(["codeshot"]).unwrap();
        let settings = resolve_settings(&args, Some("x".to_string())).unwrap();
        assert_eq!(settings.language, "javascript");
        assert_eq!(settings.font_size(), crate::ir::FontSize::DEFAULT);
    }

    #[test]
    fn pdf_requires_a_path() {
        assert!(ensure_output(None, "pdf").is_err());
    }
}
