use crate::error::TokenizeError;
use crate::ir::{HighlightedCode, SourceDocument};
use crate::language::find_language;
use crate::theme::{CodeTheme, color_to_hex};
use once_cell::sync::Lazy;
use std::path::Path;
use syntect::highlighting::{
    HighlightIterator, HighlightState, Highlighter as ThemeHighlighter, Theme as SyntectTheme,
};
use syntect::parsing::{ParseState, ScopeStack, SyntaxReference, SyntaxSet};

static DEFAULT_SYNTAXES: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);

enum Syntaxes {
    Default,
    Extended(SyntaxSet),
}

impl Syntaxes {
    fn set(&self) -> &SyntaxSet {
        match self {
            Syntaxes::Default => &DEFAULT_SYNTAXES,
            Syntaxes::Extended(set) => set,
        }
    }
}

/// Tokenizer and theme engine: turns a [`SourceDocument`] into coloured
/// lines of tokens.
pub struct Highlighter {
    syntaxes: Syntaxes,
    theme: SyntectTheme,
    code_theme: CodeTheme,
}

impl Highlighter {
    pub fn new(theme: &CodeTheme) -> Self {
        Self {
            syntaxes: Syntaxes::Default,
            theme: theme.to_syntect(),
            code_theme: theme.clone(),
        }
    }

    /// Like [`Highlighter::new`], with `.sublime-syntax` definitions from
    /// `folder` added on top of the bundled grammars.
    pub fn with_syntax_folder(theme: &CodeTheme, folder: &Path) -> Result<Self, TokenizeError> {
        let mut builder = SyntaxSet::load_defaults_newlines().into_builder();
        builder
            .add_from_folder(folder, true)
            .map_err(|err| TokenizeError::SyntaxFolder {
                path: folder.to_path_buf(),
                message: err.to_string(),
            })?;
        let set = builder.build();
        tracing::debug!(
            folder = %folder.display(),
            syntaxes = set.syntaxes().len(),
            "loaded extra syntax definitions"
        );
        Ok(Self {
            syntaxes: Syntaxes::Extended(set),
            theme: theme.to_syntect(),
            code_theme: theme.clone(),
        })
    }

    pub fn theme(&self) -> &CodeTheme {
        &self.code_theme
    }

    pub fn resolve_syntax(&self, language: &str) -> Result<&SyntaxReference, TokenizeError> {
        let set = self.syntaxes.set();
        let found = match find_language(language) {
            Some(entry) => entry
                .candidates
                .iter()
                .find_map(|token| set.find_syntax_by_token(token)),
            None if language.trim().is_empty() => None,
            None => set.find_syntax_by_token(language.trim()),
        };
        found.ok_or_else(|| TokenizeError::UnsupportedLanguage(language.to_string()))
    }

    pub fn supports(&self, language: &str) -> bool {
        self.resolve_syntax(language).is_ok()
    }

    /// Highlights the whole document. Either every line is tokenized or an
    /// error is returned; there is no partial output.
    pub fn highlight(&self, doc: &SourceDocument) -> Result<HighlightedCode, TokenizeError> {
        let syntax = self.resolve_syntax(&doc.language)?;
        let set = self.syntaxes.set();
        let highlighter = ThemeHighlighter::new(&self.theme);
        let mut parse_state = ParseState::new(syntax);
        let mut highlight_state = HighlightState::new(&highlighter, ScopeStack::new());
        let mut code = HighlightedCode::default();

        for (idx, line) in doc.lines().enumerate() {
            // The newline-aware grammars expect each line to end with `\n`.
            let line = format!("{line}\n");
            let ops = parse_state
                .parse_line(&line, set)
                .map_err(|source| TokenizeError::Parse { line: idx, source })?;
            code.lines.push(Vec::new());
            let iter = HighlightIterator::new(&mut highlight_state, &ops, &line, &highlighter);
            for (style, piece) in iter {
                let piece = piece.trim_end_matches(['\n', '\r']);
                code.push_token(piece, color_to_hex(style.foreground));
            }
        }

        tracing::trace!(
            language = %doc.language,
            syntax = %syntax.name,
            lines = code.line_count(),
            "highlighted document"
        );
        Ok(code)
    }
}
