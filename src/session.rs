//! Render pipeline shared by the front ends.
//!
//! Each render request takes a sequence number. A finished render is only
//! applied if no newer request was issued in the meantime, so a slow render
//! can never overwrite the output of a faster, newer one. Failed renders are
//! logged and leave the last good output in place.

use crate::config::LayoutConfig;
use crate::error::TokenizeError;
use crate::highlight::Highlighter;
use crate::ir::{FontSize, SourceDocument};
use crate::layout::{SvgDocument, compute_layout};
use crate::render::{render_html, render_svg};
use crate::state::Settings;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of the inputs of one render pass.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    seq: u64,
    doc: SourceDocument,
    font_size: FontSize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderOutput {
    pub html: String,
    pub svg: String,
    pub layout: SvgDocument,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// A newer request was issued; the result was dropped.
    Stale,
    /// Rendering failed; the previous output is kept.
    Failed,
}

impl RenderRequest {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Runs the pass. Pure with respect to the session, so it can run on any
    /// thread.
    pub fn run(&self, highlighter: &Highlighter, config: &LayoutConfig) -> Result<RenderOutput, TokenizeError> {
        let code = highlighter.highlight(&self.doc)?;
        let theme = highlighter.theme();
        let layout = compute_layout(&self.doc, &code, self.font_size, theme, config);
        Ok(RenderOutput {
            html: render_html(&code, theme),
            svg: render_svg(&layout),
            layout,
        })
    }
}

#[derive(Debug, Default)]
struct Outputs {
    applied_seq: u64,
    current: Option<RenderOutput>,
}

pub struct Session {
    highlighter: Highlighter,
    layout: LayoutConfig,
    issued: AtomicU64,
    outputs: Mutex<Outputs>,
}

impl Session {
    pub fn new(highlighter: Highlighter, layout: LayoutConfig) -> Self {
        Self {
            highlighter,
            layout,
            issued: AtomicU64::new(0),
            outputs: Mutex::new(Outputs::default()),
        }
    }

    pub fn begin_render(&self, settings: &Settings) -> RenderRequest {
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        RenderRequest {
            seq,
            doc: SourceDocument::new(&settings.code, &settings.language),
            font_size: settings.font_size(),
        }
    }

    pub fn run(&self, request: &RenderRequest) -> Result<RenderOutput, TokenizeError> {
        request.run(&self.highlighter, &self.layout)
    }

    pub fn complete(&self, seq: u64, result: Result<RenderOutput, TokenizeError>) -> Completion {
        let latest = self.issued.load(Ordering::SeqCst);
        if seq != latest {
            tracing::debug!(seq, latest, "discarding stale render");
            return Completion::Stale;
        }
        let output = match result {
            Ok(output) => output,
            Err(err) => {
                tracing::error!(seq, %err, "error highlighting code");
                return Completion::Failed;
            }
        };
        let mut outputs = match self.outputs.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        // Re-check under the lock: another thread may have applied a newer pass.
        if outputs.applied_seq > seq {
            return Completion::Stale;
        }
        outputs.applied_seq = seq;
        outputs.current = Some(output);
        Completion::Applied
    }

    /// Synchronous begin + run + complete.
    pub fn render(&self, settings: &Settings) -> Completion {
        let request = self.begin_render(settings);
        let result = self.run(&request);
        self.complete(request.seq(), result)
    }

    pub fn output(&self) -> Option<RenderOutput> {
        match self.outputs.lock() {
            Ok(guard) => guard.current.clone(),
            Err(poisoned) => poisoned.into_inner().current.clone(),
        }
    }

    pub fn svg(&self) -> Option<String> {
        self.output().map(|output| output.svg)
    }

    pub fn html(&self) -> Option<String> {
        self.output().map(|output| output.html)
    }
}
