//! Where diagnostics go
//!
//! The analyser never decides whether an error stops the walk; the sink
//! does, by returning [`Aborted`] from [`DiagnosticSink::report`].

use super::{Diagnostic, DiagnosticLevel, UNKNOWN_FILE};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Analysis stopped at the first error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("analysis aborted: {code}: {message}")]
pub struct Aborted {
    pub code: String,
    pub message: String,
}

/// Receives diagnostics during analysis
pub trait DiagnosticSink {
    /// Record a diagnostic; `Err` stops the traversal
    fn report(&mut self, diagnostic: Diagnostic) -> Result<(), Aborted>;

    /// File path stamped onto subsequent diagnostics
    fn set_current_file(&mut self, path: &str);

    /// Errors reported so far
    fn error_count(&self) -> usize;
}

/// How a [`DiagnosticBag`] reacts to errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportMode {
    /// Stop at the first error (single-file mode)
    #[default]
    FirstError,
    /// Keep walking and report everything (project mode)
    CollectAll,
}

/// In-memory sink
#[derive(Debug, Default)]
pub struct DiagnosticBag {
    mode: ReportMode,
    current_file: Option<String>,
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticBag {
    pub fn new(mode: ReportMode) -> Self {
        Self {
            mode,
            current_file: None,
            diagnostics: Vec::new(),
        }
    }

    pub fn mode(&self) -> ReportMode {
        self.mode
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.level == DiagnosticLevel::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }
}

impl DiagnosticSink for DiagnosticBag {
    fn report(&mut self, mut diagnostic: Diagnostic) -> Result<(), Aborted> {
        if let Some(file) = &self.current_file {
            if diagnostic.file == UNKNOWN_FILE {
                diagnostic.file = file.clone();
            }
            for related in &mut diagnostic.related {
                if related.file == UNKNOWN_FILE {
                    related.file = file.clone();
                }
            }
        }

        let abort = diagnostic.is_error() && self.mode == ReportMode::FirstError;
        let aborted = Aborted {
            code: diagnostic.code.clone(),
            message: diagnostic.message.clone(),
        };
        self.diagnostics.push(diagnostic);

        if abort {
            Err(aborted)
        } else {
            Ok(())
        }
    }

    fn set_current_file(&mut self, path: &str) {
        self.current_file = Some(path.to_string());
    }

    fn error_count(&self) -> usize {
        self.errors().count()
    }
}
