//! Diagnostic system for errors and warnings
//!
//! Every problem the analyser finds is a [`Diagnostic`] routed through a
//! [`DiagnosticSink`]. Rust-level errors are reserved for aborting the walk.

pub mod error_codes;
pub mod sink;

pub use error_codes::DiagnosticKind;
pub use sink::{Aborted, DiagnosticBag, DiagnosticSink, ReportMode};

use crate::span::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Diagnostic schema version
pub const DIAG_VERSION: u32 = 1;

/// File name used until a sink stamps the real one
pub const UNKNOWN_FILE: &str = "<unknown>";

/// Severity level of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    /// Fails the analysis
    Error,
    /// Reported but never fails the analysis
    Warning,
}

impl fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticLevel::Error => write!(f, "error"),
            DiagnosticLevel::Warning => write!(f, "warning"),
        }
    }
}

/// Secondary location for related diagnostic information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedLocation {
    /// File path
    pub file: String,
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based)
    pub column: usize,
    /// Length of the span
    pub length: usize,
    /// Description of this location
    pub message: String,
}

impl RelatedLocation {
    /// Location in the file currently being analysed
    pub fn at(span: Span, message: impl Into<String>) -> Self {
        Self {
            file: UNKNOWN_FILE.to_string(),
            line: 1,
            column: span.start + 1,
            length: span.len(),
            message: message.into(),
        }
    }
}

/// A diagnostic message (error or warning)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Diagnostic schema version
    pub diag_version: u32,
    /// Severity level
    pub level: DiagnosticLevel,
    /// Error code (e.g., "KT0001")
    pub code: String,
    /// Main diagnostic message
    pub message: String,
    /// File path
    pub file: String,
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based)
    pub column: usize,
    /// Length of error span
    pub length: usize,
    /// Byte range in the source file
    pub span: Span,
    /// Short label for caret range
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub label: String,
    /// Additional notes (optional)
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub notes: Vec<String>,
    /// Related locations (optional)
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub related: Vec<RelatedLocation>,
    /// Suggested fix (optional)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub help: Option<String>,
}

impl Diagnostic {
    fn with_level(
        level: DiagnosticLevel,
        code: impl Into<String>,
        message: impl Into<String>,
        span: Span,
    ) -> Self {
        Self {
            diag_version: DIAG_VERSION,
            level,
            code: code.into(),
            message: message.into(),
            file: UNKNOWN_FILE.to_string(),
            line: 1,
            column: span.start + 1,
            length: span.len(),
            span,
            label: String::new(),
            notes: Vec::new(),
            related: Vec::new(),
            help: None,
        }
    }

    /// Create a new error diagnostic with code
    pub fn error_with_code(
        code: impl Into<String>,
        message: impl Into<String>,
        span: Span,
    ) -> Self {
        Self::with_level(DiagnosticLevel::Error, code, message, span)
    }

    /// Create a new warning diagnostic with code
    pub fn warning_with_code(
        code: impl Into<String>,
        message: impl Into<String>,
        span: Span,
    ) -> Self {
        Self::with_level(DiagnosticLevel::Warning, code, message, span)
    }

    /// Create a diagnostic for a known kind, using its code and level
    pub fn new(kind: DiagnosticKind, message: impl Into<String>, span: Span) -> Self {
        Self::with_level(kind.level(), kind.code(), message, span)
    }

    /// Kind behind this diagnostic's code, if it is a registered one
    pub fn kind(&self) -> Option<DiagnosticKind> {
        DiagnosticKind::from_code(&self.code)
    }

    pub fn is_error(&self) -> bool {
        self.level == DiagnosticLevel::Error
    }

    /// Set the file path
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = file.into();
        self
    }

    /// Set the line number
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }

    /// Set the label (caret description)
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Add a note
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Add a help message
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Add a help message when one is available
    pub fn with_optional_help(mut self, help: Option<String>) -> Self {
        if help.is_some() {
            self.help = help;
        }
        self
    }

    /// Add a related location
    pub fn with_related_location(mut self, location: RelatedLocation) -> Self {
        self.related.push(location);
        self
    }

    /// Format as human-readable string
    pub fn to_human_string(&self) -> String {
        let mut output = String::new();

        // Header: error[KT0001]: Type mismatch
        output.push_str(&format!(
            "{}[{}]: {}\n",
            self.level, self.code, self.message
        ));

        // Location: --> path/to/file.kes:12:9
        output.push_str(&format!(
            "  --> {}:{}:{}\n",
            self.file, self.line, self.column
        ));

        if !self.label.is_empty() {
            output.push_str(&format!("   | {}\n", self.label));
        }

        for note in &self.notes {
            output.push_str(&format!("   = note: {}\n", note));
        }

        for related in &self.related {
            output.push_str(&format!(
                "   = note: related location at {}:{}:{}: {}\n",
                related.file, related.line, related.column, related.message
            ));
        }

        if let Some(help) = &self.help {
            output.push_str(&format!("   = help: {}\n", help));
        }

        output
    }

    /// Format as JSON string
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Format as compact JSON string
    pub fn to_json_compact(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Sort diagnostics by level (errors first), then by location
pub fn sort_diagnostics(diagnostics: &mut [Diagnostic]) {
    diagnostics.sort_by(|a, b| match (a.level, b.level) {
        (DiagnosticLevel::Error, DiagnosticLevel::Warning) => std::cmp::Ordering::Less,
        (DiagnosticLevel::Warning, DiagnosticLevel::Error) => std::cmp::Ordering::Greater,
        _ => a
            .file
            .cmp(&b.file)
            .then(a.line.cmp(&b.line))
            .then(a.column.cmp(&b.column)),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_takes_code_and_level_from_kind() {
        let diag = Diagnostic::new(DiagnosticKind::TypeMismatch, "bad", Span::new(3, 7));
        assert_eq!(diag.code, "KT0001");
        assert_eq!(diag.level, DiagnosticLevel::Error);
        assert_eq!(diag.column, 4);
        assert_eq!(diag.length, 4);
        assert_eq!(diag.kind(), Some(DiagnosticKind::TypeMismatch));

        let warn = Diagnostic::new(DiagnosticKind::UnusedBinding, "unused", Span::new(0, 1));
        assert_eq!(warn.level, DiagnosticLevel::Warning);
        assert!(!warn.is_error());
    }

    #[test]
    fn test_builder_pattern() {
        let diag = Diagnostic::error_with_code("KT0002", "test", Span::new(0, 4))
            .with_file("main.kes")
            .with_line(10)
            .with_label("not found in this scope")
            .with_note("names must be declared before use")
            .with_help("did you mean 'count'?");

        assert_eq!(diag.file, "main.kes");
        assert_eq!(diag.line, 10);
        assert_eq!(diag.label, "not found in this scope");
        assert_eq!(diag.notes.len(), 1);
        assert!(diag.help.is_some());
    }

    #[test]
    fn test_optional_help_keeps_existing_help() {
        let diag = Diagnostic::warning_with_code("KW0001", "w", Span::dummy())
            .with_help("first")
            .with_optional_help(None);
        assert_eq!(diag.help.as_deref(), Some("first"));
    }

    #[test]
    fn test_human_format() {
        let diag = Diagnostic::error_with_code("KT0001", "Type mismatch", Span::new(8, 13))
            .with_file("test.kes")
            .with_label("expected I32, found String")
            .with_related_location(RelatedLocation::at(Span::new(0, 3), "declared here"))
            .with_help("convert the value first");

        let output = diag.to_human_string();
        assert!(output.starts_with("error[KT0001]: Type mismatch\n"));
        assert!(output.contains("  --> test.kes:1:9"));
        assert!(output.contains("expected I32, found String"));
        assert!(output.contains("related location at <unknown>:1:1: declared here"));
        assert!(output.contains("= help: convert the value first"));
    }

    #[test]
    fn test_json_round_trip() {
        let diag = Diagnostic::error_with_code("KT0001", "Type mismatch", Span::new(0, 5))
            .with_file("test.kes")
            .with_label("error here");

        let json = diag.to_json_string().unwrap();
        assert!(json.contains("\"diag_version\": 1"));
        assert!(json.contains("\"level\": \"error\""));
        assert!(json.contains("\"code\": \"KT0001\""));

        let back: Diagnostic = serde_json::from_str(&json).unwrap();
        assert_eq!(back, diag);
    }

    #[test]
    fn test_sort_diagnostics() {
        let mut diagnostics = vec![
            Diagnostic::warning_with_code("KW0001", "warn1", Span::new(0, 1))
                .with_file("a.kes")
                .with_line(5),
            Diagnostic::error_with_code("KT0001", "err1", Span::new(0, 1))
                .with_file("b.kes")
                .with_line(1),
            Diagnostic::error_with_code("KT0001", "err2", Span::new(0, 1))
                .with_file("a.kes")
                .with_line(10),
        ];

        sort_diagnostics(&mut diagnostics);

        assert_eq!(diagnostics[0].message, "err2");
        assert_eq!(diagnostics[1].message, "err1");
        assert_eq!(diagnostics[2].level, DiagnosticLevel::Warning);
    }

    #[test]
    fn test_diagnostic_level_display() {
        assert_eq!(DiagnosticLevel::Error.to_string(), "error");
        assert_eq!(DiagnosticLevel::Warning.to_string(), "warning");
    }
}
