//! Kestrel semantic analysis
//!
//! This library provides the type-checking and narrowing engine of the
//! Kestrel compiler front end:
//! - The AST handed over by the parser (in memory or as JSON)
//! - Type representation and normalization
//! - Struct, union and function signature registries
//! - Lexical scopes, generic substitution and tag narrowing
//! - Diagnostics with stable codes, and lint hooks

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod ast;
pub mod defs;
pub mod diagnostic;
pub mod lint;
pub mod scope;
pub mod span;
pub mod typechecker;
pub mod types;

pub use ast::{Program, VersionedProgram, AST_VERSION};
pub use defs::{Definitions, FnSig};
pub use diagnostic::{
    error_codes, sort_diagnostics, Aborted, Diagnostic, DiagnosticBag, DiagnosticKind,
    DiagnosticLevel, DiagnosticSink, RelatedLocation, ReportMode, DIAG_VERSION,
};
pub use lint::{LintConfig, LintHooks, NoLints, StandardLints};
pub use span::Span;
pub use typechecker::{analyze_program, AnalysisOptions, AnalysisOutcome, TypeChecker};
pub use types::{normalize, parse_type, Type};

/// Analyse one file with a fresh [`DiagnosticBag`] and the standard lints
///
/// Diagnostics come back sorted: errors first, then by position.
pub fn analyze(
    program: &Program,
    imports: &[FnSig],
    options: &AnalysisOptions,
    mode: ReportMode,
    lints: LintConfig,
) -> (AnalysisOutcome, Vec<Diagnostic>) {
    let mut bag = DiagnosticBag::new(mode);
    let mut hooks = StandardLints::new(lints);
    let outcome = analyze_program(program, imports, options, &mut bag, &mut hooks);
    let mut diagnostics = bag.into_diagnostics();
    sort_diagnostics(&mut diagnostics);
    (outcome, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoke() {
        assert_eq!(VERSION, "0.1.0");
    }

    #[test]
    fn test_empty_program_is_ok() {
        let (outcome, diagnostics) = analyze(
            &Program::default(),
            &[],
            &AnalysisOptions::default(),
            ReportMode::CollectAll,
            LintConfig::default(),
        );
        assert!(outcome.is_ok());
        assert!(diagnostics.is_empty());
    }
}
