//! Shared helpers for the analysis integration tests

#![allow(dead_code)]

use kestrel_sema::ast::build::{block, func};
use kestrel_sema::ast::{Item, Program, Stmt};
use kestrel_sema::{
    analyze, AnalysisOptions, AnalysisOutcome, Diagnostic, DiagnosticKind, FnSig, LintConfig,
    ReportMode,
};
use pretty_assertions::assert_eq;

/// `fn main() { stmts }`
pub fn main_with(stmts: Vec<Stmt>) -> Item {
    func("main", &[], None, block(stmts, None))
}

/// Analyse in collect-all mode with lints off
pub fn run(program: &Program) -> (AnalysisOutcome, Vec<Diagnostic>) {
    run_with_imports(program, &[])
}

pub fn run_with_imports(program: &Program, imports: &[FnSig]) -> (AnalysisOutcome, Vec<Diagnostic>) {
    let lints = LintConfig {
        unused_bindings: false,
        ..LintConfig::default()
    };
    analyze(
        program,
        imports,
        &AnalysisOptions::default(),
        ReportMode::CollectAll,
        lints,
    )
}

/// Kinds of every diagnostic, errors first
pub fn kinds(program: &Program) -> Vec<DiagnosticKind> {
    let (_, diagnostics) = run(program);
    diagnostics.iter().filter_map(|d| d.kind()).collect()
}

/// Assert that a program analyses without any diagnostic
pub fn assert_clean(program: &Program) {
    let (outcome, diagnostics) = run(program);
    assert!(
        diagnostics.is_empty(),
        "Expected no diagnostics, got: {:#?}",
        diagnostics
    );
    assert!(outcome.is_ok());
}

/// Assert that a program produces exactly these diagnostic kinds
pub fn assert_kinds(program: &Program, expected: &[DiagnosticKind]) {
    assert_eq!(kinds(program), expected.to_vec());
}
