//! Standard lints run through `analyze`

mod common;

use common::*;
use kestrel_sema::ast::build::*;
use kestrel_sema::ast::{BinaryOp, Program};
use kestrel_sema::{analyze, AnalysisOptions, DiagnosticKind, LintConfig, ReportMode};
use pretty_assertions::assert_eq;

fn lint(program: &Program, options: &AnalysisOptions, config: LintConfig) -> Vec<DiagnosticKind> {
    let (_, diagnostics) = analyze(program, &[], options, ReportMode::CollectAll, config);
    diagnostics.iter().filter_map(|d| d.kind()).collect()
}

#[test]
fn test_unused_local_and_parameter() {
    let program = program(vec![func(
        "f",
        &[("a", "I32"), ("_b", "I32")],
        None,
        block(vec![let_("tmp", None, int(1))], None),
    )]);
    let kinds = lint(&program, &AnalysisOptions::default(), LintConfig::default());
    assert_eq!(
        kinds,
        vec![DiagnosticKind::UnusedBinding, DiagnosticKind::UnusedBinding]
    );
}

#[test]
fn test_warnings_do_not_fail_analysis() {
    let program = program(vec![main_with(vec![let_("tmp", None, int(1))])]);
    let (outcome, diagnostics) = analyze(
        &program,
        &[],
        &AnalysisOptions::default(),
        ReportMode::FirstError,
        LintConfig::default(),
    );
    assert!(outcome.is_ok());
    assert_eq!(diagnostics.len(), 1);
    assert!(!diagnostics[0].is_error());
}

#[test]
fn test_errors_sort_before_warnings() {
    let program = program(vec![main_with(vec![
        let_("tmp", None, int(1)),
        let_("bad", Some("Bool"), int(1)),
    ])]);
    let (_, diagnostics) = analyze(
        &program,
        &[],
        &AnalysisOptions::default(),
        ReportMode::CollectAll,
        LintConfig::default(),
    );
    let kinds: Vec<_> = diagnostics.iter().filter_map(|d| d.kind()).collect();
    assert_eq!(
        kinds,
        vec![DiagnosticKind::TypeMismatch, DiagnosticKind::UnusedBinding]
    );
}

#[test]
fn test_parameter_limit() {
    let many: Vec<(String, &str)> = (0..4).map(|i| (format!("_p{}", i), "I32")).collect();
    let list: Vec<(&str, &str)> = many.iter().map(|(n, t)| (n.as_str(), *t)).collect();
    let program = program(vec![func("wide", &list, None, block(vec![], None))]);
    let config = LintConfig {
        max_params: 3,
        ..LintConfig::default()
    };
    assert_eq!(
        lint(&program, &AnalysisOptions::default(), config),
        vec![DiagnosticKind::TooManyParameters]
    );
}

#[test]
fn test_complexity_limit() {
    let cond = binary(BinaryOp::And, ident("a"), ident("b"));
    let body = block(
        vec![expr_stmt(if_(cond, block_expr(vec![], None), None))],
        None,
    );
    let program = program(vec![func("branchy", &[("a", "Bool"), ("b", "Bool")], None, body)]);
    let config = LintConfig {
        max_complexity: 2,
        ..LintConfig::default()
    };
    assert_eq!(
        lint(&program, &AnalysisOptions::default(), config),
        vec![DiagnosticKind::ComplexityTooHigh]
    );
}

#[test]
fn test_module_level_unused_only_in_entry_file() {
    let program = program(vec![global("LIMIT", Some("I32"), int(10))]);
    let entry = AnalysisOptions::default();
    let library = AnalysisOptions {
        entry_file: false,
        ..AnalysisOptions::default()
    };
    assert_eq!(
        lint(&program, &entry, LintConfig::default()),
        vec![DiagnosticKind::UnusedBinding]
    );
    assert!(lint(&program, &library, LintConfig::default()).is_empty());
}

#[test]
fn test_deprecated_function_warns_at_use() {
    let program = program(vec![
        deprecated(
            func("old", &[], None, block(vec![], None)),
            "use new instead",
        ),
        main_with(vec![expr_stmt(call("old", vec![]))]),
    ]);
    let (_, diagnostics) = run(&program);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics[0].kind(),
        Some(DiagnosticKind::DeprecatedSymbolUsed)
    );
    assert_eq!(diagnostics[0].notes, vec!["use new instead".to_string()]);
}
