//! Assignment targets and ownership

mod common;

use common::*;
use kestrel_sema::ast::build::*;
use kestrel_sema::DiagnosticKind;
use pretty_assertions::assert_eq;

#[test]
fn test_immutable_binding_cannot_be_assigned() {
    let program = program(vec![main_with(vec![
        let_("count", Some("I32"), int(0)),
        assign("count", int(1)),
    ])]);
    let (_, diagnostics) = run(&program);
    assert_eq!(diagnostics.len(), 1);
    let diag = &diagnostics[0];
    assert_eq!(diag.kind(), Some(DiagnosticKind::CannotAssignImmutable));
    assert_eq!(diag.related[0].message, "declared immutable here");
    assert!(diag.help.is_some());
}

#[test]
fn test_mutable_binding_can_be_assigned() {
    let program = program(vec![main_with(vec![
        let_mut("count", Some("I32"), int(0)),
        assign("count", int(1)),
    ])]);
    assert_clean(&program);
}

#[test]
fn test_parameters_are_immutable() {
    let program = program(vec![func(
        "reset",
        &[("n", "I32")],
        None,
        block(vec![assign("n", int(0))], None),
    )]);
    assert_kinds(&program, &[DiagnosticKind::CannotAssignImmutable]);
}

#[test]
fn test_assignment_to_unknown_name() {
    let program = program(vec![main_with(vec![assign("ghost", int(1))])]);
    assert_kinds(&program, &[DiagnosticKind::UnknownName]);
}

#[test]
fn test_droppable_value_moves_into_call() {
    let program = program(vec![
        func("close", &[("f", "File!close_file")], None, block(vec![], None)),
        struct_decl("File", &[("fd", "I32")]),
        func(
            "main",
            &[("f", "File!close_file")],
            None,
            block(
                vec![
                    expr_stmt(call("close", vec![ident("f")])),
                    expr_stmt(call("close", vec![ident("f")])),
                ],
                None,
            ),
        ),
    ]);
    assert_kinds(&program, &[DiagnosticKind::UseAfterMove]);
}
