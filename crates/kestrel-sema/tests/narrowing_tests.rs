//! Tag narrowing through `if` and `while`

mod common;

use common::*;
use kestrel_sema::ast::build::*;
use kestrel_sema::ast::{BinaryOp, Expr, Item};
use kestrel_sema::DiagnosticKind;
use pretty_assertions::assert_eq;
use rstest::rstest;

fn result_union() -> Item {
    union_decl(
        "Result",
        &[],
        vec![("Ok", vec!["I32"]), ("Err", vec!["String"])],
    )
}

fn tag_is(name: &str, variant: &str) -> Expr {
    binary(BinaryOp::Eq, field(ident(name), "tag"), string(variant))
}

fn tag_is_not(name: &str, variant: &str) -> Expr {
    binary(BinaryOp::Ne, field(ident(name), "tag"), string(variant))
}

fn with_result(stmts: Vec<kestrel_sema::ast::Stmt>) -> kestrel_sema::Program {
    program(vec![
        result_union(),
        func("handle", &[("r", "Result")], None, block(stmts, None)),
    ])
}

#[test]
fn test_value_is_readable_after_equality_check() {
    let program = with_result(vec![expr_stmt(if_(
        tag_is("r", "Ok"),
        block_expr(vec![let_("n", Some("I32"), field(ident("r"), "value"))], None),
        Some(block_expr(vec![], None)),
    ))]);
    assert_clean(&program);
}

#[test]
fn test_else_branch_of_inequality_is_narrowed() {
    let program = with_result(vec![expr_stmt(if_(
        tag_is_not("r", "Err"),
        block_expr(vec![], None),
        Some(block_expr(
            vec![let_("msg", Some("String"), field(ident("r"), "value"))],
            None,
        )),
    ))]);
    assert_clean(&program);
}

#[test]
fn test_value_without_narrowing_is_rejected() {
    let program = with_result(vec![let_("n", None, field(ident("r"), "value"))]);
    assert_kinds(&program, &[DiagnosticKind::UnionPayloadRequiresNarrowing]);
}

#[test]
fn test_narrowing_ends_with_the_branch() {
    let program = with_result(vec![
        expr_stmt(if_(
            tag_is("r", "Ok"),
            block_expr(vec![], None),
            None,
        )),
        let_("n", None, field(ident("r"), "value")),
    ]);
    assert_kinds(&program, &[DiagnosticKind::UnionPayloadRequiresNarrowing]);
}

#[test]
fn test_innermost_check_wins() {
    let inner = if_(
        tag_is("r", "Err"),
        block_expr(
            vec![let_("msg", Some("String"), field(ident("r"), "value"))],
            None,
        ),
        None,
    );
    let program = with_result(vec![expr_stmt(if_(
        tag_is("r", "Ok"),
        block_expr(vec![expr_stmt(inner)], None),
        None,
    ))]);
    assert_clean(&program);
}

#[test]
fn test_payload_type_follows_the_variant() {
    let program = with_result(vec![expr_stmt(if_(
        tag_is("r", "Ok"),
        block_expr(
            vec![let_("msg", Some("String"), field(ident("r"), "value"))],
            None,
        ),
        None,
    ))]);
    assert_kinds(&program, &[DiagnosticKind::TypeMismatch]);
}

#[test]
fn test_unknown_variant_in_condition() {
    let program = with_result(vec![expr_stmt(if_(
        tag_is("r", "Okay"),
        block_expr(vec![], None),
        None,
    ))]);
    let (_, diagnostics) = run(&program);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind(), Some(DiagnosticKind::UnknownUnionVariant));
    assert!(diagnostics[0].help.as_deref().unwrap_or("").contains("Ok"));
}

#[test]
fn test_lambda_parameter_is_not_narrowed() {
    let program = with_result(vec![expr_stmt(if_(
        tag_is("r", "Ok"),
        block_expr(
            vec![let_(
                "f",
                None,
                lambda(&[("r", "Result")], None, field(ident("r"), "value")),
            )],
            None,
        ),
        None,
    ))]);
    assert_kinds(&program, &[DiagnosticKind::UnionPayloadRequiresNarrowing]);
}

#[test]
fn test_assignment_ends_narrowing() {
    let program = with_result(vec![
        let_mut("current", None, ident("r")),
        expr_stmt(if_(
            tag_is("current", "Ok"),
            block_expr(
                vec![
                    assign("current", call("Err", vec![string("reset")])),
                    let_("n", None, field(ident("current"), "value")),
                ],
                None,
            ),
            None,
        )),
    ]);
    assert_kinds(&program, &[DiagnosticKind::UnionPayloadRequiresNarrowing]);
}

#[test]
fn test_while_condition_narrows_body() {
    let program = with_result(vec![while_(
        tag_is("r", "Ok"),
        block(vec![let_("n", Some("I32"), field(ident("r"), "value"))], None),
    )]);
    assert_clean(&program);
}

#[rstest]
#[case::compound(binary(BinaryOp::And, tag_is("r", "Ok"), boolean(true)))]
#[case::non_literal(binary(BinaryOp::Eq, field(ident("r"), "tag"), ident("label")))]
fn test_unrecognized_conditions_do_not_narrow(#[case] cond: Expr) {
    let program = with_result(vec![
        let_("label", None, string("Ok")),
        expr_stmt(if_(
            cond,
            block_expr(vec![let_("n", None, field(ident("r"), "value"))], None),
            None,
        )),
    ]);
    assert_kinds(&program, &[DiagnosticKind::UnionPayloadRequiresNarrowing]);
}
