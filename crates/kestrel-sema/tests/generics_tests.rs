//! Generic functions, structs and unions

mod common;

use common::*;
use kestrel_sema::ast::build::*;
use kestrel_sema::ast::Item;
use kestrel_sema::{DiagnosticKind, FnSig, Type};
use pretty_assertions::assert_eq;

fn identity() -> Item {
    generic_func(
        "identity",
        &["T"],
        &[("x", "T")],
        Some("T"),
        block(vec![], Some(ident("x"))),
    )
}

fn pick() -> Item {
    generic_func(
        "pick",
        &["T"],
        &[("a", "T"), ("b", "T")],
        Some("T"),
        block(vec![], Some(ident("a"))),
    )
}

#[test]
fn test_identity_returns_argument_type() {
    let program = program(vec![
        identity(),
        main_with(vec![
            let_("s", Some("String"), call("identity", vec![string("hi")])),
            let_("b", Some("Bool"), call("identity", vec![boolean(true)])),
        ]),
    ]);
    assert_clean(&program);
}

#[test]
fn test_identity_result_is_enforced() {
    let program = program(vec![
        identity(),
        main_with(vec![let_(
            "b",
            Some("Bool"),
            call("identity", vec![string("hi")]),
        )]),
    ]);
    assert_kinds(&program, &[DiagnosticKind::TypeMismatch]);
}

#[test]
fn test_conflicting_bindings_resolve_to_unknown() {
    let program = program(vec![
        pick(),
        main_with(vec![let_(
            "r",
            Some("Bool"),
            call("pick", vec![int_typed(1, "I32"), string("x")]),
        )]),
    ]);
    assert_clean(&program);
}

#[test]
fn test_generic_struct_literal_infers_arguments() {
    let program = program(vec![
        generic_struct("Box", &["T"], &[("item", "T")]),
        main_with(vec![
            let_("b", None, struct_lit("Box", vec![("item", string("x"))])),
            let_("s", Some("String"), field(ident("b"), "item")),
            let_("n", Some("I32"), field(ident("b"), "item")),
        ]),
    ]);
    assert_kinds(&program, &[DiagnosticKind::TypeMismatch]);
}

#[test]
fn test_generic_union_payload_through_narrowing() {
    let program = program(vec![
        union_decl("Maybe", &["T"], vec![("Just", vec!["T"]), ("Nothing", vec![])]),
        func(
            "get",
            &[("m", "Maybe<String>")],
            None,
            block(
                vec![expr_stmt(if_(
                    binary(
                        kestrel_sema::ast::BinaryOp::Eq,
                        field(ident("m"), "tag"),
                        string("Just"),
                    ),
                    block_expr(
                        vec![let_("s", Some("String"), field(ident("m"), "value"))],
                        None,
                    ),
                    None,
                ))],
                None,
            ),
        ),
    ]);
    assert_clean(&program);
}

#[test]
fn test_imported_generic_signature() {
    let first = FnSig::new(
        "first",
        vec![Type::slice(Type::named("T"))],
        Type::named("T"),
    )
    .with_type_params(&["T"]);
    let program = program(vec![main_with(vec![
        let_("xs", None, array(vec![string("a"), string("b")])),
        let_("s", Some("String"), call("first", vec![ident("xs")])),
        let_("n", Some("I32"), call("first", vec![ident("xs")])),
    ])]);
    let (_, diagnostics) = run_with_imports(&program, &[first]);
    let kinds: Vec<_> = diagnostics.iter().filter_map(|d| d.kind()).collect();
    assert_eq!(kinds, vec![DiagnosticKind::TypeMismatch]);
}
