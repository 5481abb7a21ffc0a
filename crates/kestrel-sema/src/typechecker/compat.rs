//! Compatibility between an expected type and an inferred one

use super::{Check, TypeChecker};
use super::infer::unsuffixed_int_value;
use super::suggestions::suggest_type_mismatch;
use crate::ast::Expr;
use crate::defs::Definitions;
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::span::Span;
use crate::types::{Prim, Type};

/// Whether values are checked against `expected` at all
///
/// Only concrete primitives and registered, non-generic struct names are
/// enforced; every other expected type accepts anything.
pub fn is_enforced(defs: &Definitions, expected: &Type) -> bool {
    match expected.strip_drop() {
        Type::Primitive(prim) => !matches!(prim, Prim::IntLit | Prim::FloatLit),
        Type::Generic { name, args } => args.is_empty() && defs.has_struct(name),
        _ => false,
    }
}

pub fn compatible(defs: &Definitions, expected: &Type, actual: &Type) -> bool {
    if !is_enforced(defs, expected) {
        return true;
    }
    if actual.is_unknown() || actual.is_never() {
        return true;
    }
    match actual.as_prim() {
        Some(Prim::IntLit) if expected.is_int_like() => return true,
        Some(Prim::FloatLit) if expected.is_float_like() => return true,
        _ => {}
    }
    expected.strip_drop().normalized() == actual.strip_drop().normalized()
}

impl<'a> TypeChecker<'a> {
    /// Report `TypeMismatch` unless `actual` satisfies `expected`
    pub(super) fn require(
        &mut self,
        expected: &Type,
        actual: &Type,
        context: &str,
        span: Span,
    ) -> Check<bool> {
        if compatible(&self.defs, expected, actual) {
            return Ok(true);
        }
        let diag = Diagnostic::new(
            DiagnosticKind::TypeMismatch,
            format!(
                "type mismatch in {}: expected {}, found {}",
                context, expected, actual
            ),
            span,
        )
        .with_label(format!("expected {}", expected))
        .with_optional_help(suggest_type_mismatch(expected, actual));
        self.report(diag)?;
        Ok(false)
    }

    /// `require` plus the range check for integer literals
    pub(super) fn require_expr(
        &mut self,
        expected: &Type,
        actual: &Type,
        expr: &Expr,
        context: &str,
    ) -> Check<bool> {
        if !self.require(expected, actual, context, expr.span())? {
            return Ok(false);
        }
        self.check_literal_range(expected, expr)
    }

    /// `LiteralOutOfRange` when an unsuffixed literal cannot fit `expected`
    pub(super) fn check_literal_range(&mut self, expected: &Type, expr: &Expr) -> Check<bool> {
        let (Some(prim), Some(value)) = (expected.as_prim(), unsuffixed_int_value(expr)) else {
            return Ok(true);
        };
        let Some((min, max)) = prim.int_range() else {
            return Ok(true);
        };
        if (min..=max).contains(&value) {
            return Ok(true);
        }
        self.report(
            Diagnostic::new(
                DiagnosticKind::LiteralOutOfRange,
                format!("literal {} does not fit in {}", value, prim.name()),
                expr.span(),
            )
            .with_note(format!("{} holds values from {} to {}", prim.name(), min, max)),
        )?;
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defs::StructDef;
    use crate::types::normalize;
    use rstest::rstest;

    fn defs_with_point() -> Definitions {
        let mut defs = Definitions::new();
        defs.register_struct(StructDef {
            name: "Point".into(),
            type_params: vec![],
            fields: vec![],
            field_types: vec![],
            deprecated: None,
            span: Span::dummy(),
        })
        .unwrap();
        defs
    }

    #[rstest]
    #[case("I32", true)]
    #[case("Bool", true)]
    #[case("Void", true)]
    #[case("Never", true)]
    #[case("String", true)]
    #[case("Point", true)]
    #[case("IntLit", false)]
    #[case("Unknown", false)]
    #[case("Widget", false)]
    #[case("Option<I32>", false)]
    #[case("[I32; 3]", false)]
    fn test_is_enforced(#[case] raw: &str, #[case] enforced: bool) {
        assert_eq!(is_enforced(&defs_with_point(), &normalize(raw)), enforced);
    }

    #[rstest]
    #[case("I32", "IntLit", true)]
    #[case("U32", "IntLit", true)]
    #[case("Char", "IntLit", true)]
    #[case("String", "IntLit", false)]
    #[case("F32", "FloatLit", true)]
    #[case("I32", "FloatLit", false)]
    #[case("I32", "Unknown", true)]
    #[case("Bool", "Never", true)]
    #[case("I32", "I64", false)]
    #[case("Point", "Point", true)]
    #[case("Point", "Point!free_point", true)]
    #[case("Widget", "Bool", true)]
    fn test_compatible(#[case] expected: &str, #[case] actual: &str, #[case] ok: bool) {
        let defs = defs_with_point();
        assert_eq!(compatible(&defs, &normalize(expected), &normalize(actual)), ok);
    }
}
