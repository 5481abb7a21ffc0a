//! Local inference rules that need no environment

use crate::ast::{Literal, UnaryOp};
use crate::types::{Prim, Type};

/// Type of a literal; unsuffixed numbers get the provisional literal types
pub fn literal_type(lit: &Literal) -> Type {
    match lit {
        Literal::Int { suffix, .. } => suffix
            .as_deref()
            .and_then(Prim::from_name)
            .filter(|p| p.is_concrete_int())
            .map(Type::Primitive)
            .unwrap_or(Type::INT_LIT),
        Literal::Float { suffix, .. } => suffix
            .as_deref()
            .and_then(Prim::from_name)
            .filter(|p| p.is_concrete_float())
            .map(Type::Primitive)
            .unwrap_or(Type::FLOAT_LIT),
        Literal::Bool(_) => Type::BOOL,
        Literal::Char(_) => Type::CHAR,
        Literal::String(_) => Type::STRING,
    }
}

/// Result of a unary operator, `Unknown` when the operand does not fit
pub fn unary_result(op: UnaryOp, operand: &Type) -> Type {
    match op {
        UnaryOp::Not => {
            if operand.as_prim() == Some(Prim::Bool) {
                Type::BOOL
            } else {
                Type::Unknown
            }
        }
        UnaryOp::Neg => match operand.as_prim() {
            Some(p) if p.is_concrete_int() || p.is_concrete_float() => Type::Primitive(p),
            Some(p) if p.is_int_like() => Type::I32,
            Some(Prim::FloatLit) => Type::F64,
            _ => Type::Unknown,
        },
    }
}

/// Result of `+ - * / %`
///
/// Floats: a concrete width wins over a literal. Integers keep a width only
/// when both sides share it. Everything else falls back to I32 or F64.
pub fn arithmetic_result(is_add: bool, left: &Type, right: &Type) -> Type {
    let (l, r) = match (left.as_prim(), right.as_prim()) {
        (Some(l), Some(r)) => (l, r),
        _ => return Type::Unknown,
    };

    if is_add && (l == Prim::String || r == Prim::String) {
        return Type::STRING;
    }

    if l.is_float_like() && r.is_float_like() {
        return match (l, r) {
            (Prim::FloatLit, Prim::FloatLit) => Type::F64,
            (Prim::FloatLit, concrete) | (concrete, Prim::FloatLit) => Type::Primitive(concrete),
            (a, b) if a == b => Type::Primitive(a),
            _ => Type::F64,
        };
    }

    if l.is_int_like() && r.is_int_like() {
        if l == Prim::Char || r == Prim::Char {
            return Type::I32;
        }
        return if l == r && l.is_concrete_int() {
            Type::Primitive(l)
        } else {
            Type::I32
        };
    }

    Type::Unknown
}

/// Type of a two-way branch (`if`/`else`, match arms pairwise)
///
/// `Never` defers to the other side; equal known types are kept.
pub fn join_branches(then_ty: &Type, else_ty: &Type) -> Type {
    if then_ty.is_never() {
        return else_ty.clone();
    }
    if else_ty.is_never() {
        return then_ty.clone();
    }
    if !then_ty.is_unknown() && then_ty == else_ty {
        return then_ty.clone();
    }
    Type::Unknown
}

/// Element type shared by two array literal elements
///
/// A literal joins with a concrete type of its class.
pub fn join_elements(a: &Type, b: &Type) -> Type {
    match (a.as_prim(), b.as_prim()) {
        (Some(Prim::IntLit), Some(p)) | (Some(p), Some(Prim::IntLit)) if p.is_int_like() => {
            Type::Primitive(p)
        }
        (Some(Prim::FloatLit), Some(p)) | (Some(p), Some(Prim::FloatLit)) if p.is_float_like() => {
            Type::Primitive(p)
        }
        _ => join_branches(a, b),
    }
}

/// Unsuffixed integer literal value, looking through a leading `-`
pub fn unsuffixed_int_value(expr: &crate::ast::Expr) -> Option<i128> {
    use crate::ast::Expr;
    match expr {
        Expr::Literal(Literal::Int { value, suffix: None }, _) => Some(*value),
        Expr::Unary(unary) if unary.op == UnaryOp::Neg => {
            unsuffixed_int_value(&unary.operand).and_then(i128::checked_neg)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::build::*;
    use rstest::rstest;

    #[rstest]
    #[case(Type::INT_LIT, Type::INT_LIT, Type::I32)]
    #[case(Type::INT_LIT, Type::U32, Type::I32)]
    #[case(Type::U32, Type::INT_LIT, Type::I32)]
    #[case(Type::I64, Type::INT_LIT, Type::I32)]
    #[case(Type::I64, Type::I64, Type::I64)]
    #[case(Type::Primitive(Prim::U8), Type::Primitive(Prim::U8), Type::Primitive(Prim::U8))]
    #[case(Type::I64, Type::U32, Type::I32)]
    #[case(Type::CHAR, Type::INT_LIT, Type::I32)]
    #[case(Type::FLOAT_LIT, Type::FLOAT_LIT, Type::F64)]
    #[case(Type::F32, Type::FLOAT_LIT, Type::F32)]
    #[case(Type::FLOAT_LIT, Type::F32, Type::F32)]
    #[case(Type::F32, Type::F64, Type::F64)]
    #[case(Type::I32, Type::F64, Type::Unknown)]
    #[case(Type::BOOL, Type::BOOL, Type::Unknown)]
    #[case(Type::Unknown, Type::I32, Type::Unknown)]
    fn test_arithmetic_widening(#[case] left: Type, #[case] right: Type, #[case] expected: Type) {
        assert_eq!(arithmetic_result(false, &left, &right), expected);
    }

    #[test]
    fn test_string_concatenation_only_for_add() {
        assert_eq!(arithmetic_result(true, &Type::STRING, &Type::I32), Type::STRING);
        assert_eq!(arithmetic_result(true, &Type::BOOL, &Type::STRING), Type::STRING);
        assert_eq!(arithmetic_result(false, &Type::STRING, &Type::STRING), Type::Unknown);
    }

    #[rstest]
    #[case(UnaryOp::Not, Type::BOOL, Type::BOOL)]
    #[case(UnaryOp::Not, Type::I32, Type::Unknown)]
    #[case(UnaryOp::Neg, Type::INT_LIT, Type::I32)]
    #[case(UnaryOp::Neg, Type::I64, Type::I64)]
    #[case(UnaryOp::Neg, Type::FLOAT_LIT, Type::F64)]
    #[case(UnaryOp::Neg, Type::F32, Type::F32)]
    #[case(UnaryOp::Neg, Type::STRING, Type::Unknown)]
    fn test_unary_rules(#[case] op: UnaryOp, #[case] operand: Type, #[case] expected: Type) {
        assert_eq!(unary_result(op, &operand), expected);
    }

    #[test]
    fn test_literal_types() {
        assert_eq!(literal_type(&Literal::Int { value: 1, suffix: None }), Type::INT_LIT);
        assert_eq!(
            literal_type(&Literal::Int {
                value: 1,
                suffix: Some("U8".into())
            }),
            Type::Primitive(Prim::U8)
        );
        assert_eq!(
            literal_type(&Literal::Float {
                value: 1.5,
                suffix: Some("F32".into())
            }),
            Type::F32
        );
        assert_eq!(literal_type(&Literal::Char('a')), Type::CHAR);
    }

    #[test]
    fn test_join_branches() {
        assert_eq!(join_branches(&Type::NEVER, &Type::I32), Type::I32);
        assert_eq!(join_branches(&Type::STRING, &Type::NEVER), Type::STRING);
        assert_eq!(join_branches(&Type::I32, &Type::I32), Type::I32);
        assert_eq!(join_branches(&Type::I32, &Type::I64), Type::Unknown);
        assert_eq!(join_branches(&Type::Unknown, &Type::Unknown), Type::Unknown);
    }

    #[rstest]
    #[case(Type::INT_LIT, Type::U32, Type::U32)]
    #[case(Type::F32, Type::FLOAT_LIT, Type::F32)]
    #[case(Type::INT_LIT, Type::INT_LIT, Type::INT_LIT)]
    #[case(Type::STRING, Type::STRING, Type::STRING)]
    #[case(Type::STRING, Type::INT_LIT, Type::Unknown)]
    fn test_join_elements(#[case] a: Type, #[case] b: Type, #[case] expected: Type) {
        assert_eq!(join_elements(&a, &b), expected);
    }

    #[test]
    fn test_unsuffixed_int_value_sees_through_negation() {
        assert_eq!(unsuffixed_int_value(&neg(int(129))), Some(-129));
        assert_eq!(unsuffixed_int_value(&int_typed(5, "U8")), None);
        assert_eq!(unsuffixed_int_value(&string("5")), None);
    }
}
