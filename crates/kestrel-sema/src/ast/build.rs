//! Terse AST constructors for tests and tooling
//!
//! Every node gets a dummy span. Type annotations are passed as text; an
//! empty string means "no annotation".

use super::*;

pub fn id(name: &str) -> Ident {
    Ident {
        name: name.to_string(),
        span: Span::dummy(),
    }
}

pub fn annotation(text: &str) -> Option<TypeAnnotation> {
    if text.is_empty() {
        None
    } else {
        Some(TypeAnnotation {
            text: text.to_string(),
            span: Span::dummy(),
        })
    }
}

pub fn program(items: Vec<Item>) -> Program {
    Program { items }
}

// ---------------------------------------------------------------------------
// Declarations
// ---------------------------------------------------------------------------

pub fn params(list: &[(&str, &str)]) -> Vec<Param> {
    list.iter()
        .map(|(name, ty)| Param {
            name: id(name),
            ty: annotation(ty),
            span: Span::dummy(),
        })
        .collect()
}

pub fn func(name: &str, param_list: &[(&str, &str)], ret: Option<&str>, body: Block) -> Item {
    generic_func(name, &[], param_list, ret, body)
}

pub fn generic_func(
    name: &str,
    type_params: &[&str],
    param_list: &[(&str, &str)],
    ret: Option<&str>,
    body: Block,
) -> Item {
    Item::Function(FnDecl {
        name: id(name),
        type_params: type_params.iter().map(|t| id(t)).collect(),
        params: params(param_list),
        return_type: ret.and_then(annotation),
        body,
        deprecated: None,
        span: Span::dummy(),
    })
}

/// Mark a function or struct item deprecated
pub fn deprecated(item: Item, reason: &str) -> Item {
    match item {
        Item::Function(mut f) => {
            f.deprecated = Some(reason.to_string());
            Item::Function(f)
        }
        Item::Struct(mut s) => {
            s.deprecated = Some(reason.to_string());
            Item::Struct(s)
        }
        other => other,
    }
}

pub fn struct_decl(name: &str, fields: &[(&str, &str)]) -> Item {
    generic_struct(name, &[], fields)
}

pub fn generic_struct(name: &str, type_params: &[&str], fields: &[(&str, &str)]) -> Item {
    Item::Struct(StructDecl {
        name: id(name),
        type_params: type_params.iter().map(|t| id(t)).collect(),
        fields: fields
            .iter()
            .map(|(field, ty)| FieldDecl {
                name: id(field),
                ty: annotation(ty),
            })
            .collect(),
        deprecated: None,
        span: Span::dummy(),
    })
}

pub fn union_decl(name: &str, type_params: &[&str], variants: Vec<(&str, Vec<&str>)>) -> Item {
    Item::Union(UnionDecl {
        name: id(name),
        type_params: type_params.iter().map(|t| id(t)).collect(),
        variants: variants
            .into_iter()
            .map(|(variant, payload)| VariantDecl {
                name: id(variant),
                payload: payload.iter().filter_map(|ty| annotation(ty)).collect(),
            })
            .collect(),
        span: Span::dummy(),
    })
}

pub fn extern_fn(name: &str, param_list: &[(&str, &str)], ret: Option<&str>) -> Item {
    Item::Extern(ExternDecl {
        name: id(name),
        params: params(param_list),
        return_type: ret.and_then(annotation),
        span: Span::dummy(),
    })
}

pub fn module(name: &str, items: Vec<Item>) -> Item {
    Item::Module(ModuleDecl {
        name: id(name),
        items,
        span: Span::dummy(),
    })
}

/// Module-level `let`
pub fn global(name: &str, ty: Option<&str>, init: Expr) -> Item {
    Item::Let(LetStmt {
        name: id(name),
        mutable: false,
        ty: ty.and_then(annotation),
        init: Some(init),
        span: Span::dummy(),
    })
}

// ---------------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------------

pub fn block(stmts: Vec<Stmt>, tail: Option<Expr>) -> Block {
    Block {
        stmts,
        tail: tail.map(Box::new),
        span: Span::dummy(),
    }
}

fn let_stmt(name: &str, mutable: bool, ty: Option<&str>, init: Option<Expr>) -> Stmt {
    Stmt::Let(LetStmt {
        name: id(name),
        mutable,
        ty: ty.and_then(annotation),
        init,
        span: Span::dummy(),
    })
}

pub fn let_(name: &str, ty: Option<&str>, init: Expr) -> Stmt {
    let_stmt(name, false, ty, Some(init))
}

pub fn let_mut(name: &str, ty: Option<&str>, init: Expr) -> Stmt {
    let_stmt(name, true, ty, Some(init))
}

/// `let name: ty;` without an initializer
pub fn let_uninit(name: &str, ty: &str) -> Stmt {
    let_stmt(name, false, Some(ty), None)
}

/// `let mut name: ty;` without an initializer
pub fn let_mut_uninit(name: &str, ty: &str) -> Stmt {
    let_stmt(name, true, Some(ty), None)
}

pub fn assign(name: &str, value: Expr) -> Stmt {
    Stmt::Assign(AssignStmt {
        target: AssignTarget::Name(id(name)),
        value,
        span: Span::dummy(),
    })
}

pub fn assign_index(base: &str, index: Expr, value: Expr) -> Stmt {
    Stmt::Assign(AssignStmt {
        target: AssignTarget::Index {
            base: Box::new(ident(base)),
            index: Box::new(index),
            span: Span::dummy(),
        },
        value,
        span: Span::dummy(),
    })
}

pub fn assign_field(base: &str, field: &str, value: Expr) -> Stmt {
    Stmt::Assign(AssignStmt {
        target: AssignTarget::Field {
            base: Box::new(ident(base)),
            field: id(field),
            span: Span::dummy(),
        },
        value,
        span: Span::dummy(),
    })
}

pub fn expr_stmt(expr: Expr) -> Stmt {
    Stmt::Expr(expr)
}

pub fn yield_(value: Option<Expr>) -> Stmt {
    Stmt::Yield(YieldStmt {
        value,
        span: Span::dummy(),
    })
}

pub fn while_(cond: Expr, body: Block) -> Stmt {
    Stmt::While(WhileStmt {
        cond,
        body,
        span: Span::dummy(),
    })
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

pub fn ident(name: &str) -> Expr {
    Expr::Ident(id(name))
}

pub fn int(value: i128) -> Expr {
    Expr::Literal(Literal::Int { value, suffix: None }, Span::dummy())
}

pub fn int_typed(value: i128, suffix: &str) -> Expr {
    Expr::Literal(
        Literal::Int {
            value,
            suffix: Some(suffix.to_string()),
        },
        Span::dummy(),
    )
}

pub fn float(value: f64) -> Expr {
    Expr::Literal(Literal::Float { value, suffix: None }, Span::dummy())
}

pub fn float_typed(value: f64, suffix: &str) -> Expr {
    Expr::Literal(
        Literal::Float {
            value,
            suffix: Some(suffix.to_string()),
        },
        Span::dummy(),
    )
}

pub fn string(value: &str) -> Expr {
    Expr::Literal(Literal::String(value.to_string()), Span::dummy())
}

pub fn boolean(value: bool) -> Expr {
    Expr::Literal(Literal::Bool(value), Span::dummy())
}

pub fn ch(value: char) -> Expr {
    Expr::Literal(Literal::Char(value), Span::dummy())
}

pub fn unary(op: UnaryOp, operand: Expr) -> Expr {
    Expr::Unary(UnaryExpr {
        op,
        operand: Box::new(operand),
        span: Span::dummy(),
    })
}

pub fn not(operand: Expr) -> Expr {
    unary(UnaryOp::Not, operand)
}

pub fn neg(operand: Expr) -> Expr {
    unary(UnaryOp::Neg, operand)
}

pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary(BinaryExpr {
        op,
        left: Box::new(left),
        right: Box::new(right),
        span: Span::dummy(),
    })
}

pub fn field(base: Expr, name: &str) -> Expr {
    Expr::Field(FieldExpr {
        base: Box::new(base),
        field: id(name),
        span: Span::dummy(),
    })
}

pub fn index(base: Expr, idx: Expr) -> Expr {
    Expr::Index(IndexExpr {
        base: Box::new(base),
        index: Box::new(idx),
        span: Span::dummy(),
    })
}

pub fn call(callee: &str, args: Vec<Expr>) -> Expr {
    call_expr(ident(callee), &[], args)
}

pub fn call_with_types(callee: &str, type_args: &[&str], args: Vec<Expr>) -> Expr {
    call_expr(ident(callee), type_args, args)
}

pub fn call_expr(callee: Expr, type_args: &[&str], args: Vec<Expr>) -> Expr {
    Expr::Call(CallExpr {
        callee: Box::new(callee),
        type_args: type_args.iter().filter_map(|t| annotation(t)).collect(),
        args,
        span: Span::dummy(),
    })
}

pub fn if_(cond: Expr, then_branch: Expr, else_branch: Option<Expr>) -> Expr {
    Expr::If(IfExpr {
        cond: Box::new(cond),
        then_branch: Box::new(then_branch),
        else_branch: else_branch.map(Box::new),
        span: Span::dummy(),
    })
}

pub fn block_expr(stmts: Vec<Stmt>, tail: Option<Expr>) -> Expr {
    Expr::Block(block(stmts, tail))
}

pub fn lambda(param_list: &[(&str, &str)], ret: Option<&str>, body: Expr) -> Expr {
    Expr::Lambda(LambdaExpr {
        params: params(param_list),
        return_type: ret.and_then(annotation),
        body: Box::new(body),
        span: Span::dummy(),
    })
}

pub fn match_(scrutinee: Expr, arms: Vec<MatchArm>) -> Expr {
    Expr::Match(MatchExpr {
        scrutinee: Box::new(scrutinee),
        arms,
        span: Span::dummy(),
    })
}

pub fn arm(pattern: Pattern, body: Expr) -> MatchArm {
    MatchArm {
        pattern,
        body,
        span: Span::dummy(),
    }
}

pub fn p_wild() -> Pattern {
    Pattern::Wildcard(Span::dummy())
}

pub fn p_bind(name: &str) -> Pattern {
    Pattern::Binding(id(name))
}

pub fn p_variant(name: &str, bindings: &[&str]) -> Pattern {
    Pattern::Variant {
        name: id(name),
        bindings: bindings.iter().map(|b| id(b)).collect(),
        span: Span::dummy(),
    }
}

pub fn struct_lit(name: &str, fields: Vec<(&str, Expr)>) -> Expr {
    Expr::StructLit(StructLitExpr {
        name: id(name),
        fields: fields
            .into_iter()
            .map(|(field, value)| FieldInit {
                name: id(field),
                value,
            })
            .collect(),
        span: Span::dummy(),
    })
}

pub fn array(items: Vec<Expr>) -> Expr {
    Expr::Array(items, Span::dummy())
}

pub fn tuple(items: Vec<Expr>) -> Expr {
    Expr::Tuple(items, Span::dummy())
}
