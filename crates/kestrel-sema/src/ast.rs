//! Abstract Syntax Tree consumed by the analyser
//!
//! The parser lives outside this crate; it hands over a [`Program`] either
//! in memory or as JSON through [`VersionedProgram`]. Every node category is
//! a closed enum so each traversal matches exhaustively.

pub mod build;

use crate::span::Span;
use serde::{Deserialize, Serialize};

/// AST schema version
///
/// Included in JSON dumps. Increment on breaking changes to the node shapes.
pub const AST_VERSION: u32 = 1;

/// One analysed source file
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Program {
    pub items: Vec<Item>,
}

/// Versioned AST wrapper for JSON serialization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionedProgram {
    pub ast_version: u32,
    pub program: Program,
}

impl VersionedProgram {
    pub fn new(program: Program) -> Self {
        Self {
            ast_version: AST_VERSION,
            program,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl From<Program> for VersionedProgram {
    fn from(program: Program) -> Self {
        Self::new(program)
    }
}

/// Module-level declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Item {
    Function(FnDecl),
    Struct(StructDecl),
    Union(UnionDecl),
    Extern(ExternDecl),
    Module(ModuleDecl),
    Let(LetStmt),
}

impl Item {
    pub fn span(&self) -> Span {
        match self {
            Item::Function(f) => f.span,
            Item::Struct(s) => s.span,
            Item::Union(u) => u.span,
            Item::Extern(e) => e.span,
            Item::Module(m) => m.span,
            Item::Let(l) => l.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

/// Type annotation exactly as written; resolved through `types::normalize`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeAnnotation {
    pub text: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: Ident,
    pub ty: Option<TypeAnnotation>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FnDecl {
    pub name: Ident,
    /// Type parameters (e.g. `<T, E>` in `fn foo<T, E>(...)`)
    pub type_params: Vec<Ident>,
    pub params: Vec<Param>,
    pub return_type: Option<TypeAnnotation>,
    pub body: Block,
    /// Deprecation reason, if the function is deprecated
    pub deprecated: Option<String>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructDecl {
    pub name: Ident,
    pub type_params: Vec<Ident>,
    pub fields: Vec<FieldDecl>,
    pub deprecated: Option<String>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: Ident,
    /// `None` leaves the field unconstrained
    pub ty: Option<TypeAnnotation>,
}

/// Tagged union: `union Shape = Circle<F64> | Square<F64>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnionDecl {
    pub name: Ident,
    pub type_params: Vec<Ident>,
    pub variants: Vec<VariantDecl>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantDecl {
    pub name: Ident,
    pub payload: Vec<TypeAnnotation>,
}

/// Foreign function signature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternDecl {
    pub name: Ident,
    pub params: Vec<Param>,
    pub return_type: Option<TypeAnnotation>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleDecl {
    pub name: Ident,
    pub items: Vec<Item>,
    pub span: Span,
}

/// `{ stmts; tail }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub tail: Option<Box<Expr>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    Let(LetStmt),
    Assign(AssignStmt),
    Expr(Expr),
    Yield(YieldStmt),
    While(WhileStmt),
    Break(Span),
    Continue(Span),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Let(s) => s.span,
            Stmt::Assign(s) => s.span,
            Stmt::Expr(e) => e.span(),
            Stmt::Yield(s) => s.span,
            Stmt::While(s) => s.span,
            Stmt::Break(span) | Stmt::Continue(span) => *span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LetStmt {
    pub name: Ident,
    pub mutable: bool,
    pub ty: Option<TypeAnnotation>,
    /// Fixed arrays may be declared without an initializer
    pub init: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignStmt {
    pub target: AssignTarget,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AssignTarget {
    Name(Ident),
    Index {
        base: Box<Expr>,
        index: Box<Expr>,
        span: Span,
    },
    Field {
        base: Box<Expr>,
        field: Ident,
        span: Span,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldStmt {
    pub value: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhileStmt {
    pub cond: Expr,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Literal(Literal, Span),
    Ident(Ident),
    Lambda(LambdaExpr),
    Unary(UnaryExpr),
    Binary(BinaryExpr),
    Field(FieldExpr),
    Index(IndexExpr),
    Call(CallExpr),
    If(IfExpr),
    Block(Block),
    Match(MatchExpr),
    StructLit(StructLitExpr),
    Array(Vec<Expr>, Span),
    Tuple(Vec<Expr>, Span),
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Literal(_, span) | Expr::Array(_, span) | Expr::Tuple(_, span) => *span,
            Expr::Ident(id) => id.span,
            Expr::Lambda(e) => e.span,
            Expr::Unary(e) => e.span,
            Expr::Binary(e) => e.span,
            Expr::Field(e) => e.span,
            Expr::Index(e) => e.span,
            Expr::Call(e) => e.span,
            Expr::If(e) => e.span,
            Expr::Block(b) => b.span,
            Expr::Match(e) => e.span,
            Expr::StructLit(e) => e.span,
        }
    }

    /// Identifier name if this is a bare identifier
    pub fn as_ident(&self) -> Option<&Ident> {
        match self {
            Expr::Ident(id) => Some(id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    /// Integer literal; `suffix` names an explicit width such as `U8`
    Int { value: i128, suffix: Option<String> },
    Float { value: f64, suffix: Option<String> },
    Bool(bool),
    Char(char),
    String(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LambdaExpr {
    pub params: Vec<Param>,
    pub return_type: Option<TypeAnnotation>,
    pub body: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Not,
    Neg,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    pub operand: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem
        )
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryExpr {
    pub op: BinaryOp,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldExpr {
    pub base: Box<Expr>,
    pub field: Ident,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexExpr {
    pub base: Box<Expr>,
    pub index: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallExpr {
    pub callee: Box<Expr>,
    /// Explicit type arguments: `identity<I32>(x)`
    pub type_args: Vec<TypeAnnotation>,
    pub args: Vec<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfExpr {
    pub cond: Box<Expr>,
    pub then_branch: Box<Expr>,
    pub else_branch: Option<Box<Expr>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchExpr {
    pub scrutinee: Box<Expr>,
    pub arms: Vec<MatchArm>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchArm {
    pub pattern: Pattern,
    pub body: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Pattern {
    Wildcard(Span),
    /// Binds the whole scrutinee; matches everything
    Binding(Ident),
    /// `Circle(r)`: a union variant with its payload bindings
    Variant {
        name: Ident,
        bindings: Vec<Ident>,
        span: Span,
    },
    Literal(Literal, Span),
}

impl Pattern {
    pub fn span(&self) -> Span {
        match self {
            Pattern::Wildcard(span) | Pattern::Literal(_, span) => *span,
            Pattern::Binding(id) => id.span,
            Pattern::Variant { span, .. } => *span,
        }
    }

    /// Wildcards and bare bindings cover every value
    pub fn is_catch_all(&self) -> bool {
        matches!(self, Pattern::Wildcard(_) | Pattern::Binding(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructLitExpr {
    pub name: Ident,
    pub fields: Vec<FieldInit>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldInit {
    pub name: Ident,
    pub value: Expr,
}

#[cfg(test)]
mod tests {
    use super::build::*;
    use super::*;

    #[test]
    fn test_versioned_program_json_round_trip() {
        let program = program(vec![func(
            "main",
            &[],
            Some("Void"),
            block(vec![let_("x", Some("I32"), int(1))], None),
        )]);
        let json = VersionedProgram::new(program.clone()).to_json().unwrap();
        assert!(json.contains("\"ast_version\": 1"));
        let back = VersionedProgram::from_json(&json).unwrap();
        assert_eq!(back.program, program);
    }

    #[test]
    fn test_integer_literals_survive_json() {
        let program = program(vec![func(
            "main",
            &[],
            None,
            block(
                vec![
                    let_("big", Some("U64"), int(u64::MAX as i128)),
                    let_("low", Some("I64"), neg(int(9_223_372_036_854_775_808))),
                    let_("byte", None, int_typed(7, "U8")),
                ],
                None,
            ),
        )]);
        let json = VersionedProgram::new(program.clone()).to_json().unwrap();
        let back = VersionedProgram::from_json(&json).unwrap();
        assert_eq!(back.ast_version, AST_VERSION);
        assert_eq!(back.program, program);
    }

    #[test]
    fn test_catch_all_patterns() {
        assert!(p_wild().is_catch_all());
        assert!(p_bind("x").is_catch_all());
        assert!(!p_variant("Some", &["x"]).is_catch_all());
    }

    #[test]
    fn test_operator_classes() {
        assert!(BinaryOp::Rem.is_arithmetic());
        assert!(BinaryOp::Le.is_comparison());
        assert!(BinaryOp::Or.is_logical());
        assert_eq!(BinaryOp::Ne.symbol(), "!=");
    }
}
