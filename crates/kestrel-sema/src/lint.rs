//! Lint hooks invoked during analysis
//!
//! Lints see what the analyser already computed (bindings with usage
//! flags at scope exit, function shapes at function boundaries) and report
//! warnings through the same sink. They never influence typing.

use crate::ast::{Block, Expr, Param, Stmt};
use crate::diagnostic::{Aborted, Diagnostic, DiagnosticKind, DiagnosticSink};
use crate::scope::{Binding, BindingKind};
use crate::span::Span;

/// Which kind of scope just closed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// File or nested module body
    Module { entry_file: bool },
    /// Function or lambda parameters and body
    Function,
    /// Block, branch, loop body or match arm
    Block,
}

/// Body of a function or lambda
#[derive(Debug, Clone, Copy)]
pub enum FnBody<'a> {
    Block(&'a Block),
    Expr(&'a Expr),
}

/// Shape of a function handed to lints after it was checked
#[derive(Debug, Clone, Copy)]
pub struct FunctionInfo<'a> {
    /// `None` for lambdas
    pub name: Option<&'a str>,
    pub params: &'a [Param],
    pub body: FnBody<'a>,
    pub span: Span,
}

pub trait LintHooks {
    fn scope_exited(
        &mut self,
        _kind: ScopeKind,
        _bindings: &[Binding],
        _sink: &mut dyn DiagnosticSink,
    ) -> Result<(), Aborted> {
        Ok(())
    }

    fn function_checked(
        &mut self,
        _func: &FunctionInfo<'_>,
        _sink: &mut dyn DiagnosticSink,
    ) -> Result<(), Aborted> {
        Ok(())
    }
}

/// Lints disabled
#[derive(Debug, Default)]
pub struct NoLints;

impl LintHooks for NoLints {}

/// Thresholds for [`StandardLints`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LintConfig {
    pub unused_bindings: bool,
    pub max_params: usize,
    pub max_complexity: usize,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            unused_bindings: true,
            max_params: 7,
            max_complexity: 15,
        }
    }
}

/// Unused bindings, parameter count and cyclomatic complexity
#[derive(Debug, Default)]
pub struct StandardLints {
    config: LintConfig,
}

impl StandardLints {
    pub fn new(config: LintConfig) -> Self {
        Self { config }
    }
}

impl LintHooks for StandardLints {
    fn scope_exited(
        &mut self,
        kind: ScopeKind,
        bindings: &[Binding],
        sink: &mut dyn DiagnosticSink,
    ) -> Result<(), Aborted> {
        if !self.config.unused_bindings {
            return Ok(());
        }
        if kind == (ScopeKind::Module { entry_file: false }) {
            return Ok(());
        }
        for binding in bindings {
            if binding.read || binding.name.starts_with('_') {
                continue;
            }
            let what = match binding.kind {
                BindingKind::Variable => "variable",
                BindingKind::Parameter => "parameter",
                _ => continue,
            };
            sink.report(
                Diagnostic::new(
                    DiagnosticKind::UnusedBinding,
                    format!("unused {} '{}'", what, binding.name),
                    binding.span,
                )
                .with_label("declared here but never read")
                .with_help(format!(
                    "remove it or rename it to '_{}'",
                    binding.name
                )),
            )?;
        }
        Ok(())
    }

    fn function_checked(
        &mut self,
        func: &FunctionInfo<'_>,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<(), Aborted> {
        let label = func
            .name
            .map(|n| format!("function '{}'", n))
            .unwrap_or_else(|| "lambda".to_string());

        if func.params.len() > self.config.max_params {
            sink.report(Diagnostic::new(
                DiagnosticKind::TooManyParameters,
                format!(
                    "{} has {} parameters (maximum {})",
                    label,
                    func.params.len(),
                    self.config.max_params
                ),
                func.span,
            ))?;
        }

        let complexity = cyclomatic_complexity(func.body);
        if complexity > self.config.max_complexity {
            sink.report(
                Diagnostic::new(
                    DiagnosticKind::ComplexityTooHigh,
                    format!(
                        "{} has cyclomatic complexity {} (maximum {})",
                        label, complexity, self.config.max_complexity
                    ),
                    func.span,
                )
                .with_note("complexity counts branches, loops, extra match arms and && / ||"),
            )?;
        }
        Ok(())
    }
}

/// 1 + branches + loops + extra match arms + short-circuit operators
///
/// Nested lambdas are scored separately and do not count here.
pub fn cyclomatic_complexity(body: FnBody<'_>) -> usize {
    let mut counter = Complexity { score: 1 };
    match body {
        FnBody::Block(block) => counter.block(block),
        FnBody::Expr(expr) => counter.expr(expr),
    }
    counter.score
}

struct Complexity {
    score: usize,
}

impl Complexity {
    fn block(&mut self, block: &Block) {
        for stmt in &block.stmts {
            self.stmt(stmt);
        }
        if let Some(tail) = &block.tail {
            self.expr(tail);
        }
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Let(let_stmt) => {
                if let Some(init) = &let_stmt.init {
                    self.expr(init);
                }
            }
            Stmt::Assign(assign) => self.expr(&assign.value),
            Stmt::Expr(expr) => self.expr(expr),
            Stmt::Yield(y) => {
                if let Some(value) = &y.value {
                    self.expr(value);
                }
            }
            Stmt::While(w) => {
                self.score += 1;
                self.expr(&w.cond);
                self.block(&w.body);
            }
            Stmt::Break(_) | Stmt::Continue(_) => {}
        }
    }

    fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Literal(..) | Expr::Ident(_) | Expr::Lambda(_) => {}
            Expr::Unary(u) => self.expr(&u.operand),
            Expr::Binary(b) => {
                if b.op.is_logical() {
                    self.score += 1;
                }
                self.expr(&b.left);
                self.expr(&b.right);
            }
            Expr::Field(f) => self.expr(&f.base),
            Expr::Index(i) => {
                self.expr(&i.base);
                self.expr(&i.index);
            }
            Expr::Call(c) => {
                self.expr(&c.callee);
                for arg in &c.args {
                    self.expr(arg);
                }
            }
            Expr::If(i) => {
                self.score += 1;
                self.expr(&i.cond);
                self.expr(&i.then_branch);
                if let Some(else_branch) = &i.else_branch {
                    self.expr(else_branch);
                }
            }
            Expr::Block(block) => self.block(block),
            Expr::Match(m) => {
                self.score += m.arms.len().saturating_sub(1);
                self.expr(&m.scrutinee);
                for arm in &m.arms {
                    self.expr(&arm.body);
                }
            }
            Expr::StructLit(s) => {
                for field in &s.fields {
                    self.expr(&field.value);
                }
            }
            Expr::Array(items, _) | Expr::Tuple(items, _) => {
                for item in items {
                    self.expr(item);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::build::*;
    use crate::ast::BinaryOp;
    use crate::diagnostic::{DiagnosticBag, ReportMode};
    use crate::types::Type;

    fn binding(name: &str, kind: BindingKind, read: bool) -> Binding {
        let mut b = Binding::new(name, false, Type::I32, kind, Span::new(0, 1));
        b.read = read;
        b
    }

    #[test]
    fn test_unused_binding_rules() {
        let mut lints = StandardLints::default();
        let mut bag = DiagnosticBag::new(ReportMode::CollectAll);
        let bindings = vec![
            binding("used", BindingKind::Variable, true),
            binding("unused", BindingKind::Variable, false),
            binding("_ignored", BindingKind::Variable, false),
            binding("helper", BindingKind::Function, false),
            binding("count", BindingKind::Parameter, false),
        ];
        lints
            .scope_exited(ScopeKind::Function, &bindings, &mut bag)
            .unwrap();

        let messages: Vec<&str> = bag.diagnostics().iter().map(|d| d.message.as_str()).collect();
        assert_eq!(
            messages,
            vec!["unused variable 'unused'", "unused parameter 'count'"]
        );
    }

    #[test]
    fn test_module_scope_checked_only_in_entry_file() {
        let mut lints = StandardLints::default();
        let bindings = vec![binding("global", BindingKind::Variable, false)];

        let mut bag = DiagnosticBag::new(ReportMode::CollectAll);
        lints
            .scope_exited(ScopeKind::Module { entry_file: false }, &bindings, &mut bag)
            .unwrap();
        assert!(bag.diagnostics().is_empty());

        lints
            .scope_exited(ScopeKind::Module { entry_file: true }, &bindings, &mut bag)
            .unwrap();
        assert_eq!(bag.diagnostics().len(), 1);
    }

    #[test]
    fn test_complexity_counts_decision_points() {
        let body = block(
            vec![while_(
                binary(BinaryOp::And, boolean(true), boolean(false)),
                block(vec![], None),
            )],
            Some(if_(
                ident("c"),
                match_(ident("x"), vec![arm(p_wild(), int(1)), arm(p_wild(), int(2))]),
                Some(int(3)),
            )),
        );
        // 1 + while + && + if + one extra arm
        assert_eq!(cyclomatic_complexity(FnBody::Block(&body)), 5);
    }

    #[test]
    fn test_nested_lambda_is_not_counted() {
        let body = lambda(&[], None, if_(ident("c"), int(1), Some(int(2))));
        assert_eq!(cyclomatic_complexity(FnBody::Expr(&body)), 1);
    }

    #[test]
    fn test_function_thresholds() {
        let mut lints = StandardLints::new(LintConfig {
            unused_bindings: true,
            max_params: 1,
            max_complexity: 1,
        });
        let mut bag = DiagnosticBag::new(ReportMode::FirstError);
        let ps = params(&[("a", "I32"), ("b", "I32")]);
        let body = if_(ident("a"), int(1), None);
        lints
            .function_checked(
                &FunctionInfo {
                    name: Some("f"),
                    params: &ps,
                    body: FnBody::Expr(&body),
                    span: Span::dummy(),
                },
                &mut bag,
            )
            .unwrap();
        let kinds: Vec<_> = bag.diagnostics().iter().filter_map(|d| d.kind()).collect();
        assert_eq!(
            kinds,
            vec![DiagnosticKind::TooManyParameters, DiagnosticKind::ComplexityTooHigh]
        );
    }
}
