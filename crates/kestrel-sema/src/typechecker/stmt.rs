//! Statement checking: bindings, assignment, yield and loops

use super::expr::literal_index;
use super::suggestions::{suggest_mutability_fix, suggest_similar_name};
use super::{Check, TypeChecker};
use crate::ast::{AssignStmt, AssignTarget, Expr, Ident, LetStmt, Stmt, WhileStmt, YieldStmt};
use crate::diagnostic::{Diagnostic, DiagnosticKind, RelatedLocation};
use crate::lint::ScopeKind;
use crate::scope::Binding;
use crate::types::Type;
use tracing::trace;

impl<'a> TypeChecker<'a> {
    pub(super) fn check_stmt(&mut self, stmt: &Stmt) -> Check<()> {
        match stmt {
            Stmt::Let(let_stmt) => self.check_let(let_stmt),
            Stmt::Assign(assign) => self.check_assign(assign),
            Stmt::Expr(expr) => self.check_expr(expr).map(|_| ()),
            Stmt::Yield(yield_stmt) => self.check_yield(yield_stmt),
            Stmt::While(while_stmt) => self.check_while(while_stmt),
            Stmt::Break(_) | Stmt::Continue(_) => Ok(()),
        }
    }

    /// Initializer first, then the annotation, then the declaration
    ///
    /// A fixed array declared without an initializer starts with no
    /// initialized elements.
    pub(super) fn check_let(&mut self, let_stmt: &LetStmt) -> Check<()> {
        let declared = match &let_stmt.ty {
            Some(annotation) => Some(self.resolve_type(annotation)?),
            None => None,
        };

        let ty = match (&let_stmt.init, declared) {
            (Some(init), declared) => {
                let init_ty = self.check_expr(init)?;
                self.consume(init);
                match declared {
                    Some(declared) => {
                        let context = format!("initializer of '{}'", let_stmt.name.name);
                        self.require_expr(&declared, &init_ty, init, &context)?;
                        declared
                    }
                    None => init_ty,
                }
            }
            (None, Some(declared)) => match declared.as_array() {
                Some((elem, _, len)) => keep_drop(&declared, Type::array(elem.clone(), 0, len)),
                None => declared,
            },
            (None, None) => Type::Unknown,
        };

        self.declare(Binding::variable(
            let_stmt.name.name.clone(),
            let_stmt.mutable,
            ty,
            let_stmt.name.span,
        ))
    }

    fn check_assign(&mut self, assign: &AssignStmt) -> Check<()> {
        match &assign.target {
            AssignTarget::Name(id) => {
                let value_ty = self.check_expr(&assign.value)?;
                self.consume(&assign.value);
                let Some(ty) = self.assignable(id, "assign to")? else {
                    return Ok(());
                };
                let context = format!("assignment to '{}'", id.name);
                self.require_expr(&ty, &value_ty, &assign.value, &context)?;
                // the new value may hold any variant
                self.narrowing.forget(&id.name);
                Ok(())
            }
            AssignTarget::Index { base, index, .. } => self.check_index_assign(base, index, assign),
            AssignTarget::Field { base, field, span } => {
                let value_ty = self.check_expr(&assign.value)?;
                self.consume(&assign.value);
                let base_ty = match base.as_ref() {
                    Expr::Ident(id) => match self.assignable(id, "assign to a field of")? {
                        Some(ty) => ty,
                        None => return Ok(()),
                    },
                    other => self.check_expr(other)?,
                };
                let field_ty = self.member_type(base, &base_ty, field, *span)?;
                let context = format!("assignment to field '{}'", field.name);
                self.require_expr(&field_ty, &value_ty, &assign.value, &context)?;
                Ok(())
            }
        }
    }

    /// Type of a binding about to be written through, after checking it
    /// exists and is mutable; `None` when an error was reported
    ///
    /// Writing does not count as a read.
    fn assignable(&mut self, id: &Ident, action: &str) -> Check<Option<Type>> {
        Ok(self
            .write_target(id, action)?
            .and_then(|(ty, writable)| writable.then_some(ty)))
    }

    /// Type of a write target and whether it may be written; `None` when
    /// the name is unknown
    ///
    /// Reports `UnknownName` and `CannotAssignImmutable`.
    fn write_target(&mut self, id: &Ident, action: &str) -> Check<Option<(Type, bool)>> {
        let Some(binding) = self.scopes.lookup(&id.name) else {
            let help = suggest_similar_name(&id.name, self.scopes.visible_names().into_iter());
            self.report(
                Diagnostic::new(
                    DiagnosticKind::UnknownName,
                    format!("unknown name '{}'", id.name),
                    id.span,
                )
                .with_optional_help(help),
            )?;
            return Ok(None);
        };
        if !binding.mutable {
            let ty = binding.ty.clone();
            let declared_at = binding.span;
            self.report(
                Diagnostic::new(
                    DiagnosticKind::CannotAssignImmutable,
                    format!("cannot {} immutable binding '{}'", action, id.name),
                    id.span,
                )
                .with_label("assignment to immutable binding")
                .with_related_location(RelatedLocation::at(declared_at, "declared immutable here"))
                .with_help(suggest_mutability_fix(&id.name)),
            )?;
            return Ok(Some((ty, false)));
        }
        let ty = binding.ty.clone();
        self.scopes.mark_written(&id.name);
        Ok(Some((ty, true)))
    }

    /// `a[i] = v`; literal indices into a fixed array binding are checked
    /// against its length and its initialized prefix
    fn check_index_assign(&mut self, base: &Expr, index: &Expr, assign: &AssignStmt) -> Check<()> {
        let index_ty = self.check_expr(index)?;
        self.require_index_type(&index_ty, index)?;
        let value_ty = self.check_expr(&assign.value)?;
        self.consume(&assign.value);

        let Expr::Ident(id) = base else {
            let base_ty = self.check_expr(base)?;
            if let Some(elem) = element_type(&base_ty) {
                self.require_expr(&elem, &value_ty, &assign.value, "element assignment")?;
            }
            return Ok(());
        };
        let Some((base_ty, writable)) = self.write_target(id, "assign to an element of")? else {
            return Ok(());
        };

        if let Some(elem) = element_type(&base_ty) {
            self.require_expr(&elem, &value_ty, &assign.value, "element assignment")?;
        }
        let (Some((elem, init, len)), Some(position)) = (base_ty.as_array(), literal_index(index))
        else {
            return Ok(());
        };
        if !self.check_array_bounds(position, len, index.span())? {
            return Ok(());
        }
        let init_i = init as i128;
        if position > init_i {
            self.report(
                Diagnostic::new(
                    DiagnosticKind::UninitializedIndex,
                    format!(
                        "index {} of '{}' is assigned before index {}",
                        position, id.name, init
                    ),
                    index.span(),
                )
                .with_label("skips ahead of the initialized elements")
                .with_help(format!("assign '{}[{}]' first", id.name, init)),
            )?;
        } else if writable && position == init_i && init < len {
            let advanced = keep_drop(&base_ty, Type::array(elem.clone(), init + 1, len));
            trace!(binding = %id.name, init = init + 1, len, "array prefix advanced");
            self.scopes.update_type(&id.name, advanced);
        }
        Ok(())
    }

    fn check_yield(&mut self, yield_stmt: &YieldStmt) -> Check<()> {
        let expected = self.return_types.last().cloned().unwrap_or(Type::Unknown);
        match &yield_stmt.value {
            Some(value) => {
                let ty = self.check_expr(value)?;
                self.consume(value);
                self.require_expr(&expected, &ty, value, "yield")?;
            }
            None => {
                self.require(&expected, &Type::VOID, "yield", yield_stmt.span)?;
            }
        }
        Ok(())
    }

    fn check_while(&mut self, while_stmt: &WhileStmt) -> Check<()> {
        let cond_ty = self.check_expr(&while_stmt.cond)?;
        self.require_condition(&cond_ty, &while_stmt.cond, "while")?;
        let narrowing = self.narrowing_for(&while_stmt.cond)?;

        let mark = self.narrowing.mark();
        self.assume_variant(&narrowing.binding, &narrowing.then_variant);
        let result = self.with_scope(ScopeKind::Block, |this| this.check_block_body(&while_stmt.body));
        self.narrowing.truncate(mark);
        result.map(|_| ())
    }
}

/// Element type of an array or slice, looking through pointers
fn element_type(ty: &Type) -> Option<Type> {
    let mut target = ty.strip_drop();
    while let Type::Pointer { inner, .. } = target {
        target = inner.strip_drop();
    }
    target
        .as_array()
        .map(|(elem, _, _)| elem.clone())
        .or_else(|| target.slice_inner().cloned())
}

/// `ty` with the drop marker of `original`, if it had one
fn keep_drop(original: &Type, ty: Type) -> Type {
    match original.drop_handler() {
        Some(handler) => ty.with_drop(handler),
        None => ty,
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::build::*;
    use crate::ast::{Program, Stmt};
    use crate::diagnostic::{DiagnosticBag, DiagnosticKind, ReportMode};
    use crate::lint::NoLints;
    use crate::typechecker::{analyze_program, AnalysisOptions};
    use pretty_assertions::assert_eq;

    fn check_main(stmts: Vec<Stmt>) -> Vec<DiagnosticKind> {
        let program: Program = program(vec![func("main", &[], None, block(stmts, None))]);
        let mut bag = DiagnosticBag::new(ReportMode::CollectAll);
        analyze_program(&program, &[], &AnalysisOptions::default(), &mut bag, &mut NoLints);
        bag.diagnostics().iter().filter_map(|d| d.kind()).collect()
    }

    #[test]
    fn test_let_annotation_mismatch() {
        assert_eq!(
            check_main(vec![let_("x", Some("Bool"), string("no"))]),
            vec![DiagnosticKind::TypeMismatch]
        );
    }

    #[test]
    fn test_let_in_nested_block_cannot_shadow() {
        let stmts = vec![
            let_("x", None, int(1)),
            expr_stmt(block_expr(vec![let_("x", None, int(2))], None)),
        ];
        assert_eq!(check_main(stmts), vec![DiagnosticKind::ShadowingNotAllowed]);
    }

    #[test]
    fn test_assignment_type_is_checked() {
        let stmts = vec![
            let_mut("n", Some("I32"), int(0)),
            assign("n", string("one")),
        ];
        assert_eq!(check_main(stmts), vec![DiagnosticKind::TypeMismatch]);
    }

    #[test]
    fn test_field_assignment_requires_mutable_base() {
        let program = program(vec![
            struct_decl("Point", &[("x", "I32")]),
            func(
                "main",
                &[],
                None,
                block(
                    vec![
                        let_("p", None, struct_lit("Point", vec![("x", int(1))])),
                        assign_field("p", "x", int(2)),
                        let_mut("q", None, struct_lit("Point", vec![("x", int(1))])),
                        assign_field("q", "x", string("2")),
                        assign_field("q", "y", int(2)),
                    ],
                    None,
                ),
            ),
        ]);
        let mut bag = DiagnosticBag::new(ReportMode::CollectAll);
        analyze_program(&program, &[], &AnalysisOptions::default(), &mut bag, &mut NoLints);
        let kinds: Vec<_> = bag.diagnostics().iter().filter_map(|d| d.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                DiagnosticKind::CannotAssignImmutable,
                DiagnosticKind::TypeMismatch,
                DiagnosticKind::UnknownField,
            ]
        );
    }

    #[test]
    fn test_yield_checked_against_return_type() {
        let program = program(vec![func(
            "pick",
            &[("flag", "Bool")],
            Some("I32"),
            block(
                vec![expr_stmt(if_(
                    ident("flag"),
                    block_expr(vec![yield_(Some(string("no")))], None),
                    None,
                ))],
                Some(int(0)),
            ),
        )]);
        let mut bag = DiagnosticBag::new(ReportMode::CollectAll);
        analyze_program(&program, &[], &AnalysisOptions::default(), &mut bag, &mut NoLints);
        let kinds: Vec<_> = bag.diagnostics().iter().filter_map(|d| d.kind()).collect();
        assert_eq!(kinds, vec![DiagnosticKind::TypeMismatch]);
    }

    #[test]
    fn test_bare_yield_counts_as_void() {
        let program = program(vec![func(
            "f",
            &[],
            Some("I32"),
            block(vec![yield_(None)], None),
        )]);
        let mut bag = DiagnosticBag::new(ReportMode::CollectAll);
        analyze_program(&program, &[], &AnalysisOptions::default(), &mut bag, &mut NoLints);
        assert_eq!(bag.diagnostics()[0].kind(), Some(DiagnosticKind::TypeMismatch));
    }

    #[test]
    fn test_while_condition_and_body_scope() {
        let stmts = vec![
            let_mut("i", None, int(0)),
            while_(
                binary(crate::ast::BinaryOp::Lt, ident("i"), int(10)),
                block(vec![assign("i", binary(crate::ast::BinaryOp::Add, ident("i"), int(1)))], None),
            ),
            while_(ident("i"), block(vec![], None)),
        ];
        assert_eq!(check_main(stmts), vec![DiagnosticKind::ConditionNotBool]);
    }
}
