//! Expression type checking

use super::infer::{arithmetic_result, join_branches, join_elements, literal_type, unary_result};
use super::substitution::Substitution;
use super::suggestions::{suggest_condition_fix, suggest_similar_name};
use super::{deprecation_warning, Check, TypeChecker};
use crate::ast::*;
use crate::diagnostic::{Diagnostic, DiagnosticKind, RelatedLocation};
use crate::lint::{FnBody, FunctionInfo, ScopeKind};
use crate::scope::{is_reserved, BindingKind};
use crate::span::Span;
use crate::types::Type;

impl<'a> TypeChecker<'a> {
    /// Check an expression and return its type
    pub(super) fn check_expr(&mut self, expr: &Expr) -> Check<Type> {
        match expr {
            Expr::Literal(lit, _) => Ok(literal_type(lit)),
            Expr::Ident(id) => self.check_ident(id),
            Expr::Lambda(lambda) => self.check_lambda(lambda),
            Expr::Unary(unary) => {
                let operand = self.check_expr(&unary.operand)?;
                Ok(unary_result(unary.op, &operand))
            }
            Expr::Binary(binary) => self.check_binary(binary),
            Expr::Field(field) => {
                let base = self.check_expr(&field.base)?;
                self.member_type(&field.base, &base, &field.field, field.span)
            }
            Expr::Index(index) => self.check_index(index),
            Expr::Call(call) => self.check_call(call),
            Expr::If(if_expr) => self.check_if(if_expr),
            Expr::Block(block) => self.check_block(block),
            Expr::Match(match_expr) => self.check_match(match_expr),
            Expr::StructLit(lit) => self.check_struct_lit(lit),
            Expr::Array(items, _) => self.check_array_literal(items),
            Expr::Tuple(items, _) => {
                let mut types = Vec::with_capacity(items.len());
                for item in items {
                    types.push(self.check_expr(item)?);
                    self.consume(item);
                }
                Ok(Type::Tuple(types).normalized())
            }
        }
    }

    fn check_ident(&mut self, id: &Ident) -> Check<Type> {
        match id.name.as_str() {
            "true" | "false" => return Ok(Type::BOOL),
            name if is_reserved(name) => return Ok(Type::NEVER),
            _ => {}
        }

        let Some(binding) = self.scopes.lookup(&id.name) else {
            let help = suggest_similar_name(&id.name, self.scopes.visible_names().into_iter());
            self.report(
                Diagnostic::new(
                    DiagnosticKind::UnknownName,
                    format!("unknown name '{}'", id.name),
                    id.span,
                )
                .with_label("not found in this scope")
                .with_optional_help(help),
            )?;
            return Ok(Type::Unknown);
        };

        let ty = binding.ty.clone();
        let moved = binding.moved;
        let deprecated = binding.deprecated.clone();
        let what = match binding.kind {
            BindingKind::Function => "function",
            BindingKind::Variant => "variant",
            BindingKind::Module => "module",
            BindingKind::Variable | BindingKind::Parameter => "binding",
        };
        self.scopes.mark_read(&id.name);

        if let Some(moved_at) = moved {
            self.report(
                Diagnostic::new(
                    DiagnosticKind::UseAfterMove,
                    format!("use of moved value '{}'", id.name),
                    id.span,
                )
                .with_label("value used here after move")
                .with_related_location(RelatedLocation::at(moved_at, "value moved here")),
            )?;
        }
        if let Some(reason) = deprecated {
            self.report(deprecation_warning(what, &id.name, &reason, id.span))?;
        }
        Ok(ty)
    }

    /// Record a move when `expr` names a droppable local
    pub(super) fn consume(&mut self, expr: &Expr) {
        let Some(id) = expr.as_ident() else {
            return;
        };
        let owns = self.scopes.lookup(&id.name).is_some_and(|b| {
            matches!(b.kind, BindingKind::Variable | BindingKind::Parameter)
                && b.ty.drop_handler().is_some()
        });
        if owns {
            self.scopes.mark_moved(&id.name, id.span);
        }
    }

    fn check_lambda(&mut self, lambda: &LambdaExpr) -> Check<Type> {
        let ret = self.resolve_annotation(&lambda.return_type)?;
        // parameters may reuse a narrowed outer name
        let mark = self.narrowing.mark();
        for param in &lambda.params {
            self.narrowing.forget(&param.name.name);
        }
        let params = self.with_scope(ScopeKind::Function, |this| {
            let params = this.declare_params(&lambda.params)?;
            this.return_types.push(ret.clone());
            let body = this.check_expr(&lambda.body);
            this.return_types.pop();
            let body = body?;
            this.require_expr(&ret, &body, &lambda.body, "lambda body")?;
            Ok(params)
        });
        self.narrowing.truncate(mark);
        let params = params?;
        self.lints.function_checked(
            &FunctionInfo {
                name: None,
                params: &lambda.params,
                body: FnBody::Expr(&lambda.body),
                span: lambda.span,
            },
            &mut *self.sink,
        )?;
        Ok(Type::function(Vec::new(), params, ret))
    }

    fn check_binary(&mut self, binary: &BinaryExpr) -> Check<Type> {
        let left = self.check_expr(&binary.left)?;
        let right = self.check_expr(&binary.right)?;

        if binary.op.is_logical() {
            let context = format!("operand of '{}'", binary.op.symbol());
            self.require(&Type::BOOL, &left, &context, binary.left.span())?;
            self.require(&Type::BOOL, &right, &context, binary.right.span())?;
            return Ok(Type::BOOL);
        }
        if binary.op.is_comparison() {
            return Ok(Type::BOOL);
        }
        Ok(arithmetic_result(binary.op == BinaryOp::Add, &left, &right))
    }

    /// `ConditionNotBool` unless the condition is `Bool`, `Unknown` or `Never`
    pub(super) fn require_condition(&mut self, cond_ty: &Type, cond: &Expr, construct: &str) -> Check<()> {
        if cond_ty.is_unknown() || cond_ty.is_never() || *cond_ty.strip_drop() == Type::BOOL {
            return Ok(());
        }
        self.report(
            Diagnostic::new(
                DiagnosticKind::ConditionNotBool,
                format!("{} condition must be Bool, found {}", construct, cond_ty),
                cond.span(),
            )
            .with_label(format!("this is {}", cond_ty))
            .with_help(suggest_condition_fix(cond_ty)),
        )
    }

    fn check_if(&mut self, if_expr: &IfExpr) -> Check<Type> {
        let cond_ty = self.check_expr(&if_expr.cond)?;
        self.require_condition(&cond_ty, &if_expr.cond, "if")?;
        let narrowing = self.narrowing_for(&if_expr.cond)?;

        let then_ty =
            self.check_branch(&if_expr.then_branch, &narrowing.binding, &narrowing.then_variant)?;
        let else_ty = match &if_expr.else_branch {
            Some(else_branch) => {
                self.check_branch(else_branch, &narrowing.binding, &narrowing.else_variant)?
            }
            None => Type::VOID,
        };
        Ok(join_branches(&then_ty, &else_ty))
    }

    /// Check one branch with `binding` narrowed to `variant` (if any)
    fn check_branch(&mut self, body: &Expr, binding: &str, variant: &str) -> Check<Type> {
        let mark = self.narrowing.mark();
        self.assume_variant(binding, variant);
        let result = self.check_expr(body);
        self.narrowing.truncate(mark);
        result
    }

    /// Type of `base.field`, where `base_ty` is the already checked base
    ///
    /// Pointers are dereferenced. Unions expose `tag` and `value`; structs
    /// their declared fields. Anything else is `Unknown`.
    pub(super) fn member_type(
        &mut self,
        base: &Expr,
        base_ty: &Type,
        field: &Ident,
        span: Span,
    ) -> Check<Type> {
        let mut target = base_ty.strip_drop();
        while let Type::Pointer { inner, .. } = target {
            target = inner.strip_drop();
        }

        if let Some((union_name, union_args)) = self.union_application(target) {
            return match field.name.as_str() {
                "tag" => Ok(Type::STRING),
                "value" => self.union_payload_access(base, &union_name, &union_args, span),
                other => {
                    self.report(
                        Diagnostic::new(
                            DiagnosticKind::UnknownField,
                            format!("union '{}' has no field '{}'", union_name, other),
                            field.span,
                        )
                        .with_help("unions expose only 'tag' and 'value'"),
                    )?;
                    Ok(Type::Unknown)
                }
            };
        }

        let Some((struct_name, args)) = target.as_application() else {
            return Ok(Type::Unknown);
        };
        let Some(def) = self.defs.find_struct(struct_name) else {
            return Ok(Type::Unknown);
        };
        let type_params = def.type_params.clone();
        match self.defs.field_type(struct_name, &field.name) {
            Ok(ty) => Ok(Substitution::from_explicit(&type_params, args).apply(&type_params, &ty)),
            Err(err) => {
                let help = suggest_similar_name(&field.name, def.fields.iter().map(String::as_str));
                self.report(
                    Diagnostic::new(err.kind(), err.to_string(), field.span)
                        .with_label("unknown field")
                        .with_optional_help(help),
                )?;
                Ok(Type::Unknown)
            }
        }
    }

    fn check_index(&mut self, index: &IndexExpr) -> Check<Type> {
        let base_ty = self.check_expr(&index.base)?;
        let index_ty = self.check_expr(&index.index)?;
        self.require_index_type(&index_ty, &index.index)?;

        let mut target = base_ty.strip_drop();
        while let Type::Pointer { inner, .. } = target {
            target = inner.strip_drop();
        }
        if let Some((elem, init, len)) = target.as_array() {
            let elem = elem.clone();
            if let Some(position) = literal_index(&index.index) {
                if self.check_array_bounds(position, len, index.index.span())? && position >= init as i128 {
                    self.report(
                        Diagnostic::new(
                            DiagnosticKind::UninitializedIndex,
                            format!(
                                "index {} is read before it is initialized (initialized: {} of {})",
                                position, init, len
                            ),
                            index.index.span(),
                        )
                        .with_label("not yet assigned"),
                    )?;
                }
            }
            return Ok(elem);
        }
        Ok(target.slice_inner().cloned().unwrap_or(Type::Unknown))
    }

    pub(super) fn require_index_type(&mut self, index_ty: &Type, index: &Expr) -> Check<()> {
        if index_ty.is_int_like() || index_ty.is_unknown() || index_ty.is_never() {
            return Ok(());
        }
        self.report(
            Diagnostic::new(
                DiagnosticKind::TypeMismatch,
                format!("array index must be an integer, found {}", index_ty),
                index.span(),
            )
            .with_label("not an integer"),
        )
    }

    /// `IndexOutOfBounds` unless `0 <= position < len`
    pub(super) fn check_array_bounds(&mut self, position: i128, len: usize, span: Span) -> Check<bool> {
        if position >= 0 && position < len as i128 {
            return Ok(true);
        }
        self.report(
            Diagnostic::new(
                DiagnosticKind::IndexOutOfBounds,
                format!("index {} is out of bounds for an array of length {}", position, len),
                span,
            )
            .with_label("out of bounds"),
        )?;
        Ok(false)
    }

    fn check_struct_lit(&mut self, lit: &StructLitExpr) -> Check<Type> {
        let Some(def) = self.defs.find_struct(&lit.name.name).cloned() else {
            let help = suggest_similar_name(&lit.name.name, self.defs.struct_names());
            self.report(
                Diagnostic::new(
                    DiagnosticKind::UnknownStruct,
                    format!("unknown struct '{}'", lit.name.name),
                    lit.name.span,
                )
                .with_optional_help(help),
            )?;
            for init in &lit.fields {
                self.check_expr(&init.value)?;
            }
            return Ok(Type::Unknown);
        };
        if let Some(reason) = &def.deprecated {
            self.report(deprecation_warning("struct", &def.name, reason, lit.name.span))?;
        }

        let mut seen: Vec<&str> = Vec::new();
        let mut subst = Substitution::new();
        let mut checked: Vec<(usize, Type, &Expr)> = Vec::new();
        for init in &lit.fields {
            let value_ty = self.check_expr(&init.value)?;
            self.consume(&init.value);

            if seen.contains(&init.name.name.as_str()) {
                self.report(
                    Diagnostic::new(
                        DiagnosticKind::DuplicateName,
                        format!("field '{}' is initialized more than once", init.name.name),
                        init.name.span,
                    )
                    .with_label("duplicate field"),
                )?;
                continue;
            }
            seen.push(&init.name.name);

            let Some(position) = def.fields.iter().position(|f| *f == init.name.name) else {
                let help =
                    suggest_similar_name(&init.name.name, def.fields.iter().map(String::as_str));
                self.report(
                    Diagnostic::new(
                        DiagnosticKind::UnknownField,
                        format!("struct '{}' has no field '{}'", def.name, init.name.name),
                        init.name.span,
                    )
                    .with_optional_help(help),
                )?;
                continue;
            };
            subst.collect(&def.type_params, &def.field_types[position], &value_ty);
            checked.push((position, value_ty, &init.value));
        }

        for (position, value_ty, value) in checked {
            let expected = subst.apply(&def.type_params, &def.field_types[position]);
            let context = format!("field '{}' of '{}'", def.fields[position], def.name);
            self.require_expr(&expected, &value_ty, value, &context)?;
        }

        if let Some(missing) = def.fields.iter().find(|f| !seen.contains(&f.as_str())) {
            self.report(
                Diagnostic::new(
                    DiagnosticKind::WrongArgOrValueCount,
                    format!(
                        "struct '{}' has {} field(s) but {} were given: missing '{}'",
                        def.name,
                        def.fields.len(),
                        seen.len(),
                        missing
                    ),
                    lit.span,
                )
                .with_label("missing field"),
            )?;
        }

        let args = def
            .type_params
            .iter()
            .map(|p| subst.get(p).cloned().unwrap_or(Type::Unknown))
            .collect();
        Ok(Type::generic(def.name.clone(), args))
    }

    fn check_array_literal(&mut self, items: &[Expr]) -> Check<Type> {
        let mut elem: Option<Type> = None;
        for item in items {
            let ty = self.check_expr(item)?;
            self.consume(item);
            elem = Some(match elem {
                None => ty,
                Some(prev) => join_elements(&prev, &ty),
            });
        }
        Ok(Type::array(elem.unwrap_or(Type::Unknown), items.len(), items.len()))
    }
}

/// Integer literal used as a static index, suffixed or not
pub(super) fn literal_index(expr: &Expr) -> Option<i128> {
    match expr {
        Expr::Literal(Literal::Int { value, .. }, _) => Some(*value),
        Expr::Unary(unary) if unary.op == UnaryOp::Neg => {
            literal_index(&unary.operand).and_then(i128::checked_neg)
        }
        _ => None,
    }
}
