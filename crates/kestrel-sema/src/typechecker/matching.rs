//! `match` checking: variant patterns, payload bindings and exhaustiveness

use super::infer::{join_branches, literal_type};
use super::substitution::Substitution;
use super::{Check, TypeChecker};
use crate::ast::{Ident, MatchArm, MatchExpr, Pattern};
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::lint::ScopeKind;
use crate::scope::Binding;
use crate::types::Type;

/// Union a scrutinee is matched against: name and type arguments
type UnionApp = (String, Vec<Type>);

impl<'a> TypeChecker<'a> {
    pub(super) fn check_match(&mut self, match_expr: &MatchExpr) -> Check<Type> {
        let scrutinee_ty = self.check_expr(&match_expr.scrutinee)?;
        let union = self.union_application(&scrutinee_ty);
        let subject = match_expr.scrutinee.as_ident().map(|id| id.name.clone());

        let mut covered: Vec<String> = Vec::new();
        let mut has_catch_all = false;
        let mut result: Option<Type> = None;
        for arm in &match_expr.arms {
            has_catch_all |= arm.pattern.is_catch_all();
            let arm_ty = self.check_arm(
                arm,
                &scrutinee_ty,
                union.as_ref(),
                subject.as_deref(),
                &mut covered,
            )?;
            result = Some(match result {
                None => arm_ty,
                Some(prev) => join_branches(&prev, &arm_ty),
            });
        }

        if let (Some((union_name, _)), false) = (&union, has_catch_all) {
            let missing = self.defs.find_union(union_name).and_then(|def| {
                def.variants
                    .iter()
                    .find(|v| !covered.contains(&v.name))
                    .map(|v| v.name.clone())
            });
            if let Some(missing) = missing {
                self.report(
                    Diagnostic::new(
                        DiagnosticKind::NonExhaustiveMatch,
                        format!(
                            "non-exhaustive match on '{}': variant '{}' is not covered",
                            union_name, missing
                        ),
                        match_expr.span,
                    )
                    .with_label(format!("'{}' not covered", missing))
                    .with_help(format!("add an arm for '{}' or a wildcard '_' arm", missing)),
                )?;
            }
        }

        Ok(result.unwrap_or(Type::VOID))
    }

    /// Bind the arm's pattern in a fresh scope and check its body
    fn check_arm(
        &mut self,
        arm: &MatchArm,
        scrutinee_ty: &Type,
        union: Option<&UnionApp>,
        subject: Option<&str>,
        covered: &mut Vec<String>,
    ) -> Check<Type> {
        self.with_scope(ScopeKind::Block, |this| {
            let variant = this.bind_pattern(&arm.pattern, scrutinee_ty, union)?;
            let mark = this.narrowing.mark();
            if let Some(variant) = &variant {
                if !covered.contains(variant) {
                    covered.push(variant.clone());
                }
                if let Some(subject) = subject {
                    this.assume_variant(subject, variant);
                }
            }
            let body = this.check_expr(&arm.body);
            this.narrowing.truncate(mark);
            body
        })
    }

    /// Declare pattern bindings; returns the variant a valid variant
    /// pattern selects
    fn bind_pattern(
        &mut self,
        pattern: &Pattern,
        scrutinee_ty: &Type,
        union: Option<&UnionApp>,
    ) -> Check<Option<String>> {
        match pattern {
            Pattern::Wildcard(_) => Ok(None),
            Pattern::Binding(id) => {
                self.declare(Binding::variable(
                    id.name.clone(),
                    false,
                    scrutinee_ty.clone(),
                    id.span,
                ))?;
                Ok(None)
            }
            Pattern::Literal(lit, span) => {
                self.require(scrutinee_ty, &literal_type(lit), "match pattern", *span)?;
                Ok(None)
            }
            Pattern::Variant { name, bindings, span } => {
                let Some((union_name, union_args)) = self.pattern_union(name, scrutinee_ty, union)?
                else {
                    self.bind_unknown(bindings)?;
                    return Ok(None);
                };
                if !self.check_variant_exists(&union_name, &name.name, name.span)? {
                    self.bind_unknown(bindings)?;
                    return Ok(None);
                }

                let payload: Vec<Type> = match self.defs.find_union(&union_name) {
                    Some(def) => {
                        let subst = Substitution::from_explicit(&def.type_params, &union_args);
                        self.defs
                            .variant_payload_types(&union_name, &name.name)
                            .iter()
                            .map(|ty| subst.apply(&def.type_params, ty))
                            .collect()
                    }
                    None => Vec::new(),
                };
                if bindings.len() != payload.len() {
                    self.report(
                        Diagnostic::new(
                            DiagnosticKind::WrongArgOrValueCount,
                            format!(
                                "variant '{}' carries {} value(s) but the pattern binds {}",
                                name.name,
                                payload.len(),
                                bindings.len()
                            ),
                            *span,
                        )
                        .with_label("wrong number of bindings"),
                    )?;
                }
                for (i, binding) in bindings.iter().enumerate() {
                    let ty = payload.get(i).cloned().unwrap_or(Type::Unknown);
                    self.declare(Binding::variable(binding.name.clone(), false, ty, binding.span))?;
                }
                Ok(Some(name.name.clone()))
            }
        }
    }

    /// Union a variant pattern refers to
    ///
    /// An `Unknown` scrutinee is resolved through the variant name; any
    /// other non-union scrutinee is a mismatch.
    fn pattern_union(
        &mut self,
        variant: &Ident,
        scrutinee_ty: &Type,
        union: Option<&UnionApp>,
    ) -> Check<Option<UnionApp>> {
        if let Some(union) = union {
            return Ok(Some(union.clone()));
        }
        if scrutinee_ty.is_unknown() {
            return match self.defs.union_of_variant(&variant.name) {
                Some(def) => Ok(Some((
                    def.name.clone(),
                    vec![Type::Unknown; def.type_params.len()],
                ))),
                None => {
                    self.report(
                        Diagnostic::new(
                            DiagnosticKind::UnknownUnionVariant,
                            format!("no union declares a variant named '{}'", variant.name),
                            variant.span,
                        )
                        .with_label("unknown variant"),
                    )?;
                    Ok(None)
                }
            };
        }
        self.report(
            Diagnostic::new(
                DiagnosticKind::TypeMismatch,
                format!(
                    "variant pattern '{}' cannot match a value of type {}",
                    variant.name, scrutinee_ty
                ),
                variant.span,
            )
            .with_label(format!("scrutinee is {}", scrutinee_ty)),
        )?;
        Ok(None)
    }

    fn bind_unknown(&mut self, bindings: &[Ident]) -> Check<()> {
        for binding in bindings {
            self.declare(Binding::variable(
                binding.name.clone(),
                false,
                Type::Unknown,
                binding.span,
            ))?;
        }
        Ok(())
    }
}
