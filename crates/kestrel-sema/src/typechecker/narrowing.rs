//! Tag narrowing for tagged unions
//!
//! A condition of the form `x.tag == "Variant"` (or `!=`, either operand
//! order, optionally under `!`) narrows `x` to one variant in the branch
//! where the comparison holds. Narrowed bindings may read `.value`.

use super::suggestions::suggest_similar_name;
use super::substitution::Substitution;
use super::{Check, TypeChecker};
use crate::ast::{BinaryOp, Expr, Ident, Literal, UnaryOp};
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::span::Span;
use crate::types::Type;
use tracing::trace;

/// Result of recognizing a tag comparison
///
/// An empty variant means the branch learns nothing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TagNarrowing {
    pub binding: String,
    pub then_variant: String,
    pub else_variant: String,
}

/// Recognize `ident.tag == "V"` / `!=`, in either operand order, under any
/// number of `!`. Compound conditions are not decomposed.
pub fn parse_tag_narrowing(cond: &Expr) -> Option<TagNarrowing> {
    match cond {
        Expr::Unary(unary) if unary.op == UnaryOp::Not => {
            let inner = parse_tag_narrowing(&unary.operand)?;
            Some(TagNarrowing {
                binding: inner.binding,
                then_variant: inner.else_variant,
                else_variant: inner.then_variant,
            })
        }
        Expr::Binary(binary) if matches!(binary.op, BinaryOp::Eq | BinaryOp::Ne) => {
            let (binding, variant) = tag_operands(&binary.left, &binary.right)
                .or_else(|| tag_operands(&binary.right, &binary.left))?;
            let (then_variant, else_variant) = if binary.op == BinaryOp::Eq {
                (variant, String::new())
            } else {
                (String::new(), variant)
            };
            Some(TagNarrowing {
                binding,
                then_variant,
                else_variant,
            })
        }
        _ => None,
    }
}

fn tag_operands(tag_side: &Expr, literal_side: &Expr) -> Option<(String, String)> {
    let Expr::Field(field) = tag_side else {
        return None;
    };
    if field.field.name != "tag" {
        return None;
    }
    let binding = field.base.as_ident()?;
    match literal_side {
        Expr::Literal(Literal::String(variant), _) => {
            Some((binding.name.clone(), variant.clone()))
        }
        _ => None,
    }
}

/// Binding is known to hold one variant in the current branch; `None`
/// hides every older fact for the name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarrowingFact {
    pub binding: String,
    pub variant: Option<String>,
}

/// Facts active in the current branch, in assertion order
///
/// Branches append facts and truncate back to their mark on exit; a lookup
/// returns the most recently asserted fact for a name. Reassignment and
/// lambda parameters that reuse a name push a [`forget`](Self::forget)
/// entry instead of editing older facts.
#[derive(Debug, Clone, Default)]
pub struct NarrowingSet {
    facts: Vec<NarrowingFact>,
}

impl NarrowingSet {
    pub fn push(&mut self, binding: &str, variant: &str) {
        self.facts.push(NarrowingFact {
            binding: binding.to_string(),
            variant: Some(variant.to_string()),
        });
    }

    /// Stop narrowing `binding` until the current branch ends
    pub fn forget(&mut self, binding: &str) {
        if self.lookup(binding).is_some() {
            self.facts.push(NarrowingFact {
                binding: binding.to_string(),
                variant: None,
            });
        }
    }

    /// Position to truncate back to when the branch ends
    pub fn mark(&self) -> usize {
        self.facts.len()
    }

    pub fn truncate(&mut self, mark: usize) {
        self.facts.truncate(mark);
    }

    pub fn lookup(&self, binding: &str) -> Option<&str> {
        self.facts
            .iter()
            .rev()
            .find(|f| f.binding == binding)
            .and_then(|f| f.variant.as_deref())
    }

    pub fn facts(&self) -> &[NarrowingFact] {
        &self.facts
    }
}

impl<'a> TypeChecker<'a> {
    /// Union name and type arguments if `ty` is a registered union
    pub(super) fn union_application(&self, ty: &Type) -> Option<(String, Vec<Type>)> {
        let (name, args) = ty.as_application()?;
        self.defs
            .has_union(name)
            .then(|| (name.to_string(), args.to_vec()))
    }

    /// Report `UnknownUnionVariant` unless `variant` exists on `union_name`
    pub(super) fn check_variant_exists(
        &mut self,
        union_name: &str,
        variant: &str,
        span: Span,
    ) -> Check<bool> {
        if self.defs.union_has_variant(union_name, variant) {
            return Ok(true);
        }
        let candidates = self.defs.variant_names(union_name);
        let help = suggest_similar_name(variant, candidates.into_iter());
        self.report(
            Diagnostic::new(
                DiagnosticKind::UnknownUnionVariant,
                format!("union '{}' has no variant '{}'", union_name, variant),
                span,
            )
            .with_optional_help(help),
        )?;
        Ok(false)
    }

    /// Validate a condition's narrowing and return it
    ///
    /// Facts naming a variant the binding's union lacks are reported and
    /// dropped.
    pub(super) fn narrowing_for(&mut self, cond: &Expr) -> Check<TagNarrowing> {
        let Some(mut narrowing) = parse_tag_narrowing(cond) else {
            return Ok(TagNarrowing::default());
        };
        let union = self
            .scopes
            .lookup(&narrowing.binding)
            .and_then(|b| self.union_application(&b.ty));
        if let Some((union_name, _)) = union {
            let span = cond.span();
            for variant in [&mut narrowing.then_variant, &mut narrowing.else_variant] {
                if !variant.is_empty() && !self.check_variant_exists(&union_name, variant, span)? {
                    variant.clear();
                }
            }
        }
        trace!(
            binding = %narrowing.binding,
            then_variant = %narrowing.then_variant,
            else_variant = %narrowing.else_variant,
            "tag narrowing"
        );
        Ok(narrowing)
    }

    /// Assert a fact for the current branch when `variant` is non-empty
    pub(super) fn assume_variant(&mut self, binding: &str, variant: &str) {
        if !variant.is_empty() {
            self.narrowing.push(binding, variant);
        }
    }

    /// Type of `.value` on a union-typed base
    pub(super) fn union_payload_access(
        &mut self,
        base: &Expr,
        union_name: &str,
        union_args: &[Type],
        span: Span,
    ) -> Check<Type> {
        let narrowed = base
            .as_ident()
            .and_then(|Ident { name, .. }| self.narrowing.lookup(name))
            .map(str::to_string);
        let Some(variant) = narrowed else {
            let example = self
                .defs
                .variant_names(union_name)
                .first()
                .copied()
                .unwrap_or("Variant")
                .to_string();
            self.report(
                Diagnostic::new(
                    DiagnosticKind::UnionPayloadRequiresNarrowing,
                    format!(
                        "cannot read '.value' of union '{}' before narrowing it",
                        union_name
                    ),
                    span,
                )
                .with_help(format!(
                    "check the variant first: `if x.tag == \"{}\" {{ ... }}`",
                    example
                )),
            )?;
            return Ok(Type::Unknown);
        };

        let Some(def) = self.defs.find_union(union_name) else {
            return Ok(Type::Unknown);
        };
        let subst = Substitution::from_explicit(&def.type_params, union_args);
        let payload: Vec<Type> = self
            .defs
            .variant_payload_types(union_name, &variant)
            .iter()
            .map(|ty| subst.apply(&def.type_params, ty))
            .collect();
        Ok(match payload.len() {
            0 => Type::Unknown,
            1 => payload.into_iter().next().unwrap_or(Type::Unknown),
            _ => Type::Tuple(payload),
        })
    }
}
