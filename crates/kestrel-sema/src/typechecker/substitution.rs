//! Type-variable substitution for generic calls and instantiations
//!
//! A variable bound twice to different types resolves to `Unknown`
//! instead of failing: ambiguity is represented, not rejected.

use crate::types::Type;
use tracing::trace;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Substitution {
    bindings: Vec<(String, Type)>,
}

impl Substitution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Substitution from explicit type arguments, positionally
    pub fn from_explicit(type_params: &[String], args: &[Type]) -> Self {
        let mut subst = Self::new();
        for (param, arg) in type_params.iter().zip(args) {
            subst.bind(param, arg.clone());
        }
        subst
    }

    pub fn get(&self, var: &str) -> Option<&Type> {
        self.bindings
            .iter()
            .find(|(name, _)| name == var)
            .map(|(_, ty)| ty)
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Bind `var`; a conflicting second binding makes it `Unknown`
    pub fn bind(&mut self, var: &str, ty: Type) {
        let ty = ty.normalized();
        match self.bindings.iter_mut().find(|(name, _)| name == var) {
            None => self.bindings.push((var.to_string(), ty)),
            Some((_, existing)) if *existing == ty => {}
            Some((_, existing)) => {
                trace!(var, first = %existing, second = %ty, "ambiguous type variable");
                *existing = Type::Unknown;
            }
        }
    }

    /// Rewrite every occurrence of a variable in `type_params`
    ///
    /// Variables without a binding are left in place.
    pub fn apply(&self, type_params: &[String], ty: &Type) -> Type {
        let applied = match ty {
            Type::Generic { name, args } if args.is_empty() && type_params.contains(name) => {
                self.get(name).cloned().unwrap_or_else(|| ty.clone())
            }
            Type::Generic { name, args } => Type::Generic {
                name: name.clone(),
                args: args.iter().map(|a| self.apply(type_params, a)).collect(),
            },
            Type::Array { elem, init, len } => Type::Array {
                elem: Box::new(self.apply(type_params, elem)),
                init: *init,
                len: *len,
            },
            Type::Slice(elem) => Type::Slice(Box::new(self.apply(type_params, elem))),
            Type::Tuple(items) => {
                Type::Tuple(items.iter().map(|t| self.apply(type_params, t)).collect())
            }
            Type::Pointer { mutable, inner } => Type::Pointer {
                mutable: *mutable,
                inner: Box::new(self.apply(type_params, inner)),
            },
            Type::Function {
                type_params: own,
                params,
                ret,
            } => {
                // Variables re-bound by a nested function type are its own
                let visible: Vec<String> = type_params
                    .iter()
                    .filter(|p| !own.contains(p))
                    .cloned()
                    .collect();
                Type::Function {
                    type_params: own.clone(),
                    params: params.iter().map(|p| self.apply(&visible, p)).collect(),
                    ret: Box::new(self.apply(&visible, ret)),
                }
            }
            Type::Droppable { base, handler } => Type::Droppable {
                base: Box::new(self.apply(type_params, base)),
                handler: handler.clone(),
            },
            Type::Unknown | Type::Primitive(_) => ty.clone(),
        };
        applied.normalized()
    }

    /// Unify a parameter type against an argument type, binding the
    /// variables of `type_params` found in matching positions
    pub fn collect(&mut self, type_params: &[String], param: &Type, arg: &Type) {
        let arg = arg.strip_drop();
        if arg.is_unknown() || arg.is_never() {
            return;
        }
        match (param.strip_drop(), arg) {
            (Type::Generic { name, args }, _) if args.is_empty() && type_params.contains(name) => {
                self.bind(name, arg.clone());
            }
            (Type::Generic { name: pn, args: pa }, Type::Generic { name: an, args: aa })
                if pn == an && pa.len() == aa.len() =>
            {
                for (p, a) in pa.iter().zip(aa) {
                    self.collect(type_params, p, a);
                }
            }
            (Type::Array { elem: p, .. }, Type::Array { elem: a, .. })
            | (Type::Slice(p), Type::Slice(a))
            | (Type::Slice(p), Type::Array { elem: a, .. }) => self.collect(type_params, p, a),
            (Type::Pointer { inner: p, .. }, Type::Pointer { inner: a, .. }) => {
                self.collect(type_params, p, a)
            }
            (Type::Tuple(ps), Type::Tuple(as_)) if ps.len() == as_.len() => {
                for (p, a) in ps.iter().zip(as_) {
                    self.collect(type_params, p, a);
                }
            }
            (
                Type::Function {
                    params: pp,
                    ret: pr,
                    ..
                },
                Type::Function {
                    params: ap,
                    ret: ar,
                    ..
                },
            ) if pp.len() == ap.len() => {
                for (p, a) in pp.iter().zip(ap) {
                    self.collect(type_params, p, a);
                }
                self.collect(type_params, pr, ar);
            }
            _ => {}
        }
    }
}
