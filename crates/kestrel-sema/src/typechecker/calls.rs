//! Call checking and generic resolution

use super::substitution::Substitution;
use super::suggestions::{suggest_arity_fix, suggest_similar_name};
use super::{deprecation_warning, Check, TypeChecker};
use crate::ast::{CallExpr, Expr, Ident};
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::types::Type;
use tracing::debug;

impl<'a> TypeChecker<'a> {
    pub(super) fn check_call(&mut self, call: &CallExpr) -> Check<Type> {
        if let Expr::Ident(id) = call.callee.as_ref() {
            if !self.scopes.contains(&id.name) {
                if self.defs.has_struct(&id.name) {
                    return self.check_struct_constructor(id, call);
                }
                return self.report_unknown_callee(id, call);
            }
        }

        let callee_ty = self.check_expr(&call.callee)?;
        let arg_types = self.check_args(&call.args)?;
        if !callee_ty.is_function() {
            return Ok(Type::Unknown);
        }
        let name = match call.callee.as_ref() {
            Expr::Ident(id) => id.name.clone(),
            _ => "function value".to_string(),
        };
        self.resolve_call(&name, &callee_ty, call, &arg_types)
    }

    /// Check arguments left to right, moving droppable locals
    fn check_args(&mut self, args: &[Expr]) -> Check<Vec<Type>> {
        let mut types = Vec::with_capacity(args.len());
        for arg in args {
            types.push(self.check_expr(arg)?);
            self.consume(arg);
        }
        Ok(types)
    }

    fn report_unknown_callee(&mut self, id: &Ident, call: &CallExpr) -> Check<Type> {
        let help = suggest_similar_name(&id.name, self.scopes.visible_names().into_iter());
        self.report(
            Diagnostic::new(
                DiagnosticKind::UnknownFnOrUnion,
                format!("unknown function or union variant '{}'", id.name),
                id.span,
            )
            .with_label("not declared")
            .with_optional_help(help),
        )?;
        self.check_args(&call.args)?;
        Ok(Type::Unknown)
    }

    /// `Point(1, 2)`: positional construction of a struct
    fn check_struct_constructor(&mut self, id: &Ident, call: &CallExpr) -> Check<Type> {
        let Some(def) = self.defs.find_struct(&id.name).cloned() else {
            return Ok(Type::Unknown);
        };
        if let Some(reason) = &def.deprecated {
            self.report(deprecation_warning("struct", &def.name, reason, id.span))?;
        }
        let arg_types = self.check_args(&call.args)?;
        if arg_types.len() != def.fields.len() {
            self.report(
                Diagnostic::new(
                    DiagnosticKind::WrongArgOrValueCount,
                    format!(
                        "struct '{}' has {} field(s) but {} value(s) were given",
                        def.name,
                        def.fields.len(),
                        arg_types.len()
                    ),
                    call.span,
                )
                .with_note(format!("fields: {}", def.fields.join(", "))),
            )?;
        }

        let subst = match self.explicit_type_args(&def.name, &def.type_params, call)? {
            Some(explicit) => Substitution::from_explicit(&def.type_params, &explicit),
            None => {
                let mut subst = Substitution::new();
                for (field_ty, arg_ty) in def.field_types.iter().zip(&arg_types) {
                    subst.collect(&def.type_params, field_ty, arg_ty);
                }
                subst
            }
        };
        for ((field, field_ty), (arg_ty, arg)) in def
            .fields
            .iter()
            .zip(&def.field_types)
            .zip(arg_types.iter().zip(&call.args))
        {
            let expected = subst.apply(&def.type_params, field_ty);
            let context = format!("field '{}' of '{}'", field, def.name);
            self.require_expr(&expected, arg_ty, arg, &context)?;
        }

        let args = def
            .type_params
            .iter()
            .map(|p| subst.get(p).cloned().unwrap_or(Type::Unknown))
            .collect();
        Ok(Type::generic(def.name.clone(), args))
    }

    /// Check a call against a function type and compute its result
    ///
    /// Type arguments come from explicit `<...>` arguments when their count
    /// matches, otherwise from unifying parameters with argument types.
    /// Variables left unbound resolve to `Unknown`.
    fn resolve_call(
        &mut self,
        name: &str,
        callee_ty: &Type,
        call: &CallExpr,
        arg_types: &[Type],
    ) -> Check<Type> {
        let type_params = callee_ty.function_type_params().to_vec();
        let param_types = callee_ty.function_param_types().to_vec();
        let ret = callee_ty
            .function_return_type()
            .cloned()
            .unwrap_or(Type::Unknown);

        if arg_types.len() != param_types.len() {
            self.report(
                Diagnostic::new(
                    DiagnosticKind::WrongArgOrValueCount,
                    format!(
                        "'{}' expects {} argument(s), found {}",
                        name,
                        param_types.len(),
                        arg_types.len()
                    ),
                    call.span,
                )
                .with_label("wrong number of arguments")
                .with_help(suggest_arity_fix(param_types.len(), arg_types.len(), callee_ty)),
            )?;
        }

        let explicit = self.explicit_type_args(name, &type_params, call)?;
        let mut subst = match &explicit {
            Some(args) => Substitution::from_explicit(&type_params, args),
            None => Substitution::new(),
        };
        let explicit = explicit.is_some();
        if !explicit && !type_params.is_empty() {
            for (param, arg) in param_types.iter().zip(arg_types) {
                subst.collect(&type_params, param, arg);
            }
        }
        for var in &type_params {
            if subst.get(var).is_none() {
                subst.bind(var, Type::Unknown);
            }
        }
        if !type_params.is_empty() {
            debug!(callee = name, explicit, substitution = ?subst, "resolved type arguments");
        }

        for ((param, arg_ty), arg) in param_types.iter().zip(arg_types).zip(&call.args) {
            let expected = subst.apply(&type_params, param);
            let context = format!("argument to '{}'", name);
            self.require_expr(&expected, arg_ty, arg, &context)?;
        }
        Ok(subst.apply(&type_params, &ret))
    }

    /// Validate explicit `<...>` arguments against the callee's parameters
    ///
    /// Returns the resolved arguments only when their count matches.
    fn explicit_type_args(
        &mut self,
        name: &str,
        type_params: &[String],
        call: &CallExpr,
    ) -> Check<Option<Vec<Type>>> {
        if call.type_args.is_empty() {
            return Ok(None);
        }
        if type_params.is_empty() {
            self.report(
                Diagnostic::new(
                    DiagnosticKind::UnsupportedTypeArgsOnNonGeneric,
                    format!("'{}' is not generic but was given type arguments", name),
                    call.span,
                )
                .with_help("remove the type arguments"),
            )?;
            return Ok(None);
        }
        if call.type_args.len() != type_params.len() {
            self.report(
                Diagnostic::new(
                    DiagnosticKind::GenericArityMismatch,
                    format!(
                        "'{}' expects {} type argument(s), found {}",
                        name,
                        type_params.len(),
                        call.type_args.len()
                    ),
                    call.span,
                )
                .with_note(format!("type parameters: {}", type_params.join(", "))),
            )?;
            return Ok(None);
        }
        let mut args = Vec::with_capacity(call.type_args.len());
        for annotation in &call.type_args {
            args.push(self.resolve_type(annotation)?);
        }
        Ok(Some(args))
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::build::*;
    use crate::ast::{Item, Program};
    use crate::defs::FnSig;
    use crate::diagnostic::{DiagnosticBag, DiagnosticKind, ReportMode};
    use crate::lint::NoLints;
    use crate::typechecker::{analyze_program, AnalysisOptions};
    use crate::types::Type;
    use pretty_assertions::assert_eq;

    fn identity() -> Item {
        generic_func("identity", &["T"], &[("x", "T")], Some("T"), block(vec![], Some(ident("x"))))
    }

    fn check(program: &Program, imports: &[FnSig]) -> Vec<DiagnosticKind> {
        let mut bag = DiagnosticBag::new(ReportMode::CollectAll);
        analyze_program(program, imports, &AnalysisOptions::default(), &mut bag, &mut NoLints);
        bag.diagnostics().iter().filter_map(|d| d.kind()).collect()
    }

    fn main_with(stmts: Vec<crate::ast::Stmt>) -> Item {
        func("main", &[], None, block(stmts, None))
    }

    #[test]
    fn test_identity_infers_from_argument() {
        let program = program(vec![
            identity(),
            main_with(vec![
                let_("a", Some("I32"), call("identity", vec![int_typed(1, "I32")])),
                let_("b", Some("String"), call("identity", vec![int_typed(1, "I32")])),
            ]),
        ]);
        assert_eq!(check(&program, &[]), vec![DiagnosticKind::TypeMismatch]);
    }

    #[test]
    fn test_explicit_type_arguments() {
        let program = program(vec![
            identity(),
            main_with(vec![
                let_("a", Some("I64"), call_with_types("identity", &["I64"], vec![int(1)])),
                expr_stmt(call_with_types("identity", &["I64", "Bool"], vec![int(1)])),
                expr_stmt(call_with_types("main", &["I64"], vec![])),
                expr_stmt(call_with_types("identity", &["Bool"], vec![int(1)])),
            ]),
        ]);
        assert_eq!(
            check(&program, &[]),
            vec![
                DiagnosticKind::GenericArityMismatch,
                DiagnosticKind::UnsupportedTypeArgsOnNonGeneric,
                DiagnosticKind::TypeMismatch,
            ]
        );
    }

    #[test]
    fn test_arity_mismatch() {
        let program = program(vec![
            func("add", &[("a", "I32"), ("b", "I32")], Some("I32"), block(vec![], Some(ident("a")))),
            main_with(vec![expr_stmt(call("add", vec![int(1)]))]),
        ]);
        assert_eq!(check(&program, &[]), vec![DiagnosticKind::WrongArgOrValueCount]);
    }

    #[test]
    fn test_unknown_callee() {
        let program = program(vec![main_with(vec![expr_stmt(call("prnt", vec![string("x")]))])]);
        assert_eq!(check(&program, &[]), vec![DiagnosticKind::UnknownFnOrUnion]);
    }

    #[test]
    fn test_imported_signature_is_enforced() {
        let import = FnSig::new("square", vec![Type::I32], Type::I32);
        let program = program(vec![main_with(vec![
            let_("ok", Some("I32"), call("square", vec![int(3)])),
            let_("bad", Some("I32"), call("square", vec![string("3")])),
        ])]);
        assert_eq!(check(&program, &[import]), vec![DiagnosticKind::TypeMismatch]);
    }

    #[test]
    fn test_len_accepts_arrays() {
        let program = program(vec![main_with(vec![
            let_("xs", None, array(vec![int(1), int(2)])),
            let_("n", Some("USize"), call("len", vec![ident("xs")])),
        ])]);
        assert!(check(&program, &[]).is_empty());
    }

    #[test]
    fn test_struct_constructor_call() {
        let program = program(vec![
            generic_struct("Pair", &["A", "B"], &[("first", "A"), ("second", "B")]),
            main_with(vec![
                let_("p", None, call("Pair", vec![int_typed(1, "I32"), string("x")])),
                let_("s", Some("String"), field(ident("p"), "second")),
                expr_stmt(call("Pair", vec![int(1)])),
            ]),
        ]);
        assert_eq!(check(&program, &[]), vec![DiagnosticKind::WrongArgOrValueCount]);
    }

    #[test]
    fn test_struct_constructor_type_arguments() {
        let program = program(vec![
            struct_decl("Point", &[("x", "I64"), ("y", "I64")]),
            generic_struct("Cell", &["T"], &[("value", "T")]),
            main_with(vec![
                expr_stmt(call_with_types("Point", &["I64"], vec![int(1), int(2)])),
                expr_stmt(call_with_types("Cell", &["I32", "Bool"], vec![int(1)])),
                expr_stmt(call_with_types("Cell", &["String"], vec![int(1)])),
                let_(
                    "s",
                    Some("String"),
                    field(call_with_types("Cell", &["I64"], vec![int(1)]), "value"),
                ),
            ]),
        ]);
        assert_eq!(
            check(&program, &[]),
            vec![
                DiagnosticKind::UnsupportedTypeArgsOnNonGeneric,
                DiagnosticKind::GenericArityMismatch,
                DiagnosticKind::TypeMismatch,
                DiagnosticKind::TypeMismatch,
            ]
        );
    }

    #[test]
    fn test_variant_constructor_infers_union_arguments() {
        let program = program(vec![
            union_decl("Option", &["T"], vec![("Some", vec!["T"]), ("None", vec![])]),
            main_with(vec![
                let_("o", None, call("Some", vec![string("x")])),
                let_("n", None, ident("None")),
            ]),
        ]);
        assert!(check(&program, &[]).is_empty());
    }
}
