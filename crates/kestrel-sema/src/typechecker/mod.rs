//! Type checking and narrowing
//!
//! One [`TypeChecker`] analyses one file. Declarations in every scope are
//! processed in two passes: predeclaration registers structs, unions,
//! variant constructors, function signatures, externs and module names;
//! the second pass checks bodies and initializers against the complete
//! environment, so forward and mutual references resolve.
//!
//! Errors go to the [`DiagnosticSink`]. When the sink aborts, the
//! [`Aborted`] value unwinds the traversal through `?`.

mod calls;
mod compat;
mod expr;
mod infer;
mod matching;
pub mod narrowing;
mod stmt;
pub mod substitution;
pub mod suggestions;

pub use compat::{compatible, is_enforced};
pub use infer::{arithmetic_result, join_branches, join_elements, literal_type, unary_result};
pub use narrowing::{parse_tag_narrowing, NarrowingFact, NarrowingSet, TagNarrowing};
pub use substitution::Substitution;

use crate::ast::{Block, FnDecl, Item, Param, Program, Stmt, TypeAnnotation};
use crate::defs::{DefError, Definitions, FnSig, StructDef, UnionDef, VariantDef};
use crate::diagnostic::{
    Aborted, Diagnostic, DiagnosticKind, DiagnosticSink, RelatedLocation, UNKNOWN_FILE,
};
use crate::lint::{FnBody, FunctionInfo, LintHooks, ScopeKind};
use crate::scope::{Binding, BindingKind, DeclareError, ScopeStack};
use crate::span::Span;
use crate::types::{normalize, Type};
use tracing::debug;

/// Result of a traversal step; `Err` only when the sink aborted
pub(crate) type Check<T> = Result<T, Aborted>;

/// Per-file analysis settings supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisOptions {
    /// Path used in diagnostics
    pub file: String,
    /// The file is the program entry point (enables module-level unused lints)
    pub entry_file: bool,
    /// Host intrinsics are visible
    pub compiler_build: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            file: UNKNOWN_FILE.to_string(),
            entry_file: true,
            compiler_build: false,
        }
    }
}

/// What one `analyze_program` call produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisOutcome {
    /// Errors reported for this file
    pub errors: usize,
    /// The sink stopped the analysis early
    pub aborted: bool,
}

impl AnalysisOutcome {
    /// The gate for code generation: no errors were reported
    pub fn is_ok(&self) -> bool {
        self.errors == 0 && !self.aborted
    }
}

/// Signatures visible in every file
pub fn prelude(compiler_build: bool) -> Vec<FnSig> {
    let mut sigs = vec![
        FnSig::new("print", vec![Type::STRING], Type::VOID),
        FnSig::new("panic", vec![Type::STRING], Type::NEVER),
        FnSig::new("len", vec![Type::slice(Type::named("T"))], Type::USIZE)
            .with_type_params(&["T"]),
    ];
    if compiler_build {
        sigs.extend([
            FnSig::new("read_file", vec![Type::STRING], Type::STRING),
            FnSig::new("write_file", vec![Type::STRING, Type::STRING], Type::BOOL),
            FnSig::new("args", vec![], Type::slice(Type::STRING)),
        ]);
    }
    sigs
}

/// Analyse one file
///
/// `imports` are the signatures exported by the file's direct imports,
/// already resolved by the caller. The returned outcome counts only the
/// errors reported during this call.
#[tracing::instrument(skip_all, fields(file = %options.file))]
pub fn analyze_program(
    program: &Program,
    imports: &[FnSig],
    options: &AnalysisOptions,
    sink: &mut dyn DiagnosticSink,
    lints: &mut dyn LintHooks,
) -> AnalysisOutcome {
    sink.set_current_file(&options.file);
    let before = sink.error_count();

    let mut checker = TypeChecker::new(options.clone(), sink, lints);
    let aborted = checker.run(program, imports).is_err();
    let errors = checker.sink.error_count().saturating_sub(before);

    debug!(errors, aborted, "analysis finished");
    AnalysisOutcome { errors, aborted }
}

/// Analysis context for one file
pub struct TypeChecker<'a> {
    defs: Definitions,
    scopes: ScopeStack,
    narrowing: NarrowingSet,
    /// Declared return types of the enclosing functions and lambdas
    return_types: Vec<Type>,
    /// Enclosing nested modules, used to qualify function names
    module_path: Vec<String>,
    options: AnalysisOptions,
    sink: &'a mut dyn DiagnosticSink,
    lints: &'a mut dyn LintHooks,
}

impl<'a> TypeChecker<'a> {
    pub fn new(
        options: AnalysisOptions,
        sink: &'a mut dyn DiagnosticSink,
        lints: &'a mut dyn LintHooks,
    ) -> Self {
        Self {
            defs: Definitions::new(),
            scopes: ScopeStack::new(),
            narrowing: NarrowingSet::default(),
            return_types: Vec::new(),
            module_path: Vec::new(),
            options,
            sink,
            lints,
        }
    }

    /// Definitions registered so far
    pub fn definitions(&self) -> &Definitions {
        &self.defs
    }

    /// Prelude and imports in the outermost scope, file items in a child scope
    pub fn run(&mut self, program: &Program, imports: &[FnSig]) -> Check<()> {
        for sig in prelude(self.options.compiler_build) {
            self.declare_signature(sig)?;
        }
        for sig in imports {
            self.declare_signature(sig.clone())?;
        }

        let kind = ScopeKind::Module {
            entry_file: self.options.entry_file,
        };
        self.with_scope(kind, |this| {
            this.predeclare_items(&program.items)?;
            this.check_items(&program.items)
        })
    }

    fn report(&mut self, diag: Diagnostic) -> Check<()> {
        self.sink.report(diag)
    }

    /// Run `f` inside a fresh scope and hand the closed scope to the lints
    fn with_scope<T>(
        &mut self,
        kind: ScopeKind,
        f: impl FnOnce(&mut Self) -> Check<T>,
    ) -> Check<T> {
        self.scopes.enter_scope();
        let result = f(self);
        let scope = self.scopes.exit_scope();
        let value = result?;
        self.lints
            .scope_exited(kind, scope.bindings(), &mut *self.sink)?;
        Ok(value)
    }

    fn report_declare_error(&mut self, err: DeclareError, span: Span) -> Check<()> {
        let kind = match err {
            DeclareError::Shadowing { .. } => DiagnosticKind::ShadowingNotAllowed,
            DeclareError::Duplicate { .. } => DiagnosticKind::DuplicateName,
        };
        let existing = err.existing();
        self.report(
            Diagnostic::new(kind, err.to_string(), span)
                .with_label("declared again here")
                .with_related_location(RelatedLocation::at(existing, "first declared here")),
        )
    }

    fn report_def_error(&mut self, err: DefError, span: Span) -> Check<()> {
        let mut diag = Diagnostic::new(err.kind(), err.to_string(), span);
        if let DefError::Duplicate { existing, .. } = &err {
            diag = diag.with_related_location(RelatedLocation::at(*existing, "first defined here"));
        }
        self.report(diag)
    }

    fn declare(&mut self, binding: Binding) -> Check<()> {
        let span = binding.span;
        match self.scopes.declare(binding) {
            Ok(()) => Ok(()),
            Err(err) => self.report_declare_error(err, span),
        }
    }

    fn declare_local(&mut self, binding: Binding) -> Check<()> {
        let span = binding.span;
        match self.scopes.declare_local(binding) {
            Ok(()) => Ok(()),
            Err(err) => self.report_declare_error(err, span),
        }
    }

    /// Register a signature and bind its name as a function value
    fn declare_signature(&mut self, sig: FnSig) -> Check<()> {
        let local_name = sig.name.rsplit("::").next().unwrap_or(&sig.name).to_string();
        let binding = Binding::new(
            local_name,
            false,
            sig.fn_type(),
            BindingKind::Function,
            sig.span,
        )
        .with_deprecation(sig.deprecated.clone());
        let span = sig.span;
        if let Err(err) = self.defs.register_fn(sig) {
            return self.report_def_error(err, span);
        }
        self.declare(binding)
    }

    fn qualified(&self, name: &str) -> String {
        if self.module_path.is_empty() {
            name.to_string()
        } else {
            format!("{}::{}", self.module_path.join("::"), name)
        }
    }

    /// Normalize an annotation, warning when it names a deprecated struct
    fn resolve_type(&mut self, annotation: &TypeAnnotation) -> Check<Type> {
        let ty = normalize(&annotation.text);
        let deprecated = ty
            .as_application()
            .and_then(|(name, _)| self.defs.find_struct(name))
            .and_then(|def| def.deprecated.clone().map(|reason| (def.name.clone(), reason)));
        if let Some((name, reason)) = deprecated {
            self.report(deprecation_warning("struct", &name, &reason, annotation.span))?;
        }
        Ok(ty)
    }

    /// `Unknown` when the annotation is absent
    fn resolve_annotation(&mut self, annotation: &Option<TypeAnnotation>) -> Check<Type> {
        match annotation {
            Some(annotation) => self.resolve_type(annotation),
            None => Ok(Type::Unknown),
        }
    }

    // === Pass 1: predeclaration ===

    fn predeclare_items(&mut self, items: &[Item]) -> Check<()> {
        for item in items {
            match item {
                Item::Struct(decl) => {
                    let mut fields: Vec<String> = Vec::new();
                    for field in &decl.fields {
                        if fields.contains(&field.name.name) {
                            self.report(
                                Diagnostic::new(
                                    DiagnosticKind::DuplicateName,
                                    format!(
                                        "field '{}' is declared twice in struct '{}'",
                                        field.name.name, decl.name.name
                                    ),
                                    field.name.span,
                                )
                                .with_label("duplicate field"),
                            )?;
                        }
                        fields.push(field.name.name.clone());
                    }
                    let def = StructDef {
                        name: decl.name.name.clone(),
                        type_params: idents(&decl.type_params),
                        fields,
                        field_types: decl.fields.iter().map(|f| annotation_type(&f.ty)).collect(),
                        deprecated: decl.deprecated.clone(),
                        span: decl.name.span,
                    };
                    debug!(name = %def.name, fields = def.fields.len(), "predeclare struct");
                    if let Err(err) = self.defs.register_struct(def) {
                        self.report_def_error(err, decl.name.span)?;
                    }
                }
                Item::Union(decl) => {
                    let def = UnionDef {
                        name: decl.name.name.clone(),
                        type_params: idents(&decl.type_params),
                        variants: decl
                            .variants
                            .iter()
                            .map(|v| VariantDef {
                                name: v.name.name.clone(),
                                payload: v.payload.iter().map(|p| normalize(&p.text)).collect(),
                            })
                            .collect(),
                        span: decl.name.span,
                    };
                    debug!(name = %def.name, variants = def.variants.len(), "predeclare union");
                    let self_type = def.self_type();
                    let constructors: Vec<(String, Type)> = def
                        .variants
                        .iter()
                        .map(|v| {
                            let ty = if v.payload.is_empty() {
                                self_type.clone()
                            } else {
                                Type::function(
                                    def.type_params.clone(),
                                    v.payload.clone(),
                                    self_type.clone(),
                                )
                            };
                            (v.name.clone(), ty)
                        })
                        .collect();
                    if let Err(err) = self.defs.register_union(def) {
                        self.report_def_error(err, decl.name.span)?;
                        continue;
                    }
                    for (variant, (name, ty)) in decl.variants.iter().zip(constructors) {
                        let binding =
                            Binding::new(name, false, ty, BindingKind::Variant, variant.name.span);
                        if let Err(err) = self.scopes.declare(binding) {
                            let existing = err.existing();
                            self.report(
                                Diagnostic::new(
                                    DiagnosticKind::DuplicateName,
                                    format!(
                                        "variant '{}' clashes with an existing name",
                                        variant.name.name
                                    ),
                                    variant.name.span,
                                )
                                .with_related_location(RelatedLocation::at(
                                    existing,
                                    "existing declaration",
                                )),
                            )?;
                        }
                    }
                }
                Item::Function(decl) => {
                    let sig = FnSig {
                        name: self.qualified(&decl.name.name),
                        deprecated: decl.deprecated.clone(),
                        type_params: idents(&decl.type_params),
                        params: decl.params.iter().map(|p| p.name.name.clone()).collect(),
                        param_types: decl.params.iter().map(|p| annotation_type(&p.ty)).collect(),
                        ret: annotation_type(&decl.return_type),
                        span: decl.name.span,
                    };
                    debug!(name = %sig.name, generic = sig.is_generic(), "predeclare function");
                    self.declare_signature(sig)?;
                }
                Item::Extern(decl) => {
                    let sig = FnSig {
                        name: self.qualified(&decl.name.name),
                        deprecated: None,
                        type_params: Vec::new(),
                        params: decl.params.iter().map(|p| p.name.name.clone()).collect(),
                        param_types: decl.params.iter().map(|p| annotation_type(&p.ty)).collect(),
                        ret: annotation_type(&decl.return_type),
                        span: decl.name.span,
                    };
                    debug!(name = %sig.name, "predeclare extern");
                    self.declare_signature(sig)?;
                }
                Item::Module(decl) => {
                    self.declare(Binding::new(
                        decl.name.name.clone(),
                        false,
                        Type::Unknown,
                        BindingKind::Module,
                        decl.name.span,
                    ))?;
                }
                Item::Let(_) => {}
            }
        }
        Ok(())
    }

    // === Pass 2: bodies ===

    fn check_items(&mut self, items: &[Item]) -> Check<()> {
        for item in items {
            match item {
                Item::Function(decl) => self.check_function(decl)?,
                Item::Let(let_stmt) => self.check_let(let_stmt)?,
                Item::Module(decl) => {
                    self.module_path.push(decl.name.name.clone());
                    let kind = ScopeKind::Module {
                        entry_file: self.options.entry_file,
                    };
                    let result = self.with_scope(kind, |this| {
                        this.predeclare_items(&decl.items)?;
                        this.check_items(&decl.items)
                    });
                    self.module_path.pop();
                    result?;
                }
                Item::Struct(_) | Item::Union(_) | Item::Extern(_) => {}
            }
        }
        Ok(())
    }

    fn check_function(&mut self, decl: &FnDecl) -> Check<()> {
        debug!(function = %decl.name.name, "checking function body");
        let ret = self.resolve_annotation(&decl.return_type)?;
        self.with_scope(ScopeKind::Function, |this| {
            this.declare_params(&decl.params)?;
            this.return_types.push(ret.clone());
            let body = this.check_block_body(&decl.body);
            this.return_types.pop();
            let body = body?;
            if let Some(tail) = &decl.body.tail {
                this.require_expr(&ret, &body, tail, "function return value")?;
            }
            Ok(())
        })?;
        self.lints.function_checked(
            &FunctionInfo {
                name: Some(&decl.name.name),
                params: &decl.params,
                body: FnBody::Block(&decl.body),
                span: decl.name.span,
            },
            &mut *self.sink,
        )
    }

    /// Declare parameters in the current scope and return their types
    fn declare_params(&mut self, params: &[Param]) -> Check<Vec<Type>> {
        let mut types = Vec::with_capacity(params.len());
        for param in params {
            let ty = self.resolve_annotation(&param.ty)?;
            self.declare_local(Binding::parameter(
                param.name.name.clone(),
                ty.clone(),
                param.name.span,
            ))?;
            types.push(ty);
        }
        Ok(types)
    }

    /// Statements then tail, in the current scope
    ///
    /// A block without a tail that ends in `yield`, `break` or `continue`
    /// has type `Never`.
    fn check_block_body(&mut self, block: &Block) -> Check<Type> {
        for stmt in &block.stmts {
            self.check_stmt(stmt)?;
        }
        match &block.tail {
            Some(tail) => self.check_expr(tail),
            None => Ok(match block.stmts.last() {
                Some(Stmt::Yield(_) | Stmt::Break(_) | Stmt::Continue(_)) => Type::NEVER,
                _ => Type::VOID,
            }),
        }
    }

    fn check_block(&mut self, block: &Block) -> Check<Type> {
        self.with_scope(ScopeKind::Block, |this| this.check_block_body(block))
    }
}

fn idents(list: &[crate::ast::Ident]) -> Vec<String> {
    list.iter().map(|id| id.name.clone()).collect()
}

/// Normalized annotation, `Unknown` when absent
fn annotation_type(annotation: &Option<TypeAnnotation>) -> Type {
    annotation
        .as_ref()
        .map(|a| normalize(&a.text))
        .unwrap_or(Type::Unknown)
}

fn deprecation_warning(what: &str, name: &str, reason: &str, span: Span) -> Diagnostic {
    Diagnostic::new(
        DiagnosticKind::DeprecatedSymbolUsed,
        format!("{} '{}' is deprecated", what, name),
        span,
    )
    .with_note(reason.to_string())
}
