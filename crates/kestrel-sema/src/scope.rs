//! Lexical scopes and bindings

use crate::span::Span;
use crate::types::Type;
use thiserror::Error;

/// Names that are always valid and never looked up
pub const RESERVED_IDENTIFIERS: [&str; 4] = ["true", "false", "break", "continue"];

pub fn is_reserved(name: &str) -> bool {
    RESERVED_IDENTIFIERS.contains(&name)
}

/// What introduced a binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Variable,
    Parameter,
    /// Declared function, extern or prelude entry
    Function,
    /// Union variant constructor
    Variant,
    /// Nested module name
    Module,
}

/// Variable binding with usage and ownership metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub name: String,
    pub mutable: bool,
    pub ty: Type,
    pub kind: BindingKind,
    /// Declaration location
    pub span: Span,
    pub deprecated: Option<String>,
    pub read: bool,
    pub written: bool,
    /// Where the value was moved out, if it was
    pub moved: Option<Span>,
}

impl Binding {
    pub fn new(name: impl Into<String>, mutable: bool, ty: Type, kind: BindingKind, span: Span) -> Self {
        Self {
            name: name.into(),
            mutable,
            ty,
            kind,
            span,
            deprecated: None,
            read: false,
            written: false,
            moved: None,
        }
    }

    pub fn variable(name: impl Into<String>, mutable: bool, ty: Type, span: Span) -> Self {
        Self::new(name, mutable, ty, BindingKind::Variable, span)
    }

    pub fn parameter(name: impl Into<String>, ty: Type, span: Span) -> Self {
        Self::new(name, false, ty, BindingKind::Parameter, span)
    }

    pub fn with_deprecation(mut self, reason: Option<String>) -> Self {
        self.deprecated = reason;
        self
    }

    pub fn is_param(&self) -> bool {
        self.kind == BindingKind::Parameter
    }
}

/// Bindings local to one lexical block
#[derive(Debug, Clone, Default)]
pub struct Scope {
    bindings: Vec<Binding>,
}

impl Scope {
    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.bindings.iter().find(|b| b.name == name)
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut Binding> {
        self.bindings.iter_mut().find(|b| b.name == name)
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn into_bindings(self) -> Vec<Binding> {
        self.bindings
    }
}

/// Declaration rejected by the scope policy
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeclareError {
    #[error("'{name}' shadows a binding from an enclosing scope")]
    Shadowing { name: String, existing: Span },
    #[error("'{name}' is already declared in this scope")]
    Duplicate { name: String, existing: Span },
}

impl DeclareError {
    /// Where the conflicting binding was declared
    pub fn existing(&self) -> Span {
        match self {
            DeclareError::Shadowing { existing, .. } | DeclareError::Duplicate { existing, .. } => {
                *existing
            }
        }
    }
}

/// Stack of scopes (outermost first)
#[derive(Debug, Clone)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeStack {
    /// Stack holding only the outermost scope
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::default()],
        }
    }

    /// Number of active scopes
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Push a fresh scope and return the new depth
    pub fn enter_scope(&mut self) -> usize {
        self.scopes.push(Scope::default());
        self.scopes.len()
    }

    /// Pop the innermost scope, handing its bindings to the caller
    ///
    /// The outermost scope is never popped.
    pub fn exit_scope(&mut self) -> Scope {
        if self.scopes.len() > 1 {
            self.scopes.pop().unwrap_or_default()
        } else {
            Scope::default()
        }
    }

    fn current(&mut self) -> &mut Scope {
        if self.scopes.is_empty() {
            self.scopes.push(Scope::default());
        }
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }

    fn current_has(&self, name: &str) -> Option<Span> {
        self.scopes.last().and_then(|s| s.get(name)).map(|b| b.span)
    }

    /// Declare in the current scope; no active scope may already bind the name
    pub fn declare(&mut self, binding: Binding) -> Result<(), DeclareError> {
        let in_current = self.current_has(&binding.name).is_some();
        if let Some(existing) = self.lookup(&binding.name).map(|b| b.span) {
            let name = binding.name;
            return Err(if in_current {
                DeclareError::Duplicate { name, existing }
            } else {
                DeclareError::Shadowing { name, existing }
            });
        }
        self.current().bindings.push(binding);
        Ok(())
    }

    /// Declare in the current scope, permitting shadowing of outer bindings
    pub fn declare_local(&mut self, binding: Binding) -> Result<(), DeclareError> {
        if let Some(existing) = self.current_has(&binding.name) {
            return Err(DeclareError::Duplicate {
                name: binding.name,
                existing,
            });
        }
        self.current().bindings.push(binding);
        Ok(())
    }

    /// Innermost binding for `name`
    pub fn lookup(&self, name: &str) -> Option<&Binding> {
        self.scopes.iter().rev().find_map(|s| s.get(name))
    }

    fn lookup_mut(&mut self, name: &str) -> Option<&mut Binding> {
        self.scopes.iter_mut().rev().find_map(|s| s.get_mut(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    pub fn mark_read(&mut self, name: &str) {
        if let Some(binding) = self.lookup_mut(name) {
            binding.read = true;
        }
    }

    pub fn mark_written(&mut self, name: &str) {
        if let Some(binding) = self.lookup_mut(name) {
            binding.written = true;
        }
    }

    /// Record a move; the first recorded position is kept
    pub fn mark_moved(&mut self, name: &str, at: Span) {
        if let Some(binding) = self.lookup_mut(name) {
            if binding.moved.is_none() {
                binding.moved = Some(at);
            }
        }
    }

    pub fn is_moved(&self, name: &str) -> bool {
        self.lookup(name).is_some_and(|b| b.moved.is_some())
    }

    /// Replace a binding's type, keeping flags and move state
    pub fn update_type(&mut self, name: &str, ty: Type) -> bool {
        match self.lookup_mut(name) {
            Some(binding) => {
                binding.ty = ty;
                true
            }
            None => false,
        }
    }

    /// Every visible name, innermost scope first
    pub fn visible_names(&self) -> Vec<&str> {
        self.scopes
            .iter()
            .rev()
            .flat_map(|s| s.bindings.iter().map(|b| b.name.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn var(name: &str, start: usize) -> Binding {
        Binding::variable(name, false, Type::I32, Span::new(start, start + 1))
    }

    #[test]
    fn test_enter_and_exit_scope() {
        let mut stack = ScopeStack::new();
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.enter_scope(), 2);
        stack.declare(var("x", 0)).unwrap();
        let scope = stack.exit_scope();
        assert_eq!(scope.bindings().len(), 1);
        assert!(stack.lookup("x").is_none());
        // outermost scope stays
        stack.exit_scope();
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn test_declare_rejects_shadowing_with_existing_span() {
        let mut stack = ScopeStack::new();
        stack.declare(var("x", 3)).unwrap();
        stack.enter_scope();
        let err = stack.declare(var("x", 10)).unwrap_err();
        assert_eq!(
            err,
            DeclareError::Shadowing {
                name: "x".into(),
                existing: Span::new(3, 4),
            }
        );
    }

    #[test]
    fn test_declare_local_permits_outer_shadowing() {
        let mut stack = ScopeStack::new();
        stack.declare(var("x", 0)).unwrap();
        stack.enter_scope();
        stack
            .declare_local(Binding::parameter("x", Type::STRING, Span::new(5, 6)))
            .unwrap();
        assert_eq!(stack.lookup("x").map(|b| b.ty.clone()), Some(Type::STRING));
        assert!(matches!(
            stack.declare_local(var("x", 9)),
            Err(DeclareError::Duplicate { .. })
        ));
    }

    #[test]
    fn test_usage_flags_and_moves() {
        let mut stack = ScopeStack::new();
        stack.declare(var("buf", 0)).unwrap();
        stack.mark_read("buf");
        stack.mark_written("buf");
        stack.mark_moved("buf", Span::new(7, 10));
        stack.mark_moved("buf", Span::new(20, 23));

        let binding = stack.lookup("buf").unwrap();
        assert!(binding.read && binding.written);
        assert_eq!(binding.moved, Some(Span::new(7, 10)));
        assert!(stack.is_moved("buf"));
    }

    #[test]
    fn test_update_type_preserves_flags() {
        let mut stack = ScopeStack::new();
        stack
            .declare(Binding::variable("a", true, Type::array(Type::I32, 0, 3), Span::dummy()))
            .unwrap();
        stack.mark_written("a");
        assert!(stack.update_type("a", Type::array(Type::I32, 1, 3)));
        let binding = stack.lookup("a").unwrap();
        assert!(binding.written && binding.mutable);
        assert_eq!(binding.ty, Type::array(Type::I32, 1, 3));
        assert!(!stack.update_type("missing", Type::I32));
    }

    #[test]
    fn test_reserved_identifiers() {
        assert!(is_reserved("true"));
        assert!(is_reserved("continue"));
        assert!(!is_reserved("truth"));
    }
}
