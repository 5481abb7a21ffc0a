//! Definition environment: struct, union and function signature registries
//!
//! Registries are filled during predeclaration and read-only afterwards.
//! Field, payload and signature types are stored normalized; an absent
//! annotation is stored as `Type::Unknown`.

use crate::diagnostic::DiagnosticKind;
use crate::span::Span;
use crate::types::Type;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub struct StructDef {
    pub name: String,
    pub type_params: Vec<String>,
    /// Field names in declaration order
    pub fields: Vec<String>,
    /// Parallel to `fields`
    pub field_types: Vec<Type>,
    pub deprecated: Option<String>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariantDef {
    pub name: String,
    pub payload: Vec<Type>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnionDef {
    pub name: String,
    pub type_params: Vec<String>,
    pub variants: Vec<VariantDef>,
    pub span: Span,
}

impl UnionDef {
    /// The union applied to its own type parameters: `Option<T>`
    pub fn self_type(&self) -> Type {
        Type::generic(
            self.name.clone(),
            self.type_params.iter().map(Type::named).collect(),
        )
    }
}

fn unconstrained() -> Type {
    Type::Unknown
}

/// Function signature, local or imported
///
/// Imported signatures arrive as JSON from module resolution, with types
/// written in annotation syntax.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FnSig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_params: Vec<String>,
    /// Parameter names in order
    #[serde(default)]
    pub params: Vec<String>,
    /// Parallel to `params`
    #[serde(default)]
    pub param_types: Vec<Type>,
    /// `Unknown` when the return type is inferred
    #[serde(default = "unconstrained")]
    pub ret: Type,
    #[serde(skip)]
    pub span: Span,
}

impl FnSig {
    /// Signature with positional parameter names `p0, p1, ...`
    pub fn new(name: impl Into<String>, param_types: Vec<Type>, ret: Type) -> Self {
        Self {
            name: name.into(),
            deprecated: None,
            type_params: Vec::new(),
            params: (0..param_types.len()).map(|i| format!("p{}", i)).collect(),
            param_types,
            ret,
            span: Span::dummy(),
        }
    }

    pub fn with_type_params(mut self, type_params: &[&str]) -> Self {
        self.type_params = type_params.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn is_generic(&self) -> bool {
        !self.type_params.is_empty()
    }

    /// The signature as a function type
    pub fn fn_type(&self) -> Type {
        Type::function(
            self.type_params.clone(),
            self.param_types.clone(),
            self.ret.clone(),
        )
    }
}

/// Registration or lookup failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefError {
    #[error("'{name}' is already defined")]
    Duplicate { name: String, existing: Span },
    #[error("unknown struct '{0}'")]
    UnknownStruct(String),
    #[error("struct '{ty}' has no field '{field}'")]
    UnknownField { ty: String, field: String },
}

impl DefError {
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            DefError::Duplicate { .. } => DiagnosticKind::DuplicateName,
            DefError::UnknownStruct(_) => DiagnosticKind::UnknownStruct,
            DefError::UnknownField { .. } => DiagnosticKind::UnknownField,
        }
    }
}

/// Per-file registries of structs, unions and function signatures
#[derive(Debug, Clone, Default)]
pub struct Definitions {
    structs: HashMap<String, StructDef>,
    unions: HashMap<String, UnionDef>,
    fns: HashMap<String, FnSig>,
}

impl Definitions {
    pub fn new() -> Self {
        Self::default()
    }

    fn existing_type(&self, name: &str) -> Option<Span> {
        self.structs
            .get(name)
            .map(|s| s.span)
            .or_else(|| self.unions.get(name).map(|u| u.span))
    }

    /// Struct and union names share one namespace
    pub fn register_struct(&mut self, def: StructDef) -> Result<(), DefError> {
        if let Some(existing) = self.existing_type(&def.name) {
            return Err(DefError::Duplicate {
                name: def.name,
                existing,
            });
        }
        self.structs.insert(def.name.clone(), def);
        Ok(())
    }

    pub fn register_union(&mut self, def: UnionDef) -> Result<(), DefError> {
        if let Some(existing) = self.existing_type(&def.name) {
            return Err(DefError::Duplicate {
                name: def.name,
                existing,
            });
        }
        self.unions.insert(def.name.clone(), def);
        Ok(())
    }

    pub fn register_fn(&mut self, sig: FnSig) -> Result<(), DefError> {
        if let Some(existing) = self.fns.get(&sig.name) {
            return Err(DefError::Duplicate {
                name: sig.name,
                existing: existing.span,
            });
        }
        self.fns.insert(sig.name.clone(), sig);
        Ok(())
    }

    // === Structs ===

    pub fn find_struct(&self, name: &str) -> Option<&StructDef> {
        self.structs.get(name)
    }

    pub fn has_struct(&self, name: &str) -> bool {
        self.structs.contains_key(name)
    }

    pub fn field_index(&self, struct_name: &str, field: &str) -> Option<usize> {
        self.find_struct(struct_name)?
            .fields
            .iter()
            .position(|f| f == field)
    }

    /// Declared type of `struct_name.field`, `Unknown` if unannotated
    pub fn field_type(&self, struct_name: &str, field: &str) -> Result<Type, DefError> {
        let def = self
            .find_struct(struct_name)
            .ok_or_else(|| DefError::UnknownStruct(struct_name.to_string()))?;
        let index = def
            .fields
            .iter()
            .position(|f| f == field)
            .ok_or_else(|| DefError::UnknownField {
                ty: struct_name.to_string(),
                field: field.to_string(),
            })?;
        Ok(def.field_types[index].clone())
    }

    pub fn struct_names(&self) -> impl Iterator<Item = &str> {
        self.structs.keys().map(String::as_str)
    }

    // === Functions ===

    pub fn find_fn_sig(&self, name: &str) -> Option<&FnSig> {
        self.fns.get(name)
    }

    pub fn has_fn_sig(&self, name: &str) -> bool {
        self.fns.contains_key(name)
    }

    // === Unions ===

    pub fn find_union(&self, name: &str) -> Option<&UnionDef> {
        self.unions.get(name)
    }

    pub fn has_union(&self, name: &str) -> bool {
        self.unions.contains_key(name)
    }

    pub fn union_has_variant(&self, union_name: &str, variant: &str) -> bool {
        self.variant_index(union_name, variant).is_some()
    }

    pub fn variant_index(&self, union_name: &str, variant: &str) -> Option<usize> {
        self.find_union(union_name)?
            .variants
            .iter()
            .position(|v| v.name == variant)
    }

    pub fn variant_has_payload(&self, union_name: &str, variant: &str) -> bool {
        !self.variant_payload_types(union_name, variant).is_empty()
    }

    /// Declared payload types, empty for unknown variants
    pub fn variant_payload_types(&self, union_name: &str, variant: &str) -> &[Type] {
        self.find_union(union_name)
            .and_then(|u| u.variants.iter().find(|v| v.name == variant))
            .map(|v| v.payload.as_slice())
            .unwrap_or(&[])
    }

    pub fn variant_names(&self, union_name: &str) -> Vec<&str> {
        self.find_union(union_name)
            .map(|u| u.variants.iter().map(|v| v.name.as_str()).collect())
            .unwrap_or_default()
    }

    /// Union declaring a variant with this name
    pub fn union_of_variant(&self, variant: &str) -> Option<&UnionDef> {
        let mut owners: Vec<&UnionDef> = self
            .unions
            .values()
            .filter(|u| u.variants.iter().any(|v| v.name == variant))
            .collect();
        owners.sort_by(|a, b| a.name.cmp(&b.name));
        owners.into_iter().next()
    }
}
