//! Type system representation
//!
//! Types are structural values. Identity is structural equality of the
//! normalized form, and `Display` renders the canonical text that
//! [`normalize`] parses back to the same value.

mod grammar;

pub use grammar::{normalize, parse_type, TypeSyntaxError};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Primitive types, including the provisional literal types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Prim {
    I8,
    I16,
    I32,
    I64,
    ISize,
    U8,
    U16,
    U32,
    U64,
    USize,
    F32,
    F64,
    Bool,
    Char,
    String,
    Void,
    Never,
    /// Unsuffixed integer literal, widens to any int-like type
    IntLit,
    /// Unsuffixed float literal, widens to any float-like type
    FloatLit,
}

impl Prim {
    pub const ALL: [Prim; 19] = [
        Prim::I8,
        Prim::I16,
        Prim::I32,
        Prim::I64,
        Prim::ISize,
        Prim::U8,
        Prim::U16,
        Prim::U32,
        Prim::U64,
        Prim::USize,
        Prim::F32,
        Prim::F64,
        Prim::Bool,
        Prim::Char,
        Prim::String,
        Prim::Void,
        Prim::Never,
        Prim::IntLit,
        Prim::FloatLit,
    ];

    /// Canonical spelling
    pub fn name(self) -> &'static str {
        match self {
            Prim::I8 => "I8",
            Prim::I16 => "I16",
            Prim::I32 => "I32",
            Prim::I64 => "I64",
            Prim::ISize => "ISize",
            Prim::U8 => "U8",
            Prim::U16 => "U16",
            Prim::U32 => "U32",
            Prim::U64 => "U64",
            Prim::USize => "USize",
            Prim::F32 => "F32",
            Prim::F64 => "F64",
            Prim::Bool => "Bool",
            Prim::Char => "Char",
            Prim::String => "String",
            Prim::Void => "Void",
            Prim::Never => "Never",
            Prim::IntLit => "IntLit",
            Prim::FloatLit => "FloatLit",
        }
    }

    /// Resolve a spelling, including the accepted aliases
    pub fn from_name(name: &str) -> Option<Prim> {
        let canonical = match name {
            "Int" => "I32",
            "UInt" => "U32",
            "Float" => "F64",
            "Byte" => "U8",
            "Str" => "String",
            other => other,
        };
        Prim::ALL.iter().copied().find(|p| p.name() == canonical)
    }

    pub fn is_concrete_int(self) -> bool {
        matches!(
            self,
            Prim::I8
                | Prim::I16
                | Prim::I32
                | Prim::I64
                | Prim::ISize
                | Prim::U8
                | Prim::U16
                | Prim::U32
                | Prim::U64
                | Prim::USize
        )
    }

    pub fn is_int_like(self) -> bool {
        self.is_concrete_int() || matches!(self, Prim::IntLit | Prim::Char)
    }

    pub fn is_concrete_float(self) -> bool {
        matches!(self, Prim::F32 | Prim::F64)
    }

    pub fn is_float_like(self) -> bool {
        self.is_concrete_float() || self == Prim::FloatLit
    }

    /// Inclusive value range of a concrete integer width
    pub fn int_range(self) -> Option<(i128, i128)> {
        match self {
            Prim::I8 => Some((i8::MIN as i128, i8::MAX as i128)),
            Prim::I16 => Some((i16::MIN as i128, i16::MAX as i128)),
            Prim::I32 => Some((i32::MIN as i128, i32::MAX as i128)),
            Prim::I64 | Prim::ISize => Some((i64::MIN as i128, i64::MAX as i128)),
            Prim::U8 => Some((0, u8::MAX as i128)),
            Prim::U16 => Some((0, u16::MAX as i128)),
            Prim::U32 => Some((0, u32::MAX as i128)),
            Prim::U64 | Prim::USize => Some((0, u64::MAX as i128)),
            _ => None,
        }
    }
}

/// Type representation
///
/// Serializes as its canonical text, so signatures handed over as JSON
/// read the same as annotations in source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Type {
    /// Unresolved or ambiguous; compatible with everything
    Unknown,
    Primitive(Prim),
    /// Fixed-size array; `init` leading elements are known to be initialized
    Array {
        elem: Box<Type>,
        init: usize,
        len: usize,
    },
    /// Dynamically sized view `*[T]`
    Slice(Box<Type>),
    Tuple(Vec<Type>),
    Function {
        /// Type variables local to this function type
        type_params: Vec<String>,
        params: Vec<Type>,
        ret: Box<Type>,
    },
    /// Named type or generic application: struct, union or type variable
    Generic { name: String, args: Vec<Type> },
    Pointer { mutable: bool, inner: Box<Type> },
    /// A value that owns a drop handler
    Droppable { base: Box<Type>, handler: String },
}

impl Type {
    pub const I32: Type = Type::Primitive(Prim::I32);
    pub const U32: Type = Type::Primitive(Prim::U32);
    pub const I64: Type = Type::Primitive(Prim::I64);
    pub const USIZE: Type = Type::Primitive(Prim::USize);
    pub const F32: Type = Type::Primitive(Prim::F32);
    pub const F64: Type = Type::Primitive(Prim::F64);
    pub const BOOL: Type = Type::Primitive(Prim::Bool);
    pub const CHAR: Type = Type::Primitive(Prim::Char);
    pub const STRING: Type = Type::Primitive(Prim::String);
    pub const VOID: Type = Type::Primitive(Prim::Void);
    pub const NEVER: Type = Type::Primitive(Prim::Never);
    pub const INT_LIT: Type = Type::Primitive(Prim::IntLit);
    pub const FLOAT_LIT: Type = Type::Primitive(Prim::FloatLit);

    /// Named type without arguments
    pub fn named(name: impl Into<String>) -> Type {
        Type::Generic {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn generic(name: impl Into<String>, args: Vec<Type>) -> Type {
        Type::Generic {
            name: name.into(),
            args,
        }
    }

    pub fn array(elem: Type, init: usize, len: usize) -> Type {
        Type::Array {
            elem: Box::new(elem),
            init,
            len,
        }
    }

    pub fn slice(elem: Type) -> Type {
        Type::Slice(Box::new(elem))
    }

    /// Build a function type from its parts
    pub fn function(type_params: Vec<String>, params: Vec<Type>, ret: Type) -> Type {
        Type::Function {
            type_params,
            params,
            ret: Box::new(ret),
        }
    }

    /// Attach a drop handler marker, replacing any existing one
    pub fn with_drop(self, handler: impl Into<String>) -> Type {
        let base = self.strip_drop().clone();
        Type::Droppable {
            base: Box::new(base),
            handler: handler.into(),
        }
    }

    /// Canonical form: idempotent, and structural equality of two
    /// normalized values is type identity.
    pub fn normalized(&self) -> Type {
        match self {
            Type::Unknown | Type::Primitive(_) => self.clone(),
            Type::Array { elem, init, len } => Type::Array {
                elem: Box::new(elem.normalized()),
                init: (*init).min(*len),
                len: *len,
            },
            Type::Slice(elem) => Type::Slice(Box::new(elem.normalized())),
            Type::Tuple(items) => match items.len() {
                0 => Type::VOID,
                1 => items[0].normalized(),
                _ => Type::Tuple(items.iter().map(Type::normalized).collect()),
            },
            Type::Function {
                type_params,
                params,
                ret,
            } => Type::Function {
                type_params: type_params.clone(),
                params: params.iter().map(Type::normalized).collect(),
                ret: Box::new(ret.normalized()),
            },
            Type::Generic { name, args } if args.is_empty() => match name.as_str() {
                "Unknown" => Type::Unknown,
                other => match Prim::from_name(other) {
                    Some(prim) => Type::Primitive(prim),
                    None => self.clone(),
                },
            },
            Type::Generic { name, args } => Type::Generic {
                name: name.clone(),
                args: args.iter().map(Type::normalized).collect(),
            },
            Type::Pointer { mutable, inner } => Type::Pointer {
                mutable: *mutable,
                inner: Box::new(inner.normalized()),
            },
            Type::Droppable { base, handler } => Type::Droppable {
                base: Box::new(base.strip_drop().normalized()),
                handler: handler.clone(),
            },
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Type::Unknown)
    }

    pub fn is_never(&self) -> bool {
        matches!(self.strip_drop(), Type::Primitive(Prim::Never))
    }

    pub fn as_prim(&self) -> Option<Prim> {
        match self.strip_drop() {
            Type::Primitive(prim) => Some(*prim),
            _ => None,
        }
    }

    pub fn is_int_like(&self) -> bool {
        self.as_prim().is_some_and(Prim::is_int_like)
    }

    pub fn is_concrete_int(&self) -> bool {
        self.as_prim().is_some_and(Prim::is_concrete_int)
    }

    pub fn is_float_like(&self) -> bool {
        self.as_prim().is_some_and(Prim::is_float_like)
    }

    pub fn is_concrete_float(&self) -> bool {
        self.as_prim().is_some_and(Prim::is_concrete_float)
    }

    /// Base type with any drop marker removed
    pub fn strip_drop(&self) -> &Type {
        match self {
            Type::Droppable { base, .. } => base.strip_drop(),
            other => other,
        }
    }

    pub fn drop_handler(&self) -> Option<&str> {
        match self {
            Type::Droppable { handler, .. } => Some(handler),
            _ => None,
        }
    }

    /// `(elem, init, len)` if this is a fixed-size array
    pub fn as_array(&self) -> Option<(&Type, usize, usize)> {
        match self.strip_drop() {
            Type::Array { elem, init, len } => Some((elem, *init, *len)),
            _ => None,
        }
    }

    /// Element type of a slice
    pub fn slice_inner(&self) -> Option<&Type> {
        match self.strip_drop() {
            Type::Slice(elem) => Some(elem),
            _ => None,
        }
    }

    /// `(callee, args)` of a named type or generic application
    pub fn as_application(&self) -> Option<(&str, &[Type])> {
        match self.strip_drop() {
            Type::Generic { name, args } => Some((name, args)),
            _ => None,
        }
    }

    pub fn is_function(&self) -> bool {
        matches!(self.strip_drop(), Type::Function { .. })
    }

    pub fn function_type_params(&self) -> &[String] {
        match self.strip_drop() {
            Type::Function { type_params, .. } => type_params,
            _ => &[],
        }
    }

    pub fn function_param_types(&self) -> &[Type] {
        match self.strip_drop() {
            Type::Function { params, .. } => params,
            _ => &[],
        }
    }

    pub fn function_return_type(&self) -> Option<&Type> {
        match self.strip_drop() {
            Type::Function { ret, .. } => Some(ret),
            _ => None,
        }
    }

    /// Get a human-readable name for this type
    pub fn display_name(&self) -> String {
        self.to_string()
    }
}

impl From<Type> for String {
    fn from(ty: Type) -> String {
        ty.to_string()
    }
}

impl TryFrom<String> for Type {
    type Error = TypeSyntaxError;

    fn try_from(text: String) -> Result<Type, TypeSyntaxError> {
        parse_type(&text)
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Type]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Unknown => write!(f, "Unknown"),
            Type::Primitive(prim) => write!(f, "{}", prim.name()),
            Type::Array { elem, init, len } => write!(f, "[{}; {}; {}]", elem, init, len),
            Type::Slice(elem) => write!(f, "*[{}]", elem),
            Type::Tuple(items) => {
                write!(f, "(")?;
                write_list(f, items)?;
                write!(f, ")")
            }
            Type::Function {
                type_params,
                params,
                ret,
            } => {
                write!(f, "Fn")?;
                if !type_params.is_empty() {
                    write!(f, "<{}>", type_params.join(", "))?;
                }
                write!(f, "(")?;
                write_list(f, params)?;
                write!(f, ")->{}", ret)
            }
            Type::Generic { name, args } => {
                write!(f, "{}", name)?;
                if !args.is_empty() {
                    write!(f, "<")?;
                    write_list(f, args)?;
                    write!(f, ">")?;
                }
                Ok(())
            }
            Type::Pointer { mutable, inner } => {
                if *mutable {
                    write!(f, "*mut {}", inner)
                } else {
                    write!(f, "*{}", inner)
                }
            }
            // Function and pointer bases would absorb the marker on re-parse
            Type::Droppable { base, handler } => match base.as_ref() {
                Type::Function { .. } | Type::Pointer { .. } => {
                    write!(f, "({})!{}", base, handler)
                }
                _ => write!(f, "{}!{}", base, handler),
            },
        }
    }
}
