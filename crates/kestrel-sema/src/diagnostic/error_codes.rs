//! Diagnostic code registry with descriptions and help text
//!
//! Codes follow the KTxxxx scheme for errors and KWxxxx for warnings.

use super::DiagnosticLevel;
use serde::{Deserialize, Serialize};
use std::fmt;

// === Error Code Constants ===

pub const TYPE_MISMATCH: &str = "KT0001";
pub const UNKNOWN_NAME: &str = "KT0002";
pub const UNKNOWN_STRUCT: &str = "KT0003";
pub const UNKNOWN_FIELD: &str = "KT0004";
pub const UNKNOWN_FN_OR_UNION: &str = "KT0005";
pub const UNKNOWN_UNION_VARIANT: &str = "KT0006";
pub const SHADOWING_NOT_ALLOWED: &str = "KT0007";
pub const DUPLICATE_NAME: &str = "KT0008";
pub const UNION_PAYLOAD_REQUIRES_NARROWING: &str = "KT0009";
pub const NON_EXHAUSTIVE_MATCH: &str = "KT0010";
pub const CONDITION_NOT_BOOL: &str = "KT0011";
pub const CANNOT_ASSIGN_IMMUTABLE: &str = "KT0012";
pub const WRONG_ARG_OR_VALUE_COUNT: &str = "KT0013";
pub const GENERIC_ARITY_MISMATCH: &str = "KT0014";
pub const UNSUPPORTED_TYPE_ARGS: &str = "KT0015";
pub const INDEX_OUT_OF_BOUNDS: &str = "KT0016";
pub const UNINITIALIZED_INDEX: &str = "KT0017";
pub const USE_AFTER_MOVE: &str = "KT0018";
pub const LITERAL_OUT_OF_RANGE: &str = "KT0019";

// KWxxxx - Warnings
pub const UNUSED_BINDING: &str = "KW0001";
pub const DEPRECATED_SYMBOL_USED: &str = "KW0002";
pub const TOO_MANY_PARAMETERS: &str = "KW0003";
pub const COMPLEXITY_TOO_HIGH: &str = "KW0004";

/// Every kind of problem the analyser reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticKind {
    TypeMismatch,
    UnknownName,
    UnknownStruct,
    UnknownField,
    UnknownFnOrUnion,
    UnknownUnionVariant,
    ShadowingNotAllowed,
    DuplicateName,
    UnionPayloadRequiresNarrowing,
    NonExhaustiveMatch,
    ConditionNotBool,
    CannotAssignImmutable,
    WrongArgOrValueCount,
    GenericArityMismatch,
    UnsupportedTypeArgsOnNonGeneric,
    IndexOutOfBounds,
    UninitializedIndex,
    UseAfterMove,
    LiteralOutOfRange,
    UnusedBinding,
    DeprecatedSymbolUsed,
    TooManyParameters,
    ComplexityTooHigh,
}

impl DiagnosticKind {
    pub const ALL: [DiagnosticKind; 23] = [
        DiagnosticKind::TypeMismatch,
        DiagnosticKind::UnknownName,
        DiagnosticKind::UnknownStruct,
        DiagnosticKind::UnknownField,
        DiagnosticKind::UnknownFnOrUnion,
        DiagnosticKind::UnknownUnionVariant,
        DiagnosticKind::ShadowingNotAllowed,
        DiagnosticKind::DuplicateName,
        DiagnosticKind::UnionPayloadRequiresNarrowing,
        DiagnosticKind::NonExhaustiveMatch,
        DiagnosticKind::ConditionNotBool,
        DiagnosticKind::CannotAssignImmutable,
        DiagnosticKind::WrongArgOrValueCount,
        DiagnosticKind::GenericArityMismatch,
        DiagnosticKind::UnsupportedTypeArgsOnNonGeneric,
        DiagnosticKind::IndexOutOfBounds,
        DiagnosticKind::UninitializedIndex,
        DiagnosticKind::UseAfterMove,
        DiagnosticKind::LiteralOutOfRange,
        DiagnosticKind::UnusedBinding,
        DiagnosticKind::DeprecatedSymbolUsed,
        DiagnosticKind::TooManyParameters,
        DiagnosticKind::ComplexityTooHigh,
    ];

    pub fn code(self) -> &'static str {
        match self {
            DiagnosticKind::TypeMismatch => TYPE_MISMATCH,
            DiagnosticKind::UnknownName => UNKNOWN_NAME,
            DiagnosticKind::UnknownStruct => UNKNOWN_STRUCT,
            DiagnosticKind::UnknownField => UNKNOWN_FIELD,
            DiagnosticKind::UnknownFnOrUnion => UNKNOWN_FN_OR_UNION,
            DiagnosticKind::UnknownUnionVariant => UNKNOWN_UNION_VARIANT,
            DiagnosticKind::ShadowingNotAllowed => SHADOWING_NOT_ALLOWED,
            DiagnosticKind::DuplicateName => DUPLICATE_NAME,
            DiagnosticKind::UnionPayloadRequiresNarrowing => UNION_PAYLOAD_REQUIRES_NARROWING,
            DiagnosticKind::NonExhaustiveMatch => NON_EXHAUSTIVE_MATCH,
            DiagnosticKind::ConditionNotBool => CONDITION_NOT_BOOL,
            DiagnosticKind::CannotAssignImmutable => CANNOT_ASSIGN_IMMUTABLE,
            DiagnosticKind::WrongArgOrValueCount => WRONG_ARG_OR_VALUE_COUNT,
            DiagnosticKind::GenericArityMismatch => GENERIC_ARITY_MISMATCH,
            DiagnosticKind::UnsupportedTypeArgsOnNonGeneric => UNSUPPORTED_TYPE_ARGS,
            DiagnosticKind::IndexOutOfBounds => INDEX_OUT_OF_BOUNDS,
            DiagnosticKind::UninitializedIndex => UNINITIALIZED_INDEX,
            DiagnosticKind::UseAfterMove => USE_AFTER_MOVE,
            DiagnosticKind::LiteralOutOfRange => LITERAL_OUT_OF_RANGE,
            DiagnosticKind::UnusedBinding => UNUSED_BINDING,
            DiagnosticKind::DeprecatedSymbolUsed => DEPRECATED_SYMBOL_USED,
            DiagnosticKind::TooManyParameters => TOO_MANY_PARAMETERS,
            DiagnosticKind::ComplexityTooHigh => COMPLEXITY_TOO_HIGH,
        }
    }

    pub fn level(self) -> DiagnosticLevel {
        match self {
            DiagnosticKind::UnusedBinding
            | DiagnosticKind::DeprecatedSymbolUsed
            | DiagnosticKind::TooManyParameters
            | DiagnosticKind::ComplexityTooHigh => DiagnosticLevel::Warning,
            _ => DiagnosticLevel::Error,
        }
    }

    pub fn from_code(code: &str) -> Option<DiagnosticKind> {
        DiagnosticKind::ALL.iter().copied().find(|k| k.code() == code)
    }

    pub fn info(self) -> ErrorCodeInfo {
        // Every kind has an entry; the registry test enforces it
        lookup(self.code()).unwrap_or(ErrorCodeInfo {
            code: self.code(),
            description: "",
            help: None,
        })
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// === Error Code Info Registry ===

/// Error code descriptor with code, description, and optional help text
#[derive(Debug, Clone)]
pub struct ErrorCodeInfo {
    /// The error code string (e.g., "KT0001")
    pub code: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Optional contextual help text
    pub help: Option<&'static str>,
}

/// Get info for an error code, if known
pub fn lookup(code: &str) -> Option<ErrorCodeInfo> {
    ERROR_CODES.iter().find(|e| e.code == code).cloned()
}

/// Get help text for an error code
pub fn help_for(code: &str) -> Option<&'static str> {
    lookup(code).and_then(|e| e.help)
}

/// Get description for an error code
pub fn description_for(code: &str) -> Option<&'static str> {
    lookup(code).map(|e| e.description)
}

/// All known error codes with descriptions and help
pub static ERROR_CODES: &[ErrorCodeInfo] = &[
    ErrorCodeInfo {
        code: "KT0001",
        description: "Type mismatch",
        help: Some("Ensure the value's type matches the expected type."),
    },
    ErrorCodeInfo {
        code: "KT0002",
        description: "Unknown name",
        help: Some("Check spelling. The binding may not be in scope here."),
    },
    ErrorCodeInfo {
        code: "KT0003",
        description: "Unknown struct",
        help: Some("Declare the struct or import the module that defines it."),
    },
    ErrorCodeInfo {
        code: "KT0004",
        description: "Unknown field",
        help: Some("Check the struct declaration for the available fields."),
    },
    ErrorCodeInfo {
        code: "KT0005",
        description: "Unknown function or union",
        help: Some("Only declared functions, externs and union variants can be called."),
    },
    ErrorCodeInfo {
        code: "KT0006",
        description: "Unknown union variant",
        help: Some("Check the union declaration for the available variants."),
    },
    ErrorCodeInfo {
        code: "KT0007",
        description: "Shadowing not allowed",
        help: Some("Rename the inner binding; names may not shadow an enclosing binding."),
    },
    ErrorCodeInfo {
        code: "KT0008",
        description: "Duplicate name",
        help: Some("Each name may be declared only once in a scope."),
    },
    ErrorCodeInfo {
        code: "KT0009",
        description: "Union payload requires narrowing",
        help: Some("Check `.tag` in an `if` or use `match` before reading `.value`."),
    },
    ErrorCodeInfo {
        code: "KT0010",
        description: "Non-exhaustive match",
        help: Some("Add an arm for every variant or a wildcard `_` arm."),
    },
    ErrorCodeInfo {
        code: "KT0011",
        description: "Condition is not Bool",
        help: Some("Compare the value explicitly, e.g. `x != 0`."),
    },
    ErrorCodeInfo {
        code: "KT0012",
        description: "Cannot assign to immutable binding",
        help: Some("Declare the binding with `let mut` to allow assignment."),
    },
    ErrorCodeInfo {
        code: "KT0013",
        description: "Wrong number of arguments or values",
        help: Some("Check the declaration for the expected count."),
    },
    ErrorCodeInfo {
        code: "KT0014",
        description: "Generic arity mismatch",
        help: Some("Pass one type argument per declared type parameter."),
    },
    ErrorCodeInfo {
        code: "KT0015",
        description: "Type arguments on non-generic function",
        help: Some("Remove the explicit type arguments."),
    },
    ErrorCodeInfo {
        code: "KT0016",
        description: "Index out of bounds",
        help: Some("Fixed arrays are indexed from 0 to length - 1."),
    },
    ErrorCodeInfo {
        code: "KT0017",
        description: "Index used before initialization",
        help: Some("Initialize fixed array elements in order, starting at index 0."),
    },
    ErrorCodeInfo {
        code: "KT0018",
        description: "Use after move",
        help: Some("The value was moved earlier; it owns a drop handler and cannot be copied."),
    },
    ErrorCodeInfo {
        code: "KT0019",
        description: "Integer literal out of range",
        help: Some("Use a wider integer type or a smaller literal."),
    },
    ErrorCodeInfo {
        code: "KW0001",
        description: "Unused binding",
        help: Some("Remove it or prefix the name with an underscore."),
    },
    ErrorCodeInfo {
        code: "KW0002",
        description: "Deprecated symbol used",
        help: None,
    },
    ErrorCodeInfo {
        code: "KW0003",
        description: "Too many parameters",
        help: Some("Group related parameters into a struct."),
    },
    ErrorCodeInfo {
        code: "KW0004",
        description: "Complexity too high",
        help: Some("Split the function into smaller functions."),
    },
];
