use thiserror::Error;

/// A malformed schema. Raised while the type model is being constructed,
/// before any value is packed or any code is generated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("Invalid identifier \"{0}\"")]
    InvalidName(String),

    #[error("Invalid schema version \"{version}\": {reason}")]
    InvalidVersion { version: String, reason: String },

    #[error("The type \"{0}\" is defined twice")]
    DuplicateType(String),

    #[error("The type name \"{0}\" is reserved")]
    ReservedName(String),

    #[error("The type \"{referenced}\" used by \"{by}\" is not defined")]
    UnknownType { referenced: String, by: String },

    #[error("The name \"{name}\" is declared twice in \"{type_name}\"")]
    DuplicateName { type_name: String, name: String },

    #[error("The type \"{0}\" must declare at least one entry")]
    Empty(String),

    #[error("The size of \"{0}\" must be positive")]
    NonPositiveSize(String),

    #[error("The size type {size_type} of \"{type_name}\" is not an unsigned integer")]
    InvalidSizeType { type_name: String, size_type: String },

    #[error("The maximum {max} of \"{type_name}\" does not fit in size type {size_type}")]
    SizeTypeOverflow {
        type_name: String,
        max:       u64,
        size_type: String,
    },

    #[error("Cyclic schema: {}", .cycle.join(" -> "))]
    Cyclic { cycle: Vec<String> },
}

/// A value that cannot be constructed, packed or unpacked.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WireError {
    #[error("Out of range value {value} for {type_name}")]
    Range { type_name: String, value: String },

    #[error("Invalid length {len} for {type_name} (limit {limit})")]
    Length {
        type_name: String,
        len:       u64,
        limit:     u64,
    },

    #[error("Truncated buffer: needed {needed} bytes but only {remaining} remain")]
    TruncatedBuffer { needed: usize, remaining: usize },

    #[error("Invalid enumeration value {value} for {type_name}")]
    InvalidEnumerationValue { type_name: String, value: u64 },

    #[error("Invalid variant {value} for {type_name}")]
    InvalidVariant { type_name: String, value: u64 },

    #[error("{remaining} trailing bytes after {type_name}")]
    TrailingBytes { type_name: String, remaining: usize },

    #[error("Unknown type \"{0}\"")]
    UnknownType(String),

    #[error("A {found} value cannot be used as {type_name}")]
    TypeMismatch { type_name: String, found: &'static str },

    #[error("Missing field \"{field}\" of {type_name}")]
    MissingField { type_name: String, field: String },

    #[error("Unknown field \"{field}\" for {type_name}")]
    UnknownField { type_name: String, field: String },

    #[error("Field \"{field}\" of {type_name} is given twice")]
    DuplicateField { type_name: String, field: String },

    #[error("Unknown label \"{label}\" for {type_name}")]
    UnknownLabel { type_name: String, label: String },
}
