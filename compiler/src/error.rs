use brine_wire_schema::{SchemaError, TypeKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}, column {column}: {msg}")]
    ParseError {
        msg:    String,
        line:   usize,
        column: usize,
    },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("Unsupported target \"{language}\"{}", describe_kind(.kind))]
    UnsupportedTarget {
        language: String,
        kind:     Option<TypeKind>,
    },

    #[error("A {kind} builder is already registered for \"{language}\"")]
    DuplicateBuilder { language: String, kind: TypeKind },

    #[error("The language \"{0}\" is already registered")]
    DuplicateLanguage(String),

    #[error("\"{first}\" and \"{second}\" in {scope} both render as {mangled} in {language}")]
    NameCollision {
        language: String,
        scope:    String,
        first:    String,
        second:   String,
        mangled:  String,
    },

    #[error("\"{name}\" in {scope} renders as {mangled}, which {language} output already uses")]
    ReservedName {
        language: String,
        scope:    String,
        name:     String,
        mangled:  String,
    },

    #[error("The {language} declaration of \"{type_name}\" would hold {count} elements (limit {limit})")]
    ArrayTooLarge {
        language:  String,
        type_name: String,
        count:     u64,
        limit:     u64,
    },

    #[error("The type \"{0}\" is not part of the schema being rendered")]
    UnknownType(String),

    #[error("The type \"{type_name}\" was handed to a {expected} builder")]
    KindMismatch { type_name: String, expected: TypeKind },

    #[error("Invalid project name \"{0}\"")]
    InvalidProject(String),
}

fn describe_kind(kind: &Option<TypeKind>) -> String {
    match kind {
        Some(kind) => format!(": no builder for {}", kind),
        None => String::new(),
    }
}
