//! brine-wire
//!
//! This crate provides runtime support for working with brine-wire data.
//!
//! - `Pack` / `Unpack` traits, implemented by generated Rust code
//! - The dynamic [Value] codec and the schema type model
//! - The compiler entry points, for build scripts and tools

pub mod traits;

pub use traits::{Pack, Unpack};
pub use brine_wire_compiler::{
    compile_schema, generate, write_project, BuilderRegistry, CompileError, GeneratedFile,
    Language,
};
pub use brine_wire_schema::{
    BuiltIn, ByteBuffer, ByteBufferMut, Schema, SchemaError, TypeDef, TypeKind, Value,
    WireError,
};

/// Describe a compiled schema as a pretty-printed JSON string.
pub fn describe_to_json(schema: &Schema) -> serde_json::Result<String> {
    serde_json::to_string_pretty(schema)
}

pub mod error {
    pub use brine_wire_compiler::CompileError;
    pub use brine_wire_schema::{SchemaError, WireError};
}

pub mod schema {
    pub use brine_wire_schema::{
        BuiltIn, Composite, Enumeration, Field, FixedArray, Group, Scalar, Schema, TypeDef,
        TypeKind, Value, VariableArray,
    };
}
