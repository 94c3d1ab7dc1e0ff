//! brine-wire-compiler
//!
//! This crate implements:
//!  1) A tokenizer + parser for `.wire` schema files,
//!  2) The builder registry, keyed by target language and type kind,
//!  3) C, Ruby and Rust backends built on that registry,
//!  4) Project generation (`generate` → files, `write_project` → disk),
//!  5) Error types (`CompileError`).
//!
//! ```
//! use brine_wire_compiler::{compile_schema, generate, BuilderRegistry, Language};
//!
//! let schema = compile_schema("schema demo 1.0.0; scalar meters uint32;").unwrap();
//! let registry = BuilderRegistry::with_defaults().unwrap();
//! let files = generate(&schema, &registry, Language::C, "demo").unwrap();
//! assert_eq!(files.len(), 2);
//! ```

pub mod error;
pub mod utils;
pub mod tokenizer;
pub mod parser;
pub mod compiler;
pub mod formatter;
pub mod builder;
pub mod registry;
pub mod generator;
pub mod gen_c;
pub mod gen_ruby;
pub mod gen_rust;

pub use builder::{Builder, Emitter, RenderContext};
pub use compiler::compile_schema;
pub use error::CompileError;
pub use generator::{generate, write_project, GeneratedFile};
pub use registry::{BuilderRegistry, Language};
