//! Type model and reference wire codec for brine-wire schemas.
//!
//! A [Schema] is a named, versioned set of type definitions built from the
//! fixed-width builtins. Every value of a schema type has exactly one
//! little-endian encoding, produced and consumed by [Value].
//!
//! ```
//! use brine_wire_schema::*;
//!
//! let schema = Schema::new("shapes", "1.0.0", vec![
//!     Scalar::new("coord", BuiltIn::Int32).into(),
//!     Composite::new("point", vec![
//!         Field::new("x", "coord"),
//!         Field::new("y", "coord"),
//!     ]).unwrap().into(),
//! ]).unwrap();
//!
//! let value = Value::unpack(&schema, "point", &[1, 0, 0, 0, 254, 255, 255, 255]).unwrap();
//! assert_eq!(format!("{:?}", value), "{x: 1, y: -2}");
//! assert_eq!(value.pack(&schema, "point").unwrap(), [1, 0, 0, 0, 254, 255, 255, 255]);
//! ```

pub mod bb;
pub mod builtin;
pub mod error;
pub mod resolver;
pub mod schema;
pub mod types;
pub mod value;

pub use bb::*;
pub use builtin::*;
pub use error::*;
pub use schema::*;
pub use types::*;
pub use value::*;
