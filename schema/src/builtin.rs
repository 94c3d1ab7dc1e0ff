use serde::Serialize;
use std::fmt;

/// Largest magnitude accepted for a `float32` value. Both bounds are exclusive.
pub const FLOAT32_LIMIT: f64 = 3.402823466e38;

/// The fixed set of primitive scalars every schema starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltIn {
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
}

/// Integer vs float semantics of a builtin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Numeric {
    Signed,
    Unsigned,
    Float,
}

pub const BUILTINS: [BuiltIn; 10] = [
    BuiltIn::Int8,
    BuiltIn::Int16,
    BuiltIn::Int32,
    BuiltIn::Int64,
    BuiltIn::UInt8,
    BuiltIn::UInt16,
    BuiltIn::UInt32,
    BuiltIn::UInt64,
    BuiltIn::Float32,
    BuiltIn::Float64,
];

impl BuiltIn {
    /// The reserved schema name of this builtin.
    pub fn name(self) -> &'static str {
        match self {
            BuiltIn::Int8 => "int8",
            BuiltIn::Int16 => "int16",
            BuiltIn::Int32 => "int32",
            BuiltIn::Int64 => "int64",
            BuiltIn::UInt8 => "uint8",
            BuiltIn::UInt16 => "uint16",
            BuiltIn::UInt32 => "uint32",
            BuiltIn::UInt64 => "uint64",
            BuiltIn::Float32 => "float32",
            BuiltIn::Float64 => "float64",
        }
    }

    pub fn from_name(name: &str) -> Option<BuiltIn> {
        BUILTINS.iter().copied().find(|b| b.name() == name)
    }

    /// Encoded width in bytes.
    pub fn byte_length(self) -> usize {
        match self {
            BuiltIn::Int8 | BuiltIn::UInt8 => 1,
            BuiltIn::Int16 | BuiltIn::UInt16 => 2,
            BuiltIn::Int32 | BuiltIn::UInt32 | BuiltIn::Float32 => 4,
            BuiltIn::Int64 | BuiltIn::UInt64 | BuiltIn::Float64 => 8,
        }
    }

    pub fn numeric(self) -> Numeric {
        match self {
            BuiltIn::Int8 | BuiltIn::Int16 | BuiltIn::Int32 | BuiltIn::Int64 => Numeric::Signed,
            BuiltIn::UInt8 | BuiltIn::UInt16 | BuiltIn::UInt32 | BuiltIn::UInt64 => {
                Numeric::Unsigned
            }
            BuiltIn::Float32 | BuiltIn::Float64 => Numeric::Float,
        }
    }

    pub fn is_float(self) -> bool {
        self.numeric() == Numeric::Float
    }

    pub fn is_unsigned(self) -> bool {
        self.numeric() == Numeric::Unsigned
    }

    /// Inclusive `(min, max)` bounds for integer builtins, `None` for floats.
    pub fn int_range(self) -> Option<(i128, i128)> {
        let bits = (self.byte_length() * 8) as u32;
        match self.numeric() {
            Numeric::Signed => Some((-(1i128 << (bits - 1)), (1i128 << (bits - 1)) - 1)),
            Numeric::Unsigned => Some((0, (1i128 << bits) - 1)),
            Numeric::Float => None,
        }
    }

    /// Largest count an unsigned builtin can carry, `None` for the rest.
    pub fn unsigned_max(self) -> Option<u64> {
        match self.numeric() {
            Numeric::Unsigned => self.int_range().map(|(_, max)| max as u64),
            _ => None,
        }
    }

    /// The smallest unsigned builtin able to represent `max`.
    pub fn smallest_unsigned_for(max: u64) -> BuiltIn {
        if max <= u8::MAX as u64 {
            BuiltIn::UInt8
        } else if max <= u16::MAX as u64 {
            BuiltIn::UInt16
        } else if max <= u32::MAX as u64 {
            BuiltIn::UInt32
        } else {
            BuiltIn::UInt64
        }
    }
}

impl fmt::Display for BuiltIn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[test]
fn builtin_ranges() {
    assert_eq!(BuiltIn::UInt8.int_range(), Some((0, 255)));
    assert_eq!(BuiltIn::Int8.int_range(), Some((-128, 127)));
    assert_eq!(BuiltIn::Int32.int_range(), Some((-(1i128 << 31), (1i128 << 31) - 1)));
    assert_eq!(BuiltIn::UInt64.int_range(), Some((0, u64::MAX as i128)));
    assert_eq!(BuiltIn::Int64.int_range(), Some((i64::MIN as i128, i64::MAX as i128)));
    assert_eq!(BuiltIn::Float32.int_range(), None);
}

#[test]
fn builtin_names_round_trip() {
    for builtin in BUILTINS {
        assert_eq!(BuiltIn::from_name(builtin.name()), Some(builtin));
    }
    assert_eq!(BuiltIn::from_name("uint128"), None);
}

#[test]
fn smallest_unsigned() {
    assert_eq!(BuiltIn::smallest_unsigned_for(0), BuiltIn::UInt8);
    assert_eq!(BuiltIn::smallest_unsigned_for(255), BuiltIn::UInt8);
    assert_eq!(BuiltIn::smallest_unsigned_for(256), BuiltIn::UInt16);
    assert_eq!(BuiltIn::smallest_unsigned_for(65_536), BuiltIn::UInt32);
    assert_eq!(BuiltIn::smallest_unsigned_for(u64::MAX), BuiltIn::UInt64);
}
