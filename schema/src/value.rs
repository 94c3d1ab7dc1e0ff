use crate::{
    bb::{ByteBuffer, ByteBufferMut},
    builtin::{BuiltIn, Numeric, FLOAT32_LIMIT},
    error::WireError,
    schema::Schema,
    types::TypeDef,
};

use std::collections::HashSet;
use std::fmt;
use std::ops::Index;

/// This type holds dynamic data for any type in a [Schema](struct.Schema.html).
///
/// Values are converted to and from the canonical little-endian encoding
/// using the schema they were built against. Enumeration labels, field names
/// and variant names are stored as string slices from the Schema, so a Value
/// can outlive the buffer it was decoded from but can't outlive the schema.
///
/// Composite fields are kept in declaration order once a value has been
/// built with [composite](#method.composite) or decoded.
#[derive(Clone, PartialEq)]
pub enum Value<'a> {
    Integer(i128),
    Float(f64),
    Enum(&'a str),
    Composite(Vec<(&'a str, Value<'a>)>),
    FixedArray(Vec<Value<'a>>),
    VariableArray(Vec<Value<'a>>),
    Group(&'a str, Box<Value<'a>>),
}

impl<'a> Value<'a> {
    /// Builds an integer value for a builtin or scalar integer type, failing
    /// with [WireError::Range] outside of the type's bounds.
    pub fn integer(
        schema: &'a Schema,
        type_name: &str,
        value: impl Into<i128>,
    ) -> Result<Value<'a>, WireError> {
        let value = Value::Integer(value.into());
        value.validate(lookup(schema, type_name)?, schema)?;
        Ok(value)
    }

    /// Builds a float value. `float32` values are rounded to single precision
    /// so that they survive a pack/unpack round trip unchanged. NaN is
    /// rejected for both widths since it never compares equal to itself.
    pub fn float(schema: &'a Schema, type_name: &str, value: f64) -> Result<Value<'a>, WireError> {
        let def = lookup(schema, type_name)?;
        let value = match def.as_builtin() {
            Some(BuiltIn::Float32) => {
                check_float32(def.name(), value)?;
                Value::Float(value as f32 as f64)
            }
            Some(BuiltIn::Float64) => {
                check_float64(def.name(), value)?;
                Value::Float(value)
            }
            _ => Value::Float(value),
        };
        value.validate(def, schema)?;
        Ok(value)
    }

    /// Builds an enumeration value from one of its labels.
    pub fn enumeration(
        schema: &'a Schema,
        type_name: &str,
        label: &str,
    ) -> Result<Value<'a>, WireError> {
        let def = lookup(schema, type_name)?;
        let enumeration = def.as_enumeration().ok_or_else(|| mismatch(def, "enumeration"))?;
        match enumeration.labels().iter().find(|l| *l == label) {
            Some(label) => Ok(Value::Enum(label.as_str())),
            None => Err(WireError::UnknownLabel {
                type_name: def.name().to_string(),
                label:     label.to_string(),
            }),
        }
    }

    /// Builds a composite from fields given in any order. The set of names
    /// must equal the declared field set; the result is in declaration order.
    pub fn composite<'n>(
        schema: &'a Schema,
        type_name: &str,
        fields: impl IntoIterator<Item = (&'n str, Value<'a>)>,
    ) -> Result<Value<'a>, WireError> {
        let def = lookup(schema, type_name)?;
        let composite = def.as_composite().ok_or_else(|| mismatch(def, "composite"))?;
        let mut given: Vec<(&'n str, Option<Value<'a>>)> = Vec::new();
        for (name, value) in fields {
            if composite.field(name).is_none() {
                return Err(WireError::UnknownField {
                    type_name: def.name().to_string(),
                    field:     name.to_string(),
                });
            }
            if given.iter().any(|(n, _)| *n == name) {
                return Err(WireError::DuplicateField {
                    type_name: def.name().to_string(),
                    field:     name.to_string(),
                });
            }
            given.push((name, Some(value)));
        }

        let mut ordered = Vec::with_capacity(composite.fields().len());
        for field in composite.fields() {
            let slot = given.iter_mut().find(|(n, _)| *n == field.name).and_then(|(_, v)| v.take());
            match slot {
                Some(value) => ordered.push((field.name.as_str(), value)),
                None => {
                    return Err(WireError::MissingField {
                        type_name: def.name().to_string(),
                        field:     field.name.clone(),
                    })
                }
            }
        }

        let value = Value::Composite(ordered);
        value.validate(def, schema)?;
        Ok(value)
    }

    /// Builds a fixed array. The element count must equal the declared count.
    pub fn fixed_array(
        schema: &'a Schema,
        type_name: &str,
        elements: Vec<Value<'a>>,
    ) -> Result<Value<'a>, WireError> {
        let value = Value::FixedArray(elements);
        value.validate(lookup(schema, type_name)?, schema)?;
        Ok(value)
    }

    /// Builds a variable array, failing with [WireError::Length] when there
    /// are more elements than the declared maximum.
    pub fn variable_array(
        schema: &'a Schema,
        type_name: &str,
        elements: Vec<Value<'a>>,
    ) -> Result<Value<'a>, WireError> {
        let value = Value::VariableArray(elements);
        value.validate(lookup(schema, type_name)?, schema)?;
        Ok(value)
    }

    /// Builds a group value holding `payload` in the named variant.
    pub fn group(
        schema: &'a Schema,
        type_name: &str,
        variant: &str,
        payload: Value<'a>,
    ) -> Result<Value<'a>, WireError> {
        let def = lookup(schema, type_name)?;
        let group = def.as_group().ok_or_else(|| mismatch(def, "group"))?;
        let index = group.variant_index(variant).ok_or_else(|| WireError::UnknownLabel {
            type_name: def.name().to_string(),
            label:     variant.to_string(),
        })?;
        let value = Value::Group(group.variants()[index].name.as_str(), Box::new(payload));
        value.validate(def, schema)?;
        Ok(value)
    }

    /// A convenience method to extract the value out of an [Integer](#variant.Integer).
    pub fn as_integer(&self) -> Option<i128> {
        match *self {
            Value::Integer(value) => Some(value),
            _ => None,
        }
    }

    /// A convenience method to extract the value out of a [Float](#variant.Float).
    pub fn as_float(&self) -> Option<f64> {
        match *self {
            Value::Float(value) => Some(value),
            _ => None,
        }
    }

    /// A convenience method to extract the label out of an [Enum](#variant.Enum).
    pub fn as_label(&self) -> Option<&'a str> {
        match *self {
            Value::Enum(label) => Some(label),
            _ => None,
        }
    }

    /// Elements of either array kind. Returns an empty slice for other kinds.
    pub fn as_slice(&self) -> &[Value<'a>] {
        match *self {
            Value::FixedArray(ref values) | Value::VariableArray(ref values) => values.as_slice(),
            _ => &[],
        }
    }

    /// Number of array elements. Returns `0` for other value kinds.
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A convenience method to extract a field out of a [Composite](#variant.Composite).
    /// Returns `None` for other value kinds or if the field isn't present.
    pub fn get(&self, name: &str) -> Option<&Value<'a>> {
        match *self {
            Value::Composite(ref fields) => {
                fields.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
            }
            _ => None,
        }
    }

    /// Decodes a whole buffer as the type named `type_name`. Bytes left over
    /// after the value fail with [WireError::TrailingBytes].
    pub fn unpack(
        schema: &'a Schema,
        type_name: &str,
        bytes: &[u8],
    ) -> Result<Value<'a>, WireError> {
        let mut bb = ByteBuffer::new(bytes);
        let value = Value::unpack_bb(schema, type_name, &mut bb)?;
        if bb.remaining() != 0 {
            return Err(WireError::TrailingBytes {
                type_name: type_name.to_string(),
                remaining: bb.remaining(),
            });
        }
        Ok(value)
    }

    /// Decodes the type named `type_name` from `bb` starting at the current
    /// index. After this function returns, the current index will be advanced
    /// by the amount of data that was successfully parsed.
    pub fn unpack_bb(
        schema: &'a Schema,
        type_name: &str,
        bb: &mut ByteBuffer,
    ) -> Result<Value<'a>, WireError> {
        Value::decode_bb(schema, lookup(schema, type_name)?, bb)
    }

    /// Encodes this value as the type named `type_name`. The value is checked
    /// against the type while it is written, so hand-built values get the
    /// same range and length errors as the constructors give.
    pub fn pack(&self, schema: &Schema, type_name: &str) -> Result<Vec<u8>, WireError> {
        let mut bb = ByteBufferMut::new();
        self.pack_bb(schema, type_name, &mut bb)?;
        Ok(bb.data())
    }

    /// Encodes the current value to the end of `bb`. On error the buffer may
    /// hold a partial encoding.
    pub fn pack_bb(
        &self,
        schema: &Schema,
        type_name: &str,
        bb: &mut ByteBufferMut,
    ) -> Result<(), WireError> {
        self.encode_bb(schema, lookup(schema, type_name)?, bb)
    }

    fn validate(&self, def: &TypeDef, schema: &Schema) -> Result<(), WireError> {
        self.encode_bb(schema, def, &mut ByteBufferMut::new())
    }

    fn kind_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Enum(_) => "enumeration",
            Value::Composite(_) => "composite",
            Value::FixedArray(_) => "fixed array",
            Value::VariableArray(_) => "variable array",
            Value::Group(..) => "group",
        }
    }

    fn decode_bb(
        schema: &'a Schema,
        def: &'a TypeDef,
        bb: &mut ByteBuffer,
    ) -> Result<Value<'a>, WireError> {
        match def {
            TypeDef::BuiltIn { .. } | TypeDef::Scalar(_) => {
                let builtin = def.as_builtin().ok_or_else(|| mismatch(def, "builtin"))?;
                let width = builtin.byte_length();
                match builtin.numeric() {
                    Numeric::Signed => Ok(Value::Integer(bb.read_int(width)? as i128)),
                    Numeric::Unsigned => Ok(Value::Integer(bb.read_uint(width)? as i128)),
                    Numeric::Float if width == 4 => {
                        let value = bb.read_f32()? as f64;
                        check_float32(def.name(), value)?;
                        Ok(Value::Float(value))
                    }
                    Numeric::Float => {
                        let value = bb.read_f64()?;
                        check_float64(def.name(), value)?;
                        Ok(Value::Float(value))
                    }
                }
            }

            TypeDef::Enumeration(t) => {
                let ordinal = bb.read_uint(t.tag_type().byte_length())?;
                match t.labels().get(ordinal as usize) {
                    Some(label) => Ok(Value::Enum(label.as_str())),
                    None => Err(WireError::InvalidEnumerationValue {
                        type_name: t.name().to_string(),
                        value:     ordinal,
                    }),
                }
            }

            TypeDef::Composite(t) => {
                let mut fields = Vec::with_capacity(t.fields().len());
                for field in t.fields() {
                    let value = Value::decode_bb(schema, lookup(schema, &field.type_name)?, bb)?;
                    fields.push((field.name.as_str(), value));
                }
                Ok(Value::Composite(fields))
            }

            TypeDef::FixedArray(t) => {
                let element = lookup(schema, t.element())?;
                let mut values = Vec::new();
                for _ in 0..t.count() {
                    values.push(Value::decode_bb(schema, element, bb)?);
                }
                Ok(Value::FixedArray(values))
            }

            TypeDef::VariableArray(t) => {
                let len = bb.read_uint(t.size_type().byte_length())?;
                if len > t.max() {
                    return Err(WireError::Length {
                        type_name: t.name().to_string(),
                        len,
                        limit: t.max(),
                    });
                }
                let element = lookup(schema, t.element())?;
                let mut values = Vec::with_capacity((len as usize).min(bb.remaining()));
                for _ in 0..len {
                    values.push(Value::decode_bb(schema, element, bb)?);
                }
                Ok(Value::VariableArray(values))
            }

            TypeDef::Group(t) => {
                let tag = bb.read_uint(t.tag_type().byte_length())?;
                let variant = match t.variants().get(tag as usize) {
                    Some(variant) => variant,
                    None => {
                        return Err(WireError::InvalidVariant {
                            type_name: t.name().to_string(),
                            value:     tag,
                        })
                    }
                };
                let payload = Value::decode_bb(schema, lookup(schema, &variant.type_name)?, bb)?;
                Ok(Value::Group(variant.name.as_str(), Box::new(payload)))
            }
        }
    }

    fn encode_bb(
        &self,
        schema: &Schema,
        def: &TypeDef,
        bb: &mut ByteBufferMut,
    ) -> Result<(), WireError> {
        match (def, self) {
            (TypeDef::BuiltIn { .. } | TypeDef::Scalar(_), _) => {
                let builtin = def.as_builtin().ok_or_else(|| mismatch(def, self.kind_name()))?;
                encode_builtin(builtin, def.name(), self, bb)
            }

            (TypeDef::Enumeration(t), Value::Enum(label)) => match t.ordinal(label) {
                Some(ordinal) => {
                    bb.write_uint(t.tag_type().byte_length(), ordinal as u64);
                    Ok(())
                }
                None => Err(WireError::UnknownLabel {
                    type_name: t.name().to_string(),
                    label:     label.to_string(),
                }),
            },

            (TypeDef::Composite(t), Value::Composite(fields)) => {
                let mut seen = HashSet::new();
                for (name, _) in fields {
                    if t.field(name).is_none() {
                        return Err(WireError::UnknownField {
                            type_name: t.name().to_string(),
                            field:     name.to_string(),
                        });
                    }
                    if !seen.insert(*name) {
                        return Err(WireError::DuplicateField {
                            type_name: t.name().to_string(),
                            field:     name.to_string(),
                        });
                    }
                }
                // Wire order is declaration order, whatever order the value holds
                for field in t.fields() {
                    let value = match fields.iter().find(|(n, _)| *n == field.name) {
                        Some((_, value)) => value,
                        None => {
                            return Err(WireError::MissingField {
                                type_name: t.name().to_string(),
                                field:     field.name.clone(),
                            })
                        }
                    };
                    value.encode_bb(schema, lookup(schema, &field.type_name)?, bb)?;
                }
                Ok(())
            }

            (TypeDef::FixedArray(t), Value::FixedArray(values)) => {
                if values.len() as u64 != t.count() {
                    return Err(WireError::Length {
                        type_name: t.name().to_string(),
                        len:       values.len() as u64,
                        limit:     t.count(),
                    });
                }
                let element = lookup(schema, t.element())?;
                for value in values {
                    value.encode_bb(schema, element, bb)?;
                }
                Ok(())
            }

            (TypeDef::VariableArray(t), Value::VariableArray(values)) => {
                if values.len() as u64 > t.max() {
                    return Err(WireError::Length {
                        type_name: t.name().to_string(),
                        len:       values.len() as u64,
                        limit:     t.max(),
                    });
                }
                bb.write_uint(t.size_type().byte_length(), values.len() as u64);
                let element = lookup(schema, t.element())?;
                for value in values {
                    value.encode_bb(schema, element, bb)?;
                }
                Ok(())
            }

            (TypeDef::Group(t), Value::Group(variant, payload)) => {
                let index = t.variant_index(variant).ok_or_else(|| WireError::UnknownLabel {
                    type_name: t.name().to_string(),
                    label:     variant.to_string(),
                })?;
                bb.write_uint(t.tag_type().byte_length(), index as u64);
                payload.encode_bb(schema, lookup(schema, &t.variants()[index].type_name)?, bb)
            }

            _ => Err(mismatch(def, self.kind_name())),
        }
    }
}

fn lookup<'s>(schema: &'s Schema, type_name: &str) -> Result<&'s TypeDef, WireError> {
    schema.get(type_name).ok_or_else(|| WireError::UnknownType(type_name.to_string()))
}

fn mismatch(def: &TypeDef, found: &'static str) -> WireError {
    WireError::TypeMismatch { type_name: def.name().to_string(), found }
}

fn check_float32(type_name: &str, value: f64) -> Result<(), WireError> {
    if value > -FLOAT32_LIMIT && value < FLOAT32_LIMIT {
        Ok(())
    } else {
        Err(WireError::Range { type_name: type_name.to_string(), value: value.to_string() })
    }
}

fn check_float64(type_name: &str, value: f64) -> Result<(), WireError> {
    if value.is_nan() {
        Err(WireError::Range { type_name: type_name.to_string(), value: value.to_string() })
    } else {
        Ok(())
    }
}

fn encode_builtin(
    builtin: BuiltIn,
    type_name: &str,
    value: &Value,
    bb: &mut ByteBufferMut,
) -> Result<(), WireError> {
    let width = builtin.byte_length();
    match (builtin.numeric(), value) {
        (Numeric::Signed | Numeric::Unsigned, Value::Integer(v)) => {
            let (min, max) = builtin.int_range().unwrap_or((0, 0));
            if *v < min || *v > max {
                return Err(WireError::Range {
                    type_name: type_name.to_string(),
                    value:     v.to_string(),
                });
            }
            bb.write_uint(width, *v as u64);
            Ok(())
        }
        (Numeric::Float, Value::Float(v)) if width == 4 => {
            check_float32(type_name, *v)?;
            bb.write_f32(*v as f32);
            Ok(())
        }
        (Numeric::Float, Value::Float(v)) => {
            check_float64(type_name, *v)?;
            bb.write_f64(*v);
            Ok(())
        }
        _ => Err(WireError::TypeMismatch {
            type_name: type_name.to_string(),
            found:     value.kind_name(),
        }),
    }
}

impl<'a> Index<usize> for Value<'a> {
    type Output = Value<'a>;

    /// A convenience method that adds support for `self[index]` expressions.
    /// It will panic if this value isn't an array or if the provided index is
    /// out of bounds.
    fn index(&self, index: usize) -> &Value<'a> {
        &self.as_slice()[index]
    }
}

impl<'a> fmt::Debug for Value<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        match *self {
            Value::Integer(value) => fmt::Debug::fmt(&value, f),
            Value::Float(value) => fmt::Debug::fmt(&value, f),
            Value::Enum(label) => write!(f, "{}", label),
            Value::FixedArray(ref values) | Value::VariableArray(ref values) => fmt::Debug::fmt(values, f),
            Value::Group(variant, ref payload) => write!(f, "{}({:?})", variant, payload),

            Value::Composite(ref fields) => {
                let mut first = true;
                write!(f, "{{")?;

                for (name, value) in fields {
                    if first {
                        first = false;
                    } else {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {:?}", name, value)?;
                }

                write!(f, "}}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Composite, Enumeration, Field, FixedArray, Group, Scalar, VariableArray};

    fn schema() -> Schema {
        Schema::new(
            "test1",
            "1.2.3",
            vec![
                Scalar::new("test1_int", BuiltIn::Int32).into(),
                Scalar::new("test1_byte", BuiltIn::UInt8).into(),
                Enumeration::new("test1_color", ["RED", "BLUE", "GREEN"]).unwrap().into(),
                Composite::new(
                    "test1_dot",
                    vec![
                        Field::new("color", "test1_color"),
                        Field::new("x", "test1_int"),
                        Field::new("y", "test1_int"),
                    ],
                )
                .unwrap()
                .into(),
                FixedArray::new("test1_tri", "test1_dot", 3).unwrap().into(),
                VariableArray::new("test1_byte_string", "test1_byte", 10, BuiltIn::UInt8)
                    .unwrap()
                    .into(),
                Group::new(
                    "test1_shape",
                    vec![Field::new("point", "test1_dot"), Field::new("label", "test1_byte_string")],
                )
                .unwrap()
                .into(),
            ],
        )
        .unwrap()
    }

    fn dot<'a>(schema: &'a Schema, color: &str, x: i32, y: i32) -> Value<'a> {
        Value::composite(
            schema,
            "test1_dot",
            [
                ("x", Value::integer(schema, "test1_int", x).unwrap()),
                ("y", Value::integer(schema, "test1_int", y).unwrap()),
                ("color", Value::enumeration(schema, "test1_color", color).unwrap()),
            ],
        )
        .unwrap()
    }

    #[test]
    fn integer_bounds_are_inclusive() {
        let schema = schema();
        let cases: [(&str, i128, i128); 8] = [
            ("int8", -128, 127),
            ("int16", -32768, 32767),
            ("int32", i32::MIN as i128, i32::MAX as i128),
            ("int64", i64::MIN as i128, i64::MAX as i128),
            ("uint8", 0, 255),
            ("uint16", 0, 0xFFFF),
            ("uint32", 0, u32::MAX as i128),
            ("uint64", 0, u64::MAX as i128),
        ];
        for (name, min, max) in cases {
            assert!(Value::integer(&schema, name, min).is_ok(), "{} min", name);
            assert!(Value::integer(&schema, name, max).is_ok(), "{} max", name);
            assert!(
                matches!(Value::integer(&schema, name, min - 1), Err(WireError::Range { .. })),
                "{} below",
                name
            );
            assert!(
                matches!(Value::integer(&schema, name, max + 1), Err(WireError::Range { .. })),
                "{} above",
                name
            );
        }
        let err = Value::integer(&schema, "uint8", 256).unwrap_err();
        assert!(err.to_string().starts_with("Out of range value"));
    }

    #[test]
    fn builtins_are_little_endian() {
        let schema = schema();
        let pack = |name: &str, v: i128| Value::integer(&schema, name, v).unwrap().pack(&schema, name).unwrap();
        assert_eq!(pack("uint16", 0xABCD), [0xCD, 0xAB]);
        assert_eq!(pack("uint32", 0xDEAD_BEEF), [0xEF, 0xBE, 0xAD, 0xDE]);
        assert_eq!(
            pack("uint64", 0xCAFE_BABE_DEAD_BEEF),
            [0xEF, 0xBE, 0xAD, 0xDE, 0xBE, 0xBA, 0xFE, 0xCA]
        );
        assert_eq!(pack("int8", -42), [0xD6]);
        assert_eq!(pack("int16", -42), [0xD6, 0xFF]);
        assert_eq!(pack("int32", 0xDEADBEE), [0xEE, 0xDB, 0xEA, 0x0D]);
    }

    #[test]
    fn builtins_round_trip() {
        let schema = schema();
        for (name, v) in [("int8", -128i128), ("int64", i64::MIN as i128), ("uint64", u64::MAX as i128), ("test1_int", -200)] {
            let value = Value::integer(&schema, name, v).unwrap();
            let bytes = value.pack(&schema, name).unwrap();
            assert_eq!(Value::unpack(&schema, name, &bytes), Ok(value));
        }
        for v in [-123.456, 3001.4001, 42.424242] {
            for name in ["float32", "float64"] {
                let value = Value::float(&schema, name, v).unwrap();
                let bytes = value.pack(&schema, name).unwrap();
                assert_eq!(bytes.len(), if name == "float32" { 4 } else { 8 });
                assert_eq!(Value::unpack(&schema, name, &bytes), Ok(value));
            }
        }
    }

    #[test]
    fn float32_rejects_values_outside_single_precision() {
        let schema = schema();
        for v in [-3.402823466e38, 3.402823466e38, f64::NAN, f64::INFINITY] {
            assert!(matches!(Value::float(&schema, "float32", v), Err(WireError::Range { .. })));
        }
        assert!(Value::float(&schema, "float64", -3.402823466e38).is_ok());
        assert!(Value::float(&schema, "float64", 3.402823466e38).is_ok());
        assert!(matches!(
            Value::Float(1e39).pack(&schema, "float32"),
            Err(WireError::Range { .. })
        ));
        // 0x7F800000 is +inf, which a float32 value can never hold
        assert!(matches!(
            Value::unpack(&schema, "float32", &[0, 0, 0x80, 0x7F]),
            Err(WireError::Range { .. })
        ));
    }

    #[test]
    fn float64_rejects_nan() {
        let schema = schema();
        assert!(matches!(Value::float(&schema, "float64", f64::NAN), Err(WireError::Range { .. })));
        assert!(matches!(Value::Float(f64::NAN).pack(&schema, "float64"), Err(WireError::Range { .. })));
        assert!(matches!(
            Value::unpack(&schema, "float64", &f64::NAN.to_le_bytes()),
            Err(WireError::Range { .. })
        ));

        for v in [f64::INFINITY, f64::MIN_POSITIVE, -0.0] {
            let value = Value::float(&schema, "float64", v).unwrap();
            let bytes = value.pack(&schema, "float64").unwrap();
            assert_eq!(Value::unpack(&schema, "float64", &bytes), Ok(value));
        }
    }

    #[test]
    fn enumeration_packs_ordinal() {
        let schema = schema();
        let green = Value::enumeration(&schema, "test1_color", "GREEN").unwrap();
        assert_eq!(green.pack(&schema, "test1_color"), Ok(vec![2]));
        assert_eq!(Value::unpack(&schema, "test1_color", &[2]), Ok(green));
        assert_eq!(
            Value::unpack(&schema, "test1_color", &[3]),
            Err(WireError::InvalidEnumerationValue { type_name: "test1_color".into(), value: 3 })
        );
        assert!(matches!(
            Value::enumeration(&schema, "test1_color", "PURPLE"),
            Err(WireError::UnknownLabel { .. })
        ));
    }

    #[test]
    fn composite_packs_in_declaration_order() {
        let schema = schema();
        let loc = dot(&schema, "BLUE", 100, 200);
        assert_eq!(format!("{:?}", loc), "{color: BLUE, x: 100, y: 200}");

        let mut expected = Value::Enum("BLUE").pack(&schema, "test1_color").unwrap();
        expected.extend(Value::Integer(100).pack(&schema, "test1_int").unwrap());
        expected.extend(Value::Integer(200).pack(&schema, "test1_int").unwrap());
        assert_eq!(loc.pack(&schema, "test1_dot").unwrap(), expected);

        // Hand-built values in any order encode the same way
        let shuffled = Value::Composite(vec![
            ("y", Value::Integer(200)),
            ("color", Value::Enum("BLUE")),
            ("x", Value::Integer(100)),
        ]);
        assert_eq!(shuffled.pack(&schema, "test1_dot").unwrap(), expected);

        let back = Value::unpack(&schema, "test1_dot", &expected).unwrap();
        assert_eq!(back, loc);
        assert_eq!(back.get("color"), Some(&Value::Enum("BLUE")));
    }

    #[test]
    fn composite_requires_the_declared_field_set() {
        let schema = schema();
        let x = || Value::Integer(1);
        assert_eq!(
            Value::composite(&schema, "test1_dot", [("x", x()), ("y", x())]),
            Err(WireError::MissingField { type_name: "test1_dot".into(), field: "color".into() })
        );
        assert!(matches!(
            Value::composite(&schema, "test1_dot", [("x", x()), ("z", x())]),
            Err(WireError::UnknownField { .. })
        ));
        assert!(matches!(
            Value::composite(&schema, "test1_dot", [("x", x()), ("x", x())]),
            Err(WireError::DuplicateField { .. })
        ));
        assert!(matches!(
            Value::composite(
                &schema,
                "test1_dot",
                [("x", Value::Integer(1i128 << 40)), ("y", x()), ("color", Value::Enum("RED"))]
            ),
            Err(WireError::Range { .. })
        ));
    }

    #[test]
    fn fixed_array_round_trips_element_for_element() {
        let schema = schema();
        let tri = Value::fixed_array(
            &schema,
            "test1_tri",
            vec![dot(&schema, "RED", 10, 20), dot(&schema, "GREEN", 30, 40), dot(&schema, "BLUE", 50, 60)],
        )
        .unwrap();
        let bytes = tri.pack(&schema, "test1_tri").unwrap();
        assert_eq!(bytes.len(), 27);
        assert_eq!(Value::unpack(&schema, "test1_tri", &bytes), Ok(tri));

        assert!(matches!(
            Value::unpack(&schema, "test1_tri", &bytes[..26]),
            Err(WireError::TruncatedBuffer { .. })
        ));
        assert!(matches!(
            Value::fixed_array(&schema, "test1_tri", vec![dot(&schema, "RED", 1, 2)]),
            Err(WireError::Length { len: 1, limit: 3, .. })
        ));
    }

    #[test]
    fn variable_array_prefixes_its_length() {
        let schema = schema();
        let bytes_of = |text: &'static str| {
            text.bytes()
                .map(|b| Value::integer(&schema, "test1_byte", b).unwrap())
                .collect::<Vec<_>>()
        };

        let hello = Value::variable_array(&schema, "test1_byte_string", bytes_of("hello")).unwrap();
        let packed = hello.pack(&schema, "test1_byte_string").unwrap();
        assert_eq!(packed, [5, 104, 101, 108, 108, 111]);
        assert_eq!(Value::unpack(&schema, "test1_byte_string", &packed), Ok(hello));

        let err = Value::variable_array(&schema, "test1_byte_string", bytes_of("0123456789_"))
            .unwrap_err();
        assert_eq!(
            err,
            WireError::Length { type_name: "test1_byte_string".into(), len: 11, limit: 10 }
        );
        assert!(err.to_string().to_lowercase().contains("invalid length"));

        assert!(matches!(
            Value::unpack(&schema, "test1_byte_string", &[11, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]),
            Err(WireError::Length { len: 11, .. })
        ));
        assert!(matches!(
            Value::unpack(&schema, "test1_byte_string", &[3, 1, 2]),
            Err(WireError::TruncatedBuffer { .. })
        ));
    }

    #[test]
    fn group_packs_discriminant_then_payload() {
        let schema = schema();
        let point = Value::group(&schema, "test1_shape", "point", dot(&schema, "RED", 1, 2)).unwrap();
        let bytes = point.pack(&schema, "test1_shape").unwrap();
        assert_eq!(bytes, [0, 0, 1, 0, 0, 0, 2, 0, 0, 0]);
        assert_eq!(Value::unpack(&schema, "test1_shape", &bytes), Ok(point));

        let label = Value::group(
            &schema,
            "test1_shape",
            "label",
            Value::VariableArray(vec![Value::Integer(7)]),
        )
        .unwrap();
        assert_eq!(label.pack(&schema, "test1_shape"), Ok(vec![1, 1, 7]));

        assert_eq!(
            Value::unpack(&schema, "test1_shape", &[2]),
            Err(WireError::InvalidVariant { type_name: "test1_shape".into(), value: 2 })
        );
        assert!(matches!(
            Value::group(&schema, "test1_shape", "point", Value::Integer(1)),
            Err(WireError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn unpack_rejects_trailing_bytes() {
        let schema = schema();
        assert_eq!(
            Value::unpack(&schema, "uint8", &[1, 2]),
            Err(WireError::TrailingBytes { type_name: "uint8".into(), remaining: 1 })
        );
        let mut bb = ByteBuffer::new(&[1, 2]);
        assert_eq!(Value::unpack_bb(&schema, "uint8", &mut bb), Ok(Value::Integer(1)));
        assert_eq!(bb.remaining(), 1);
    }

    #[test]
    fn unknown_types_are_reported() {
        let schema = schema();
        assert_eq!(
            Value::Integer(1).pack(&schema, "nope"),
            Err(WireError::UnknownType("nope".into()))
        );
    }
}
