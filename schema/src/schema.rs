use crate::{
    builtin::{BuiltIn, BUILTINS},
    error::SchemaError,
    resolver::resolve,
    types::{EncodedSize, TypeDef},
};
use semver::Version;
use serde::{Serialize, Serializer};
use std::collections::HashMap;

/// A named, versioned, validated and acyclic set of type definitions.
///
/// The builtins are always present, ahead of the declared types, under their
/// reserved names. A `Schema` can only be obtained through [`Schema::new`],
/// so every reference resolves and the reference graph has no cycles.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    name:    String,
    version: Version,
    defs:    Vec<TypeDef>,
    index:   HashMap<String, usize>,
    order:   Vec<usize>,
}

impl Schema {
    pub fn new(
        name: impl Into<String>,
        version: &str,
        types: Vec<TypeDef>,
    ) -> Result<Schema, SchemaError> {
        let name = name.into();
        if !is_identifier(&name) {
            return Err(SchemaError::InvalidName(name));
        }
        let version = Version::parse(version).map_err(|e| SchemaError::InvalidVersion {
            version: version.to_string(),
            reason:  e.to_string(),
        })?;

        let mut defs: Vec<TypeDef> = BUILTINS.iter().map(|&b| TypeDef::from(b)).collect();
        let mut index: HashMap<String, usize> =
            defs.iter().enumerate().map(|(i, d)| (d.name().to_string(), i)).collect();

        // 1) Names: identifiers, not reserved, not defined twice
        for def in types {
            if let TypeDef::BuiltIn { .. } = def {
                return Err(SchemaError::ReservedName(def.name().to_string()));
            }
            if !is_identifier(def.name()) {
                return Err(SchemaError::InvalidName(def.name().to_string()));
            }
            if BuiltIn::from_name(def.name()).is_some() {
                return Err(SchemaError::ReservedName(def.name().to_string()));
            }
            if index.contains_key(def.name()) {
                return Err(SchemaError::DuplicateType(def.name().to_string()));
            }
            index.insert(def.name().to_string(), defs.len());
            defs.push(def);
        }

        // 2) Every reference resolves
        for def in &defs {
            for referenced in def.references() {
                if !index.contains_key(referenced) {
                    return Err(SchemaError::UnknownType {
                        referenced: referenced.to_string(),
                        by:         def.name().to_string(),
                    });
                }
            }
        }

        // 3) No type contains itself
        let order = resolve(&defs, &index)?;

        Ok(Schema { name, version, defs, index, order })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn get(&self, name: &str) -> Option<&TypeDef> {
        self.index.get(name).map(|&i| &self.defs[i])
    }

    /// Declared types, builtins excluded, in declaration order.
    pub fn declared(&self) -> impl Iterator<Item = &TypeDef> {
        self.defs.iter().skip(BUILTINS.len())
    }

    /// All types, builtins included, each after everything it references.
    pub fn ordered(&self) -> impl Iterator<Item = &TypeDef> {
        self.order.iter().map(move |&i| &self.defs[i])
    }

    /// Fixed byte length, or `Variable` for anything holding a variable
    /// array or a group.
    pub fn encoded_size(&self, def: &TypeDef) -> EncodedSize {
        let fixed = |name: &str| match self.get(name) {
            Some(def) => self.encoded_size(def),
            None => EncodedSize::Variable,
        };
        match def {
            TypeDef::BuiltIn { .. } | TypeDef::Scalar(_) => EncodedSize::Fixed(
                def.as_builtin().map(|b| b.byte_length() as u64).unwrap_or_default(),
            ),
            TypeDef::Enumeration(t) => EncodedSize::Fixed(t.tag_type().byte_length() as u64),
            TypeDef::Composite(t) => {
                let mut total = 0u64;
                for field in t.fields() {
                    match fixed(&field.type_name) {
                        EncodedSize::Fixed(n) => total = total.saturating_add(n),
                        EncodedSize::Variable => return EncodedSize::Variable,
                    }
                }
                EncodedSize::Fixed(total)
            }
            TypeDef::FixedArray(t) => match fixed(t.element()) {
                EncodedSize::Fixed(n) => EncodedSize::Fixed(n.saturating_mul(t.count())),
                EncodedSize::Variable => EncodedSize::Variable,
            },
            TypeDef::VariableArray(_) | TypeDef::Group(_) => EncodedSize::Variable,
        }
    }

    /// Upper bound on the encoded length of any value of `def`.
    pub fn max_encoded_len(&self, def: &TypeDef) -> u64 {
        let max_of = |name: &str| self.get(name).map(|d| self.max_encoded_len(d)).unwrap_or(0);
        match def {
            TypeDef::BuiltIn { .. } | TypeDef::Scalar(_) => {
                def.as_builtin().map(|b| b.byte_length() as u64).unwrap_or_default()
            }
            TypeDef::Enumeration(t) => t.tag_type().byte_length() as u64,
            TypeDef::Composite(t) => t
                .fields()
                .iter()
                .fold(0u64, |acc, f| acc.saturating_add(max_of(&f.type_name))),
            TypeDef::FixedArray(t) => max_of(t.element()).saturating_mul(t.count()),
            TypeDef::VariableArray(t) => (t.size_type().byte_length() as u64)
                .saturating_add(max_of(t.element()).saturating_mul(t.max())),
            TypeDef::Group(t) => {
                let payload = t.variants().iter().map(|v| max_of(&v.type_name)).max();
                (t.tag_type().byte_length() as u64).saturating_add(payload.unwrap_or(0))
            }
        }
    }
}

impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Described<'a> {
            name:    &'a str,
            version: &'a Version,
            types:   Vec<&'a TypeDef>,
        }

        Described {
            name:    &self.name,
            version: &self.version,
            types:   self.declared().collect(),
        }
        .serialize(serializer)
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Composite, Enumeration, Field, FixedArray, Group, Scalar, VariableArray};

    fn test1() -> Schema {
        Schema::new(
            "test1",
            "1.2.3",
            vec![
                Scalar::new("test1_int", BuiltIn::Int32).into(),
                Scalar::new("test1_byte", BuiltIn::UInt8).into(),
                Enumeration::new("test1_color", ["red", "blue", "green"]).unwrap().into(),
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
            ],
        )
        .unwrap()
    }

    #[test]
    fn builtins_are_implicit() {
        let schema = test1();
        assert_eq!(schema.get("uint16"), Some(&TypeDef::from(BuiltIn::UInt16)));
        assert_eq!(schema.declared().count(), 6);
        assert_eq!(schema.ordered().count(), 16);
        assert_eq!(schema.version().to_string(), "1.2.3");
    }

    #[test]
    fn ordered_places_dependencies_first() {
        let schema = test1();
        let order: Vec<&str> = schema.ordered().map(|d| d.name()).collect();
        let pos = |name: &str| order.iter().position(|n| *n == name).unwrap();
        assert!(pos("int32") < pos("test1_int"));
        assert!(pos("test1_color") < pos("test1_dot"));
        assert!(pos("test1_int") < pos("test1_dot"));
        assert!(pos("test1_dot") < pos("test1_tri"));
        assert!(pos("test1_byte") < pos("test1_byte_string"));
    }

    #[test]
    fn encoded_size_propagates() {
        let schema = test1();
        let size = |name: &str| schema.encoded_size(schema.get(name).unwrap());
        assert_eq!(size("test1_int"), EncodedSize::Fixed(4));
        assert_eq!(size("test1_color"), EncodedSize::Fixed(1));
        assert_eq!(size("test1_dot"), EncodedSize::Fixed(9));
        assert_eq!(size("test1_tri"), EncodedSize::Fixed(27));
        assert_eq!(size("test1_byte_string"), EncodedSize::Variable);
    }

    #[test]
    fn max_encoded_len_bounds_variable_types() {
        let schema = test1();
        let max = |name: &str| schema.max_encoded_len(schema.get(name).unwrap());
        assert_eq!(max("test1_tri"), 27);
        assert_eq!(max("test1_byte_string"), 11);
    }

    #[test]
    fn rejects_unknown_references() {
        let err = Schema::new(
            "s",
            "1.0.0",
            vec![FixedArray::new("tri", "dot", 3).unwrap().into()],
        )
        .unwrap_err();
        assert_eq!(err, SchemaError::UnknownType { referenced: "dot".into(), by: "tri".into() });
    }

    #[test]
    fn rejects_duplicate_and_reserved_names() {
        let dup = Schema::new(
            "s",
            "1.0.0",
            vec![Scalar::new("a", BuiltIn::Int8).into(), Scalar::new("a", BuiltIn::Int16).into()],
        );
        assert_eq!(dup, Err(SchemaError::DuplicateType("a".into())));

        let reserved = Schema::new("s", "1.0.0", vec![Scalar::new("uint8", BuiltIn::Int8).into()]);
        assert_eq!(reserved, Err(SchemaError::ReservedName("uint8".into())));
    }

    #[test]
    fn rejects_cycles() {
        let err = Schema::new(
            "s",
            "1.0.0",
            vec![
                Composite::new("a", vec![Field::new("b", "b")]).unwrap().into(),
                Group::new("b", vec![Field::new("a", "a")]).unwrap().into(),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::Cyclic { .. }));
    }

    #[test]
    fn rejects_bad_versions() {
        assert!(matches!(
            Schema::new("s", "1.2", vec![]),
            Err(SchemaError::InvalidVersion { .. })
        ));
        assert_eq!(Schema::new("9s", "1.2.0", vec![]), Err(SchemaError::InvalidName("9s".into())));
    }
}
