use crate::{builtin::BuiltIn, error::SchemaError};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// Registry key for everything that can be declared in a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    BuiltIn,
    Scalar,
    Enumeration,
    Composite,
    FixedArray,
    VariableArray,
    Group,
}

pub const TYPE_KINDS: [TypeKind; 7] = [
    TypeKind::BuiltIn,
    TypeKind::Scalar,
    TypeKind::Enumeration,
    TypeKind::Composite,
    TypeKind::FixedArray,
    TypeKind::VariableArray,
    TypeKind::Group,
];

impl TypeKind {
    pub fn name(self) -> &'static str {
        match self {
            TypeKind::BuiltIn => "builtin",
            TypeKind::Scalar => "scalar",
            TypeKind::Enumeration => "enumeration",
            TypeKind::Composite => "composite",
            TypeKind::FixedArray => "fixed_array",
            TypeKind::VariableArray => "variable_array",
            TypeKind::Group => "group",
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Encoded-size characteristic of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodedSize {
    Fixed(u64),
    Variable,
}

impl EncodedSize {
    pub fn is_fixed(self) -> bool {
        matches!(self, EncodedSize::Fixed(_))
    }
}

/// A named alias of a builtin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scalar {
    name:    String,
    builtin: BuiltIn,
}

impl Scalar {
    pub fn new(name: impl Into<String>, builtin: BuiltIn) -> Scalar {
        Scalar { name: name.into(), builtin }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn builtin(&self) -> BuiltIn {
        self.builtin
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Enumeration {
    name:   String,
    labels: Vec<String>,
}

impl Enumeration {
    pub fn new<S: Into<String>>(
        name: impl Into<String>,
        labels: impl IntoIterator<Item = S>,
    ) -> Result<Enumeration, SchemaError> {
        let name = name.into();
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        if labels.is_empty() {
            return Err(SchemaError::Empty(name));
        }
        check_unique(&name, labels.iter().map(String::as_str))?;
        Ok(Enumeration { name, labels })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn ordinal(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    /// Unsigned builtin wide enough for `count(labels) - 1`.
    pub fn tag_type(&self) -> BuiltIn {
        BuiltIn::smallest_unsigned_for(self.labels.len() as u64 - 1)
    }
}

/// A named reference to another type. Used for composite fields and group variants.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub name:      String,
    pub type_name: String,
}

impl Field {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Field {
        Field { name: name.into(), type_name: type_name.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Composite {
    name:   String,
    fields: Vec<Field>,
}

impl Composite {
    /// Field order here is the wire order.
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> Result<Composite, SchemaError> {
        let name = name.into();
        check_unique(&name, fields.iter().map(|f| f.name.as_str()))?;
        Ok(Composite { name, fields })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FixedArray {
    name:    String,
    element: String,
    count:   u64,
}

impl FixedArray {
    pub fn new(
        name: impl Into<String>,
        element: impl Into<String>,
        count: u64,
    ) -> Result<FixedArray, SchemaError> {
        let name = name.into();
        if count == 0 {
            return Err(SchemaError::NonPositiveSize(name));
        }
        Ok(FixedArray { name, element: element.into(), count })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn element(&self) -> &str {
        &self.element
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableArray {
    name:      String,
    element:   String,
    max:       u64,
    size_type: BuiltIn,
}

impl VariableArray {
    pub fn new(
        name: impl Into<String>,
        element: impl Into<String>,
        max: u64,
        size_type: BuiltIn,
    ) -> Result<VariableArray, SchemaError> {
        let name = name.into();
        if max == 0 {
            return Err(SchemaError::NonPositiveSize(name));
        }
        let limit = match size_type.unsigned_max() {
            Some(limit) => limit,
            None => {
                return Err(SchemaError::InvalidSizeType {
                    type_name: name,
                    size_type: size_type.name().to_string(),
                })
            }
        };
        if max > limit {
            return Err(SchemaError::SizeTypeOverflow {
                type_name: name,
                max,
                size_type: size_type.name().to_string(),
            });
        }
        Ok(VariableArray { name, element: element.into(), max, size_type })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn element(&self) -> &str {
        &self.element
    }

    pub fn max(&self) -> u64 {
        self.max
    }

    pub fn size_type(&self) -> BuiltIn {
        self.size_type
    }
}

/// Tagged union: a discriminant followed by the active variant's payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    name:     String,
    variants: Vec<Field>,
}

impl Group {
    pub fn new(name: impl Into<String>, variants: Vec<Field>) -> Result<Group, SchemaError> {
        let name = name.into();
        if variants.is_empty() {
            return Err(SchemaError::Empty(name));
        }
        check_unique(&name, variants.iter().map(|v| v.name.as_str()))?;
        Ok(Group { name, variants })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variants(&self) -> &[Field] {
        &self.variants
    }

    pub fn variant_index(&self, label: &str) -> Option<usize> {
        self.variants.iter().position(|v| v.name == label)
    }

    /// Unsigned builtin wide enough to index every variant.
    pub fn tag_type(&self) -> BuiltIn {
        BuiltIn::smallest_unsigned_for(self.variants.len() as u64 - 1)
    }
}

/// One declared type. Other types are referenced by name only.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeDef {
    BuiltIn { builtin: BuiltIn },
    Scalar(Scalar),
    Enumeration(Enumeration),
    Composite(Composite),
    FixedArray(FixedArray),
    VariableArray(VariableArray),
    Group(Group),
}

impl TypeDef {
    pub fn name(&self) -> &str {
        match self {
            TypeDef::BuiltIn { builtin } => builtin.name(),
            TypeDef::Scalar(t) => t.name(),
            TypeDef::Enumeration(t) => t.name(),
            TypeDef::Composite(t) => t.name(),
            TypeDef::FixedArray(t) => t.name(),
            TypeDef::VariableArray(t) => t.name(),
            TypeDef::Group(t) => t.name(),
        }
    }

    pub fn kind(&self) -> TypeKind {
        match self {
            TypeDef::BuiltIn { .. } => TypeKind::BuiltIn,
            TypeDef::Scalar(_) => TypeKind::Scalar,
            TypeDef::Enumeration(_) => TypeKind::Enumeration,
            TypeDef::Composite(_) => TypeKind::Composite,
            TypeDef::FixedArray(_) => TypeKind::FixedArray,
            TypeDef::VariableArray(_) => TypeKind::VariableArray,
            TypeDef::Group(_) => TypeKind::Group,
        }
    }

    /// Names of the types this definition depends on, in declaration order.
    pub fn references(&self) -> Vec<&str> {
        match self {
            TypeDef::BuiltIn { .. } | TypeDef::Enumeration(_) => vec![],
            TypeDef::Scalar(t) => vec![t.builtin().name()],
            TypeDef::Composite(t) => t.fields().iter().map(|f| f.type_name.as_str()).collect(),
            TypeDef::FixedArray(t) => vec![t.element()],
            TypeDef::VariableArray(t) => vec![t.size_type().name(), t.element()],
            TypeDef::Group(t) => t.variants().iter().map(|v| v.type_name.as_str()).collect(),
        }
    }

    /// The builtin that encodes this type, for builtins and scalars.
    pub fn as_builtin(&self) -> Option<BuiltIn> {
        match self {
            TypeDef::BuiltIn { builtin } => Some(*builtin),
            TypeDef::Scalar(t) => Some(t.builtin()),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            TypeDef::Scalar(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_enumeration(&self) -> Option<&Enumeration> {
        match self {
            TypeDef::Enumeration(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_composite(&self) -> Option<&Composite> {
        match self {
            TypeDef::Composite(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_fixed_array(&self) -> Option<&FixedArray> {
        match self {
            TypeDef::FixedArray(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_variable_array(&self) -> Option<&VariableArray> {
        match self {
            TypeDef::VariableArray(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&Group> {
        match self {
            TypeDef::Group(t) => Some(t),
            _ => None,
        }
    }
}

impl From<BuiltIn> for TypeDef {
    fn from(builtin: BuiltIn) -> TypeDef {
        TypeDef::BuiltIn { builtin }
    }
}

impl From<Scalar> for TypeDef {
    fn from(t: Scalar) -> TypeDef {
        TypeDef::Scalar(t)
    }
}

impl From<Enumeration> for TypeDef {
    fn from(t: Enumeration) -> TypeDef {
        TypeDef::Enumeration(t)
    }
}

impl From<Composite> for TypeDef {
    fn from(t: Composite) -> TypeDef {
        TypeDef::Composite(t)
    }
}

impl From<FixedArray> for TypeDef {
    fn from(t: FixedArray) -> TypeDef {
        TypeDef::FixedArray(t)
    }
}

impl From<VariableArray> for TypeDef {
    fn from(t: VariableArray) -> TypeDef {
        TypeDef::VariableArray(t)
    }
}

impl From<Group> for TypeDef {
    fn from(t: Group) -> TypeDef {
        TypeDef::Group(t)
    }
}

fn check_unique<'a>(
    type_name: &str,
    names: impl Iterator<Item = &'a str>,
) -> Result<(), SchemaError> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(SchemaError::DuplicateName {
                type_name: type_name.to_string(),
                name:      name.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enumeration_rejects_duplicate_labels() {
        let err = Enumeration::new("color", ["red", "blue", "red"]).unwrap_err();
        assert_eq!(
            err,
            SchemaError::DuplicateName { type_name: "color".into(), name: "red".into() }
        );
        assert_eq!(Enumeration::new("nothing", Vec::<String>::new()), Err(SchemaError::Empty("nothing".into())));
    }

    #[test]
    fn enumeration_tag_width_tracks_label_count() {
        let small = Enumeration::new("small", (0..256).map(|i| format!("l{}", i))).unwrap();
        assert_eq!(small.tag_type(), BuiltIn::UInt8);
        let wide = Enumeration::new("wide", (0..257).map(|i| format!("l{}", i))).unwrap();
        assert_eq!(wide.tag_type(), BuiltIn::UInt16);
    }

    #[test]
    fn composite_rejects_duplicate_fields() {
        let err = Composite::new(
            "dot",
            vec![Field::new("x", "int32"), Field::new("x", "int32")],
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateName { .. }));
    }

    #[test]
    fn arrays_reject_non_positive_sizes() {
        assert_eq!(
            FixedArray::new("tri", "dot", 0),
            Err(SchemaError::NonPositiveSize("tri".into()))
        );
        assert_eq!(
            VariableArray::new("bytes", "uint8", 0, BuiltIn::UInt8),
            Err(SchemaError::NonPositiveSize("bytes".into()))
        );
    }

    #[test]
    fn variable_array_max_must_fit_size_type() {
        assert!(VariableArray::new("bytes", "uint8", 255, BuiltIn::UInt8).is_ok());
        assert!(matches!(
            VariableArray::new("bytes", "uint8", 256, BuiltIn::UInt8),
            Err(SchemaError::SizeTypeOverflow { max: 256, .. })
        ));
        assert!(matches!(
            VariableArray::new("bytes", "uint8", 10, BuiltIn::Int8),
            Err(SchemaError::InvalidSizeType { .. })
        ));
    }

    #[test]
    fn group_tag_and_references() {
        let group = Group::new(
            "shape",
            vec![Field::new("circle", "int32"), Field::new("dot", "dot")],
        )
        .unwrap();
        assert_eq!(group.tag_type(), BuiltIn::UInt8);
        assert_eq!(group.variant_index("dot"), Some(1));
        assert_eq!(TypeDef::from(group).references(), vec!["int32", "dot"]);
    }
}
