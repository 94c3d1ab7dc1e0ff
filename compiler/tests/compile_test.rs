#![cfg(test)]

use brine_wire_compiler::{compile_schema, CompileError};
use brine_wire_schema::{BuiltIn, EncodedSize, SchemaError, TypeKind};

#[test]
fn test_compile_schema() {
    let input = r#"
    // Shapes shared by every service
    schema shapes 1.4.0-beta.1;

    scalar coord int16;

    enumeration color {
      RED;
      GREEN;
      BLUE;
    }

    composite point {
      color color;
      coord x;
      coord y;
    }

    fixed_array triangle point[3];
    variable_array polygon point[300] uint16;

    group shape {
      triangle triangle;
      polygon polygon;
    }
    "#;

    let schema = compile_schema(input).expect("compile_schema failed");

    assert_eq!(schema.name(), "shapes");
    assert_eq!(schema.version().to_string(), "1.4.0-beta.1");

    let declared: Vec<&str> = schema.declared().map(|d| d.name()).collect();
    assert_eq!(declared, ["coord", "color", "point", "triangle", "polygon", "shape"]);

    // Check scalar coord
    let coord = schema.get("coord").unwrap().as_scalar().unwrap();
    assert_eq!(coord.builtin(), BuiltIn::Int16);

    // Check enumeration color
    let color = schema.get("color").unwrap().as_enumeration().unwrap();
    assert_eq!(color.labels(), ["RED", "GREEN", "BLUE"]);
    assert_eq!(color.ordinal("BLUE"), Some(2));
    assert_eq!(color.tag_type(), BuiltIn::UInt8);

    // Check composite point keeps declaration order
    let point = schema.get("point").unwrap().as_composite().unwrap();
    let fields: Vec<(&str, &str)> =
        point.fields().iter().map(|f| (f.name.as_str(), f.type_name.as_str())).collect();
    assert_eq!(fields, [("color", "color"), ("x", "coord"), ("y", "coord")]);
    assert_eq!(schema.encoded_size(schema.get("point").unwrap()), EncodedSize::Fixed(5));

    // Check arrays
    let triangle = schema.get("triangle").unwrap().as_fixed_array().unwrap();
    assert_eq!((triangle.element(), triangle.count()), ("point", 3));
    let polygon = schema.get("polygon").unwrap().as_variable_array().unwrap();
    assert_eq!((polygon.element(), polygon.max(), polygon.size_type()), ("point", 300, BuiltIn::UInt16));
    assert_eq!(schema.max_encoded_len(schema.get("polygon").unwrap()), 2 + 300 * 5);

    // Check group shape
    let shape = schema.get("shape").unwrap();
    assert_eq!(shape.kind(), TypeKind::Group);
    assert_eq!(shape.as_group().unwrap().variant_index("polygon"), Some(1));
    assert_eq!(schema.encoded_size(shape), EncodedSize::Variable);
}

#[test]
fn test_dependency_order() {
    let schema = compile_schema(
        "schema s 1.0.0;
         composite line { dot a; dot b; }
         composite dot { meters x; meters y; }
         scalar meters float32;",
    )
    .unwrap();

    let position = |name: &str| schema.ordered().position(|d| d.name() == name).unwrap();
    assert!(position("float32") < position("meters"));
    assert!(position("meters") < position("dot"));
    assert!(position("dot") < position("line"));

    // Declaration order is still available
    let declared: Vec<&str> = schema.declared().map(|d| d.name()).collect();
    assert_eq!(declared, ["line", "dot", "meters"]);
}

#[test]
fn test_parse_errors() {
    let cases = [
        ("scalar x int8;", "Expected \"schema\" but found \"scalar\"", 1, 1),
        ("schema s 1.0.0;\nscalar x string;", "Expected builtin type but found \"string\"", 2, 10),
        ("schema s 1.0.0;\ncomposite p { int8 x }", "Expected \";\" but found \"}\"", 2, 22),
        ("schema s 1.0.0;\nfixed_array f int8[];", "Expected integer but found \"]\"", 2, 20),
        ("schema s 1.0.0;\nmessage m {}", "Unexpected token \"message\"", 2, 1),
    ];

    for (input, msg, line, column) in cases {
        match compile_schema(input) {
            Err(CompileError::ParseError { msg: m, line: l, column: c }) => {
                assert_eq!((m.as_str(), l, c), (msg, line, column), "{}", input);
            }
            other => panic!("expected a parse error for {:?}, got {:?}", input, other),
        }
    }
}

#[test]
fn test_schema_errors() {
    let cases = [
        (
            "schema s 1.0.0; scalar a int8; scalar a int16;",
            SchemaError::DuplicateType("a".into()),
        ),
        (
            "schema s 1.0.0; scalar uint8 int8;",
            SchemaError::ReservedName("uint8".into()),
        ),
        (
            "schema s 1.0.0; composite p { coord x; }",
            SchemaError::UnknownType { referenced: "coord".into(), by: "p".into() },
        ),
        (
            "schema s 1.0.0; enumeration e { A; A; }",
            SchemaError::DuplicateName { type_name: "e".into(), name: "A".into() },
        ),
        (
            "schema s 1.0.0; fixed_array f int8[0];",
            SchemaError::NonPositiveSize("f".into()),
        ),
        (
            "schema s 1.0.0; variable_array v int8[256] uint8;",
            SchemaError::SizeTypeOverflow { type_name: "v".into(), max: 256, size_type: "uint8".into() },
        ),
        (
            "schema s 1.0.0; variable_array v int8[4] int16;",
            SchemaError::InvalidSizeType { type_name: "v".into(), size_type: "int16".into() },
        ),
    ];

    for (input, expected) in cases {
        match compile_schema(input) {
            Err(CompileError::Schema(err)) => assert_eq!(err, expected, "{}", input),
            other => panic!("expected a schema error for {:?}, got {:?}", input, other),
        }
    }
}

#[test]
fn test_bad_version() {
    let err = compile_schema("schema s 1.0;").unwrap_err();
    // `1.0` tokenizes as a version but is not valid semver
    assert!(matches!(err, CompileError::Schema(SchemaError::InvalidVersion { .. })), "{:?}", err);
}

#[test]
fn test_cyclic_schema() {
    let err = compile_schema(
        "schema s 1.0.0;
         composite a { b next; }
         composite b { list items; }
         variable_array list a[4] uint8;",
    )
    .unwrap_err();

    match err {
        CompileError::Schema(SchemaError::Cyclic { cycle }) => {
            assert_eq!(cycle, ["a", "b", "list", "a"]);
        }
        other => panic!("expected a cycle, got {:?}", other),
    }

    let err = compile_schema("schema s 1.0.0; group g { g inner; }").unwrap_err();
    assert_eq!(err.to_string(), "Cyclic schema: g -> g");
}
