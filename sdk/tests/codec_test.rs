#![cfg(test)]

// Rust output of `bwire generate rust shapes` for example/schema/shapes.wire
#[allow(dead_code)]
#[path = "../../example/src/generated.rs"]
mod generated;

use brine_wire::{compile_schema, Pack, Unpack, Value, WireError};
use generated::{Color, Coord, Path, Point, Shape};

const SHAPES: &str = include_str!("../../example/schema/shapes.wire");

fn point(color: Color, x: i32, y: i32) -> Point {
    Point { color, x: Coord::new(x).unwrap(), y: Coord::new(y).unwrap() }
}

#[test]
fn test_generated_matches_dynamic_codec() {
    let schema = compile_schema(SHAPES).unwrap();

    let shape = Shape::Dot(point(Color::Blue, 100, 200));
    let bytes = shape.pack().unwrap();
    assert_eq!(bytes, [0, 2, 100, 0, 0, 0, 200, 0, 0, 0]);

    let value = Value::unpack(&schema, "shape", &bytes).unwrap();
    assert_eq!(format!("{:?}", value), "dot({color: BLUE, x: 100, y: 200})");
    assert_eq!(value.pack(&schema, "shape").unwrap(), bytes);
    assert_eq!(Shape::unpack(&bytes).unwrap(), shape);
}

#[test]
fn test_variable_array_prefix() {
    let path = Path::new(vec![point(Color::Red, -1, 0), point(Color::Green, 0, -1)]).unwrap();
    let bytes = Shape::Line(path).pack().unwrap();
    assert_eq!(
        bytes,
        [
            1, 2, //
            0, 0xFF, 0xFF, 0xFF, 0xFF, 0, 0, 0, 0, //
            1, 0, 0, 0, 0, 0xFF, 0xFF, 0xFF, 0xFF,
        ]
    );

    let too_long = vec![point(Color::Red, 0, 0); Path::MAX + 1];
    assert!(matches!(Path::new(too_long), Err(WireError::Length { len: 17, limit: 16, .. })));
}

#[test]
fn test_invalid_encodings() {
    assert!(matches!(
        Color::unpack(&[3]),
        Err(WireError::InvalidEnumerationValue { value: 3, .. })
    ));
    assert!(matches!(Shape::unpack(&[2]), Err(WireError::InvalidVariant { value: 2, .. })));
    assert!(matches!(Path::unpack(&[17]), Err(WireError::Length { len: 17, .. })));
    assert!(matches!(
        Point::unpack(&[0, 1, 0, 0, 0]),
        Err(WireError::TruncatedBuffer { needed: 4, remaining: 0 })
    ));
    assert!(matches!(Coord::unpack(&[0, 0, 0, 0, 0]), Err(WireError::TrailingBytes { remaining: 1, .. })));
}
