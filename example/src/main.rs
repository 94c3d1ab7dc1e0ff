// example/src/main.rs

#[allow(dead_code)]
mod generated;

use brine_wire::*;

// Bring the generated types into scope:
use generated::{Color, Coord, Path, Point, Shape};

const SHAPES: &str = include_str!("../schema/shapes.wire");

// Fields can be given in any order; they are packed in declaration order.
fn point<'a>(schema: &'a Schema, color: &str, x: i32, y: i32) -> Result<Value<'a>, WireError> {
    Value::composite(schema, "point", [
        ("x", Value::integer(schema, "coord", x)?),
        ("y", Value::integer(schema, "coord", y)?),
        ("color", Value::enumeration(schema, "color", color)?),
    ])
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let schema = compile_schema(SHAPES)?;
    println!("schema  = {} {}", schema.name(), schema.version());

    // Build a "line" shape through the dynamic codec.
    let points = vec![point(&schema, "RED", 0, 0)?, point(&schema, "BLUE", 100, -200)?];
    let path = Value::variable_array(&schema, "path", points)?;
    let line = Value::group(&schema, "shape", "line", path)?;
    let bytes = line.pack(&schema, "shape")?;
    println!("value   = {:?}", line);
    println!("packed  = {:02x?}", bytes);

    // The generated types produce the same bytes.
    let generated = Shape::Line(Path::new(vec![
        Point { color: Color::Red, x: Coord::new(0)?, y: Coord::new(0)? },
        Point { color: Color::Blue, x: Coord::new(100)?, y: Coord::new(-200)? },
    ])?);
    assert_eq!(generated.pack()?, bytes);

    // Decode them back both ways.
    let decoded = Shape::unpack(&bytes)?;
    println!("decoded = {:?}", decoded);
    if let Shape::Line(path) = &decoded {
        for (i, p) in path.elements().iter().enumerate() {
            println!("  point[{}] = ({}, {}) {}", i, p.x.0, p.y.0, p.color.label());
        }
    }
    assert_eq!(Value::unpack(&schema, "shape", &bytes)?, line);

    // Values outside their declared bounds are rejected before anything is written.
    if let Err(err) = Value::integer(&schema, "uint8", 256) {
        println!("error   = {}", err);
    }
    if let Err(err) = Value::unpack(&schema, "color", &[7]) {
        println!("error   = {}", err);
    }

    Ok(())
}
