// Generated by bwire from schema shapes 1.0.0. Do not edit.

use brine_wire as wire;
use brine_wire::{Pack as _, Unpack as _};

pub const SCHEMA_NAME: &str = "shapes";
pub const SCHEMA_VERSION: &str = "1.0.0";

/// `coord`, encoded as int32.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coord(pub i32);

impl Coord {
    pub fn new(value: i32) -> Result<Self, wire::WireError> {
        let value = Coord(value);
        wire::Pack::validate(&value)?;
        Ok(value)
    }
}

impl wire::Pack for Coord {
    fn pack_into(&self, bb: &mut wire::ByteBufferMut) -> Result<(), wire::WireError> {
        self.0.pack_into(bb)
    }
}

impl wire::Unpack for Coord {
    fn unpack_from(bb: &mut wire::ByteBuffer) -> Result<Self, wire::WireError> {
        Ok(Coord(i32::unpack_from(bb)?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Red,
    Green,
    Blue,
}

impl Color {
    pub const LABELS: [&'static str; 3] = ["RED", "GREEN", "BLUE"];

    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        match ordinal {
            0 => Some(Color::Red),
            1 => Some(Color::Green),
            2 => Some(Color::Blue),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        Self::LABELS[self as usize]
    }
}

impl wire::Pack for Color {
    fn pack_into(&self, bb: &mut wire::ByteBufferMut) -> Result<(), wire::WireError> {
        self.ordinal().pack_into(bb)
    }
}

impl wire::Unpack for Color {
    fn unpack_from(bb: &mut wire::ByteBuffer) -> Result<Self, wire::WireError> {
        let ordinal = u8::unpack_from(bb)?;
        Color::from_ordinal(ordinal).ok_or_else(|| wire::WireError::InvalidEnumerationValue {
            type_name: "color".to_string(),
            value:     u64::from(ordinal),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub color: Color,
    pub x: Coord,
    pub y: Coord,
}

impl wire::Pack for Point {
    fn pack_into(&self, bb: &mut wire::ByteBufferMut) -> Result<(), wire::WireError> {
        self.color.pack_into(bb)?;
        self.x.pack_into(bb)?;
        self.y.pack_into(bb)?;
        Ok(())
    }
}

impl wire::Unpack for Point {
    fn unpack_from(bb: &mut wire::ByteBuffer) -> Result<Self, wire::WireError> {
        Ok(Point {
            color: Color::unpack_from(bb)?,
            x: Coord::unpack_from(bb)?,
            y: Coord::unpack_from(bb)?,
        })
    }
}

/// At most 16 elements, prefixed by a uint8 count.
#[derive(Debug, Clone, PartialEq)]
pub struct Path(Vec<Point>);

impl Path {
    pub const MAX: usize = 16;

    pub fn new(elements: Vec<Point>) -> Result<Self, wire::WireError> {
        if elements.len() > Self::MAX {
            return Err(wire::WireError::Length {
                type_name: "path".to_string(),
                len:       elements.len() as u64,
                limit:     Self::MAX as u64,
            });
        }
        let value = Path(elements);
        wire::Pack::validate(&value)?;
        Ok(value)
    }

    pub fn elements(&self) -> &[Point] {
        &self.0
    }

    pub fn into_elements(self) -> Vec<Point> {
        self.0
    }
}

impl wire::Pack for Path {
    fn pack_into(&self, bb: &mut wire::ByteBufferMut) -> Result<(), wire::WireError> {
        if self.0.len() > Self::MAX {
            return Err(wire::WireError::Length {
                type_name: "path".to_string(),
                len:       self.0.len() as u64,
                limit:     Self::MAX as u64,
            });
        }
        (self.0.len() as u8).pack_into(bb)?;
        for element in &self.0 {
            element.pack_into(bb)?;
        }
        Ok(())
    }
}

impl wire::Unpack for Path {
    fn unpack_from(bb: &mut wire::ByteBuffer) -> Result<Self, wire::WireError> {
        let len = u64::from(u8::unpack_from(bb)?);
        if len > Self::MAX as u64 {
            return Err(wire::WireError::Length {
                type_name: "path".to_string(),
                len:       len,
                limit:     Self::MAX as u64,
            });
        }
        let mut elements = Vec::with_capacity((len as usize).min(bb.remaining()));
        for _ in 0..len {
            elements.push(Point::unpack_from(bb)?);
        }
        Ok(Path(elements))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Dot(Point),
    Line(Path),
}

impl Shape {
    pub const VARIANTS: [&'static str; 2] = ["dot", "line"];

    pub fn tag(&self) -> u8 {
        match self {
            Shape::Dot(_) => 0,
            Shape::Line(_) => 1,
        }
    }
}

impl wire::Pack for Shape {
    fn pack_into(&self, bb: &mut wire::ByteBufferMut) -> Result<(), wire::WireError> {
        self.tag().pack_into(bb)?;
        match self {
            Shape::Dot(payload) => payload.pack_into(bb),
            Shape::Line(payload) => payload.pack_into(bb),
        }
    }
}

impl wire::Unpack for Shape {
    fn unpack_from(bb: &mut wire::ByteBuffer) -> Result<Self, wire::WireError> {
        match u8::unpack_from(bb)? {
            0 => Ok(Shape::Dot(Point::unpack_from(bb)?)),
            1 => Ok(Shape::Line(Path::unpack_from(bb)?)),
            tag => Err(wire::WireError::InvalidVariant {
                type_name: "shape".to_string(),
                value:     u64::from(tag),
            }),
        }
    }
}
