// Generated by bwire from schema blobs 1.0.0. Do not edit.

use brine_wire as wire;
use brine_wire::{Pack as _, Unpack as _};

pub const SCHEMA_NAME: &str = "blobs";
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Exactly 1000 elements.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk(Vec<u64>);

impl Chunk {
    pub const COUNT: usize = 1000;

    pub fn new(elements: Vec<u64>) -> Result<Self, wire::WireError> {
        if elements.len() != Self::COUNT {
            return Err(wire::WireError::Length {
                type_name: "chunk".to_string(),
                len:       elements.len() as u64,
                limit:     Self::COUNT as u64,
            });
        }
        let value = Chunk(elements);
        wire::Pack::validate(&value)?;
        Ok(value)
    }

    pub fn elements(&self) -> &[u64] {
        &self.0
    }

    pub fn into_elements(self) -> Vec<u64> {
        self.0
    }
}

impl wire::Pack for Chunk {
    fn pack_into(&self, bb: &mut wire::ByteBufferMut) -> Result<(), wire::WireError> {
        for element in &self.0 {
            element.pack_into(bb)?;
        }
        Ok(())
    }
}

impl wire::Unpack for Chunk {
    fn unpack_from(bb: &mut wire::ByteBuffer) -> Result<Self, wire::WireError> {
        let mut elements = Vec::with_capacity(Self::COUNT.min(bb.remaining()));
        for _ in 0..Self::COUNT {
            elements.push(u64::unpack_from(bb)?);
        }
        Ok(Chunk(elements))
    }
}

/// At most 4294967295 elements, prefixed by a uint32 count.
#[derive(Debug, Clone, PartialEq)]
pub struct Blob(Vec<Chunk>);

impl Blob {
    pub const MAX: usize = 4294967295;

    pub fn new(elements: Vec<Chunk>) -> Result<Self, wire::WireError> {
        if elements.len() > Self::MAX {
            return Err(wire::WireError::Length {
                type_name: "blob".to_string(),
                len:       elements.len() as u64,
                limit:     Self::MAX as u64,
            });
        }
        let value = Blob(elements);
        wire::Pack::validate(&value)?;
        Ok(value)
    }

    pub fn elements(&self) -> &[Chunk] {
        &self.0
    }

    pub fn into_elements(self) -> Vec<Chunk> {
        self.0
    }
}

impl wire::Pack for Blob {
    fn pack_into(&self, bb: &mut wire::ByteBufferMut) -> Result<(), wire::WireError> {
        if self.0.len() > Self::MAX {
            return Err(wire::WireError::Length {
                type_name: "blob".to_string(),
                len:       self.0.len() as u64,
                limit:     Self::MAX as u64,
            });
        }
        (self.0.len() as u32).pack_into(bb)?;
        for element in &self.0 {
            element.pack_into(bb)?;
        }
        Ok(())
    }
}

impl wire::Unpack for Blob {
    fn unpack_from(bb: &mut wire::ByteBuffer) -> Result<Self, wire::WireError> {
        let len = u64::from(u32::unpack_from(bb)?);
        if len > Self::MAX as u64 {
            return Err(wire::WireError::Length {
                type_name: "blob".to_string(),
                len:       len,
                limit:     Self::MAX as u64,
            });
        }
        let mut elements = Vec::with_capacity((len as usize).min(bb.remaining()));
        for _ in 0..len {
            elements.push(Chunk::unpack_from(bb)?);
        }
        Ok(Blob(elements))
    }
}
