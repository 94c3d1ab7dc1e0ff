use crate::error::WireError;

/// A little-endian byte buffer meant for reading.
///
/// Example usage:
///
/// ```
/// let mut bb = brine_wire_schema::ByteBuffer::new(&[0xCD, 0xAB, 0xD6]);
/// assert_eq!(bb.read_uint(2), Ok(0xABCD));
/// assert_eq!(bb.read_int(1), Ok(-42));
/// assert_eq!(bb.remaining(), 0);
/// ```
///
pub struct ByteBuffer<'a> {
    data:  &'a [u8],
    index: usize,
}

impl<'a> ByteBuffer<'a> {
    /// Create a new ByteBuffer that wraps the provided byte slice. The lifetime
    /// of the returned ByteBuffer must not outlive the lifetime of the byte
    /// slice.
    pub fn new(data: &'a [u8]) -> ByteBuffer<'a> {
        ByteBuffer { data, index: 0 }
    }

    /// Retrieves the underlying byte slice.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Retrieves the current index into the underlying byte slice. This starts
    /// off as 0 and ends up as `self.data().len()` when everything has been
    /// read.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of bytes left to read.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.index
    }

    /// Try to read `len` bytes starting at the current index.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], WireError> {
        if len > self.remaining() {
            Err(WireError::TruncatedBuffer { needed: len, remaining: self.remaining() })
        } else {
            let value = &self.data[self.index..self.index + len];
            self.index += len;
            Ok(value)
        }
    }

    /// Try to read a byte starting at the current index.
    pub fn read_byte(&mut self) -> Result<u8, WireError> {
        Ok(self.read_bytes(1)?[0])
    }

    /// Try to read an unsigned little-endian integer that is `width` bytes
    /// wide (1, 2, 4 or 8).
    pub fn read_uint(&mut self, width: usize) -> Result<u64, WireError> {
        let bytes = self.read_bytes(width)?;
        Ok(bytes
            .iter()
            .enumerate()
            .fold(0u64, |acc, (i, &b)| acc | ((b as u64) << (8 * i))))
    }

    /// Try to read a two's-complement little-endian integer that is `width`
    /// bytes wide, sign-extending it to 64 bits.
    pub fn read_int(&mut self, width: usize) -> Result<i64, WireError> {
        let raw = self.read_uint(width)?;
        let shift = 64 - 8 * width as u32;
        Ok(((raw << shift) as i64) >> shift)
    }

    /// Try to read an IEEE-754 binary32 value.
    pub fn read_f32(&mut self) -> Result<f32, WireError> {
        Ok(f32::from_bits(self.read_uint(4)? as u32))
    }

    /// Try to read an IEEE-754 binary64 value.
    pub fn read_f64(&mut self) -> Result<f64, WireError> {
        Ok(f64::from_bits(self.read_uint(8)?))
    }
}

#[test]
fn read_byte() {
    let read = |bytes| ByteBuffer::new(bytes).read_byte();
    assert_eq!(read(&[]), Err(WireError::TruncatedBuffer { needed: 1, remaining: 0 }));
    assert_eq!(read(&[0]), Ok(0));
    assert_eq!(read(&[255]), Ok(255));
}

#[test]
fn read_bytes() {
    let read = |bytes, len| ByteBuffer::new(bytes).read_bytes(len);
    assert_eq!(read(&[], 0), Ok(vec![].as_slice()));
    assert!(read(&[], 1).is_err());
    assert_eq!(read(&[0], 1), Ok(vec![0].as_slice()));
    assert_eq!(read(&[0], 2), Err(WireError::TruncatedBuffer { needed: 2, remaining: 1 }));

    let mut bb = ByteBuffer::new(&[1, 2, 3, 4, 5]);
    assert_eq!(bb.read_bytes(3), Ok(vec![1, 2, 3].as_slice()));
    assert_eq!(bb.read_bytes(2), Ok(vec![4, 5].as_slice()));
    assert!(bb.read_bytes(1).is_err());
}

#[test]
fn read_uint() {
    let read = |bytes, width| ByteBuffer::new(bytes).read_uint(width);
    assert_eq!(read(&[42], 1), Ok(42));
    assert_eq!(read(&[0xCD, 0xAB], 2), Ok(0xABCD));
    assert_eq!(read(&[0xEF, 0xBE, 0xAD, 0xDE], 4), Ok(0xDEAD_BEEF));
    assert_eq!(
        read(&[0xEF, 0xBE, 0xAD, 0xDE, 0xBE, 0xBA, 0xFE, 0xCA], 8),
        Ok(0xCAFE_BABE_DEAD_BEEF)
    );
    assert!(read(&[0xEF, 0xBE, 0xAD], 4).is_err());
}

#[test]
fn read_int() {
    let read = |bytes, width| ByteBuffer::new(bytes).read_int(width);
    assert_eq!(read(&[0xD6], 1), Ok(-42));
    assert_eq!(read(&[0x80], 1), Ok(-128));
    assert_eq!(read(&[0x7F], 1), Ok(127));
    assert_eq!(read(&[0xD6, 0xFF], 2), Ok(-42));
    assert_eq!(read(&[0xCD, 0x0B], 2), Ok(0xBCD));
    assert_eq!(read(&[0xEE, 0xDB, 0xEA, 0x0D], 4), Ok(0xDEADBEE));
    assert_eq!(read(&[0, 0, 0, 0x80], 4), Ok(i32::MIN as i64));
    assert_eq!(read(&[0xFF; 8], 8), Ok(-1));
}

#[test]
fn read_floats() {
    let mut bb = ByteBuffer::new(&[0, 0, 0, 0x3F, 0, 0, 0, 0, 0, 0, 0xF0, 0xBF]);
    assert_eq!(bb.read_f32(), Ok(0.5));
    assert_eq!(bb.read_f64(), Ok(-1.0));
    assert_eq!(bb.remaining(), 0);
}

/// A little-endian byte buffer meant for writing.
///
/// Example usage:
///
/// ```
/// let mut bb = brine_wire_schema::ByteBufferMut::new();
/// bb.write_uint(2, 0xABCD);
/// bb.write_int(1, -42);
/// assert_eq!(bb.data(), [0xCD, 0xAB, 0xD6]);
/// ```
///
#[derive(Default)]
pub struct ByteBufferMut {
    data: Vec<u8>,
}

impl ByteBufferMut {
    /// Creates an empty ByteBufferMut ready for writing.
    pub fn new() -> ByteBufferMut {
        ByteBufferMut { data: vec![] }
    }

    /// Consumes this buffer and returns the underlying backing store. Use this
    /// to get the data out when you're done writing to the buffer.
    pub fn data(self) -> Vec<u8> {
        self.data
    }

    /// Returns the number of bytes written so far.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Write a byte to the end of the buffer.
    pub fn write_byte(&mut self, value: u8) {
        self.data.push(value);
    }

    /// Write a raw byte slice to the end of the buffer.
    pub fn write_bytes(&mut self, value: &[u8]) {
        self.data.extend_from_slice(value);
    }

    /// Write the low `width` bytes of `value`, least significant first.
    pub fn write_uint(&mut self, width: usize, value: u64) {
        for i in 0..width {
            self.data.push((value >> (8 * i)) as u8);
        }
    }

    /// Write the low `width` bytes of the two's-complement form of `value`.
    pub fn write_int(&mut self, width: usize, value: i64) {
        self.write_uint(width, value as u64);
    }

    /// Write an IEEE-754 binary32 value.
    pub fn write_f32(&mut self, value: f32) {
        self.write_uint(4, value.to_bits() as u64);
    }

    /// Write an IEEE-754 binary64 value.
    pub fn write_f64(&mut self, value: f64) {
        self.write_uint(8, value.to_bits());
    }
}

#[cfg(test)]
fn write_once(cb: fn(&mut ByteBufferMut)) -> Vec<u8> {
    let mut bb = ByteBufferMut::new();
    cb(&mut bb);
    bb.data()
}

#[test]
fn write_uint() {
    assert_eq!(write_once(|bb| bb.write_uint(1, 42)), [42]);
    assert_eq!(write_once(|bb| bb.write_uint(2, 0xABCD)), [0xCD, 0xAB]);
    assert_eq!(write_once(|bb| bb.write_uint(4, 0xDEAD_BEEF)), [0xEF, 0xBE, 0xAD, 0xDE]);
    assert_eq!(
        write_once(|bb| bb.write_uint(8, 0xCAFE_BABE_DEAD_BEEF)),
        [0xEF, 0xBE, 0xAD, 0xDE, 0xBE, 0xBA, 0xFE, 0xCA]
    );
}

#[test]
fn write_int() {
    assert_eq!(write_once(|bb| bb.write_int(1, -42)), [0xD6]);
    assert_eq!(write_once(|bb| bb.write_int(2, -42)), [0xD6, 0xFF]);
    assert_eq!(write_once(|bb| bb.write_int(2, 0xBCD)), [0xCD, 0x0B]);
    assert_eq!(write_once(|bb| bb.write_int(4, 0xDEADBEE)), [0xEE, 0xDB, 0xEA, 0x0D]);
    assert_eq!(write_once(|bb| bb.write_int(8, i64::MIN)), [0, 0, 0, 0, 0, 0, 0, 0x80]);
}

#[test]
fn write_floats() {
    assert_eq!(write_once(|bb| bb.write_f32(0.5)), [0, 0, 0, 0x3F]);
    assert_eq!(write_once(|bb| bb.write_f64(-1.0)), [0, 0, 0, 0, 0, 0, 0xF0, 0xBF]);
}

#[test]
fn write_sequence() {
    let mut bb = ByteBufferMut::new();
    bb.write_byte(5);
    bb.write_bytes(b"hello");
    bb.write_uint(2, 1);
    assert_eq!(bb.data(), [5, 104, 101, 108, 108, 111, 1, 0]);
}
