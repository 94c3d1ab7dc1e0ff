use brine_wire_schema::{ByteBuffer, ByteBufferMut, WireError, FLOAT32_LIMIT};

/// Types with a canonical little-endian encoding. Generated Rust code
/// implements this for every schema type; the builtins are covered here.
pub trait Pack {
    /// Appends the encoding of `self` to `bb`. On error `bb` may hold a
    /// partial encoding.
    fn pack_into(&self, bb: &mut ByteBufferMut) -> Result<(), WireError>;

    fn pack(&self) -> Result<Vec<u8>, WireError> {
        let mut bb = ByteBufferMut::new();
        self.pack_into(&mut bb)?;
        Ok(bb.data())
    }

    /// Checks that `self` can be encoded, without keeping the bytes.
    fn validate(&self) -> Result<(), WireError> {
        self.pack_into(&mut ByteBufferMut::new())
    }
}

/// Types that decode from the canonical encoding.
pub trait Unpack: Sized {
    /// Decodes one value starting at the current index of `bb`.
    fn unpack_from(bb: &mut ByteBuffer<'_>) -> Result<Self, WireError>;

    /// Decodes a whole buffer. Leftover bytes fail with
    /// [WireError::TrailingBytes].
    fn unpack(bytes: &[u8]) -> Result<Self, WireError> {
        let mut bb = ByteBuffer::new(bytes);
        let value = Self::unpack_from(&mut bb)?;
        if bb.remaining() != 0 {
            return Err(WireError::TrailingBytes {
                type_name: std::any::type_name::<Self>().to_string(),
                remaining: bb.remaining(),
            });
        }
        Ok(value)
    }
}

macro_rules! unsigned {
    ($($ty:ty),*) => {$(
        impl Pack for $ty {
            fn pack_into(&self, bb: &mut ByteBufferMut) -> Result<(), WireError> {
                bb.write_uint(std::mem::size_of::<$ty>(), u64::from(*self));
                Ok(())
            }
        }

        impl Unpack for $ty {
            fn unpack_from(bb: &mut ByteBuffer<'_>) -> Result<Self, WireError> {
                // read_uint never yields more than `size_of` bytes worth
                Ok(bb.read_uint(std::mem::size_of::<$ty>())? as $ty)
            }
        }
    )*};
}

macro_rules! signed {
    ($($ty:ty),*) => {$(
        impl Pack for $ty {
            fn pack_into(&self, bb: &mut ByteBufferMut) -> Result<(), WireError> {
                bb.write_int(std::mem::size_of::<$ty>(), i64::from(*self));
                Ok(())
            }
        }

        impl Unpack for $ty {
            fn unpack_from(bb: &mut ByteBuffer<'_>) -> Result<Self, WireError> {
                Ok(bb.read_int(std::mem::size_of::<$ty>())? as $ty)
            }
        }
    )*};
}

unsigned!(u8, u16, u32, u64);
signed!(i8, i16, i32, i64);

fn range_error(type_name: &str, value: impl ToString) -> WireError {
    WireError::Range { type_name: type_name.to_string(), value: value.to_string() }
}

fn check_f32(value: f32) -> Result<f32, WireError> {
    let wide = f64::from(value);
    if wide.is_nan() || wide <= -FLOAT32_LIMIT || wide >= FLOAT32_LIMIT {
        return Err(range_error("float32", value));
    }
    Ok(value)
}

/// float64 takes every IEEE-754 value except NaN.
fn check_f64(value: f64) -> Result<f64, WireError> {
    if value.is_nan() {
        return Err(range_error("float64", value));
    }
    Ok(value)
}

impl Pack for f32 {
    fn pack_into(&self, bb: &mut ByteBufferMut) -> Result<(), WireError> {
        bb.write_f32(check_f32(*self)?);
        Ok(())
    }
}

impl Unpack for f32 {
    fn unpack_from(bb: &mut ByteBuffer<'_>) -> Result<Self, WireError> {
        check_f32(bb.read_f32()?)
    }
}

impl Pack for f64 {
    fn pack_into(&self, bb: &mut ByteBufferMut) -> Result<(), WireError> {
        bb.write_f64(check_f64(*self)?);
        Ok(())
    }
}

impl Unpack for f64 {
    fn unpack_from(bb: &mut ByteBuffer<'_>) -> Result<Self, WireError> {
        check_f64(bb.read_f64()?)
    }
}
