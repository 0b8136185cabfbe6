use crate::codec::{Bounds, Codec, DecodeError, EncodeError, ReadCursor, WriteCursor};
use crate::types::{TypeRef, Value};

/// Fixed-size codec for `Unit`, `Bool` and the numeric types.
///
/// Numbers are written little-endian at their natural width; `Unit` occupies
/// zero bytes.
#[derive(Debug)]
pub struct PrimitiveCodec {
    type_ref: TypeRef,
    width: usize,
}

impl PrimitiveCodec {
    /// Returns `None` for non-primitive types.
    pub fn new(type_ref: TypeRef) -> Option<Self> {
        let width = match type_ref {
            TypeRef::Unit => 0,
            TypeRef::Bool | TypeRef::I8 | TypeRef::U8 => 1,
            TypeRef::I16 | TypeRef::U16 => 2,
            TypeRef::I32 | TypeRef::U32 | TypeRef::F32 => 4,
            TypeRef::I64 | TypeRef::U64 | TypeRef::F64 => 8,
            _ => return None,
        };

        Some(Self { type_ref, width })
    }
}

macro_rules! decode_le {
    ($cursor:expr, $variant:ident, $ty:ty) => {
        Value::$variant(<$ty>::from_le_bytes($cursor.take_array()?))
    };
}

impl Codec for PrimitiveCodec {
    fn type_ref(&self) -> &TypeRef {
        &self.type_ref
    }

    fn fixed_size(&self) -> Option<usize> {
        Some(self.width)
    }

    fn calculate_size(&self, value: &Value) -> Result<usize, EncodeError> {
        match (&self.type_ref, value) {
            (TypeRef::Unit, Value::Unit)
            | (TypeRef::Bool, Value::Bool(_))
            | (TypeRef::I8, Value::I8(_))
            | (TypeRef::I16, Value::I16(_))
            | (TypeRef::I32, Value::I32(_))
            | (TypeRef::I64, Value::I64(_))
            | (TypeRef::U8, Value::U8(_))
            | (TypeRef::U16, Value::U16(_))
            | (TypeRef::U32, Value::U32(_))
            | (TypeRef::U64, Value::U64(_))
            | (TypeRef::F32, Value::F32(_))
            | (TypeRef::F64, Value::F64(_)) => Ok(self.width),
            _ => Err(self.mismatch(value)),
        }
    }

    fn encode(&self, cursor: &mut WriteCursor<'_>, value: &Value) -> Result<(), EncodeError> {
        match (&self.type_ref, value) {
            (TypeRef::Unit, Value::Unit) => Ok(()),
            (TypeRef::Bool, Value::Bool(v)) => cursor.put_u8(u8::from(*v)),
            (TypeRef::I8, Value::I8(v)) => cursor.put_bytes(&v.to_le_bytes()),
            (TypeRef::I16, Value::I16(v)) => cursor.put_bytes(&v.to_le_bytes()),
            (TypeRef::I32, Value::I32(v)) => cursor.put_bytes(&v.to_le_bytes()),
            (TypeRef::I64, Value::I64(v)) => cursor.put_bytes(&v.to_le_bytes()),
            (TypeRef::U8, Value::U8(v)) => cursor.put_u8(*v),
            (TypeRef::U16, Value::U16(v)) => cursor.put_bytes(&v.to_le_bytes()),
            (TypeRef::U32, Value::U32(v)) => cursor.put_bytes(&v.to_le_bytes()),
            (TypeRef::U64, Value::U64(v)) => cursor.put_bytes(&v.to_le_bytes()),
            (TypeRef::F32, Value::F32(v)) => cursor.put_bytes(&v.to_le_bytes()),
            (TypeRef::F64, Value::F64(v)) => cursor.put_bytes(&v.to_le_bytes()),
            _ => Err(self.mismatch(value)),
        }
    }

    fn decode(&self, cursor: &mut ReadCursor<'_>, _bounds: Bounds) -> Result<Value, DecodeError> {
        Ok(match self.type_ref {
            TypeRef::Unit => Value::Unit,
            TypeRef::Bool => match cursor.read_u8()? {
                0 => Value::Bool(false),
                1 => Value::Bool(true),
                other => return Err(DecodeError::InvalidBool(other)),
            },
            TypeRef::I8 => decode_le!(cursor, I8, i8),
            TypeRef::I16 => decode_le!(cursor, I16, i16),
            TypeRef::I32 => decode_le!(cursor, I32, i32),
            TypeRef::I64 => decode_le!(cursor, I64, i64),
            TypeRef::U8 => Value::U8(cursor.read_u8()?),
            TypeRef::U16 => decode_le!(cursor, U16, u16),
            TypeRef::U32 => decode_le!(cursor, U32, u32),
            TypeRef::U64 => decode_le!(cursor, U64, u64),
            TypeRef::F32 => decode_le!(cursor, F32, f32),
            TypeRef::F64 => decode_le!(cursor, F64, f64),
            // `new` only admits the types matched above.
            _ => return Err(DecodeError::InvalidWitness(self.type_ref.clone())),
        })
    }
}
