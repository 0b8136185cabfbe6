use crate::codec::{Bounds, Codec, DecodeError, EncodeError, ReadCursor, SharedCodec, WriteCursor};
use crate::constants::PRESENCE_FLAG_SIZE;
use crate::types::{TypeRef, Value};

/// Presence byte followed by the inner value when present.
#[derive(Debug)]
pub struct NullableCodec {
    type_ref: TypeRef,
    inner: SharedCodec,
}

impl NullableCodec {
    pub fn new(inner: SharedCodec) -> Self {
        Self {
            type_ref: TypeRef::nullable(inner.type_ref().clone()),
            inner,
        }
    }
}

impl Codec for NullableCodec {
    fn type_ref(&self) -> &TypeRef {
        &self.type_ref
    }

    fn min_size(&self) -> usize {
        PRESENCE_FLAG_SIZE
    }

    fn calculate_size(&self, value: &Value) -> Result<usize, EncodeError> {
        match value {
            Value::Null => Ok(PRESENCE_FLAG_SIZE),
            present => Ok(PRESENCE_FLAG_SIZE + self.inner.calculate_size(present)?),
        }
    }

    fn encode(&self, cursor: &mut WriteCursor<'_>, value: &Value) -> Result<(), EncodeError> {
        match value {
            Value::Null => cursor.put_u8(0),
            present => {
                cursor.put_u8(1)?;
                self.inner.encode(cursor, present)
            }
        }
    }

    fn decode(&self, cursor: &mut ReadCursor<'_>, bounds: Bounds) -> Result<Value, DecodeError> {
        match cursor.read_u8()? {
            0 => Ok(Value::Null),
            1 => self.inner.decode(cursor, bounds),
            other => Err(DecodeError::InvalidPresenceFlag(other)),
        }
    }
}
