use crate::codec::{Bounds, Codec, DecodeError, EncodeError, ReadCursor, WriteCursor};
use crate::constants::LENGTH_PREFIX_SIZE;
use crate::types::{TypeRef, Value};

/// Length-prefixed UTF-8 text. A `-1` prefix encodes null.
#[derive(Debug)]
pub struct StringCodec {
    type_ref: TypeRef,
}

impl StringCodec {
    pub fn new() -> Self {
        Self {
            type_ref: TypeRef::String,
        }
    }
}

impl Default for StringCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec for StringCodec {
    fn type_ref(&self) -> &TypeRef {
        &self.type_ref
    }

    fn min_size(&self) -> usize {
        LENGTH_PREFIX_SIZE
    }

    fn calculate_size(&self, value: &Value) -> Result<usize, EncodeError> {
        match value {
            Value::Null => Ok(LENGTH_PREFIX_SIZE),
            Value::String(s) => Ok(LENGTH_PREFIX_SIZE + s.len()),
            other => Err(self.mismatch(other)),
        }
    }

    fn encode(&self, cursor: &mut WriteCursor<'_>, value: &Value) -> Result<(), EncodeError> {
        match value {
            Value::Null => cursor.put_blob(None),
            Value::String(s) => cursor.put_blob(Some(s.as_bytes())),
            other => Err(self.mismatch(other)),
        }
    }

    fn decode(&self, cursor: &mut ReadCursor<'_>, bounds: Bounds) -> Result<Value, DecodeError> {
        match cursor.read_blob(bounds)? {
            Some(bytes) => std::str::from_utf8(bytes)
                .map(|s| Value::String(s.to_owned()))
                .map_err(|_| DecodeError::InvalidUtf8),
            None => Ok(Value::Null),
        }
    }
}

/// Length-prefixed opaque bytes. A `-1` prefix encodes null.
#[derive(Debug)]
pub struct BytesCodec {
    type_ref: TypeRef,
}

impl BytesCodec {
    pub fn new() -> Self {
        Self {
            type_ref: TypeRef::Bytes,
        }
    }
}

impl Default for BytesCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec for BytesCodec {
    fn type_ref(&self) -> &TypeRef {
        &self.type_ref
    }

    fn min_size(&self) -> usize {
        LENGTH_PREFIX_SIZE
    }

    fn calculate_size(&self, value: &Value) -> Result<usize, EncodeError> {
        match value {
            Value::Null => Ok(LENGTH_PREFIX_SIZE),
            Value::Bytes(b) => Ok(LENGTH_PREFIX_SIZE + b.len()),
            other => Err(self.mismatch(other)),
        }
    }

    fn encode(&self, cursor: &mut WriteCursor<'_>, value: &Value) -> Result<(), EncodeError> {
        match value {
            Value::Null => cursor.put_blob(None),
            Value::Bytes(b) => cursor.put_blob(Some(b)),
            other => Err(self.mismatch(other)),
        }
    }

    fn decode(&self, cursor: &mut ReadCursor<'_>, bounds: Bounds) -> Result<Value, DecodeError> {
        Ok(cursor
            .read_blob(bounds)?
            .map_or(Value::Null, |bytes| Value::Bytes(bytes.to_vec())))
    }
}
