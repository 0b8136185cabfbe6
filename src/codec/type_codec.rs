use crate::codec::{Bounds, Codec, DecodeError, EncodeError, ReadCursor, WriteCursor};
use crate::constants::{MAX_WITNESS_DEPTH, NULL_WITNESS_TAG, WITNESS_COUNT_SIZE};
use crate::types::{MemberKind, TypeRef, TypeTag, Value};

/// Nesting depth of a type witness: 1 for a leaf, plus one level for each
/// `Array`, `Nullable` or `Pending` wrapper.
pub fn witness_depth(type_ref: &TypeRef) -> usize {
    match type_ref {
        TypeRef::Array(inner) | TypeRef::Nullable(inner) | TypeRef::Pending(inner) => {
            1 + witness_depth(inner)
        }
        _ => 1,
    }
}

/// Only witnesses the reader accepts may be written.
fn ensure_witness_depth(type_ref: &TypeRef) -> Result<(), EncodeError> {
    if witness_depth(type_ref) > MAX_WITNESS_DEPTH {
        return Err(EncodeError::WitnessTooDeep(MAX_WITNESS_DEPTH));
    }
    Ok(())
}

/// Encoded size of a type witness.
///
/// A witness is one tag byte, followed by the nested witness for `Array`,
/// `Nullable` and `Pending`, a `u16` index for `Generic`, or a kind byte for
/// `Member`. Fails for witnesses nested deeper than `MAX_WITNESS_DEPTH`.
pub fn witness_size(type_ref: &TypeRef) -> Result<usize, EncodeError> {
    ensure_witness_depth(type_ref)?;
    Ok(unchecked_witness_size(type_ref))
}

fn unchecked_witness_size(type_ref: &TypeRef) -> usize {
    1 + match type_ref {
        TypeRef::Array(inner) | TypeRef::Nullable(inner) | TypeRef::Pending(inner) => {
            unchecked_witness_size(inner)
        }
        TypeRef::Generic(_) => WITNESS_COUNT_SIZE,
        TypeRef::Member(_) => 1,
        _ => 0,
    }
}

pub fn write_witness(cursor: &mut WriteCursor<'_>, type_ref: &TypeRef) -> Result<(), EncodeError> {
    ensure_witness_depth(type_ref)?;
    write_witness_body(cursor, type_ref)
}

fn write_witness_body(cursor: &mut WriteCursor<'_>, type_ref: &TypeRef) -> Result<(), EncodeError> {
    cursor.put_u8(type_ref.tag().into())?;
    match type_ref {
        TypeRef::Array(inner) | TypeRef::Nullable(inner) | TypeRef::Pending(inner) => {
            write_witness_body(cursor, inner)
        }
        TypeRef::Generic(index) => cursor.put_u16(*index),
        TypeRef::Member(kind) => cursor.put_u8((*kind).into()),
        _ => Ok(()),
    }
}

pub fn read_witness(cursor: &mut ReadCursor<'_>) -> Result<TypeRef, DecodeError> {
    let tag = cursor.read_u8()?;
    read_witness_body(cursor, tag, 0)
}

fn read_witness_body(
    cursor: &mut ReadCursor<'_>,
    tag: u8,
    depth: usize,
) -> Result<TypeRef, DecodeError> {
    if depth >= MAX_WITNESS_DEPTH {
        return Err(DecodeError::WitnessTooDeep(MAX_WITNESS_DEPTH));
    }

    let tag = TypeTag::try_from(tag).map_err(|_| DecodeError::UnknownTypeTag(tag))?;

    let nested = |cursor: &mut ReadCursor<'_>| -> Result<Box<TypeRef>, DecodeError> {
        let inner_tag = cursor.read_u8()?;
        Ok(Box::new(read_witness_body(cursor, inner_tag, depth + 1)?))
    };

    Ok(match tag {
        TypeTag::Unit => TypeRef::Unit,
        TypeTag::Bool => TypeRef::Bool,
        TypeTag::I8 => TypeRef::I8,
        TypeTag::I16 => TypeRef::I16,
        TypeTag::I32 => TypeRef::I32,
        TypeTag::I64 => TypeRef::I64,
        TypeTag::U8 => TypeRef::U8,
        TypeTag::U16 => TypeRef::U16,
        TypeTag::U32 => TypeRef::U32,
        TypeTag::U64 => TypeRef::U64,
        TypeTag::F32 => TypeRef::F32,
        TypeTag::F64 => TypeRef::F64,
        TypeTag::String => TypeRef::String,
        TypeTag::Bytes => TypeRef::Bytes,
        TypeTag::Array => TypeRef::Array(nested(cursor)?),
        TypeTag::Nullable => TypeRef::Nullable(nested(cursor)?),
        TypeTag::Pending => TypeRef::Pending(nested(cursor)?),
        TypeTag::Type => TypeRef::Type,
        TypeTag::Generic => TypeRef::Generic(cursor.read_u16()?),
        TypeTag::Member => {
            let raw = cursor.read_u8()?;
            TypeRef::Member(
                MemberKind::try_from(raw).map_err(|_| DecodeError::UnknownMemberKind(raw))?,
            )
        }
    })
}

/// Codec for `TypeRef::Type` values: the type itself travels as a witness.
///
/// Generic type arguments are sent ahead of a call's parameters with this
/// codec. A null type is the single byte `NULL_WITNESS_TAG`.
#[derive(Debug)]
pub struct TypeWitnessCodec {
    type_ref: TypeRef,
}

impl TypeWitnessCodec {
    pub fn new() -> Self {
        Self {
            type_ref: TypeRef::Type,
        }
    }
}

impl Default for TypeWitnessCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec for TypeWitnessCodec {
    fn type_ref(&self) -> &TypeRef {
        &self.type_ref
    }

    fn min_size(&self) -> usize {
        1
    }

    fn calculate_size(&self, value: &Value) -> Result<usize, EncodeError> {
        match value {
            Value::Null => Ok(1),
            Value::Type(witness) => witness_size(witness),
            other => Err(self.mismatch(other)),
        }
    }

    fn encode(&self, cursor: &mut WriteCursor<'_>, value: &Value) -> Result<(), EncodeError> {
        match value {
            Value::Null => cursor.put_u8(NULL_WITNESS_TAG),
            Value::Type(witness) => write_witness(cursor, witness),
            other => Err(self.mismatch(other)),
        }
    }

    fn decode(&self, cursor: &mut ReadCursor<'_>, _bounds: Bounds) -> Result<Value, DecodeError> {
        match cursor.read_u8()? {
            NULL_WITNESS_TAG => Ok(Value::Null),
            tag => Ok(Value::Type(read_witness_body(cursor, tag, 0)?)),
        }
    }
}
