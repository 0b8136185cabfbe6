use crate::codec::{
    Bounds, Codec, CodecError, DecodeError, EncodeError, ReadCursor, WriteCursor, read_witness,
    witness_size, write_witness,
};
use crate::constants::{LENGTH_PREFIX_SIZE, PRESENCE_FLAG_SIZE, WITNESS_COUNT_SIZE};
use crate::types::{MemberHandle, MemberKind, MemberRegistry, TypeRef, Value};
use std::sync::Arc;

/// Identity-based codec for metadata values (methods, fields, properties,
/// constructors and events).
///
/// The wire form is the member's identity, not its state:
///
/// ```text
/// presence u8 | declaring type (string) | name (string)
///   callable only: generic arity u16
///                  | generic argument count u16 | witnesses...
///                  | parameter count u16 | witnesses...
/// ```
///
/// Parameter witnesses describe the member as constructed, i.e. after the
/// generic arguments have been substituted. Decoding re-resolves the identity
/// against the [`MemberRegistry`], applying the same substitution to each
/// candidate before comparing parameter lists.
#[derive(Debug)]
pub struct MemberCodec {
    type_ref: TypeRef,
    kind: MemberKind,
    registry: Arc<MemberRegistry>,
}

impl MemberCodec {
    pub fn new(kind: MemberKind, registry: Arc<MemberRegistry>) -> Result<Self, CodecError> {
        if kind == MemberKind::Any {
            return Err(CodecError::UnsupportedMemberKind(kind));
        }

        Ok(Self {
            type_ref: TypeRef::Member(kind),
            kind,
            registry,
        })
    }

    fn handle<'v>(&self, value: &'v Value) -> Result<Option<&'v MemberHandle>, EncodeError> {
        match value {
            Value::Null => Ok(None),
            Value::Member(handle) if handle.kind() == self.kind => Ok(Some(handle)),
            other => Err(self.mismatch(other)),
        }
    }

    fn read_witness_list(cursor: &mut ReadCursor<'_>) -> Result<Vec<TypeRef>, DecodeError> {
        let count = cursor.read_u16()? as usize;
        if count > cursor.remaining() {
            return Err(DecodeError::ImplausibleLength {
                declared: count,
                remaining: cursor.remaining(),
            });
        }

        (0..count).map(|_| read_witness(cursor)).collect()
    }

    fn read_text(cursor: &mut ReadCursor<'_>) -> Result<String, DecodeError> {
        match cursor.read_blob(Bounds::Strict)? {
            Some(bytes) => std::str::from_utf8(bytes)
                .map(str::to_owned)
                .map_err(|_| DecodeError::InvalidUtf8),
            None => Err(DecodeError::InvalidLength(-1)),
        }
    }
}

impl Codec for MemberCodec {
    fn type_ref(&self) -> &TypeRef {
        &self.type_ref
    }

    fn min_size(&self) -> usize {
        PRESENCE_FLAG_SIZE
    }

    fn calculate_size(&self, value: &Value) -> Result<usize, EncodeError> {
        let Some(handle) = self.handle(value)? else {
            return Ok(PRESENCE_FLAG_SIZE);
        };

        let info = handle.info();
        let mut size = PRESENCE_FLAG_SIZE
            + LENGTH_PREFIX_SIZE
            + info.declaring_type.len()
            + LENGTH_PREFIX_SIZE
            + info.name.len();

        if self.kind.is_callable() {
            size += WITNESS_COUNT_SIZE * 3;
            for argument in handle.generic_arguments() {
                size += witness_size(argument)?;
            }
            for parameter in &handle.parameter_types() {
                size += witness_size(parameter)?;
            }
        }

        Ok(size)
    }

    fn encode(&self, cursor: &mut WriteCursor<'_>, value: &Value) -> Result<(), EncodeError> {
        let Some(handle) = self.handle(value)? else {
            return cursor.put_u8(0);
        };

        let info = handle.info();
        cursor.put_u8(1)?;
        cursor.put_blob(Some(info.declaring_type.as_bytes()))?;
        cursor.put_blob(Some(info.name.as_bytes()))?;

        if self.kind.is_callable() {
            cursor.put_u16(info.generic_arity)?;

            cursor.put_count(handle.generic_arguments().len())?;
            for argument in handle.generic_arguments() {
                write_witness(cursor, argument)?;
            }

            let parameters = handle.parameter_types();
            cursor.put_count(parameters.len())?;
            for parameter in &parameters {
                write_witness(cursor, parameter)?;
            }
        }

        Ok(())
    }

    fn decode(&self, cursor: &mut ReadCursor<'_>, _bounds: Bounds) -> Result<Value, DecodeError> {
        match cursor.read_u8()? {
            0 => return Ok(Value::Null),
            1 => {}
            other => return Err(DecodeError::InvalidPresenceFlag(other)),
        }

        let declaring_type = Self::read_text(cursor)?;
        let name = Self::read_text(cursor)?;

        let (generic_arity, generic_arguments, parameter_types) = if self.kind.is_callable() {
            let arity = cursor.read_u16()?;
            let arguments = Self::read_witness_list(cursor)?;
            let parameters = Self::read_witness_list(cursor)?;
            (arity, arguments, parameters)
        } else {
            (0, Vec::new(), Vec::new())
        };

        let info = self.registry.resolve(
            self.kind,
            &declaring_type,
            &name,
            generic_arity,
            &generic_arguments,
            &parameter_types,
        )?;

        let handle = if generic_arguments.is_empty() {
            MemberHandle::new(info)
        } else {
            MemberHandle::constructed(info, generic_arguments).ok_or(
                DecodeError::AmbiguousOrMissingMember {
                    kind: self.kind,
                    declaring_type,
                    name,
                    matches: 0,
                },
            )?
        };

        Ok(Value::Member(handle))
    }
}
