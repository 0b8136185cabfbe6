use crate::codec::{DecodeError, EncodeError, ReadCursor, WriteCursor};
use crate::types::{TypeRef, Value};
use std::fmt;
use std::sync::Arc;

/// How strictly a decoder validates declared lengths against the bytes that
/// remain in the payload.
///
/// Reads are always bounds-checked; this only governs the up-front
/// plausibility check of length prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Bounds {
    /// Reject any declared length that cannot fit in the remaining bytes
    /// before allocating for it.
    #[default]
    Strict,

    /// Skip the up-front length check.
    ///
    /// Precondition: the caller has already validated the total payload
    /// length against its envelope. Only the final field of a payload is
    /// decoded this way; nested values are always decoded strictly.
    Relaxed,
}

/// Per-type strategy for sizing, encoding and decoding values.
///
/// Implementations are stateless with respect to the values they process and
/// never retain a reference to a cursor's buffer beyond the call.
///
/// Contract:
/// - `encode` writes exactly `calculate_size(value)` bytes.
/// - `decode` consumes exactly the bytes a matching `encode` produced.
pub trait Codec: Send + Sync + fmt::Debug {
    /// The type this codec encodes.
    fn type_ref(&self) -> &TypeRef;

    /// The constant encoded size, for fixed-size codecs.
    fn fixed_size(&self) -> Option<usize> {
        None
    }

    /// The fewest bytes any encoding of this type occupies.
    fn min_size(&self) -> usize {
        self.fixed_size().unwrap_or(0)
    }

    fn calculate_size(&self, value: &Value) -> Result<usize, EncodeError>;

    fn encode(&self, cursor: &mut WriteCursor<'_>, value: &Value) -> Result<(), EncodeError>;

    fn decode(&self, cursor: &mut ReadCursor<'_>, bounds: Bounds) -> Result<Value, DecodeError>;

    fn mismatch(&self, value: &Value) -> EncodeError {
        EncodeError::TypeMismatch {
            expected: self.type_ref().clone(),
            found: value.kind_name(),
        }
    }
}

pub type SharedCodec = Arc<dyn Codec>;
