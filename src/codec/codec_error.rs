use crate::types::{MemberKind, TypeRef};
use thiserror::Error;

/// A codec could not be constructed for a type.
///
/// These are programmer errors (coverage gaps) and surface when a method's
/// codecs are first built, never while a payload is being decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("no codec for unresolved generic parameter T{0}")]
    OpenGeneric(u16),

    #[error("no codec for member kind {0:?}")]
    UnsupportedMemberKind(MemberKind),

    #[error("pending type {0} is a remoting marker and has no codec")]
    PendingType(TypeRef),

    #[error("no codec registered for {0}")]
    Unsupported(TypeRef),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodeError {
    /// The value does not fit the slot's declared type.
    #[error("cannot encode a {found} value as {expected}")]
    TypeMismatch { expected: TypeRef, found: &'static str },

    /// A write would run past the preallocated buffer.
    #[error("write of {needed} bytes exceeds the {remaining} bytes left in the buffer")]
    Overflow { needed: usize, remaining: usize },

    /// The bytes written differ from the calculated size.
    #[error("calculated {calculated} bytes but wrote {written}")]
    SizeMismatch { calculated: usize, written: usize },

    /// A length or count does not fit its wire prefix.
    #[error("length {0} does not fit the wire length prefix")]
    LengthOverflow(usize),

    /// A type witness nests deeper than decoders accept.
    #[error("type witness nesting exceeds {0} levels")]
    WitnessTooDeep(usize),

    /// An array of zero-width elements is longer than decoders accept.
    #[error("{count} zero-width elements exceed the limit of {max}")]
    TooManyZeroWidthElements { count: usize, max: usize },

    #[error(transparent)]
    Codec(#[from] CodecError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// A read would run past the end of the payload.
    #[error("payload truncated: needed {needed} bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    /// The payload offset handed to a decoder lies outside the payload.
    #[error("offset {offset} is outside a payload of {len} bytes")]
    OffsetOutOfRange { offset: usize, len: usize },

    /// Bytes were left over after the final field.
    #[error("{0} trailing bytes after the final field")]
    TrailingBytes(usize),

    /// A declared length cannot possibly fit in the remaining bytes.
    #[error("declared length {declared} cannot fit in {remaining} remaining bytes")]
    ImplausibleLength { declared: usize, remaining: usize },

    #[error("invalid length prefix {0}")]
    InvalidLength(i32),

    #[error("invalid bool byte {0:#04x}")]
    InvalidBool(u8),

    #[error("invalid presence flag {0:#04x}")]
    InvalidPresenceFlag(u8),

    #[error("string payload is not valid UTF-8")]
    InvalidUtf8,

    #[error("unknown type witness tag {0}")]
    UnknownTypeTag(u8),

    #[error("unknown member kind {0}")]
    UnknownMemberKind(u8),

    #[error("type witness nesting exceeds {0} levels")]
    WitnessTooDeep(usize),

    /// A declared count of zero-width elements exceeds the accepted limit.
    #[error("{declared} zero-width elements exceed the limit of {max}")]
    TooManyZeroWidthElements { declared: usize, max: usize },

    /// A decoded type witness cannot stand where it was found.
    #[error("type witness {0} is not valid here")]
    InvalidWitness(TypeRef),

    /// A metadata identity matched zero or several registered members.
    #[error("{kind:?} {declaring_type}::{name} matched {matches} registered members")]
    AmbiguousOrMissingMember {
        kind: MemberKind,
        declaring_type: String,
        name: String,
        matches: usize,
    },

    /// A decoded type witness has no codec (e.g. it names `member<Any>`).
    #[error(transparent)]
    Codec(#[from] CodecError),
}
