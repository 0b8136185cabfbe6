/// Size in bytes of the length prefix carried by strings, byte blobs and arrays.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Length prefix value marking a null reference.
///
/// Any non-negative prefix is a valid (possibly empty) value, so the null
/// sentinel can never collide with a real encoding.
pub const NULL_LENGTH_PREFIX: i32 = -1;

/// Size in bytes of the presence flag written ahead of nullable values and
/// metadata member identities.
pub const PRESENCE_FLAG_SIZE: usize = 1;

/// Size in bytes of the small counters used inside type witnesses and member
/// identities (generic arity, argument counts, generic parameter indices).
pub const WITNESS_COUNT_SIZE: usize = 2;

/// Tag byte written in place of a type witness for a null `Type` value.
pub const NULL_WITNESS_TAG: u8 = 0xFF;

/// The deepest nesting of type witnesses (e.g. `array<array<...>>`) accepted
/// while decoding. Guards the recursive witness reader against hostile input.
pub const MAX_WITNESS_DEPTH: usize = 32;

/// Largest array accepted when its elements encode to zero bytes
/// (`array<unit>`). Such counts cannot be checked against the remaining
/// payload, so they are capped on both the encode and decode side.
pub const MAX_ZERO_WIDTH_ELEMENTS: usize = 1 << 16;

/// Name under which constructors are registered in a `MemberRegistry`.
pub const CONSTRUCTOR_NAME: &str = ".ctor";
