use crate::types::{MemberHandle, TypeRef};
use thiserror::Error;

/// A dynamically-typed value flowing through the codecs.
///
/// Which variant is legal for a given slot is decided by the slot's
/// [`TypeRef`]; codecs reject mismatches at encode time.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A null reference, or an absent `Nullable` value.
    Null,
    /// The single value of `TypeRef::Unit`.
    Unit,
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    String(String),
    Bytes(Vec<u8>),
    Array(Vec<Value>),
    Type(TypeRef),
    Member(MemberHandle),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short variant name, used in mismatch errors.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Unit => "unit",
            Value::Bool(_) => "bool",
            Value::I8(_) => "i8",
            Value::I16(_) => "i16",
            Value::I32(_) => "i32",
            Value::I64(_) => "i64",
            Value::U8(_) => "u8",
            Value::U16(_) => "u16",
            Value::U32(_) => "u32",
            Value::U64(_) => "u64",
            Value::F32(_) => "f32",
            Value::F64(_) => "f64",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Array(_) => "array",
            Value::Type(_) => "type",
            Value::Member(_) => "member",
        }
    }
}

/// Returned when converting a [`Value`] into a concrete Rust type fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected a {expected} value, found {found}")]
pub struct ValueTypeError {
    pub expected: &'static str,
    pub found: &'static str,
}

macro_rules! value_conversions {
    ($($ty:ty => $variant:ident, $name:literal;)*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(value)
                }
            }

            impl TryFrom<Value> for $ty {
                type Error = ValueTypeError;

                fn try_from(value: Value) -> Result<Self, Self::Error> {
                    match value {
                        Value::$variant(inner) => Ok(inner),
                        other => Err(ValueTypeError {
                            expected: $name,
                            found: other.kind_name(),
                        }),
                    }
                }
            }
        )*
    };
}

value_conversions! {
    bool => Bool, "bool";
    i8 => I8, "i8";
    i16 => I16, "i16";
    i32 => I32, "i32";
    i64 => I64, "i64";
    u8 => U8, "u8";
    u16 => U16, "u16";
    u32 => U32, "u32";
    u64 => U64, "u64";
    f32 => F32, "f32";
    f64 => F64, "f64";
    String => String, "string";
    Vec<u8> => Bytes, "bytes";
    TypeRef => Type, "type";
    MemberHandle => Member, "member";
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Unit
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
