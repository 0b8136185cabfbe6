use crate::types::MemberKind;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::fmt;

/// Describes the type of a method parameter, a return value, or a generic
/// type argument.
///
/// `TypeRef` is the runtime replacement for host-language reflection: every
/// codec is selected from a `TypeRef`, and tuples of `TypeRef` key the
/// generic specialization caches, which is why it is `Hash + Eq`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// No value (`void`). Encodes to zero bytes.
    Unit,
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    /// UTF-8 text. Reference type: may be null.
    String,
    /// Opaque byte blob. Reference type: may be null.
    Bytes,
    /// Ordered sequence of the element type. Reference type: may be null.
    Array(Box<TypeRef>),
    /// Optional value-type wrapper.
    Nullable(Box<TypeRef>),
    /// A type witness, i.e. a `TypeRef` carried as a value.
    Type,
    /// An identity-based metadata value describing a member of the given kind.
    Member(MemberKind),
    /// Placeholder for the generic parameter at the given position of the
    /// enclosing generic method.
    Generic(u16),
    /// A pending operation yielding the inner type. Only meaningful as the
    /// declared return type of an interface method; it selects the remoting
    /// style and never reaches a codec.
    Pending(Box<TypeRef>),
}

/// Wire tag of each `TypeRef` variant inside a type witness.
#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, TryFromPrimitive, IntoPrimitive)]
pub enum TypeTag {
    Unit = 0,
    Bool = 1,
    I8 = 2,
    I16 = 3,
    I32 = 4,
    I64 = 5,
    U8 = 6,
    U16 = 7,
    U32 = 8,
    U64 = 9,
    F32 = 10,
    F64 = 11,
    String = 12,
    Bytes = 13,
    Array = 14,
    Nullable = 15,
    Type = 16,
    Member = 17,
    Generic = 18,
    Pending = 19,
}

impl TypeRef {
    pub fn array(element: TypeRef) -> Self {
        TypeRef::Array(Box::new(element))
    }

    pub fn nullable(inner: TypeRef) -> Self {
        TypeRef::Nullable(Box::new(inner))
    }

    pub fn pending(inner: TypeRef) -> Self {
        TypeRef::Pending(Box::new(inner))
    }

    pub fn tag(&self) -> TypeTag {
        match self {
            TypeRef::Unit => TypeTag::Unit,
            TypeRef::Bool => TypeTag::Bool,
            TypeRef::I8 => TypeTag::I8,
            TypeRef::I16 => TypeTag::I16,
            TypeRef::I32 => TypeTag::I32,
            TypeRef::I64 => TypeTag::I64,
            TypeRef::U8 => TypeTag::U8,
            TypeRef::U16 => TypeTag::U16,
            TypeRef::U32 => TypeTag::U32,
            TypeRef::U64 => TypeTag::U64,
            TypeRef::F32 => TypeTag::F32,
            TypeRef::F64 => TypeTag::F64,
            TypeRef::String => TypeTag::String,
            TypeRef::Bytes => TypeTag::Bytes,
            TypeRef::Array(_) => TypeTag::Array,
            TypeRef::Nullable(_) => TypeTag::Nullable,
            TypeRef::Type => TypeTag::Type,
            TypeRef::Member(_) => TypeTag::Member,
            TypeRef::Generic(_) => TypeTag::Generic,
            TypeRef::Pending(_) => TypeTag::Pending,
        }
    }

    /// Whether values of this type may be null without a `Nullable` wrapper.
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            TypeRef::String
                | TypeRef::Bytes
                | TypeRef::Array(_)
                | TypeRef::Type
                | TypeRef::Member(_)
        )
    }

    /// Returns `true` if no generic placeholder occurs anywhere in this type.
    pub fn is_closed(&self) -> bool {
        match self {
            TypeRef::Generic(_) => false,
            TypeRef::Array(inner) | TypeRef::Nullable(inner) | TypeRef::Pending(inner) => {
                inner.is_closed()
            }
            _ => true,
        }
    }

    /// Returns the highest generic placeholder index referenced by this type.
    pub fn max_generic_index(&self) -> Option<u16> {
        match self {
            TypeRef::Generic(index) => Some(*index),
            TypeRef::Array(inner) | TypeRef::Nullable(inner) | TypeRef::Pending(inner) => {
                inner.max_generic_index()
            }
            _ => None,
        }
    }

    /// Replaces every `Generic(i)` placeholder with `arguments[i]`.
    ///
    /// Returns `None` if a placeholder index has no corresponding argument.
    pub fn substitute(&self, arguments: &[TypeRef]) -> Option<TypeRef> {
        Some(match self {
            TypeRef::Generic(index) => arguments.get(*index as usize)?.clone(),
            TypeRef::Array(inner) => TypeRef::array(inner.substitute(arguments)?),
            TypeRef::Nullable(inner) => TypeRef::nullable(inner.substitute(arguments)?),
            TypeRef::Pending(inner) => TypeRef::pending(inner.substitute(arguments)?),
            other => other.clone(),
        })
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Unit => write!(f, "unit"),
            TypeRef::Bool => write!(f, "bool"),
            TypeRef::I8 => write!(f, "i8"),
            TypeRef::I16 => write!(f, "i16"),
            TypeRef::I32 => write!(f, "i32"),
            TypeRef::I64 => write!(f, "i64"),
            TypeRef::U8 => write!(f, "u8"),
            TypeRef::U16 => write!(f, "u16"),
            TypeRef::U32 => write!(f, "u32"),
            TypeRef::U64 => write!(f, "u64"),
            TypeRef::F32 => write!(f, "f32"),
            TypeRef::F64 => write!(f, "f64"),
            TypeRef::String => write!(f, "string"),
            TypeRef::Bytes => write!(f, "bytes"),
            TypeRef::Array(inner) => write!(f, "array<{inner}>"),
            TypeRef::Nullable(inner) => write!(f, "nullable<{inner}>"),
            TypeRef::Type => write!(f, "type"),
            TypeRef::Member(kind) => write!(f, "member<{kind:?}>"),
            TypeRef::Generic(index) => write!(f, "T{index}"),
            TypeRef::Pending(inner) => write!(f, "pending<{inner}>"),
        }
    }
}
