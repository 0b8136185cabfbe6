use crate::constants::CONSTRUCTOR_NAME;
use crate::types::TypeRef;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::sync::Arc;

/// The reflective member categories an identity-based codec can describe.
#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, TryFromPrimitive, IntoPrimitive)]
pub enum MemberKind {
    Method = 0,
    Field = 1,
    Property = 2,
    Constructor = 3,
    Event = 4,
    /// The abstract "any member" category. It has no codec; asking for one
    /// is a construction-time coverage error.
    Any = 255,
}

impl MemberKind {
    /// Callable members are matched by parameter list and generic arity in
    /// addition to their name.
    pub fn is_callable(self) -> bool {
        matches!(self, MemberKind::Method | MemberKind::Constructor)
    }
}

/// A member as registered in a [`MemberRegistry`](crate::types::MemberRegistry).
///
/// For generic methods, `parameter_types` is the open definition and may
/// reference `TypeRef::Generic(i)` for `i < generic_arity`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberInfo {
    pub declaring_type: String,
    pub name: String,
    pub kind: MemberKind,
    pub parameter_types: Vec<TypeRef>,
    pub generic_arity: u16,
}

impl MemberInfo {
    pub fn method(
        declaring_type: impl Into<String>,
        name: impl Into<String>,
        parameter_types: Vec<TypeRef>,
        generic_arity: u16,
    ) -> Self {
        Self {
            declaring_type: declaring_type.into(),
            name: name.into(),
            kind: MemberKind::Method,
            parameter_types,
            generic_arity,
        }
    }

    pub fn constructor(declaring_type: impl Into<String>, parameter_types: Vec<TypeRef>) -> Self {
        Self {
            declaring_type: declaring_type.into(),
            name: CONSTRUCTOR_NAME.to_owned(),
            kind: MemberKind::Constructor,
            parameter_types,
            generic_arity: 0,
        }
    }

    pub fn field(declaring_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self::simple(MemberKind::Field, declaring_type, name)
    }

    pub fn property(declaring_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self::simple(MemberKind::Property, declaring_type, name)
    }

    pub fn event(declaring_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self::simple(MemberKind::Event, declaring_type, name)
    }

    fn simple(kind: MemberKind, declaring_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            declaring_type: declaring_type.into(),
            name: name.into(),
            kind,
            parameter_types: Vec::new(),
            generic_arity: 0,
        }
    }
}

/// A resolved member, optionally constructed with generic type arguments.
///
/// This is the value carried by `Value::Member`. Its wire form is the
/// member's identity, never any state.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberHandle {
    info: Arc<MemberInfo>,
    generic_arguments: Vec<TypeRef>,
}

impl MemberHandle {
    pub fn new(info: Arc<MemberInfo>) -> Self {
        Self {
            info,
            generic_arguments: Vec::new(),
        }
    }

    /// Constructs a generic method with the given type arguments.
    ///
    /// Returns `None` if the argument count does not match the member's
    /// generic arity.
    pub fn constructed(info: Arc<MemberInfo>, generic_arguments: Vec<TypeRef>) -> Option<Self> {
        if generic_arguments.len() != info.generic_arity as usize {
            return None;
        }

        Some(Self {
            info,
            generic_arguments,
        })
    }

    pub fn info(&self) -> &Arc<MemberInfo> {
        &self.info
    }

    pub fn kind(&self) -> MemberKind {
        self.info.kind
    }

    pub fn generic_arguments(&self) -> &[TypeRef] {
        &self.generic_arguments
    }

    /// Parameter types as seen on this (possibly constructed) member.
    pub fn parameter_types(&self) -> Vec<TypeRef> {
        if self.generic_arguments.is_empty() {
            return self.info.parameter_types.clone();
        }

        self.info
            .parameter_types
            .iter()
            .map(|ty| {
                ty.substitute(&self.generic_arguments)
                    .unwrap_or_else(|| ty.clone())
            })
            .collect()
    }
}
