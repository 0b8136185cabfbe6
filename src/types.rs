mod member;
mod member_registry;
mod type_ref;
mod value;

pub use member::{MemberHandle, MemberInfo, MemberKind};
pub use member_registry::MemberRegistry;
pub use type_ref::{TypeRef, TypeTag};
pub use value::{Value, ValueTypeError};
