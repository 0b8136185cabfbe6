use thiserror::Error;

/// Rejection of an interface shape while building its description.
///
/// Raised the first time a shape is compiled and never deferred to call
/// time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptionError {
    #[error("{kind} name {name:?} is not a valid identifier")]
    InvalidIdentifier { kind: &'static str, name: String },

    #[error("property {interface}.{property} has a setter; only read-only properties are supported")]
    PropertySetter { interface: String, property: String },

    #[error("{interface} declares more than one {kind} named {name:?}")]
    DuplicateName {
        interface: String,
        kind: &'static str,
        name: String,
    },

    #[error("{method} returns a pending operation but parameter {parameter:?} is passed by ref or out")]
    ByRefOnAsync { method: String, parameter: String },

    #[error("{method} references generic parameter T{index} but declares only {declared}")]
    UnknownGenericParameter {
        method: String,
        index: u16,
        declared: usize,
    },

    #[error("{method} uses a pending type outside of its return position")]
    MisplacedPending { method: String },

    #[error("{interface} contains itself as a sub-service")]
    RecursiveSubservice { interface: String },
}

/// A request named a route the description does not contain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    #[error("invalid path {path}: no {kind} named {segment:?}")]
    InvalidPath {
        path: String,
        kind: &'static str,
        segment: String,
    },
}
