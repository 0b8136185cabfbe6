use crate::MethodDescription;
use callweave::types::{TypeRef, Value, ValueTypeError};
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;

/// Application-level failure reported by a service implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ImplementationError {
    message: String,
}

impl ImplementationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<ValueTypeError> for ImplementationError {
    fn from(err: ValueTypeError) -> Self {
        Self::new(err.to_string())
    }
}

pub type PendingValue = BoxFuture<'static, Result<Value, ImplementationError>>;

/// What an implementation hands back from [`ServiceImplementation::invoke`].
pub enum ImplReply {
    /// The result of a Direct method. `Value::Unit` for void methods.
    Value(Value),
    /// The pending operation of an async method.
    Pending(PendingValue),
}

impl ImplReply {
    pub fn ready(value: impl Into<Value>) -> Self {
        ImplReply::Value(value.into())
    }

    pub fn pending<F>(future: F) -> Self
    where
        F: Future<Output = Result<Value, ImplementationError>> + Send + 'static,
    {
        ImplReply::Pending(Box::pin(future))
    }
}

/// A decoded call, as seen by the implementation.
///
/// `args` holds one slot per declared parameter. Val and Ref slots carry the
/// decoded request values; Out slots start as `Value::Null`. Ref and Out
/// slots are read back after `invoke` returns.
#[derive(Debug)]
pub struct MethodCall {
    method: Arc<MethodDescription>,
    type_args: Vec<TypeRef>,
    args: Vec<Value>,
}

impl MethodCall {
    pub fn new(method: Arc<MethodDescription>, type_args: Vec<TypeRef>, args: Vec<Value>) -> Self {
        Self {
            method,
            type_args,
            args,
        }
    }

    pub fn method(&self) -> &MethodDescription {
        &self.method
    }

    pub fn name(&self) -> &str {
        self.method.name()
    }

    /// Resolved generic arguments; empty for non-generic methods.
    pub fn type_args(&self) -> &[TypeRef] {
        &self.type_args
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn into_args(self) -> Vec<Value> {
        self.args
    }

    pub fn arg(&self, position: usize) -> Result<&Value, ImplementationError> {
        self.args.get(position).ok_or_else(|| {
            ImplementationError::new(format!(
                "{} has no parameter at position {position}",
                self.method.name()
            ))
        })
    }

    /// Converts the argument at `position` into a concrete Rust type.
    pub fn arg_as<T>(&self, position: usize) -> Result<T, ImplementationError>
    where
        T: TryFrom<Value, Error = ValueTypeError>,
    {
        Ok(T::try_from(self.arg(position)?.clone())?)
    }

    /// Stores the outgoing value of a Ref or Out parameter.
    pub fn set(&mut self, position: usize, value: impl Into<Value>) -> Result<(), ImplementationError> {
        let name = self.method.name().to_owned();
        let slot = self.args.get_mut(position).ok_or_else(|| {
            ImplementationError::new(format!("{name} has no parameter at position {position}"))
        })?;

        *slot = value.into();
        Ok(())
    }
}

/// The live object behind a service, invoked by the server dispatcher.
pub trait ServiceImplementation: Send + Sync {
    /// The implementation of the sub-service exposed as property `name`.
    fn subservice(&self, name: &str) -> Option<Arc<dyn ServiceImplementation>> {
        let _ = name;
        None
    }

    fn invoke(&self, call: &mut MethodCall) -> Result<ImplReply, ImplementationError>;
}
