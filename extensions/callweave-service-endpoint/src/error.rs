use callweave::codec::{CodecError, DecodeError, EncodeError};
use callweave_service::{ImplementationError, RemotingStyle, RoutingError, RpcResultStatus};
use thiserror::Error;

/// Failure while creating a handler or handling one request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Routing(#[from] RoutingError),

    /// A codec could not be built for a non-generic handler.
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("malformed request payload: {0}")]
    Decode(#[from] DecodeError),

    #[error("failed to encode the response: {0}")]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Implementation(#[from] ImplementationError),

    /// The implementation does not provide a sub-service named on the path.
    #[error("implementation of {path} provides no sub-service {name:?}")]
    SubserviceUnavailable { path: String, name: String },

    /// A Direct method answered with a pending operation.
    #[error("{method} is remoted as {style:?} but the implementation returned a pending operation")]
    ReplyMismatch { method: String, style: RemotingStyle },
}

impl DispatchError {
    /// The response category the router reports for this error.
    pub fn status(&self) -> RpcResultStatus {
        match self {
            DispatchError::Routing(_) => RpcResultStatus::MethodNotFound,
            DispatchError::Decode(_) => RpcResultStatus::BadRequest,
            DispatchError::Implementation(_) => RpcResultStatus::Fail,
            DispatchError::Codec(_)
            | DispatchError::Encode(_)
            | DispatchError::SubserviceUnavailable { .. }
            | DispatchError::ReplyMismatch { .. } => RpcResultStatus::SystemError,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcServiceEndpointError {
    #[error("a service named {0:?} is already registered")]
    DuplicateService(String),
}
