use callweave::codec::{CodecError, DecodeError, EncodeError};
use callweave::types::TypeRef;
use callweave_service::{PathError, RemotingStyle, RpcResultStatus};
use thiserror::Error;

/// Errors that can occur during a call, from the perspective of the caller.
#[derive(Debug, Error)]
pub enum RpcCallerError {
    /// The remote side answered with a non-success status. For `Fail` the
    /// message is the implementation's error text.
    #[error("remote call failed with {status:?}: {message}")]
    Remote {
        status: RpcResultStatus,
        message: String,
    },

    #[error("failed to encode the request: {0}")]
    Encode(#[from] EncodeError),

    #[error("failed to decode the response: {0}")]
    Decode(#[from] DecodeError),

    /// No codec could be built for a generic specialization.
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error("{method} takes {expected} request argument(s), got {found}")]
    ArgumentCount {
        method: String,
        expected: usize,
        found: usize,
    },

    #[error("{method} takes {expected} type argument(s), got {found}")]
    GenericArgumentCount {
        method: String,
        expected: usize,
        found: usize,
    },

    /// Type arguments must be closed types.
    #[error("type argument {0} is not a closed type")]
    OpenTypeArgument(TypeRef),

    #[error("{service} has no method named {method:?}")]
    UnknownMethod { service: String, method: String },

    /// `call` was used on an async method, or `call_async` on a Direct one.
    #[error("{method} is remoted as {style:?}")]
    RemotingMismatch { method: String, style: RemotingStyle },

    /// A transport-level failure reported by the request processor.
    #[error("transport error: {0}")]
    Transport(String),

    /// The operation was aborted before a result could be determined.
    #[error("call aborted")]
    Aborted,
}
