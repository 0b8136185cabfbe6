use crate::RpcCallerError;
use callweave_service::ServicePath;
use std::sync::Arc;
use std::time::Duration;

/// Everything the transport needs to carry one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingRequest {
    /// Identity of the interface the proxy was compiled for.
    pub interface_id: Arc<str>,
    pub path: ServicePath,
    pub scope: Option<Arc<str>>,
    /// `None` when the call has neither generic arguments nor request bytes.
    pub payload: Option<Vec<u8>>,
    pub timeout: Duration,
}

/// The transport seam on the client side.
///
/// Implementations own framing, endpoint selection and timeouts; proxies
/// only hand them fully encoded requests.
#[async_trait::async_trait]
pub trait OutgoingRequestProcessor: Send + Sync {
    /// Carries a Direct call and blocks until the response payload arrives.
    fn process(&self, request: OutgoingRequest) -> Result<Vec<u8>, RpcCallerError>;

    /// Carries an async call; resolves to the response payload.
    async fn process_async(&self, request: OutgoingRequest) -> Result<Vec<u8>, RpcCallerError>;
}
