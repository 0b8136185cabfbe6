use crate::RpcServiceEndpoint;
use callweave_service_caller::{OutgoingRequest, OutgoingRequestProcessor, RpcCallerError};
use std::sync::Arc;

/// Feeds client requests straight into an in-process endpoint.
///
/// Timeouts are not enforced.
#[derive(Clone)]
pub struct LoopbackRequestProcessor {
    endpoint: Arc<RpcServiceEndpoint>,
}

impl LoopbackRequestProcessor {
    pub fn new(endpoint: Arc<RpcServiceEndpoint>) -> Self {
        Self { endpoint }
    }

    pub fn endpoint(&self) -> &Arc<RpcServiceEndpoint> {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl OutgoingRequestProcessor for LoopbackRequestProcessor {
    fn process(&self, request: OutgoingRequest) -> Result<Vec<u8>, RpcCallerError> {
        futures::executor::block_on(self.endpoint.handle(
            &request.path,
            request.scope.as_deref(),
            request.payload.as_deref(),
        ))
        .into_result()
    }

    async fn process_async(&self, request: OutgoingRequest) -> Result<Vec<u8>, RpcCallerError> {
        self.endpoint
            .handle(
                &request.path,
                request.scope.as_deref(),
                request.payload.as_deref(),
            )
            .await
            .into_result()
    }
}
