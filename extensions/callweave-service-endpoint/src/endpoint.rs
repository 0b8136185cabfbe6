use crate::{DispatchError, Dispatcher, Handler, RpcServiceEndpointError};
use callweave::codec::CodecFactory;
use callweave_service::{
    RoutingError, RpcResultStatus, ServiceDescription, ServiceImplementation, ServicePath,
};
use callweave_service_caller::RpcCallerError;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;

/// Supplies the live implementation of a root service for a scope.
pub trait ImplementationResolver: Send + Sync {
    fn resolve(&self, scope: Option<&str>) -> Option<Arc<dyn ServiceImplementation>>;
}

impl<F> ImplementationResolver for F
where
    F: Fn(Option<&str>) -> Option<Arc<dyn ServiceImplementation>> + Send + Sync,
{
    fn resolve(&self, scope: Option<&str>) -> Option<Arc<dyn ServiceImplementation>> {
        self(scope)
    }
}

/// Serves one implementation for every scope.
pub struct SingletonResolver {
    implementation: Arc<dyn ServiceImplementation>,
}

impl SingletonResolver {
    pub fn new(implementation: Arc<dyn ServiceImplementation>) -> Self {
        Self { implementation }
    }
}

impl ImplementationResolver for SingletonResolver {
    fn resolve(&self, _scope: Option<&str>) -> Option<Arc<dyn ServiceImplementation>> {
        Some(self.implementation.clone())
    }
}

/// Outcome of one routed request.
///
/// On success `payload` holds the encoded response; otherwise it holds the
/// UTF-8 error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcResponse {
    pub status: RpcResultStatus,
    pub payload: Vec<u8>,
}

impl RpcResponse {
    pub fn success(payload: Vec<u8>) -> Self {
        Self {
            status: RpcResultStatus::Success,
            payload,
        }
    }

    pub fn failure(status: RpcResultStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            payload: message.into().into_bytes(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == RpcResultStatus::Success
    }

    /// Converts into what a client proxy expects from its processor.
    pub fn into_result(self) -> Result<Vec<u8>, RpcCallerError> {
        match self.status {
            RpcResultStatus::Success => Ok(self.payload),
            status => Err(RpcCallerError::Remote {
                status,
                message: String::from_utf8_lossy(&self.payload).into_owned(),
            }),
        }
    }
}

#[derive(Clone)]
struct RegisteredService {
    description: Arc<ServiceDescription>,
    resolver: Arc<dyn ImplementationResolver>,
}

/// Routes requests to registered services by their root service name.
pub struct RpcServiceEndpoint {
    dispatcher: Dispatcher,
    services: DashMap<String, RegisteredService>,
    handlers: DashMap<ServicePath, Handler>,
}

impl Default for RpcServiceEndpoint {
    fn default() -> Self {
        Self::new(CodecFactory::default())
    }
}

impl RpcServiceEndpoint {
    pub fn new(factory: CodecFactory) -> Self {
        Self {
            dispatcher: Dispatcher::new(factory),
            services: DashMap::new(),
            handlers: DashMap::new(),
        }
    }

    /// Registers a root service. Each root service name can be registered
    /// once.
    pub fn register(
        &self,
        description: Arc<ServiceDescription>,
        resolver: impl ImplementationResolver + 'static,
    ) -> Result<(), RpcServiceEndpointError> {
        match self.services.entry(description.name().to_owned()) {
            Entry::Occupied(entry) => {
                Err(RpcServiceEndpointError::DuplicateService(entry.key().clone()))
            }
            Entry::Vacant(entry) => {
                tracing::debug!(
                    service = description.name(),
                    interface = %description.interface_id(),
                    "registered service"
                );

                entry.insert(RegisteredService {
                    description,
                    resolver: Arc::new(resolver),
                });
                Ok(())
            }
        }
    }

    pub fn description(&self, service: &str) -> Option<Arc<ServiceDescription>> {
        self.services
            .get(service)
            .map(|entry| entry.description.clone())
    }

    /// Number of handlers created so far.
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// The cached handler for `path`, created on first use.
    pub fn handler(&self, path: &ServicePath) -> Result<Handler, DispatchError> {
        if let Some(existing) = self.handlers.get(path) {
            return Ok(existing.clone());
        }

        let description = self
            .description(path.root())
            .ok_or_else(|| DispatchError::Routing(unknown_root(path)))?;

        let handler = self.dispatcher.create_handler(&description, path)?;

        Ok(self
            .handlers
            .entry(path.clone())
            .or_insert(handler)
            .clone())
    }

    /// Handles one request and reports its outcome.
    pub async fn handle(
        &self,
        path: &ServicePath,
        scope: Option<&str>,
        payload: Option<&[u8]>,
    ) -> RpcResponse {
        let service = match self.services.get(path.root()) {
            Some(entry) => entry.value().clone(),
            None => return reject(path, &DispatchError::Routing(unknown_root(path))),
        };

        let handler = match self.handler(path) {
            Ok(handler) => handler,
            Err(err) => return reject(path, &err),
        };

        let Some(implementation) = service.resolver.resolve(scope) else {
            tracing::warn!(path = %path, scope = ?scope, "no implementation for scope");
            return RpcResponse::failure(
                RpcResultStatus::MethodNotFound,
                format!("no implementation of {} for scope {:?}", path.root(), scope),
            );
        };

        match handler
            .handle(implementation, payload.unwrap_or_default(), 0)
            .await
        {
            Ok(response) => RpcResponse::success(response),
            Err(err) => reject(path, &err),
        }
    }
}

fn unknown_root(path: &ServicePath) -> RoutingError {
    RoutingError::InvalidPath {
        path: path.format(),
        kind: "service",
        segment: path.root().to_owned(),
    }
}

fn reject(path: &ServicePath, err: &DispatchError) -> RpcResponse {
    let status = err.status();
    tracing::warn!(path = %path, status = ?status, error = %err, "rejected request");
    RpcResponse::failure(status, err.to_string())
}
