use crate::compiled_method::CompiledMethod;
use crate::proxy_node::CompiledService;
use crate::{OutgoingRequestProcessor, ProxyNode};
use callweave::codec::{CodecError, CodecFactory};
use callweave_service::{DEFAULT_CALL_TIMEOUT, RemotingStyle, ServiceDescription};
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("no codec for a parameter or return type of {method}: {source}")]
    Codec {
        method: String,
        #[source]
        source: CodecError,
    },

    #[error("{method} is remoted as {style:?} and cannot carry ref or out parameters")]
    ByRefOnAsync { method: String, style: RemotingStyle },
}

/// Turns service descriptions into proxy node builders bound to one
/// request processor.
pub struct ClientCompiler {
    processor: Arc<dyn OutgoingRequestProcessor>,
    factory: CodecFactory,
    builders: DashMap<Arc<str>, Arc<ProxyNodeBuilder>>,
}

impl ClientCompiler {
    pub fn new(processor: Arc<dyn OutgoingRequestProcessor>, factory: CodecFactory) -> Self {
        Self {
            processor,
            factory,
            builders: DashMap::new(),
        }
    }

    /// Compiles `description` into a fresh builder. Codecs for every
    /// non-generic method are built here, so coverage gaps surface now
    /// rather than at call time.
    pub fn compile(&self, description: &ServiceDescription) -> Result<ProxyNodeBuilder, CompileError> {
        let service = Arc::new(self.compile_service(description)?);

        tracing::debug!(
            interface = %description.interface_id(),
            service = description.name(),
            "compiled client proxy"
        );

        Ok(ProxyNodeBuilder {
            service,
            processor: self.processor.clone(),
            interface_id: description.interface_id().clone(),
            root: description.name().to_owned(),
            nodes: DashMap::new(),
        })
    }

    /// The cached builder for `description`'s interface, compiling it on
    /// first use.
    pub fn builder_for(
        &self,
        description: &ServiceDescription,
    ) -> Result<Arc<ProxyNodeBuilder>, CompileError> {
        if let Some(existing) = self.builders.get(description.interface_id()) {
            return Ok(existing.clone());
        }

        let built = Arc::new(self.compile(description)?);

        Ok(self
            .builders
            .entry(description.interface_id().clone())
            .or_insert(built)
            .clone())
    }

    pub fn build_proxy(
        &self,
        description: &ServiceDescription,
        scope: Option<&str>,
        timeout: Duration,
    ) -> Result<Arc<ProxyNode>, CompileError> {
        Ok(self.builder_for(description)?.build(scope, timeout))
    }

    fn compile_service(&self, description: &ServiceDescription) -> Result<CompiledService, CompileError> {
        let mut methods = HashMap::new();

        for method in description.methods() {
            if method.remoting() != RemotingStyle::Direct
                && method.response_parameters().next().is_some()
            {
                return Err(CompileError::ByRefOnAsync {
                    method: method.name().to_owned(),
                    style: method.remoting(),
                });
            }

            let compiled = CompiledMethod::new(method.clone(), &self.factory).map_err(|source| {
                CompileError::Codec {
                    method: method.name().to_owned(),
                    source,
                }
            })?;

            methods.insert(method.name().to_owned(), Arc::new(compiled));
        }

        let subservices = description
            .subservices()
            .iter()
            .map(|sub| {
                Ok((
                    sub.name().to_owned(),
                    Arc::new(self.compile_service(sub.description())?),
                ))
            })
            .collect::<Result<Vec<_>, CompileError>>()?;

        Ok(CompiledService {
            name: description.name().to_owned(),
            methods,
            subservices,
        })
    }
}

/// Builds proxy nodes for one compiled interface, caching them by
/// (scope, timeout).
pub struct ProxyNodeBuilder {
    service: Arc<CompiledService>,
    processor: Arc<dyn OutgoingRequestProcessor>,
    interface_id: Arc<str>,
    root: String,
    nodes: DashMap<(Option<Arc<str>>, Duration), Arc<ProxyNode>>,
}

impl ProxyNodeBuilder {
    /// Returns the node for `(scope, timeout)`; equal keys yield the same
    /// instance.
    pub fn build(&self, scope: Option<&str>, timeout: Duration) -> Arc<ProxyNode> {
        let key = (scope.map(Arc::<str>::from), timeout);

        if let Some(existing) = self.nodes.get(&key) {
            return existing.clone();
        }

        let node = Arc::new(ProxyNode::new(
            self.service.clone(),
            self.processor.clone(),
            self.interface_id.clone(),
            vec![self.root.clone()],
            key.0.clone(),
            timeout,
        ));

        tracing::debug!(
            service = %self.root,
            scope = ?scope,
            timeout_ms = timeout.as_millis() as u64,
            "built proxy node"
        );

        self.nodes.entry(key).or_insert(node).clone()
    }

    /// The unscoped node with the default call timeout.
    pub fn build_default(&self) -> Arc<ProxyNode> {
        self.build(None, DEFAULT_CALL_TIMEOUT)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}
