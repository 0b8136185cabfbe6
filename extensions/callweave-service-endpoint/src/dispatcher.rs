use crate::{ConcreteHandler, DispatchError, GenericHandler, Handler};
use callweave::codec::CodecFactory;
use callweave_service::{ServiceDescription, ServicePath};
use std::sync::Arc;

/// Creates server-side handlers for paths into a service description.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    factory: CodecFactory,
}

impl Dispatcher {
    pub fn new(factory: CodecFactory) -> Self {
        Self { factory }
    }

    pub fn factory(&self) -> &CodecFactory {
        &self.factory
    }

    /// Resolves `path` against `root` and builds its handler.
    ///
    /// Non-generic handlers get their codecs here. Generic handlers build
    /// one concrete handler per distinct set of type arguments as requests
    /// arrive.
    pub fn create_handler(
        &self,
        root: &ServiceDescription,
        path: &ServicePath,
    ) -> Result<Handler, DispatchError> {
        let (_, method) = root.resolve(path)?;

        let handler = if method.is_generic() {
            Handler::Generic(Arc::new(GenericHandler::new(
                path.clone(),
                method.clone(),
                self.factory.clone(),
            )))
        } else {
            Handler::Concrete(Arc::new(ConcreteHandler::build(
                path.clone(),
                method.clone(),
                &self.factory,
                Vec::new(),
            )?))
        };

        tracing::debug!(path = %path, generic = method.is_generic(), "created handler");

        Ok(handler)
    }
}
