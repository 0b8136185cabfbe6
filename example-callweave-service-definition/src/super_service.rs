use callweave::types::TypeRef;
use callweave_service::{
    ImplReply, ImplementationError, InterfaceShape, MethodCall, MethodShape, ParamShape,
    ServiceImplementation,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const SUPER_SERVICE_ID: &str = "Demo.ISuperService";

pub const TRIVIAL_ID: &str = "Demo.ITrivial";

pub fn trivial_shape() -> InterfaceShape {
    InterfaceShape::new(TRIVIAL_ID).method(
        MethodShape::new("DoSomething", TypeRef::I32)
            .param(ParamShape::val("value", TypeRef::I32)),
    )
}

/// `SuperService` exposes `Trivial` as a read-only sub-service property.
pub fn super_service_shape() -> InterfaceShape {
    InterfaceShape::new(SUPER_SERVICE_ID)
        .method(MethodShape::new("Ping", TypeRef::Unit))
        .subservice("Trivial", Arc::new(trivial_shape()))
}

#[derive(Debug, Default)]
pub struct TrivialImpl {
    calls: AtomicUsize,
}

impl TrivialImpl {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ServiceImplementation for TrivialImpl {
    fn invoke(&self, call: &mut MethodCall) -> Result<ImplReply, ImplementationError> {
        match call.name() {
            "DoSomething" => {
                self.calls.fetch_add(1, Ordering::SeqCst);
                let value: i32 = call.arg_as(0)?;
                Ok(ImplReply::ready(value.wrapping_mul(2)))
            }
            other => Err(ImplementationError::new(format!(
                "Trivial has no method {other}"
            ))),
        }
    }
}

#[derive(Debug, Default)]
pub struct SuperServiceImpl {
    trivial: Arc<TrivialImpl>,
}

impl SuperServiceImpl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trivial(&self) -> &Arc<TrivialImpl> {
        &self.trivial
    }
}

impl ServiceImplementation for SuperServiceImpl {
    fn subservice(&self, name: &str) -> Option<Arc<dyn ServiceImplementation>> {
        match name {
            "Trivial" => Some(self.trivial.clone() as Arc<dyn ServiceImplementation>),
            _ => None,
        }
    }

    fn invoke(&self, call: &mut MethodCall) -> Result<ImplReply, ImplementationError> {
        match call.name() {
            "Ping" => Ok(ImplReply::ready(())),
            other => Err(ImplementationError::new(format!(
                "SuperService has no method {other}"
            ))),
        }
    }
}
