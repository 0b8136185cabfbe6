use callweave::types::{TypeRef, Value};
use callweave_service::{
    ImplReply, ImplementationError, InterfaceShape, MethodCall, MethodShape, ParamShape,
    PropertyShape, ServiceImplementation,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const MY_SERVICE_ID: &str = "Demo.IMyService";

pub const MY_SERVICE_VERSION: &str = "1.0";

pub fn my_service_shape() -> InterfaceShape {
    InterfaceShape::new(MY_SERVICE_ID)
        .method(
            MethodShape::new("Add", TypeRef::I32)
                .param(ParamShape::val("a", TypeRef::I32))
                .param(ParamShape::val("b", TypeRef::I32)),
        )
        .method(
            MethodShape::new("DivRem", TypeRef::I32)
                .param(ParamShape::val("a", TypeRef::I32))
                .param(ParamShape::val("b", TypeRef::I32))
                .param(ParamShape::out("remainder", TypeRef::I32)),
        )
        .method(
            MethodShape::new("Accumulate", TypeRef::Unit)
                .param(ParamShape::by_ref("total", TypeRef::I64))
                .param(ParamShape::val("amount", TypeRef::I32)),
        )
        .method(
            MethodShape::new("Greet", TypeRef::pending(TypeRef::String))
                .param(ParamShape::val("name", TypeRef::String)),
        )
        .method(
            MethodShape::new("Notify", TypeRef::pending(TypeRef::Unit))
                .param(ParamShape::val("message", TypeRef::String)),
        )
        .property(PropertyShape::value("Version", TypeRef::String))
}

#[derive(Debug, Default)]
pub struct MyServiceImpl {
    notifications: Arc<AtomicUsize>,
}

impl MyServiceImpl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `Notify` operations that have completed.
    pub fn notifications(&self) -> usize {
        self.notifications.load(Ordering::SeqCst)
    }
}

impl ServiceImplementation for MyServiceImpl {
    fn invoke(&self, call: &mut MethodCall) -> Result<ImplReply, ImplementationError> {
        match call.name() {
            "Add" => {
                let a: i32 = call.arg_as(0)?;
                let b: i32 = call.arg_as(1)?;
                Ok(ImplReply::ready(a.wrapping_add(b)))
            }
            "DivRem" => {
                let a: i32 = call.arg_as(0)?;
                let b: i32 = call.arg_as(1)?;
                if b == 0 {
                    return Err(ImplementationError::new("division by zero"));
                }
                call.set(2, a % b)?;
                Ok(ImplReply::ready(a / b))
            }
            "Accumulate" => {
                let total: i64 = call.arg_as(0)?;
                let amount: i32 = call.arg_as(1)?;
                call.set(0, total + i64::from(amount))?;
                Ok(ImplReply::ready(()))
            }
            "Greet" => {
                let name: String = call.arg_as(0)?;
                Ok(ImplReply::pending(async move {
                    Ok(Value::from(format!("Hello, {name}!")))
                }))
            }
            "Notify" => {
                let notifications = self.notifications.clone();
                Ok(ImplReply::pending(async move {
                    notifications.fetch_add(1, Ordering::SeqCst);
                    Ok(Value::Unit)
                }))
            }
            "get_Version" => Ok(ImplReply::ready(MY_SERVICE_VERSION)),
            other => Err(ImplementationError::new(format!(
                "MyService has no method {other}"
            ))),
        }
    }
}
