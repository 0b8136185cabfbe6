use callweave::types::{TypeRef, Value};
use callweave_service::{
    ImplReply, ImplementationError, InterfaceShape, MethodCall, MethodShape, ParamShape,
    ServiceImplementation,
};

pub const ECHO_SERVICE_ID: &str = "Demo.IEchoService";

/// Generic methods, each declaring a single type parameter `T`.
pub fn echo_service_shape() -> InterfaceShape {
    InterfaceShape::new(ECHO_SERVICE_ID)
        .method(
            MethodShape::new("Echo", TypeRef::Generic(0))
                .generic("T")
                .param(ParamShape::val("value", TypeRef::Generic(0))),
        )
        .method(
            MethodShape::new("Count", TypeRef::I32)
                .generic("T")
                .param(ParamShape::val("values", TypeRef::array(TypeRef::Generic(0)))),
        )
        .method(MethodShape::new("Describe", TypeRef::String).generic("T"))
        .method(
            MethodShape::new("EchoLater", TypeRef::pending(TypeRef::Generic(0)))
                .generic("T")
                .param(ParamShape::val("value", TypeRef::Generic(0))),
        )
}

#[derive(Debug, Default)]
pub struct EchoServiceImpl;

impl ServiceImplementation for EchoServiceImpl {
    fn invoke(&self, call: &mut MethodCall) -> Result<ImplReply, ImplementationError> {
        match call.name() {
            "Echo" => Ok(ImplReply::Value(call.arg(0)?.clone())),
            "Count" => match call.arg(0)? {
                Value::Array(items) => Ok(ImplReply::ready(items.len() as i32)),
                Value::Null => Ok(ImplReply::ready(-1)),
                other => Err(ImplementationError::new(format!(
                    "expected an array, found {}",
                    other.kind_name()
                ))),
            },
            "Describe" => {
                let described = call
                    .type_args()
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                Ok(ImplReply::ready(described))
            }
            "EchoLater" => {
                let value = call.arg(0)?.clone();
                Ok(ImplReply::pending(async move { Ok(value) }))
            }
            other => Err(ImplementationError::new(format!(
                "EchoService has no method {other}"
            ))),
        }
    }
}
