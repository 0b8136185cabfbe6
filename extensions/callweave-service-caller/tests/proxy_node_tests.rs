use callweave::codec::{CodecError, CodecFactory, DecodeError};
use callweave::types::{MemberKind, TypeRef, Value};
use callweave_service::{
    InterfaceShape, MethodShape, ParamShape, RemotingStyle, RpcResultStatus, ServiceDescription,
};
use callweave_service_caller::{
    CallArgs, CallReply, ClientCompiler, CompileError, OutgoingRequest, OutgoingRequestProcessor,
    RpcCallerError,
};
use example_callweave_service_definition::{
    echo_service_shape, my_service_shape, super_service_shape,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Records every request and answers from a queue of canned responses.
#[derive(Default)]
struct RecordingProcessor {
    requests: Mutex<Vec<OutgoingRequest>>,
    responses: Mutex<VecDeque<Result<Vec<u8>, RpcCallerError>>>,
    async_calls: AtomicUsize,
}

impl RecordingProcessor {
    fn respond_with(&self, payload: impl Into<Vec<u8>>) {
        self.responses.lock().unwrap().push_back(Ok(payload.into()));
    }

    fn fail_with(&self, err: RpcCallerError) {
        self.responses.lock().unwrap().push_back(Err(err));
    }

    fn requests(&self) -> Vec<OutgoingRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn answer(&self, request: OutgoingRequest) -> Result<Vec<u8>, RpcCallerError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(Vec::new()))
    }
}

#[async_trait::async_trait]
impl OutgoingRequestProcessor for RecordingProcessor {
    fn process(&self, request: OutgoingRequest) -> Result<Vec<u8>, RpcCallerError> {
        self.answer(request)
    }

    async fn process_async(&self, request: OutgoingRequest) -> Result<Vec<u8>, RpcCallerError> {
        self.async_calls.fetch_add(1, Ordering::SeqCst);
        self.answer(request)
    }
}

const TIMEOUT: Duration = Duration::from_secs(5);

fn compiler() -> (Arc<RecordingProcessor>, ClientCompiler) {
    let processor = Arc::new(RecordingProcessor::default());
    let compiler = ClientCompiler::new(processor.clone(), CodecFactory::default());
    (processor, compiler)
}

fn concat(parts: &[&[u8]]) -> Vec<u8> {
    parts.concat()
}

#[test]
fn test_proxy_identity_is_cached_per_scope_and_timeout() {
    let (_, compiler) = compiler();
    let description = ServiceDescription::build(&my_service_shape()).unwrap();

    let builder = compiler.builder_for(&description).unwrap();
    assert!(Arc::ptr_eq(&builder, &compiler.builder_for(&description).unwrap()));

    let unscoped = builder.build(None, TIMEOUT);
    assert!(Arc::ptr_eq(&unscoped, &builder.build(None, TIMEOUT)));

    let a = builder.build(Some("a"), TIMEOUT);
    let b = builder.build(Some("b"), TIMEOUT);
    assert!(!Arc::ptr_eq(&a, &b));
    assert!(Arc::ptr_eq(&a, &builder.build(Some("a"), TIMEOUT)));

    let longer = builder.build(None, TIMEOUT * 2);
    assert!(!Arc::ptr_eq(&unscoped, &longer));

    assert_eq!(builder.node_count(), 4);
}

#[test]
fn test_subservice_calls_compose_the_path() {
    let (processor, compiler) = compiler();
    let description = ServiceDescription::build(&super_service_shape()).unwrap();
    let root = compiler
        .build_proxy(&description, Some("tenant-1"), TIMEOUT)
        .unwrap();

    let trivial = root.subservice("Trivial").unwrap();
    assert!(Arc::ptr_eq(trivial, root.subservice("Trivial").unwrap()));
    assert_eq!(trivial.path(), ["SuperService", "Trivial"]);
    assert_eq!(trivial.scope(), Some("tenant-1"));
    assert_eq!(trivial.timeout(), TIMEOUT);

    processor.respond_with(14i32.to_le_bytes());
    let reply = trivial.call("DoSomething", vec![Value::I32(7)]).unwrap();
    assert_eq!(reply.return_value, Value::I32(14));

    let request = &processor.requests()[0];
    assert_eq!(request.path.format(), "SuperService/Trivial/DoSomething");
    assert_eq!(request.path.segments(), ["SuperService", "Trivial", "DoSomething"]);
    assert_eq!(&*request.interface_id, "Demo.ISuperService");
    assert_eq!(request.scope.as_deref(), Some("tenant-1"));
    assert_eq!(request.timeout, TIMEOUT);
    assert_eq!(request.payload, Some(7i32.to_le_bytes().to_vec()));
}

#[test]
fn test_empty_request_sends_no_payload_and_void_reply_is_discarded() {
    let (processor, compiler) = compiler();
    let description = ServiceDescription::build(&super_service_shape()).unwrap();
    let root = compiler.build_proxy(&description, None, TIMEOUT).unwrap();

    // Not a valid encoding of anything; a void Direct call never decodes it.
    processor.respond_with(vec![0xde_u8, 0xad]);
    let reply = root.call("Ping", ()).unwrap();

    assert_eq!(reply.return_value, Value::Unit);
    assert!(reply.response_parameters.is_empty());
    assert_eq!(processor.requests()[0].payload, None);
}

#[test]
fn test_direct_reply_decodes_response_parameters_before_return_value() {
    let (processor, compiler) = compiler();
    let description = ServiceDescription::build(&my_service_shape()).unwrap();
    let proxy = compiler.build_proxy(&description, None, TIMEOUT).unwrap();

    processor.respond_with(concat(&[&2i32.to_le_bytes(), &3i32.to_le_bytes()]));
    let reply = proxy
        .call("DivRem", vec![Value::I32(17), Value::I32(5)])
        .unwrap();

    assert_eq!(reply.response_parameters, vec![Value::I32(2)]);
    assert_eq!(reply.return_value, Value::I32(3));
    assert_eq!(
        processor.requests()[0].payload,
        Some(concat(&[&17i32.to_le_bytes(), &5i32.to_le_bytes()]))
    );
}

#[test]
fn test_ref_parameters_travel_both_ways() {
    let (processor, compiler) = compiler();
    let description = ServiceDescription::build(&my_service_shape()).unwrap();
    let proxy = compiler.build_proxy(&description, None, TIMEOUT).unwrap();

    processor.respond_with(15i64.to_le_bytes());
    let reply = proxy
        .call("Accumulate", vec![Value::I64(10), Value::I32(5)])
        .unwrap();

    assert_eq!(reply.response_parameters, vec![Value::I64(15)]);
    assert_eq!(reply.return_value, Value::Unit);
    assert_eq!(
        processor.requests()[0].payload,
        Some(concat(&[&10i64.to_le_bytes(), &5i32.to_le_bytes()]))
    );
}

#[test]
fn test_generic_witnesses_precede_parameters() {
    let (processor, compiler) = compiler();
    let description = ServiceDescription::build(&echo_service_shape()).unwrap();
    let proxy = compiler.build_proxy(&description, None, TIMEOUT).unwrap();

    processor.respond_with(123i32.to_le_bytes());
    let reply = proxy
        .call(
            "Echo",
            CallArgs::generic(vec![TypeRef::I32], vec![Value::I32(123)]),
        )
        .unwrap();
    assert_eq!(reply.return_value, Value::I32(123));

    // Type tag of i32, then the value.
    let mut expected = vec![4u8];
    expected.extend(123i32.to_le_bytes());
    assert_eq!(processor.requests()[0].payload, Some(expected));
}

#[test]
fn test_generic_method_without_parameters_still_sends_witnesses() {
    let (processor, compiler) = compiler();
    let description = ServiceDescription::build(&echo_service_shape()).unwrap();
    let proxy = compiler.build_proxy(&description, None, TIMEOUT).unwrap();

    let mut response = 6i32.to_le_bytes().to_vec();
    response.extend(b"string");
    processor.respond_with(response);

    let reply = proxy
        .call("Describe", CallArgs::generic(vec![TypeRef::String], Vec::new()))
        .unwrap();

    assert_eq!(reply.return_value, Value::from("string"));
    assert_eq!(processor.requests()[0].payload, Some(vec![12u8]));
}

#[test]
fn test_client_specializations_are_cached_per_type_arguments() {
    let (processor, compiler) = compiler();
    let description = ServiceDescription::build(&echo_service_shape()).unwrap();
    let proxy = compiler.build_proxy(&description, None, TIMEOUT).unwrap();

    for (type_arg, value, response) in [
        (TypeRef::I32, Value::I32(1), 1i32.to_le_bytes().to_vec()),
        (TypeRef::I32, Value::I32(2), 2i32.to_le_bytes().to_vec()),
        (TypeRef::Bool, Value::Bool(true), vec![1]),
    ] {
        processor.respond_with(response);
        proxy
            .call("Echo", CallArgs::generic(vec![type_arg], vec![value]))
            .unwrap();
    }

    assert_eq!(proxy.specialization_count("Echo"), 2);
    assert_eq!(proxy.specialization_count("Count"), 0);
}

#[tokio::test]
async fn test_async_with_retval_decodes_after_completion() {
    let (processor, compiler) = compiler();
    let description = ServiceDescription::build(&my_service_shape()).unwrap();
    let proxy = compiler.build_proxy(&description, None, TIMEOUT).unwrap();

    let mut greeting = 5i32.to_le_bytes().to_vec();
    greeting.extend(b"Hi Al");
    processor.respond_with(greeting);

    let pending = proxy.call_async("Greet", vec![Value::from("Al")]);
    assert_eq!(processor.async_calls.load(Ordering::SeqCst), 0);

    assert_eq!(pending.await.unwrap(), Value::from("Hi Al"));
    assert_eq!(processor.async_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_async_with_retval_reports_decode_failures_from_the_operation() {
    let (processor, compiler) = compiler();
    let description = ServiceDescription::build(&my_service_shape()).unwrap();
    let proxy = compiler.build_proxy(&description, None, TIMEOUT).unwrap();

    // Claims a 100-byte string but carries none.
    processor.respond_with(100i32.to_le_bytes());

    let result = proxy.call_async("Greet", vec![Value::from("Al")]).await;
    assert!(matches!(
        result,
        Err(RpcCallerError::Decode(DecodeError::Truncated { .. }))
    ));
}

#[tokio::test]
async fn test_async_void_ignores_the_payload() {
    let (processor, compiler) = compiler();
    let description = ServiceDescription::build(&my_service_shape()).unwrap();
    let proxy = compiler.build_proxy(&description, None, TIMEOUT).unwrap();

    processor.respond_with(vec![0xff_u8; 3]);

    let result = proxy.call_async("Notify", vec![Value::from("hello")]).await;
    assert_eq!(result.unwrap(), Value::Unit);
}

#[tokio::test]
async fn test_async_call_is_sent_only_when_polled() {
    let (processor, compiler) = compiler();
    let description = ServiceDescription::build(&my_service_shape()).unwrap();
    let proxy = compiler.build_proxy(&description, None, TIMEOUT).unwrap();

    drop(proxy.call_async("Notify", vec![Value::from("dropped")]));
    assert!(processor.requests().is_empty());

    let pending = proxy.call_async("Notify", vec![Value::from("kept")]);
    assert!(processor.requests().is_empty());

    assert_eq!(pending.await.unwrap(), Value::Unit);
    assert_eq!(processor.requests().len(), 1);
    assert_eq!(processor.async_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_invoke_dispatches_by_remoting_style() {
    let (processor, compiler) = compiler();
    let description = ServiceDescription::build(&my_service_shape()).unwrap();
    let proxy = compiler.build_proxy(&description, None, TIMEOUT).unwrap();

    processor.respond_with(130i32.to_le_bytes());
    match proxy
        .invoke("Add", vec![Value::I32(123), Value::I32(7)])
        .unwrap()
    {
        CallReply::Direct(reply) => assert_eq!(reply.return_value, Value::I32(130)),
        CallReply::Pending(_) => panic!("Add is a Direct method"),
    }

    match proxy.invoke("Notify", vec![Value::from("x")]).unwrap() {
        CallReply::Pending(pending) => assert_eq!(pending.await.unwrap(), Value::Unit),
        CallReply::Direct(_) => panic!("Notify is an async method"),
    }
}

#[tokio::test]
async fn test_remoting_mismatch_is_rejected_before_sending() {
    let (processor, compiler) = compiler();
    let description = ServiceDescription::build(&my_service_shape()).unwrap();
    let proxy = compiler.build_proxy(&description, None, TIMEOUT).unwrap();

    assert!(matches!(
        proxy.call("Greet", vec![Value::from("Al")]),
        Err(RpcCallerError::RemotingMismatch {
            style: RemotingStyle::AsyncWithRetval,
            ..
        })
    ));

    assert!(matches!(
        proxy
            .call_async("Add", vec![Value::I32(1), Value::I32(2)])
            .await,
        Err(RpcCallerError::RemotingMismatch {
            style: RemotingStyle::Direct,
            ..
        })
    ));

    assert!(processor.requests().is_empty());
}

#[test]
fn test_argument_errors_are_reported_locally() {
    let (processor, compiler) = compiler();

    let my_service = ServiceDescription::build(&my_service_shape()).unwrap();
    let proxy = compiler.build_proxy(&my_service, None, TIMEOUT).unwrap();

    assert!(matches!(
        proxy.call("Add", vec![Value::I32(1)]),
        Err(RpcCallerError::ArgumentCount {
            expected: 2,
            found: 1,
            ..
        })
    ));
    assert!(matches!(
        proxy.call("Add", vec![Value::I32(1), Value::from("two")]),
        Err(RpcCallerError::Encode(_))
    ));
    assert!(matches!(
        proxy.call("Subtract", ()),
        Err(RpcCallerError::UnknownMethod { .. })
    ));

    let echo = ServiceDescription::build(&echo_service_shape()).unwrap();
    let proxy = compiler.build_proxy(&echo, None, TIMEOUT).unwrap();

    assert!(matches!(
        proxy.call("Echo", vec![Value::I32(1)]),
        Err(RpcCallerError::GenericArgumentCount {
            expected: 1,
            found: 0,
            ..
        })
    ));
    assert!(matches!(
        proxy.call(
            "Echo",
            CallArgs::generic(vec![TypeRef::Generic(0)], vec![Value::I32(1)])
        ),
        Err(RpcCallerError::OpenTypeArgument(TypeRef::Generic(0)))
    ));
    assert!(matches!(
        proxy.call(
            "Echo",
            CallArgs::generic(vec![TypeRef::Member(MemberKind::Any)], vec![Value::Null])
        ),
        Err(RpcCallerError::Codec(CodecError::UnsupportedMemberKind(MemberKind::Any)))
    ));

    // Describe has no T-typed parameter, so only the witness check can catch these.
    match proxy.call(
        "Describe",
        CallArgs::generic(vec![TypeRef::pending(TypeRef::I32)], Vec::new()),
    ) {
        Err(RpcCallerError::Codec(CodecError::PendingType(witness))) => {
            assert_eq!(witness, TypeRef::pending(TypeRef::I32));
        }
        Err(other) => panic!("expected a codec failure, got {other:?}"),
        Ok(_) => panic!("pending<i32> is not a valid type argument"),
    }
    assert!(matches!(
        proxy.call(
            "Describe",
            CallArgs::generic(vec![TypeRef::Member(MemberKind::Any)], Vec::new())
        ),
        Err(RpcCallerError::Codec(CodecError::UnsupportedMemberKind(MemberKind::Any)))
    ));
    assert_eq!(proxy.specialization_count("Describe"), 0);

    assert!(processor.requests().is_empty());
}

#[test]
fn test_remote_failures_pass_through() {
    let (processor, compiler) = compiler();
    let description = ServiceDescription::build(&my_service_shape()).unwrap();
    let proxy = compiler.build_proxy(&description, None, TIMEOUT).unwrap();

    processor.fail_with(RpcCallerError::Remote {
        status: RpcResultStatus::Fail,
        message: "division by zero".to_owned(),
    });

    match proxy.call("DivRem", vec![Value::I32(1), Value::I32(0)]) {
        Err(RpcCallerError::Remote { status, message }) => {
            assert_eq!(status, RpcResultStatus::Fail);
            assert_eq!(message, "division by zero");
        }
        other => panic!("expected a remote failure, got {other:?}"),
    }
}

#[test]
fn test_codec_coverage_gap_fails_compilation() {
    let (_, compiler) = compiler();
    let shape = InterfaceShape::new("Demo.IReflective").method(
        MethodShape::new("Inspect", TypeRef::Unit)
            .param(ParamShape::val("member", TypeRef::Member(MemberKind::Any))),
    );
    let description = ServiceDescription::build(&shape).unwrap();

    assert_eq!(
        compiler.compile(&description).err(),
        Some(CompileError::Codec {
            method: "Inspect".to_owned(),
            source: CodecError::UnsupportedMemberKind(MemberKind::Any),
        })
    );
}
