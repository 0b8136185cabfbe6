use callweave::codec::{CodecError, DecodeError, ReadCursor};
use callweave::types::{MemberKind, TypeRef, Value};
use callweave_service::{
    ImplReply, ImplementationError, MethodCall, RemotingStyle, RoutingError, RpcResultStatus,
    ServiceDescription, ServiceImplementation, ServicePath,
};
use callweave_service_endpoint::{DispatchError, Dispatcher, GenericHandler, Handler};
use example_callweave_service_definition::{
    EchoServiceImpl, MyServiceImpl, SuperServiceImpl, echo_service_shape, my_service_shape,
    super_service_shape,
};
use std::sync::Arc;

fn handler_for(description: &ServiceDescription, path: &str) -> Handler {
    Dispatcher::default()
        .create_handler(description, &ServicePath::parse(path).unwrap())
        .unwrap()
}

fn my_service_handler(method: &str) -> Handler {
    let description = ServiceDescription::build(&my_service_shape()).unwrap();
    handler_for(&description, &format!("MyService/{method}"))
}

fn generic_handler(method: &str) -> Arc<GenericHandler> {
    let description = ServiceDescription::build(&echo_service_shape()).unwrap();
    match handler_for(&description, &format!("EchoService/{method}")) {
        Handler::Generic(handler) => handler,
        Handler::Concrete(_) => panic!("{method} should get a generic handler"),
    }
}

fn i32s(values: &[i32]) -> Vec<u8> {
    values.iter().flat_map(|value| value.to_le_bytes()).collect()
}

fn string(value: &str) -> Vec<u8> {
    let mut out = (value.len() as i32).to_le_bytes().to_vec();
    out.extend_from_slice(value.as_bytes());
    out
}

fn my_service() -> Arc<dyn ServiceImplementation> {
    Arc::new(MyServiceImpl::new())
}

/// Answers Direct methods with pending operations and async methods with
/// ready values.
struct InvertedImpl;

impl ServiceImplementation for InvertedImpl {
    fn invoke(&self, call: &mut MethodCall) -> Result<ImplReply, ImplementationError> {
        match call.name() {
            "Add" => Ok(ImplReply::pending(async {
                Ok(Value::from(0))
            })),
            "Greet" => Ok(ImplReply::ready("right away")),
            other => Err(ImplementationError::new(format!("unexpected {other}"))),
        }
    }
}

#[test]
fn test_create_handler_picks_handler_kind() {
    let super_description = ServiceDescription::build(&super_service_shape()).unwrap();
    let handler = handler_for(&super_description, "SuperService/Trivial/DoSomething");
    assert!(matches!(handler, Handler::Concrete(_)));
    assert_eq!(handler.path().format(), "SuperService/Trivial/DoSomething");

    let echo_description = ServiceDescription::build(&echo_service_shape()).unwrap();
    let handler = handler_for(&echo_description, "EchoService/Echo");
    assert!(matches!(handler, Handler::Generic(_)));
}

#[test]
fn test_create_handler_rejects_unknown_segments() {
    let description = ServiceDescription::build(&super_service_shape()).unwrap();
    let dispatcher = Dispatcher::default();

    for (path, kind, segment) in [
        ("SuperService/Missing", "method", "Missing"),
        ("SuperService/Nested/DoSomething", "sub-service", "Nested"),
        ("SuperService/Trivial/Ping", "method", "Ping"),
        ("OtherService/Ping", "service", "OtherService"),
    ] {
        let err = dispatcher
            .create_handler(&description, &ServicePath::parse(path).unwrap())
            .unwrap_err();

        assert_eq!(
            err,
            DispatchError::Routing(RoutingError::InvalidPath {
                path: path.to_owned(),
                kind,
                segment: segment.to_owned(),
            })
        );
        assert_eq!(err.status(), RpcResultStatus::MethodNotFound);
    }
}

#[tokio::test]
async fn test_add_decodes_arguments_and_encodes_result() {
    let handler = my_service_handler("Add");

    let response = handler
        .handle(my_service(), &i32s(&[123, 7]), 0)
        .await
        .unwrap();

    assert_eq!(response, 130i32.to_le_bytes());
}

#[tokio::test]
async fn test_same_path_gives_identical_outputs() {
    let first = my_service_handler("Add");
    let second = my_service_handler("Add");
    let payload = i32s(&[-40, 2]);

    let a = first.handle(my_service(), &payload, 0).await;
    let b = second.handle(my_service(), &payload, 0).await;

    assert_eq!(a, b);
    assert_eq!(a.unwrap(), (-38i32).to_le_bytes());
}

#[tokio::test]
async fn test_decoding_starts_at_offset() {
    let handler = my_service_handler("Add");

    let mut payload = vec![0xaa, 0xbb, 0xcc];
    payload.extend(i32s(&[20, 22]));

    let response = handler.handle(my_service(), &payload, 3).await.unwrap();
    assert_eq!(response, 42i32.to_le_bytes());

    let err = handler.handle(my_service(), &payload, 64).await.unwrap_err();
    assert_eq!(
        err,
        DispatchError::Decode(DecodeError::OffsetOutOfRange {
            offset: 64,
            len: payload.len()
        })
    );
}

#[tokio::test]
async fn test_out_parameter_precedes_return_value() {
    let handler = my_service_handler("DivRem");

    let response = handler
        .handle(my_service(), &i32s(&[17, 5]), 0)
        .await
        .unwrap();

    // remainder, then quotient
    assert_eq!(response, i32s(&[2, 3]));
}

#[tokio::test]
async fn test_ref_parameter_is_sent_back() {
    let handler = my_service_handler("Accumulate");

    let mut payload = 10i64.to_le_bytes().to_vec();
    payload.extend(5i32.to_le_bytes());

    let response = handler.handle(my_service(), &payload, 0).await.unwrap();
    assert_eq!(response, 15i64.to_le_bytes());
}

#[tokio::test]
async fn test_async_with_retval_encodes_return_only() {
    let handler = my_service_handler("Greet");

    let response = handler
        .handle(my_service(), &string("Ada"), 0)
        .await
        .unwrap();

    assert_eq!(response, string("Hello, Ada!"));
}

#[tokio::test]
async fn test_async_void_completes_with_empty_payload() {
    let handler = my_service_handler("Notify");
    let implementation = Arc::new(MyServiceImpl::new());

    let response = handler
        .handle(implementation.clone(), &string("ping"), 0)
        .await
        .unwrap();

    assert!(response.is_empty());
    assert_eq!(implementation.notifications(), 1);
}

#[tokio::test]
async fn test_ready_value_for_async_method_counts_as_completed() {
    let handler = my_service_handler("Greet");

    let response = handler
        .handle(Arc::new(InvertedImpl), &string("anyone"), 0)
        .await
        .unwrap();

    assert_eq!(response, string("right away"));
}

#[tokio::test]
async fn test_pending_reply_for_direct_method_is_a_system_error() {
    let handler = my_service_handler("Add");

    let err = handler
        .handle(Arc::new(InvertedImpl), &i32s(&[1, 2]), 0)
        .await
        .unwrap_err();

    assert_eq!(
        err,
        DispatchError::ReplyMismatch {
            method: "Add".to_owned(),
            style: RemotingStyle::Direct,
        }
    );
    assert_eq!(err.status(), RpcResultStatus::SystemError);
}

#[tokio::test]
async fn test_subservice_call_reaches_leaf_implementation() {
    let description = ServiceDescription::build(&super_service_shape()).unwrap();
    let handler = handler_for(&description, "SuperService/Trivial/DoSomething");
    let root = Arc::new(SuperServiceImpl::new());

    let response = handler.handle(root.clone(), &i32s(&[21]), 0).await.unwrap();

    assert_eq!(response, 42i32.to_le_bytes());
    assert_eq!(root.trivial().calls(), 1);
}

#[tokio::test]
async fn test_missing_subservice_implementation() {
    let description = ServiceDescription::build(&super_service_shape()).unwrap();
    let handler = handler_for(&description, "SuperService/Trivial/DoSomething");

    let err = handler
        .handle(my_service(), &i32s(&[21]), 0)
        .await
        .unwrap_err();

    assert_eq!(
        err,
        DispatchError::SubserviceUnavailable {
            path: "SuperService/Trivial/DoSomething".to_owned(),
            name: "Trivial".to_owned(),
        }
    );
    assert_eq!(err.status(), RpcResultStatus::SystemError);
}

#[tokio::test]
async fn test_malformed_payloads_are_bad_requests() {
    let handler = my_service_handler("Add");

    let truncated = handler
        .handle(my_service(), &[1, 0, 0, 0, 2], 0)
        .await
        .unwrap_err();
    assert_eq!(
        truncated,
        DispatchError::Decode(DecodeError::Truncated {
            needed: 4,
            remaining: 1
        })
    );
    assert_eq!(truncated.status(), RpcResultStatus::BadRequest);

    let mut trailing = i32s(&[1, 2]);
    trailing.push(0);
    let err = handler.handle(my_service(), &trailing, 0).await.unwrap_err();
    assert_eq!(err, DispatchError::Decode(DecodeError::TrailingBytes(1)));
    assert_eq!(err.status(), RpcResultStatus::BadRequest);
}

#[tokio::test]
async fn test_implementation_failure_maps_to_fail() {
    let handler = my_service_handler("DivRem");

    let err = handler
        .handle(my_service(), &i32s(&[1, 0]), 0)
        .await
        .unwrap_err();

    assert_eq!(
        err,
        DispatchError::Implementation(ImplementationError::new("division by zero"))
    );
    assert_eq!(err.status(), RpcResultStatus::Fail);
}

#[tokio::test]
async fn test_generic_handler_specializes_per_type_arguments() {
    let generic = generic_handler("Echo");
    let handler = Handler::Generic(generic.clone());
    let implementation: Arc<dyn ServiceImplementation> = Arc::new(EchoServiceImpl);

    let mut int_payload = vec![4];
    int_payload.extend(99i32.to_le_bytes());
    let response = handler
        .handle(implementation.clone(), &int_payload, 0)
        .await
        .unwrap();
    assert_eq!(response, 99i32.to_le_bytes());

    let response = handler
        .handle(implementation.clone(), &int_payload, 0)
        .await
        .unwrap();
    assert_eq!(response, 99i32.to_le_bytes());
    assert_eq!(generic.specialization_count(), 1);

    let mut string_payload = vec![12];
    string_payload.extend(string("echo"));
    let response = handler
        .handle(implementation, &string_payload, 0)
        .await
        .unwrap();
    assert_eq!(response, string("echo"));
    assert_eq!(generic.specialization_count(), 2);
}

#[test]
fn test_generic_handler_reuses_specialization_instances() {
    let generic = generic_handler("Echo");

    let first = generic.specialize(&mut ReadCursor::new(&[5])).unwrap();
    let again = generic.specialize(&mut ReadCursor::new(&[5])).unwrap();
    let other = generic.specialize(&mut ReadCursor::new(&[14, 5])).unwrap();

    assert!(Arc::ptr_eq(&first, &again));
    assert!(!Arc::ptr_eq(&first, &other));
    assert_eq!(first.type_args(), [TypeRef::I64]);
    assert_eq!(other.type_args(), [TypeRef::array(TypeRef::I64)]);
}

#[test]
fn test_concurrent_first_specializations_keep_one_instance() {
    let generic = generic_handler("Count");

    let threads: Vec<_> = (0..8)
        .map(|_| {
            let generic = generic.clone();
            std::thread::spawn(move || generic.specialize(&mut ReadCursor::new(&[12])).unwrap())
        })
        .collect();

    let built: Vec<_> = threads
        .into_iter()
        .map(|thread| thread.join().unwrap())
        .collect();

    assert_eq!(generic.specialization_count(), 1);
    for handler in &built {
        assert!(Arc::ptr_eq(handler, &built[0]));
    }
}

#[tokio::test]
async fn test_generic_witness_only_payload() {
    let handler = Handler::Generic(generic_handler("Describe"));

    let response = handler
        .handle(Arc::new(EchoServiceImpl), &[12], 0)
        .await
        .unwrap();

    assert_eq!(response, string("string"));
}

#[tokio::test]
async fn test_generic_array_argument_and_null() {
    let handler = Handler::Generic(generic_handler("Count"));

    let mut payload = vec![4];
    payload.extend(i32s(&[3, 7, 8, 9]));
    let response = handler
        .handle(Arc::new(EchoServiceImpl), &payload, 0)
        .await
        .unwrap();
    assert_eq!(response, 3i32.to_le_bytes());

    let mut payload = vec![4];
    payload.extend((-1i32).to_le_bytes());
    let response = handler
        .handle(Arc::new(EchoServiceImpl), &payload, 0)
        .await
        .unwrap();
    assert_eq!(response, (-1i32).to_le_bytes());
}

#[tokio::test]
async fn test_invalid_witnesses_are_bad_requests() {
    let handler = Handler::Generic(generic_handler("Describe"));

    let cases = [
        (vec![0xff], DecodeError::UnknownTypeTag(0xff)),
        (
            vec![18, 0, 0],
            DecodeError::InvalidWitness(TypeRef::Generic(0)),
        ),
        (
            vec![19, 4],
            DecodeError::Codec(CodecError::PendingType(TypeRef::pending(TypeRef::I32))),
        ),
        (
            vec![17, 255],
            DecodeError::Codec(CodecError::UnsupportedMemberKind(MemberKind::Any)),
        ),
        (
            vec![],
            DecodeError::Truncated {
                needed: 1,
                remaining: 0,
            },
        ),
    ];

    for (payload, expected) in cases {
        let err = handler
            .handle(Arc::new(EchoServiceImpl), &payload, 0)
            .await
            .unwrap_err();

        assert_eq!(err, DispatchError::Decode(expected));
        assert_eq!(err.status(), RpcResultStatus::BadRequest);
    }

    // Describe never touches a T-typed value, yet no specialization was kept.
    match handler {
        Handler::Generic(generic) => assert_eq!(generic.specialization_count(), 0),
        Handler::Concrete(_) => unreachable!(),
    }
}

#[tokio::test]
async fn test_generic_async_method() {
    let handler = Handler::Generic(generic_handler("EchoLater"));

    // bool witness, then `true`
    let response = handler
        .handle(Arc::new(EchoServiceImpl), &[1, 1], 0)
        .await
        .unwrap();

    assert_eq!(response, [1]);
}
