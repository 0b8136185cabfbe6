use callweave_service::{PathError, RpcResultStatus, ServicePath, route_id};

#[test]
fn test_parse_and_format() {
    let path = ServicePath::parse("SuperService/Trivial/DoSomething").unwrap();

    assert_eq!(path.root(), "SuperService");
    assert_eq!(path.subservices(), ["Trivial".to_owned()]);
    assert_eq!(path.method(), "DoSomething");
    assert_eq!(path.format(), "SuperService/Trivial/DoSomething");
    assert_eq!(path.to_string(), path.format());
}

#[test]
fn test_equality_is_positional() {
    let a = ServicePath::new(["Root", "Sub", "Method"]).unwrap();
    let b = ServicePath::parse("Root/Sub/Method").unwrap();
    let c = ServicePath::parse("Root/Method/Sub").unwrap();

    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn test_for_method_appends_to_a_prefix() {
    let prefix = vec!["SuperService".to_owned(), "Trivial".to_owned()];
    let path = ServicePath::for_method(&prefix, "DoSomething").unwrap();

    assert_eq!(path, ServicePath::parse("SuperService/Trivial/DoSomething").unwrap());
}

#[test]
fn test_invalid_paths_are_rejected() {
    assert_eq!(ServicePath::parse("Lonely"), Err(PathError::TooFewSegments(1)));
    assert_eq!(ServicePath::parse("Root//Method"), Err(PathError::EmptySegment(1)));
    assert_eq!(ServicePath::parse("Root/"), Err(PathError::EmptySegment(1)));
    assert_eq!(
        ServicePath::new(Vec::<String>::new()),
        Err(PathError::TooFewSegments(0))
    );
}

#[test]
fn test_route_id_matches_macro() {
    const ADD: u64 = route_id!("MyService/Add");

    let path = ServicePath::parse("MyService/Add").unwrap();
    assert_eq!(path.route_id(), ADD);
    assert_ne!(ADD, route_id!("MyService/Sub"));
}

#[test]
fn test_result_status_wire_values() {
    assert_eq!(u8::from(RpcResultStatus::Success), 0);
    assert_eq!(u8::from(RpcResultStatus::BadRequest), 4);
    assert_eq!(
        RpcResultStatus::try_from(3).ok(),
        Some(RpcResultStatus::MethodNotFound)
    );
    assert!(RpcResultStatus::try_from(9).is_err());
}
