use xxhash_rust::const_xxh3::xxh3_64 as const_xxh3_64;

pub const fn route_id_hash(path: &str) -> u64 {
    const_xxh3_64(path.as_bytes())
}

/// Compile-time route ID generator using xxHash3.
///
/// Hashes the formatted service path (`Root/Sub/Method`) at compile time.
/// The result equals [`ServicePath::route_id`](crate::ServicePath::route_id)
/// for the same path, so transports that route by number can precompute
/// their tables.
///
/// ## Example
///
/// ```rust,no_run
/// use callweave_service::route_id;
/// let add = route_id!("MyService/Add");
/// let nested = route_id!("SuperService/Trivial/DoSomething");
/// assert_ne!(add, nested);
/// ```
#[macro_export]
macro_rules! route_id {
    ($path:literal) => {{
        const ID: u64 = $crate::route_id_hash($path);
        ID
    }};
}
