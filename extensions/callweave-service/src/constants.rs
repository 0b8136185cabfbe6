use std::time::Duration;

/// Timeout handed to the request processor when a proxy is built without
/// an explicit one.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Separator between `ServicePath` segments in their formatted form.
pub const PATH_SEPARATOR: char = '/';

/// Prefix of the method synthesized for a read-only, non-service property.
pub const PROPERTY_GETTER_PREFIX: &str = "get_";
