use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Response category reported by the router for each request.
#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, TryFromPrimitive, IntoPrimitive)]
pub enum RpcResultStatus {
    Success = 0,
    /// The implementation ran and reported an application-level failure.
    Fail = 1,
    SystemError = 2,
    /// Unknown root service, sub-service or method, or no implementation
    /// available for the requested scope.
    MethodNotFound = 3,
    /// The payload could not be decoded.
    BadRequest = 4,
}
