mod dispatcher;
pub use dispatcher::*;

mod endpoint;
pub use endpoint::*;

pub mod error;
pub use error::{DispatchError, RpcServiceEndpointError};

mod handler;
pub use handler::*;

mod loopback;
pub use loopback::*;
