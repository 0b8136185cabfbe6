mod client_compiler;
pub use client_compiler::*;

mod compiled_method;

pub mod error;
pub use error::RpcCallerError;

mod proxy_node;
pub use proxy_node::*;

mod request_processor;
pub use request_processor::*;
