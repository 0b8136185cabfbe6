mod echo_service;
pub use echo_service::*;

mod my_service;
pub use my_service::*;

mod super_service;
pub use super_service::*;
