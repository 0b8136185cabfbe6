pub mod constants;
pub use constants::*;

mod description;
pub use description::*;

mod description_cache;
pub use description_cache::*;

mod description_error;
pub use description_error::*;

mod interface_shape;
pub use interface_shape::*;

mod macros;
pub use macros::*;

mod member_surface;
pub use member_surface::*;

mod result_status;
pub use result_status::*;

mod server_interface;
pub use server_interface::*;

mod service_path;
pub use service_path::*;
