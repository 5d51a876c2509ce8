pub mod auth;
pub mod extract;
pub mod response;

pub use auth::request_scope_middleware;
pub use extract::{Authenticated, CurrentTenant, OptionalTenant, Scope};
pub use response::{ApiResponse, ApiResult};
