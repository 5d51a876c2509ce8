pub mod directory;
pub mod resolver;
pub mod scope;

pub use directory::{get_tenant, get_tenant_or_fail, resolve_tenant_from_request, TenantError};
pub use resolver::{is_valid_slug, resolve};
pub use scope::RequestScope;
