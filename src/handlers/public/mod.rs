// handlers/public/mod.rs - endpoints open to anonymous callers
//
// Anonymous reads still go through the row-level policies: only active
// tenants and active stations are visible.

pub mod animals;
pub mod home;
pub mod tenant;

pub use animals::animals_list;
pub use home::{health, home};
pub use tenant::tenant_get;
