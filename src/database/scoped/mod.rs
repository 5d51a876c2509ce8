//! Tenant-scoped data access. Every helper takes a required [`TenantId`]
//! and goes through [`Repository`], so `tenant_id = <id>` is always the
//! first predicate of the query it issues.
//!
//! [`TenantId`]: crate::types::TenantId
//! [`Repository`]: crate::database::Repository

pub mod animals;
pub mod memberships;
pub mod profiles;
pub mod progress;
pub mod redemptions;
pub mod stats;
