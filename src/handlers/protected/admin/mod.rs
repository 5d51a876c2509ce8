// handlers/protected/admin/mod.rs - tenant back office
//
// Every handler resolves the caller's role for the current tenant first.
// Only after that check do they switch to an elevated handle, which the
// tenant-scoped helpers still confine to the current tenant.

use crate::database::models::Tenant;
use crate::database::Db;
use crate::error::ApiError;
use crate::identity::{require_role, Authorized};
use crate::server::AppState;
use crate::tenancy::RequestScope;

pub mod animals;
pub mod members;
pub mod redemptions;
pub mod stats;
pub mod visitors;

pub use animals::{animal_create, animal_delete, animal_update, animals_list};
pub use members::{member_invite, member_revoke, members_list};
pub use redemptions::{redemption_redeem, redemption_verify};
pub use stats::stats_get;
pub use visitors::visitors_list;

/// Staff, admin or super admin of `tenant`, plus an elevated handle.
pub(crate) async fn authorize(
    state: &AppState,
    scope: &RequestScope,
    tenant: &Tenant,
) -> Result<(Authorized, Db), ApiError> {
    let db = scope.db(state.store.clone());
    let authorized = require_role(&db, scope.principal(), Some(tenant.id)).await?;
    Ok((authorized, db.elevate()))
}

/// As [`authorize`], limited to roles that manage members.
pub(crate) async fn authorize_manager(
    state: &AppState,
    scope: &RequestScope,
    tenant: &Tenant,
) -> Result<(Authorized, Db), ApiError> {
    let (authorized, db) = authorize(state, scope, tenant).await?;
    if !authorized.role.can_manage_members() {
        return Err(ApiError::forbidden("Admin access required"));
    }
    Ok((authorized, db))
}
