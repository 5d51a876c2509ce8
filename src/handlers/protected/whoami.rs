// handlers/protected/whoami.rs - GET /api/auth/whoami

use axum::extract::State;
use serde::Serialize;

use crate::auth::Principal;
use crate::identity::{resolve_role, super_admin_flag, RoleResolution};
use crate::middleware::{ApiResponse, ApiResult, Authenticated, OptionalTenant, Scope};
use crate::server::AppState;
use crate::types::Role;

#[derive(Debug, Serialize)]
pub struct WhoAmI {
    pub user: Principal,
    pub tenant: Option<String>,
    /// Staff-side role in the current tenant, if any
    pub role: Option<Role>,
    pub is_super_admin: bool,
}

/// GET /api/auth/whoami - the caller and their role here. Works without a
/// resolvable tenant; `tenant` and the tenant role are then empty.
pub async fn whoami(
    State(state): State<AppState>,
    Scope(scope): Scope,
    Authenticated(principal): Authenticated,
    OptionalTenant(tenant): OptionalTenant,
) -> ApiResult<WhoAmI> {
    let db = scope.db(state.store.clone());

    let role = match &tenant {
        Some(t) => match resolve_role(&db, Some(&principal), Some(t.id)).await? {
            RoleResolution::Authorized(role) => Some(role),
            _ => None,
        },
        None => None,
    };
    let is_super_admin = super_admin_flag(&db, principal.id).await?.is_granted();

    Ok(ApiResponse::success(WhoAmI {
        user: principal,
        tenant: tenant.map(|t| t.slug),
        role,
        is_super_admin,
    }))
}
