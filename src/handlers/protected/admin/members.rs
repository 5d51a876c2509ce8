// handlers/protected/admin/members.rs - tenant membership

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::Membership;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, CurrentTenant, Scope};
use crate::server::AppState;
use crate::services::member_service;
use crate::types::MembershipRole;

#[derive(Debug, Deserialize)]
pub struct InviteRequest {
    pub user_id: Uuid,
    #[serde(default = "default_role")]
    pub role: MembershipRole,
}

fn default_role() -> MembershipRole {
    MembershipRole::Staff
}

/// GET /api/admin/members
pub async fn members_list(
    State(state): State<AppState>,
    Scope(scope): Scope,
    CurrentTenant(tenant): CurrentTenant,
) -> ApiResult<Vec<Membership>> {
    let (_, db) = super::authorize_manager(&state, &scope, &tenant).await?;
    Ok(ApiResponse::success(member_service::list_members(&db, tenant.id).await?))
}

/// POST /api/admin/members - 409 when the user already belongs to the tenant
pub async fn member_invite(
    State(state): State<AppState>,
    Scope(scope): Scope,
    CurrentTenant(tenant): CurrentTenant,
    Json(body): Json<InviteRequest>,
) -> ApiResult<Membership> {
    let (_, db) = super::authorize_manager(&state, &scope, &tenant).await?;
    let membership = member_service::invite(&db, tenant.id, body.user_id, body.role).await?;
    Ok(ApiResponse::created(membership))
}

/// DELETE /api/admin/members/:user_id - staff only; admins are 403
pub async fn member_revoke(
    State(state): State<AppState>,
    Scope(scope): Scope,
    CurrentTenant(tenant): CurrentTenant,
    Path(user_id): Path<Uuid>,
) -> ApiResult<()> {
    let (authorized, db) = super::authorize_manager(&state, &scope, &tenant).await?;
    if authorized.principal.id == user_id {
        return Err(ApiError::forbidden("You cannot revoke your own membership"));
    }
    member_service::revoke(&db, tenant.id, user_id).await?;
    Ok(ApiResponse::no_content())
}
