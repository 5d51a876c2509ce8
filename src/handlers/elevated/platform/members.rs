// handlers/elevated/platform/members.rs - POST /api/platform/tenants/:id/members

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::Membership;
use crate::middleware::{ApiResponse, ApiResult, Scope};
use crate::server::AppState;
use crate::services::{member_service, TenantService};
use crate::types::MembershipRole;

#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    pub user_id: Uuid,
    pub role: MembershipRole,
}

/// Create or change a membership in any tenant, admins included
pub async fn member_assign(
    State(state): State<AppState>,
    Scope(scope): Scope,
    Path(id): Path<Uuid>,
    Json(body): Json<AssignRequest>,
) -> ApiResult<Membership> {
    let (_, db) = super::authorize(&state, &scope).await?;
    let tenant = TenantService::new(&db)?.get_tenant(id.into()).await?;
    let membership = member_service::assign(&db, tenant.id, body.user_id, body.role).await?;
    Ok(ApiResponse::success(membership))
}
