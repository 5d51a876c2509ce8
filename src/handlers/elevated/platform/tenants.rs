// handlers/elevated/platform/tenants.rs - tenant lifecycle

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::database::models::{Branding, Tenant};
use crate::middleware::{ApiResponse, ApiResult, Scope};
use crate::server::AppState;
use crate::services::{TenantChanges, TenantService};

#[derive(Debug, Deserialize)]
pub struct CreateTenantRequest {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub branding: Option<Branding>,
}

/// GET /api/platform/tenants - every tenant, suspended ones included
pub async fn tenant_list(State(state): State<AppState>, Scope(scope): Scope) -> ApiResult<Vec<Tenant>> {
    let (_, db) = super::authorize(&state, &scope).await?;
    Ok(ApiResponse::success(TenantService::new(&db)?.list_tenants().await?))
}

/// POST /api/platform/tenants - 400 with field errors, 409 on a taken slug
pub async fn tenant_create(
    State(state): State<AppState>,
    Scope(scope): Scope,
    Json(body): Json<CreateTenantRequest>,
) -> ApiResult<Tenant> {
    let (principal, db) = super::authorize(&state, &scope).await?;
    let tenant = TenantService::new(&db)?
        .create_tenant(&body.name, &body.slug, body.branding)
        .await?;
    info!("Tenant '{}' created by {}", tenant.slug, principal.id);
    Ok(ApiResponse::created(tenant))
}

/// PATCH /api/platform/tenants/:id - name, branding, suspend/restore
pub async fn tenant_update(
    State(state): State<AppState>,
    Scope(scope): Scope,
    Path(id): Path<Uuid>,
    Json(changes): Json<TenantChanges>,
) -> ApiResult<Tenant> {
    let (_, db) = super::authorize(&state, &scope).await?;
    let tenant = TenantService::new(&db)?.update_tenant(id.into(), changes).await?;
    Ok(ApiResponse::success(tenant))
}

/// DELETE /api/platform/tenants/:id - removes the tenant and all its rows
pub async fn tenant_delete(
    State(state): State<AppState>,
    Scope(scope): Scope,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    let (principal, db) = super::authorize(&state, &scope).await?;
    TenantService::new(&db)?.delete_tenant(id.into()).await?;
    info!("Tenant {} deleted by {}", id, principal.id);
    Ok(ApiResponse::no_content())
}
