// handlers/protected/admin/redemptions.rs - redemption desk

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::database::models::Redemption;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Authenticated, CurrentTenant, Scope};
use crate::server::AppState;
use crate::services::redemption_service;

#[derive(Debug, Deserialize)]
pub struct CodeRequest {
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyResult {
    pub valid: bool,
    pub redeemed: bool,
}

/// POST /api/admin/redemptions/verify - is this code ours, and is it spent?
pub async fn redemption_verify(
    State(state): State<AppState>,
    Scope(scope): Scope,
    Authenticated(principal): Authenticated,
    CurrentTenant(tenant): CurrentTenant,
    Json(body): Json<CodeRequest>,
) -> ApiResult<VerifyResult> {
    let (_, db) = super::authorize(&state, &scope, &tenant).await?;
    state.throttle("verify", &principal)?;

    let found = redemption_service::verify(&db, tenant.id, &body.code)
        .await?
        .ok_or_else(|| ApiError::not_found("Code not found"))?;
    Ok(ApiResponse::success(VerifyResult { valid: true, redeemed: found.redeemed }))
}

/// POST /api/admin/redemptions/redeem - hand out the prize; 409 the second time
pub async fn redemption_redeem(
    State(state): State<AppState>,
    Scope(scope): Scope,
    CurrentTenant(tenant): CurrentTenant,
    Json(body): Json<CodeRequest>,
) -> ApiResult<Redemption> {
    let (authorized, db) = super::authorize(&state, &scope, &tenant).await?;
    let redemption = redemption_service::redeem(&db, tenant.id, &body.code).await?;
    tracing::info!("Code redeemed in tenant {} by {}", tenant.slug, authorized.principal.id);
    Ok(ApiResponse::success(redemption))
}
