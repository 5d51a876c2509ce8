// handlers/protected/progress.rs - GET /api/progress

use axum::extract::State;
use serde::Serialize;

use crate::database::models::Progress;
use crate::database::scoped::{animals, profiles, redemptions};
use crate::middleware::{ApiResponse, ApiResult, Authenticated, CurrentTenant, Scope};
use crate::server::AppState;
use crate::services::scan_service;
use crate::types::CompletionStatus;

#[derive(Debug, Serialize)]
pub struct ProgressView {
    pub scans: Vec<Progress>,
    pub total_stations: usize,
    pub completion_status: CompletionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redemption_code: Option<String>,
    pub redeemed: bool,
}

/// GET /api/progress - the caller's scans and completion in this tenant
pub async fn progress_get(
    State(state): State<AppState>,
    Scope(scope): Scope,
    Authenticated(principal): Authenticated,
    CurrentTenant(tenant): CurrentTenant,
) -> ApiResult<ProgressView> {
    let db = scope.db(state.store.clone());

    let (scans, stations, profile, redemption) = futures::try_join!(
        scan_service::progress_for(&db, &principal, tenant.id),
        animals::list_active(&db, tenant.id),
        profiles::get(&db, tenant.id, principal.id),
        redemptions::find_by_user(&db, tenant.id, principal.id),
    )?;

    Ok(ApiResponse::success(ProgressView {
        scans,
        total_stations: stations.len(),
        completion_status: profile.map(|p| p.completion_status).unwrap_or(CompletionStatus::InProgress),
        redeemed: redemption.as_ref().map(|r| r.redeemed).unwrap_or(false),
        redemption_code: redemption.map(|r| r.redemption_code),
    }))
}
