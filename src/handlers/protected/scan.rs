// handlers/protected/scan.rs - POST /api/scan/:qr_token

use axum::extract::{Path, State};

use crate::middleware::{ApiResponse, ApiResult, Authenticated, CurrentTenant, Scope};
use crate::server::AppState;
use crate::services::scan_service::{self, ScanResult};

/// POST /api/scan/:qr_token - record a station scan for the caller.
/// Scanning the same station again reports `already_scanned`.
pub async fn scan_post(
    State(state): State<AppState>,
    Scope(scope): Scope,
    Authenticated(principal): Authenticated,
    CurrentTenant(tenant): CurrentTenant,
    Path(qr_token): Path<String>,
) -> ApiResult<ScanResult> {
    state.throttle("scan", &principal)?;
    let db = scope.db(state.store.clone());
    let result = scan_service::scan_by_token(&db, &principal, tenant.id, &qr_token).await?;
    Ok(ApiResponse::success(result))
}
