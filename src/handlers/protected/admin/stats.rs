// handlers/protected/admin/stats.rs - GET /api/admin/stats

use axum::extract::State;

use crate::database::scoped::stats::{self, TenantStats};
use crate::middleware::{ApiResponse, ApiResult, CurrentTenant, Scope};
use crate::server::AppState;

/// GET /api/admin/stats - visitor, completion and redemption counts
pub async fn stats_get(
    State(state): State<AppState>,
    Scope(scope): Scope,
    CurrentTenant(tenant): CurrentTenant,
) -> ApiResult<TenantStats> {
    let (_, db) = super::authorize(&state, &scope, &tenant).await?;
    Ok(ApiResponse::success(stats::dashboard(&db, tenant.id).await?))
}
