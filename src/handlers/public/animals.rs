// handlers/public/animals.rs - GET /api/animals

use axum::extract::State;

use crate::middleware::{ApiResponse, ApiResult, CurrentTenant, Scope};
use crate::server::AppState;
use crate::services::station_service::{self, StationSummary};

/// GET /api/animals - active stations in hunt order, without letters or tokens
pub async fn animals_list(
    State(state): State<AppState>,
    Scope(scope): Scope,
    CurrentTenant(tenant): CurrentTenant,
) -> ApiResult<Vec<StationSummary>> {
    let db = scope.db(state.store.clone());
    let stations = station_service::public_listing(&db, tenant.id).await?;
    Ok(ApiResponse::success(stations))
}
