// handlers/protected/admin/animals.rs - station management

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::database::models::{Animal, AnimalChanges};
use crate::database::scoped::animals;
use crate::middleware::{ApiResponse, ApiResult, CurrentTenant, Scope};
use crate::server::AppState;
use crate::services::station_service::{self, StationInput};

/// GET /api/admin/animals - all stations, inactive ones included
pub async fn animals_list(
    State(state): State<AppState>,
    Scope(scope): Scope,
    CurrentTenant(tenant): CurrentTenant,
) -> ApiResult<Vec<Animal>> {
    let (_, db) = super::authorize(&state, &scope, &tenant).await?;
    Ok(ApiResponse::success(animals::list_all(&db, tenant.id).await?))
}

/// POST /api/admin/animals
pub async fn animal_create(
    State(state): State<AppState>,
    Scope(scope): Scope,
    CurrentTenant(tenant): CurrentTenant,
    Json(input): Json<StationInput>,
) -> ApiResult<Animal> {
    let (_, db) = super::authorize(&state, &scope, &tenant).await?;
    let animal = station_service::create_station(&db, tenant.id, input).await?;
    Ok(ApiResponse::created(animal))
}

/// PATCH /api/admin/animals/:id
pub async fn animal_update(
    State(state): State<AppState>,
    Scope(scope): Scope,
    CurrentTenant(tenant): CurrentTenant,
    Path(id): Path<Uuid>,
    Json(changes): Json<AnimalChanges>,
) -> ApiResult<Animal> {
    let (_, db) = super::authorize(&state, &scope, &tenant).await?;
    let animal = station_service::update_station(&db, tenant.id, id, changes).await?;
    Ok(ApiResponse::success(animal))
}

/// DELETE /api/admin/animals/:id
pub async fn animal_delete(
    State(state): State<AppState>,
    Scope(scope): Scope,
    CurrentTenant(tenant): CurrentTenant,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    let (_, db) = super::authorize(&state, &scope, &tenant).await?;
    station_service::delete_station(&db, tenant.id, id).await?;
    Ok(ApiResponse::no_content())
}
