// handlers/protected/puzzle.rs - POST /api/puzzle

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::middleware::{ApiResponse, ApiResult, Authenticated, CurrentTenant, Scope};
use crate::server::AppState;
use crate::services::{validate_puzzle_answer, PuzzleResult};

#[derive(Debug, Deserialize)]
pub struct PuzzleRequest {
    pub answer: String,
}

/// POST /api/puzzle - submit an answer; a correct one returns the prize code
pub async fn puzzle_post(
    State(state): State<AppState>,
    Scope(scope): Scope,
    Authenticated(principal): Authenticated,
    CurrentTenant(tenant): CurrentTenant,
    Json(body): Json<PuzzleRequest>,
) -> ApiResult<PuzzleResult> {
    state.throttle("puzzle", &principal)?;
    let db = scope.db(state.store.clone());
    let result = validate_puzzle_answer(&db, &principal, tenant.id, &body.answer, &state.config.redemption).await?;
    Ok(ApiResponse::success(result))
}
