// handlers/public/home.rs - GET / and GET /health

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::server::AppState;

/// GET / - service banner
pub async fn home() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Hunt API",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "public": "/api/tenant, /api/animals",
                "visitor": "/api/auth/whoami, /api/scan/:qr_token, /api/progress, /api/puzzle",
                "admin": "/api/admin/* (staff, admin or super admin of the tenant)",
                "platform": "/api/platform/* (super admin)",
            }
        }
    }))
}

/// GET /health - store connectivity
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": { "status": "ok", "timestamp": now, "database": "ok" }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "error": true,
                    "message": "Database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": { "status": "degraded", "timestamp": now }
                })),
            )
        }
    }
}
