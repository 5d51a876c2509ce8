use std::sync::Arc;

use axum::{
    http::HeaderValue,
    middleware,
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::auth::Principal;
use crate::config::{AppConfig, SecurityConfig};
use crate::database::Store;
use crate::error::ApiError;
use crate::handlers::{elevated, protected, public};
use crate::middleware::request_scope_middleware;
use crate::rate_limit::FixedWindowLimiter;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<AppConfig>,
    pub rate_limiter: Arc<FixedWindowLimiter>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: AppConfig) -> Self {
        let rate_limiter = Arc::new(FixedWindowLimiter::from_config(&config.api));
        Self { store, config: Arc::new(config), rate_limiter }
    }

    /// Count one `action` for the caller; 429 once over the window limit.
    pub fn throttle(&self, action: &str, principal: &Principal) -> Result<(), ApiError> {
        if self.rate_limiter.check(&format!("{}:{}", action, principal.id)) {
            Ok(())
        } else {
            warn!("Rate limit hit for {} by {}", action, principal.id);
            Err(ApiError::too_many_requests("Too many requests, please slow down"))
        }
    }
}

pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.security);

    Router::new()
        .merge(public_routes())
        .merge(protected_routes())
        .merge(admin_routes())
        .merge(platform_routes())
        .layer(middleware::from_fn_with_state(state.clone(), request_scope_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }
    let origins: Vec<HeaderValue> = security.cors_origins.iter().filter_map(|o| o.parse().ok()).collect();
    if origins.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new().allow_origin(origins).allow_methods(Any).allow_headers(Any)
    }
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(public::home))
        .route("/health", get(public::health))
        .route("/api/tenant", get(public::tenant_get))
        .route("/api/animals", get(public::animals_list))
}

fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/whoami", get(protected::whoami))
        .route("/api/scan/:qr_token", post(protected::scan_post))
        .route("/api/progress", get(protected::progress_get))
        .route("/api/puzzle", post(protected::puzzle_post))
}

fn admin_routes() -> Router<AppState> {
    use protected::admin;

    Router::new()
        .route("/api/admin/stats", get(admin::stats_get))
        .route("/api/admin/visitors", get(admin::visitors_list))
        .route("/api/admin/animals", get(admin::animals_list).post(admin::animal_create))
        .route("/api/admin/animals/:id", patch(admin::animal_update).delete(admin::animal_delete))
        .route("/api/admin/redemptions/verify", post(admin::redemption_verify))
        .route("/api/admin/redemptions/redeem", post(admin::redemption_redeem))
        .route("/api/admin/members", get(admin::members_list).post(admin::member_invite))
        .route("/api/admin/members/:user_id", delete(admin::member_revoke))
}

fn platform_routes() -> Router<AppState> {
    use elevated::platform;

    Router::new()
        .route("/api/platform/tenants", get(platform::tenant_list).post(platform::tenant_create))
        .route(
            "/api/platform/tenants/:id",
            patch(platform::tenant_update).delete(platform::tenant_delete),
        )
        .route("/api/platform/tenants/:id/members", post(platform::member_assign))
}
