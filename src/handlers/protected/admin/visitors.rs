// handlers/protected/admin/visitors.rs - GET /api/admin/visitors

use axum::extract::{Query, State};
use serde::Deserialize;

use crate::database::models::Profile;
use crate::database::scoped::profiles;
use crate::middleware::{ApiResponse, ApiResult, CurrentTenant, Scope};
use crate::sanitize::sanitize_search_text;
use crate::server::AppState;

const DEFAULT_PAGE_SIZE: i64 = 50;

#[derive(Debug, Deserialize)]
pub struct VisitorQuery {
    /// Free text matched against name and email
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/admin/visitors?search=&limit=&offset= - newest visitors first
pub async fn visitors_list(
    State(state): State<AppState>,
    Scope(scope): Scope,
    CurrentTenant(tenant): CurrentTenant,
    Query(query): Query<VisitorQuery>,
) -> ApiResult<Vec<Profile>> {
    let (_, db) = super::authorize(&state, &scope, &tenant).await?;

    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, state.config.api.max_page_size.max(1));
    let offset = query.offset.unwrap_or(0).max(0);
    let search = query.search.as_deref().map(sanitize_search_text);

    let visitors = profiles::list_visitors(&db, tenant.id, search.as_ref(), limit, offset).await?;
    Ok(ApiResponse::success(visitors))
}
