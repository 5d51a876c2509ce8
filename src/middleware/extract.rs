//! Request extractors for the per-request scope, the resolved tenant and the
//! authenticated caller.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::HOST, request::Parts},
};
use tracing::error;

use crate::auth::Principal;
use crate::database::models::Tenant;
use crate::error::ApiError;
use crate::identity::require_authenticated;
use crate::server::AppState;
use crate::tenancy::{resolve_tenant_from_request, RequestScope};

/// The scope installed by [`request_scope_middleware`](super::request_scope_middleware).
#[derive(Debug, Clone)]
pub struct Scope(pub Arc<RequestScope>);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Scope {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Arc<RequestScope>>() {
            Some(scope) => Ok(Scope(scope.clone())),
            None => {
                error!("Request scope missing; is the middleware installed?");
                Err(ApiError::internal_server_error("Request scope unavailable"))
            }
        }
    }
}

/// Resolve the request's tenant from host, override header and query.
/// `Ok(None)` means no active tenant matched; store failures are errors.
async fn resolve_tenant(parts: &mut Parts, state: &AppState) -> Result<Option<Tenant>, ApiError> {
    let Scope(scope) = Scope::from_request_parts(parts, state).await?;
    let tenancy = &state.config.tenancy;

    let host = parts.headers.get(HOST).and_then(|v| v.to_str().ok());
    let header = parts
        .headers
        .get(tenancy.override_header.as_str())
        .and_then(|v| v.to_str().ok());
    let query = parts.uri.query().and_then(|q| {
        url::form_urlencoded::parse(q.as_bytes())
            .find(|(k, _)| k == tenancy.override_query_param.as_str())
            .map(|(_, v)| v.into_owned())
    });

    let db = scope.db(state.store.clone());
    Ok(resolve_tenant_from_request(&db, &scope, tenancy, host, header, query.as_deref()).await?)
}

/// The tenant this request belongs to. Unknown, suspended and unresolvable
/// tenants are all a 404.
#[derive(Debug, Clone)]
pub struct CurrentTenant(pub Tenant);

#[async_trait]
impl FromRequestParts<AppState> for CurrentTenant {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        resolve_tenant(parts, state)
            .await?
            .map(CurrentTenant)
            .ok_or_else(|| ApiError::not_found("Tenant not found"))
    }
}

/// For routes that also answer without a tenant. Only "no such tenant" is
/// `None`; lookup failures still reject the request.
#[derive(Debug, Clone)]
pub struct OptionalTenant(pub Option<Tenant>);

#[async_trait]
impl FromRequestParts<AppState> for OptionalTenant {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(OptionalTenant(resolve_tenant(parts, state).await?))
    }
}

/// Caller with a verified bearer token; 401 otherwise.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Principal);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Scope(scope) = Scope::from_request_parts(parts, state).await?;
        require_authenticated(scope.principal()).map(Authenticated)
    }
}
