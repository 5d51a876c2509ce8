use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::auth::verify_token;
use crate::error::ApiError;
use crate::server::AppState;
use crate::tenancy::RequestScope;

/// Builds the per-request scope. No Authorization header means an anonymous
/// scope; a header that is present but not a valid bearer token is a 401.
pub async fn request_scope_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let principal = match extract_jwt_from_headers(&headers) {
        Ok(None) => None,
        Ok(Some(token)) => {
            let principal = verify_token(&state.config.security, &token)?;
            debug!("Authenticated request for user {}", principal.id);
            Some(principal)
        }
        Err(msg) => return Err(ApiError::unauthorized(msg)),
    };

    request.extensions_mut().insert(Arc::new(RequestScope::new(principal)));
    Ok(next.run(request).await)
}

/// Bearer token from the Authorization header, if the header is present
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<Option<String>, String> {
    let auth_header = match headers.get(axum::http::header::AUTHORIZATION) {
        Some(value) => value,
        None => return Ok(None),
    };

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty JWT token".to_string());
        }
        Ok(Some(token.trim().to_string()))
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn missing_header_is_anonymous() {
        assert_eq!(extract_jwt_from_headers(&HeaderMap::new()), Ok(None));
    }

    #[test]
    fn bearer_token_is_extracted() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(extract_jwt_from_headers(&headers), Ok(Some("abc.def.ghi".to_string())));
    }

    #[test]
    fn other_schemes_are_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert!(extract_jwt_from_headers(&headers).is_err());
        headers.insert("authorization", HeaderValue::from_static("Bearer   "));
        assert!(extract_jwt_from_headers(&headers).is_err());
    }
}
