use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::app::AppState;
use crate::auth::validate_jwt;
use crate::error::BusinessError;

/// Decode an optional bearer token into a `Principal` request extension.
///
/// Requests without an Authorization header continue anonymously; the tenant
/// boundary decides what that means for the route. A header that is present
/// but invalid is rejected with 401.
pub async fn principal_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Response {
    let token = match extract_bearer_token(&headers) {
        Ok(Some(token)) => token,
        Ok(None) => return next.run(request).await,
        Err(msg) => return BusinessError::unauthorized(msg).into_response(),
    };

    match validate_jwt(&token, &state.jwt_secret) {
        Ok(claims) => {
            request.extensions_mut().insert(claims.into_principal());
            next.run(request).await
        }
        Err(e) => {
            tracing::warn!("Token validation failed: {}", e);
            BusinessError::unauthorized(e.to_string()).into_response()
        }
    }
}

/// Extract JWT token from Authorization header
fn extract_bearer_token(headers: &HeaderMap) -> Result<Option<String>, String> {
    let Some(auth_header) = headers.get("authorization") else {
        return Ok(None);
    };

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(Some(token.trim().to_string())),
        Some(_) => Err("Empty JWT token".to_string()),
        None => Err("Authorization header must use Bearer token format".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_bearer_token(&headers), Ok(None));

        headers.insert("authorization", HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(extract_bearer_token(&headers), Ok(Some("abc.def".to_string())));

        headers.insert("authorization", HeaderValue::from_static("Basic abc"));
        assert!(extract_bearer_token(&headers).is_err());

        headers.insert("authorization", HeaderValue::from_static("Bearer  "));
        assert!(extract_bearer_token(&headers).is_err());
    }
}
