use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::Response,
};
use std::convert::Infallible;
use std::sync::Arc;

use super::{ApiError, AppState};
use crate::domain::UserId;

// ============================================================================
// Caller identity
// ============================================================================

/// Caller decoded from a valid bearer token.
///
/// Used as an extractor it rejects anonymous requests with 401.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: UserId,
    pub email: String,
}

/// Like [`AuthUser`], but anonymous requests are let through.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or_else(ApiError::unauthorized)
    }
}

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<AuthUser>().cloned()))
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Decodes `Authorization: Bearer <token>` when present.
///
/// Requests without the header pass through anonymously; a present but
/// invalid or expired token is rejected outright.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = extract_bearer_token(request.headers())? else {
        return Ok(next.run(request).await);
    };

    let claims = state.credentials().decode_token(&token).map_err(|e| {
        tracing::debug!("Rejected access token: {e}");
        ApiError::unauthorized()
    })?;

    let user = AuthUser {
        user_id: claims.user_id(),
        email: claims.email,
    };
    tracing::Span::current().record("user_id", user.user_id.value());
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// `Ok(None)` when no `Authorization` header was sent.
fn extract_bearer_token(headers: &HeaderMap) -> Result<Option<String>, ApiError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let token = value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(ApiError::unauthorized)?;

    Ok(Some(token.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = HeaderMap::new();
        assert!(matches!(extract_bearer_token(&headers), Ok(None)));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(extract_bearer_token(&headers).unwrap().as_deref(), Some("abc.def"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(extract_bearer_token(&headers).is_err());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(extract_bearer_token(&headers).is_err());
    }
}
