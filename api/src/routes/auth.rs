//! Bearer-token authentication for API routes

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION, request::Parts},
};
use std::sync::Arc;
use uuid::Uuid;

use crate::AppState;
use crate::services::session;

/// Extractor that validates the bearer access token and returns the user id
pub struct AuthUser(pub Uuid);

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = StatusCode;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        authenticate(&parts.headers, state.jwt_secret.as_bytes()).map(AuthUser)
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn authenticate(headers: &HeaderMap, secret: &[u8]) -> Result<Uuid, StatusCode> {
    let token = bearer_token(headers).ok_or(StatusCode::UNAUTHORIZED)?;

    session::validate_access_token(token, secret).map_err(|e| {
        tracing::debug!(error = %e, "JWT validation failed");
        StatusCode::UNAUTHORIZED
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::session::{AUTHENTICATED_AUDIENCE, tests::sign};
    use axum::http::HeaderValue;
    use chrono::Duration;

    const SECRET: &[u8] = b"route-secret";

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_valid_bearer() {
        let user = Uuid::new_v4();
        let token = sign(&user.to_string(), AUTHENTICATED_AUDIENCE, Duration::hours(1), SECRET);
        assert_eq!(authenticate(&headers(&format!("Bearer {}", token)), SECRET), Ok(user));
    }

    #[test]
    fn test_rejections() {
        assert_eq!(authenticate(&HeaderMap::new(), SECRET), Err(StatusCode::UNAUTHORIZED));
        assert_eq!(authenticate(&headers("Basic abc"), SECRET), Err(StatusCode::UNAUTHORIZED));
        assert_eq!(authenticate(&headers("Bearer "), SECRET), Err(StatusCode::UNAUTHORIZED));

        let token = sign(
            &Uuid::new_v4().to_string(),
            AUTHENTICATED_AUDIENCE,
            Duration::hours(1),
            b"other-secret",
        );
        assert_eq!(
            authenticate(&headers(&format!("Bearer {}", token)), SECRET),
            Err(StatusCode::UNAUTHORIZED)
        );
    }
}
