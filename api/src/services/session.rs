//! Session validation: access tokens issued by the hosted auth provider

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Audience the auth provider stamps on signed-in user tokens
pub const AUTHENTICATED_AUDIENCE: &str = "authenticated";

/// JWT claims for access tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user uuid
    pub exp: i64,
    pub iat: i64,
    pub aud: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("invalid token")]
    InvalidToken,
    #[error("token expired")]
    Expired,
}

/// Validate an access token and return the user id
pub fn validate_access_token(token: &str, secret: &[u8]) -> Result<Uuid, SessionError> {
    // HS256 only, to rule out algorithm confusion
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_required_spec_claims(&["exp", "sub", "aud"]);
    validation.set_audience(&[AUTHENTICATED_AUDIENCE]);

    let token_data = decode::<Claims>(token, &DecodingKey::from_secret(secret), &validation)
        .map_err(|e| {
            tracing::debug!(error = ?e, "JWT decode error");
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => SessionError::Expired,
                _ => SessionError::InvalidToken,
            }
        })?;

    Uuid::parse_str(&token_data.claims.sub).map_err(|_| SessionError::InvalidToken)
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use jsonwebtoken::{EncodingKey, Header, encode};

    const SECRET: &[u8] = b"test-secret";

    /// Sign a token the way the auth provider does
    pub fn sign(sub: &str, aud: &str, expires_in: Duration, secret: &[u8]) -> String {
        let now = Utc::now();
        let claims = Claims {
            sub: sub.to_string(),
            exp: (now + expires_in).timestamp(),
            iat: now.timestamp(),
            aud: aud.to_string(),
            email: None,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret)).unwrap()
    }

    #[test]
    fn test_valid_token() {
        let user = Uuid::new_v4();
        let token = sign(&user.to_string(), AUTHENTICATED_AUDIENCE, Duration::minutes(10), SECRET);
        assert_eq!(validate_access_token(&token, SECRET).unwrap(), user);
    }

    #[test]
    fn test_expired_token() {
        let token = sign(
            &Uuid::new_v4().to_string(),
            AUTHENTICATED_AUDIENCE,
            Duration::minutes(-10),
            SECRET,
        );
        assert!(matches!(
            validate_access_token(&token, SECRET),
            Err(SessionError::Expired)
        ));
    }

    #[test]
    fn test_rejects_wrong_secret_audience_and_subject() {
        let user = Uuid::new_v4().to_string();

        let other_secret = sign(&user, AUTHENTICATED_AUDIENCE, Duration::minutes(10), b"nope");
        assert!(validate_access_token(&other_secret, SECRET).is_err());

        let anon = sign(&user, "anon", Duration::minutes(10), SECRET);
        assert!(validate_access_token(&anon, SECRET).is_err());

        let not_uuid = sign("42", AUTHENTICATED_AUDIENCE, Duration::minutes(10), SECRET);
        assert!(matches!(
            validate_access_token(&not_uuid, SECRET),
            Err(SessionError::InvalidToken)
        ));
    }
}
