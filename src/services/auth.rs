//! Authentication service implementation
//!
//! This service resolves the current caller identity from a bearer token.
//! Tokens are HS256 JWTs issued by the identity provider; the shared
//! verification secret comes from configuration. There is no anonymous
//! path: a missing or invalid token is a hard rejection.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::config::settings::Settings;
use crate::models::event::Event;
use crate::utils::errors::{GatherBuddyError, Result};

/// Verified caller identity
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
}

/// Claims expected in the identity provider's tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TokenClaims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    exp: usize,
}

/// Authentication service for resolving caller identity
#[derive(Clone)]
pub struct AuthService {
    decoding_key: DecodingKey,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(settings: &Settings) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(settings.auth.jwt_secret.as_bytes()),
        }
    }

    /// Resolve the caller identity from an `Authorization` header value
    pub fn authenticate(&self, authorization: Option<&str>) -> Result<AuthUser> {
        let header = authorization.ok_or_else(|| {
            GatherBuddyError::Unauthenticated("missing Authorization header".to_string())
        })?;

        let token = header.strip_prefix("Bearer ").ok_or_else(|| {
            GatherBuddyError::Unauthenticated("expected a bearer token".to_string())
        })?;

        self.verify_token(token)
    }

    /// Verify a raw token and extract the caller identity
    pub fn verify_token(&self, token: &str) -> Result<AuthUser> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| GatherBuddyError::Unauthenticated(format!("invalid token: {e}")))?;

        let id = Uuid::parse_str(&data.claims.sub).map_err(|_| {
            GatherBuddyError::Unauthenticated("token subject is not a UUID".to_string())
        })?;

        debug!(user_id = %id, "Caller identity verified");
        Ok(AuthUser {
            id,
            email: data.claims.email,
        })
    }

    /// Require that the caller is the organizer of an event
    pub fn require_organizer(&self, user: &AuthUser, event: &Event) -> Result<()> {
        if event.organizer_id != user.id {
            return Err(GatherBuddyError::PermissionDenied(format!(
                "user {} is not the organizer of event {}",
                user.id, event.id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-secret-test-secret-test-secret!";

    fn service() -> AuthService {
        let mut settings = Settings::default();
        settings.auth.jwt_secret = SECRET.to_string();
        AuthService::new(&settings)
    }

    fn token_for(sub: &str, email: Option<&str>, secret: &str) -> String {
        let claims = TokenClaims {
            sub: sub.to_string(),
            email: email.map(|e| e.to_string()),
            exp: (Utc::now().timestamp() + 3600) as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_valid_token_yields_identity() {
        let user_id = Uuid::new_v4();
        let token = token_for(&user_id.to_string(), Some("member@example.org"), SECRET);

        let user = service()
            .authenticate(Some(&format!("Bearer {token}")))
            .unwrap();
        assert_eq!(user.id, user_id);
        assert_eq!(user.email.as_deref(), Some("member@example.org"));
    }

    #[test]
    fn test_missing_header_is_unauthenticated() {
        let err = service().authenticate(None).unwrap_err();
        assert_eq!(err.reason_code(), "UNAUTHENTICATED");
    }

    #[test]
    fn test_wrong_scheme_is_unauthenticated() {
        let err = service().authenticate(Some("Basic abc")).unwrap_err();
        assert_eq!(err.reason_code(), "UNAUTHENTICATED");
    }

    #[test]
    fn test_wrong_secret_is_unauthenticated() {
        let token = token_for(&Uuid::new_v4().to_string(), None, "another-secret-entirely-1234");
        let err = service()
            .authenticate(Some(&format!("Bearer {token}")))
            .unwrap_err();
        assert_eq!(err.reason_code(), "UNAUTHENTICATED");
    }

    #[test]
    fn test_non_uuid_subject_is_unauthenticated() {
        let token = token_for("not-a-uuid", None, SECRET);
        let err = service()
            .authenticate(Some(&format!("Bearer {token}")))
            .unwrap_err();
        assert_eq!(err.reason_code(), "UNAUTHENTICATED");
    }
}
