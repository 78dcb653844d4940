//! JWT sessions and the Axum extractor enforcing them.

use crate::Identity;
use crate::error::IdentityError;
use atelier_domain::roles::RoleSet;
use atelier_kernel::server::ApiState;
use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How long a cached session snapshot stays fresh. Kept short so account
/// locks take effect promptly even without explicit invalidation.
pub(crate) const SNAPSHOT_TTL_SECONDS: u64 = 60;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iss: String,
    iat: i64,
    exp: i64,
}

/// Signing material plus token policy, kept together so the slice handle
/// stays a single value.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    ttl_seconds: i64,
    leeway: u64,
}

impl fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtKeys")
            .field("issuer", &self.issuer)
            .field("ttl_seconds", &self.ttl_seconds)
            .finish_non_exhaustive()
    }
}

impl JwtKeys {
    #[must_use]
    pub fn new(secret: &str, issuer: String, ttl_seconds: i64, leeway_seconds: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            ttl_seconds,
            leeway: u64::try_from(leeway_seconds).unwrap_or_default(),
        }
    }

    /// Issues a token for the given subject.
    ///
    /// # Errors
    /// [`IdentityError::Internal`] when encoding fails.
    pub fn issue(&self, user_id: &str) -> Result<String, IdentityError> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_owned(),
            iss: self.issuer.clone(),
            iat: now,
            exp: now + self.ttl_seconds,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(|e| {
            IdentityError::Internal {
                message: e.to_string().into(),
                context: Some("Encoding session token".into()),
            }
        })
    }

    /// Decodes and validates a token, returning the subject.
    ///
    /// # Errors
    /// [`IdentityError::Unauthorized`] for expired or tampered tokens.
    pub fn subject(&self, token: &str) -> Result<String, IdentityError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.leeway = self.leeway;

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims.sub)
            .map_err(|e| IdentityError::Unauthorized {
                message: "invalid session token".into(),
                context: Some(e.to_string().into()),
            })
    }
}

/// Cached view of an account used on every authenticated request.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub user_id: String,
    pub roles: RoleSet,
    pub artist_id: Option<String>,
    pub provider_id: Option<String>,
}

/// The authenticated caller. Extracted from the `Authorization` header.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: String,
    pub roles: RoleSet,
    pub artist_id: Option<String>,
    pub provider_id: Option<String>,
}

impl Session {
    pub(crate) fn from_snapshot(snapshot: SessionSnapshot) -> Self {
        Self {
            user_id: snapshot.user_id,
            roles: snapshot.roles,
            artist_id: snapshot.artist_id,
            provider_id: snapshot.provider_id,
        }
    }

    /// Requires at least one of the given roles.
    ///
    /// # Errors
    /// [`IdentityError::Forbidden`] when none is granted.
    pub fn require_role(&self, roles: RoleSet) -> Result<(), IdentityError> {
        if self.roles.intersects(roles) {
            Ok(())
        } else {
            Err(IdentityError::Forbidden {
                message: "missing required role".into(),
                context: None,
            })
        }
    }

    /// The caller's artist profile id.
    ///
    /// # Errors
    /// [`IdentityError::Forbidden`] when the account has no artist profile.
    pub fn artist_id(&self) -> Result<&str, IdentityError> {
        self.artist_id.as_deref().ok_or(IdentityError::Forbidden {
            message: "artist profile required".into(),
            context: None,
        })
    }

    /// The caller's provider profile id.
    ///
    /// # Errors
    /// [`IdentityError::Forbidden`] when the account has no provider profile.
    pub fn provider_id(&self) -> Result<&str, IdentityError> {
        self.provider_id.as_deref().ok_or(IdentityError::Forbidden {
            message: "provider profile required".into(),
            context: None,
        })
    }
}

fn bearer_token(parts: &Parts) -> Result<String, IdentityError> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_owned)
        .ok_or(IdentityError::Unauthorized {
            message: "missing bearer token".into(),
            context: None,
        })
}

impl FromRequestParts<ApiState> for Session {
    type Rejection = IdentityError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ApiState,
    ) -> Result<Self, Self::Rejection> {
        let identity =
            state.try_get_slice::<Identity>().map_err(|e| IdentityError::Internal {
                message: e.to_string().into(),
                context: Some("Identity slice not registered".into()),
            })?;

        let token = bearer_token(parts)?;
        identity.authenticate(&token).await
    }
}

impl OptionalFromRequestParts<ApiState> for Session {
    type Rejection = IdentityError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ApiState,
    ) -> Result<Option<Self>, Self::Rejection> {
        if parts.headers.get(AUTHORIZATION).is_none() {
            return Ok(None);
        }
        <Self as FromRequestParts<ApiState>>::from_request_parts(parts, state).await.map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> JwtKeys {
        JwtKeys::new("test-secret", "atelier".to_owned(), 3600, 0)
    }

    #[test]
    fn issue_and_decode_round_trip() {
        let keys = keys();
        let token = keys.issue("u123").unwrap();
        assert_eq!(keys.subject(&token).unwrap(), "u123");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = keys().issue("u123").unwrap();
        let other = JwtKeys::new("other-secret", "atelier".to_owned(), 3600, 0);
        assert!(matches!(
            other.subject(&token),
            Err(IdentityError::Unauthorized { .. })
        ));
    }

    #[test]
    fn wrong_issuer_is_rejected() {
        let token = keys().issue("u123").unwrap();
        let other = JwtKeys::new("test-secret", "someone-else".to_owned(), 3600, 0);
        assert!(other.subject(&token).is_err());
    }

    #[test]
    fn role_checks() {
        let session = Session {
            user_id: "u1".into(),
            roles: RoleSet::ARTIST,
            artist_id: Some("a1".into()),
            provider_id: None,
        };

        assert!(session.require_role(RoleSet::ARTIST).is_ok());
        assert!(session.require_role(RoleSet::ARTIST | RoleSet::ADMINISTRATOR).is_ok());
        assert!(session.require_role(RoleSet::MODERATOR).is_err());
        assert_eq!(session.artist_id().unwrap(), "a1");
        assert!(session.provider_id().is_err());
    }
}
