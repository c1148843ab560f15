//! Signed, time-limited bearer tokens.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::Deserialize;
#[cfg(any(feature = "USE_ONLY_IN_AUTH_SERVICE", test))]
use serde::Serialize;
use uuid::Uuid;

/// Errors returned by [`TokenService`].
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
    #[error("token signing failed")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// JWT claims payload.
///
/// | Field | JWT claim | Meaning |
/// |-------|-----------|---------|
/// | `sub` | `sub` | user ID (UUID string) |
/// | `iat` | `iat` | issued-at, seconds since epoch |
/// | `exp` | `exp` | expires-at, seconds since epoch |
///
/// [`Serialize`] requires the **`USE_ONLY_IN_AUTH_SERVICE`** cargo feature;
/// the auth service is the sole token issuer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[cfg_attr(any(feature = "USE_ONLY_IN_AUTH_SERVICE", test), derive(Serialize))]
pub struct JwtClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and parses HS256 tokens bound to a user id.
///
/// The signing secret is the only root of trust: there is no other
/// verification path.
#[derive(Clone)]
pub struct TokenService {
    secret: String,
    ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenService {
    pub fn new(secret: impl Into<String>, ttl_hours: i64) -> Self {
        Self {
            secret: secret.into(),
            ttl: Duration::hours(ttl_hours),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Parse a token against the current time and return its subject.
    pub fn parse(&self, token: &str) -> Result<Uuid, TokenError> {
        self.parse_at(token, Utc::now())
    }

    /// Parse a token as of `now`.
    ///
    /// Rejects a bad signature, missing claims, a non-UUID subject, and any
    /// token where `now > exp`. No leeway is applied.
    pub fn parse_at(&self, token: &str, now: DateTime<Utc>) -> Result<Uuid, TokenError> {
        let claims = self.decode_claims(token)?;
        if now.timestamp() > claims.exp {
            return Err(TokenError::Expired);
        }
        claims.sub.parse::<Uuid>().map_err(|_| TokenError::Malformed)
    }

    fn decode_claims(&self, token: &str) -> Result<JwtClaims, TokenError> {
        let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
        // Expiry is checked against the caller's clock in `parse_at`.
        validation.validate_exp = false;
        validation.leeway = 0;
        // jsonwebtoken only enforces `exp` and `sub` from this list; a missing
        // `iat` is rejected by `JwtClaims` deserialization.
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = decode::<JwtClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            _ => TokenError::Malformed,
        })?;

        Ok(data.claims)
    }
}

// ── Feature-gated: auth service only ─────────────────────────────────────

#[cfg(any(feature = "USE_ONLY_IN_AUTH_SERVICE", test))]
impl TokenService {
    /// Issue a token for `user_id`, valid from now for the configured TTL.
    pub fn issue(&self, user_id: Uuid) -> Result<String, TokenError> {
        self.issue_at(user_id, Utc::now())
    }

    pub fn issue_at(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = JwtClaims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &claims,
            &jsonwebtoken::EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(TokenError::Signing)
    }
}
