//! HS256 bearer tokens carrying `(subject, role)`.

use crate::{
    entities::{Role, UserModel},
    errors::{Error, Result},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Claims embedded in every token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id as a string
    pub sub: String,
    /// Role at issue time (informational; the guard re-reads the stored role)
    pub role: Role,
    /// Issued-at, seconds since the epoch
    pub iat: i64,
    /// Expiry, seconds since the epoch
    pub exp: i64,
}

/// Issues and verifies bearer tokens with a shared secret.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    /// Creates a service signing with `secret`; tokens live for `ttl_hours`.
    #[must_use]
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Issues a token for `user`.
    pub fn issue(&self, user: &UserModel) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding).map_err(|e| Error::Internal {
            message: format!("Failed to sign token: {e}"),
        })
    }

    /// Verifies signature and expiry and returns the claims.
    ///
    /// # Errors
    /// Returns [`Error::Unauthorized`] for any malformed, forged or expired token.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| {
                debug!("Token rejected: {}", e);
                Error::unauthorized("Invalid or expired token")
            })
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
#[must_use]
pub fn bearer_token(header_value: &str) -> Option<&str> {
    header_value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
