//! Token Codec
//!
//! Signs and verifies the compact bearer tokens carried on every
//! request. A token encodes subject id, role, and the backing session
//! id, with issued-at and expiry claims (HS256). The codec alone can
//! never revoke a token; revocation is the session store's job.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use kernel::id::{SessionId, UserId};
use kernel::identity::Role;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AuthError, AuthResult};

/// Token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user id
    pub sub: Uuid,
    /// Role code at issue time
    pub role: String,
    /// Backing session id
    pub sid: Uuid,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expiry (Unix seconds)
    pub exp: i64,
}

/// HS256 token codec
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenCodec {
    /// Create a codec from the shared secret and token lifetime
    pub fn new(secret: &[u8], ttl: std::time::Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // No leeway: an expired token is expired on the next second.
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl: Duration::from_std(ttl).unwrap_or_else(|_| Duration::days(7)),
        }
    }

    /// Issue a signed, time-bounded token
    pub fn issue(&self, user_id: UserId, role: Role, session_id: SessionId) -> AuthResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.into_uuid(),
            role: role.code().to_string(),
            sid: session_id.into_uuid(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AuthError::Internal(format!("Token encoding failed: {e}")))
    }

    /// Verify signature, format, and expiry; return the claims
    ///
    /// All failure modes collapse into [`AuthError::InvalidToken`] so
    /// a caller cannot probe which check failed.
    pub fn verify(&self, token: &str) -> AuthResult<Claims> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| AuthError::InvalidToken)
    }
}
