//! Bearer token verification.
//!
//! Tokens are issued elsewhere; this module only verifies HS256 signatures
//! and expiry against the shared secret and hands back the claims.

use crate::errors::{Error, Result};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

/// Claims carried by a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id, as digits
    pub sub: String,
    /// Role recorded at issuance; informational, the live record decides
    pub role: String,
    /// Issued-at, seconds since the epoch
    pub iat: i64,
    /// Expiry, seconds since the epoch
    pub exp: i64,
}

/// Verifies HS256 bearer tokens against a shared secret.
#[derive(Clone)]
pub struct TokenVerifier {
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    /// Builds a verifier from the shared HS256 secret.
    #[must_use]
    pub fn from_secret(secret: &str) -> Self {
        Self {
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Decodes and verifies a token, returning its claims.
    ///
    /// # Errors
    /// Returns `InvalidToken` when the signature, expiry, or claim shape is
    /// wrong.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| Error::InvalidToken {
                message: e.to_string(),
            })
    }
}
