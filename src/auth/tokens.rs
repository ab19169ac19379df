//! Access token signing and refresh token generation.
//!
//! - Access token: HS256 JWT carrying the user id and email
//! - Refresh token: 64 random bytes, hex encoded; only its SHA-256 is stored

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::ExposeSecret;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config::AuthSettings;
use crate::error::{AppError, AppResult};
use crate::models::AccessClaims;

/// Access token issuer.
pub const ISSUER: &str = "personal-blog";

/// Signs and verifies access tokens with a shared HS256 secret.
#[derive(Clone)]
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenSigner {
    pub fn new(settings: &AuthSettings) -> Self {
        let secret = settings.jwt_secret.expose_secret().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl: Duration::seconds(settings.access_token_ttl_secs as i64),
        }
    }

    /// Issue an access token for a user.
    pub fn issue(&self, user_id: Uuid, email: &str) -> AppResult<String> {
        let now = Utc::now();
        let exp = now + self.ttl;

        let claims = AccessClaims {
            sub: user_id.to_string(),
            iss: ISSUER.to_string(),
            exp: exp.timestamp() as usize,
            iat: now.timestamp() as usize,
            nbf: now.timestamp() as usize,
            user_id: user_id.to_string(),
            email: email.to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign access token: {}", e)))
    }

    /// Verify an access token and return its claims.
    pub fn verify(&self, token: &str) -> AppResult<AccessClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.validate_aud = false;
        validation.validate_nbf = true;

        decode::<AccessClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| AppError::Unauthorized(format!("Invalid access token: {}", e)))
    }
}

/// Generate a new refresh token, returning `(raw, hash)`.
///
/// The raw value goes to the client once; the hash is what gets stored.
pub fn generate_refresh_token() -> (String, String) {
    let high: [u8; 32] = rand::random();
    let low: [u8; 32] = rand::random();
    let mut bytes = Vec::with_capacity(64);
    bytes.extend_from_slice(&high);
    bytes.extend_from_slice(&low);

    let raw = hex::encode(bytes);
    let hash = hash_refresh_token(&raw);
    (raw, hash)
}

/// SHA-256 a raw refresh token to its stored hex form.
pub fn hash_refresh_token(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}
