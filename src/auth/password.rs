//! Password hashing behind a trait so the session manager can be tested
//! with a fast or instrumented hasher.

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, Params, PasswordHash};
// Trait methods only; the names clash with our own trait
use argon2::{PasswordHasher as _, PasswordVerifier as _};

use crate::error::{AppError, AppResult};

/// One-way password hashing.
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password into a self-describing PHC string.
    fn hash(&self, password: &str) -> AppResult<String>;

    /// Check a plaintext password against a stored hash.
    ///
    /// A malformed stored hash verifies as false rather than erroring.
    fn verify(&self, hash: &str, password: &str) -> bool;
}

/// Argon2id hasher.
#[derive(Clone, Default)]
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl Argon2Hasher {
    /// Hasher with the crate's default (OWASP recommended) cost parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hasher with explicit cost parameters, mainly for tests.
    pub fn with_params(params: Params) -> Self {
        Self {
            argon2: Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params),
        }
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
    }

    fn verify(&self, hash: &str, password: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return false;
        };
        self.argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}
