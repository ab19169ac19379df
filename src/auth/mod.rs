//! Credential primitives: password hashing, access token signing,
//! refresh token generation and the bearer token extractor.

mod extractor;
pub mod password;
pub mod tokens;

pub use extractor::BearerAuth;
pub use password::{Argon2Hasher, PasswordHasher};
pub use tokens::{ISSUER, TokenSigner, generate_refresh_token, hash_refresh_token};
