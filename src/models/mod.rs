//! Domain models for the blog identity service.

pub mod auth;
pub mod refresh_token;
pub mod user;

// Re-export commonly used types
pub use auth::{
    AccessClaims, CallbackQuery, GitHubIdentity, LoginRequest, RefreshTokenRequest, RequestMeta,
    TokenPair,
};
pub use refresh_token::{NewRefreshToken, RefreshToken};
pub use user::{CreateUserRequest, NewUser, User, UserResponse};
