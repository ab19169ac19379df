//! Credential store interfaces consumed by the session manager.
//!
//! `DbPool` implements both against PostgreSQL; `MemoryStore` implements
//! both in process for tests.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{NewRefreshToken, NewUser, RefreshToken, User};

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new active user. Fails if the email or GitHub id is taken.
    async fn create(&self, user: NewUser) -> AppResult<User>;

    /// Replace the stored email of a user.
    async fn update_email(&self, id: Uuid, email: &str) -> AppResult<()>;

    /// Find an active user by id. Deactivated users are not returned.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find a user by email, active or not.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Find a user by linked GitHub account id.
    async fn find_by_external_id(&self, github_id: i64) -> AppResult<Option<User>>;

    async fn exists_by_email(&self, email: &str) -> AppResult<bool>;
}

#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    async fn save(&self, token: NewRefreshToken) -> AppResult<RefreshToken>;

    /// Find a token by hash, including revoked and expired ones.
    async fn find_by_hash(&self, token_hash: &str) -> AppResult<Option<RefreshToken>>;

    /// Revoke a token only if it is not revoked yet, in one conditional write.
    ///
    /// Returns true when this call performed the revocation. Two concurrent
    /// callers on the same token see exactly one `true`.
    async fn revoke_if_active(&self, id: Uuid) -> AppResult<bool>;

    /// Revoke a token. Revoking an already revoked token is a no-op.
    async fn revoke(&self, id: Uuid) -> AppResult<()>;

    /// Hard-delete every token that is expired or revoked. Returns rows deleted.
    async fn delete_expired_or_revoked(&self) -> AppResult<u64>;
}
