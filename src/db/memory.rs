//! In-process credential store backed by `HashMap`s.
//!
//! Thread-safe via `tokio::sync::RwLock`. Enforces the same uniqueness rules
//! as the PostgreSQL schema (email, GitHub id, token hash) so service code
//! behaves the same against either store. Data is lost when dropped.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{RefreshTokenStore, UserStore};
use crate::error::{AppError, AppResult};
use crate::models::{NewRefreshToken, NewUser, RefreshToken, User};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    refresh_tokens: HashMap<Uuid, RefreshToken>,
}

/// In-memory user and refresh token store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fully formed refresh token, bypassing `save` (fixtures).
    pub async fn insert_refresh_token(&self, token: RefreshToken) {
        self.tables
            .write()
            .await
            .refresh_tokens
            .insert(token.id, token);
    }

    /// Set the active flag of a user.
    pub async fn set_active(&self, id: Uuid, active: bool) {
        if let Some(user) = self.tables.write().await.users.get_mut(&id) {
            user.active = active;
        }
    }

    pub async fn user_count(&self) -> usize {
        self.tables.read().await.users.len()
    }

    pub async fn refresh_token_count(&self) -> usize {
        self.tables.read().await.refresh_tokens.len()
    }

    /// Snapshot of all refresh tokens issued to a user.
    pub async fn refresh_tokens_for(&self, user_id: Uuid) -> Vec<RefreshToken> {
        self.tables
            .read()
            .await
            .refresh_tokens
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let mut tables = self.tables.write().await;

        if tables.users.values().any(|u| u.email == new_user.email) {
            return Err(AppError::Database(
                "duplicate key value violates unique constraint \"idx_users_email\"".to_string(),
            ));
        }
        if let Some(github_id) = new_user.github_id
            && tables
                .users
                .values()
                .any(|u| u.github_id == Some(github_id))
        {
            return Err(AppError::Database(
                "duplicate key value violates unique constraint \"idx_users_github_id\""
                    .to_string(),
            ));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: new_user.name,
            email: new_user.email,
            password_hash: new_user.password_hash,
            active: true,
            github_id: new_user.github_id,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn update_email(&self, id: Uuid, email: &str) -> AppResult<()> {
        let mut tables = self.tables.write().await;

        if tables.users.values().any(|u| u.id != id && u.email == email) {
            return Err(AppError::Database(
                "duplicate key value violates unique constraint \"idx_users_email\"".to_string(),
            ));
        }

        let user = tables
            .users
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("User {}", id)))?;
        user.email = email.to_string();
        user.updated_at = Utc::now();

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).filter(|u| u.active).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_external_id(&self, github_id: i64) -> AppResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.github_id == Some(github_id))
            .cloned())
    }

    async fn exists_by_email(&self, email: &str) -> AppResult<bool> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().any(|u| u.email == email))
    }
}

#[async_trait]
impl RefreshTokenStore for MemoryStore {
    async fn save(&self, token: NewRefreshToken) -> AppResult<RefreshToken> {
        let mut tables = self.tables.write().await;

        if tables
            .refresh_tokens
            .values()
            .any(|t| t.token_hash == token.token_hash)
        {
            return Err(AppError::Database(
                "duplicate key value violates unique constraint \"idx_refresh_tokens_hash\""
                    .to_string(),
            ));
        }

        let saved = RefreshToken {
            id: Uuid::new_v4(),
            user_id: token.user_id,
            token_hash: token.token_hash,
            user_agent: token.user_agent,
            ip_address: token.ip_address,
            created_at: Utc::now(),
            expires_at: token.expires_at,
            revoked_at: None,
        };
        tables.refresh_tokens.insert(saved.id, saved.clone());

        Ok(saved)
    }

    async fn find_by_hash(&self, token_hash: &str) -> AppResult<Option<RefreshToken>> {
        let tables = self.tables.read().await;
        Ok(tables
            .refresh_tokens
            .values()
            .find(|t| t.token_hash == token_hash)
            .cloned())
    }

    async fn revoke_if_active(&self, id: Uuid) -> AppResult<bool> {
        // Check and set under one write lock
        let mut tables = self.tables.write().await;
        match tables.refresh_tokens.get_mut(&id) {
            Some(token) if token.revoked_at.is_none() => {
                token.revoked_at = Some(Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn revoke(&self, id: Uuid) -> AppResult<()> {
        self.revoke_if_active(id).await?;
        Ok(())
    }

    async fn delete_expired_or_revoked(&self) -> AppResult<u64> {
        let now = Utc::now();
        let mut tables = self.tables.write().await;
        let before = tables.refresh_tokens.len();
        tables
            .refresh_tokens
            .retain(|_, t| t.expires_at >= now && t.revoked_at.is_none());
        Ok((before - tables.refresh_tokens.len()) as u64)
    }
}
