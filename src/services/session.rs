//! Session lifecycle: password login, GitHub login, refresh rotation, logout.
//!
//! Every successful login or refresh produces a [`TokenPair`]: a short-lived
//! HS256 access token and a single-use refresh token whose SHA-256 is stored.
//!
//! Password login always runs exactly one hash comparison, against a dummy
//! hash when there is no real one, so response time does not reveal whether
//! an account exists or how it signs in.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info, warn};

use crate::auth::{PasswordHasher, TokenSigner, generate_refresh_token, hash_refresh_token};
use crate::config::AuthSettings;
use crate::db::{RefreshTokenStore, UserStore};
use crate::error::{AppResult, AuthError};
use crate::models::{GitHubIdentity, NewRefreshToken, NewUser, RequestMeta, TokenPair, User};

/// Plaintext behind the dummy hash compared on failed lookups.
const DUMMY_PASSWORD: &str = "dummy-password-for-constant-time-login";

/// Orchestrates credential checks and token issuance over the stores.
pub struct AuthSessionManager {
    users: Arc<dyn UserStore>,
    refresh_tokens: Arc<dyn RefreshTokenStore>,
    hasher: Arc<dyn PasswordHasher>,
    signer: TokenSigner,
    refresh_ttl: Duration,
    disclose_login_method: bool,
    dummy_hash: String,
}

impl AuthSessionManager {
    /// Build a manager. Computes the dummy hash up front with the same hasher
    /// so both login failure paths cost the same.
    pub fn new(
        users: Arc<dyn UserStore>,
        refresh_tokens: Arc<dyn RefreshTokenStore>,
        hasher: Arc<dyn PasswordHasher>,
        settings: &AuthSettings,
    ) -> AppResult<Self> {
        let dummy_hash = hasher.hash(DUMMY_PASSWORD)?;

        Ok(Self {
            users,
            refresh_tokens,
            hasher,
            signer: TokenSigner::new(settings),
            refresh_ttl: Duration::seconds(settings.refresh_token_ttl_secs as i64),
            disclose_login_method: settings.disclose_login_method,
            dummy_hash,
        })
    }

    /// Signer used for access tokens, shared with the bearer extractor.
    pub fn signer(&self) -> &TokenSigner {
        &self.signer
    }

    /// Authenticate with email and password.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        meta: &RequestMeta,
    ) -> Result<TokenPair, AuthError> {
        let user = match self.users.find_by_email(email).await {
            Ok(user) => user,
            Err(e) => {
                self.compare_dummy(password);
                return Err(AuthError::internal("failed to find user by email")(e));
            }
        };

        let Some(user) = user else {
            self.compare_dummy(password);
            debug!(email = %email, "Login failed: unknown email");
            return Err(AuthError::UserNotFound);
        };

        if !user.active {
            self.compare_dummy(password);
            debug!(user_id = %user.id, "Login failed: inactive user");
            return Err(AuthError::UserNotFound);
        }

        let Some(password_hash) = user.password_hash.as_deref() else {
            self.compare_dummy(password);
            debug!(user_id = %user.id, "Login failed: account has no password");
            return Err(if self.disclose_login_method {
                AuthError::UserExistsWithGitHubLogin
            } else {
                AuthError::UserNotFound
            });
        };

        if !self.hasher.verify(password_hash, password) {
            debug!(user_id = %user.id, "Login failed: wrong password");
            return Err(AuthError::UserNotFound);
        }

        let pair = self.issue_tokens(&user, meta).await?;
        info!(user_id = %user.id, "User logged in");
        Ok(pair)
    }

    /// Authenticate with an identity resolved from GitHub.
    ///
    /// The GitHub account id is the correlation key. An email that already
    /// belongs to a local account is never linked implicitly.
    pub async fn login_with_github(
        &self,
        identity: &GitHubIdentity,
        meta: &RequestMeta,
    ) -> Result<TokenPair, AuthError> {
        let linked = self
            .users
            .find_by_external_id(identity.id)
            .await
            .map_err(AuthError::internal("failed to find user by github id"))?;

        if let Some(mut user) = linked {
            if !user.active {
                warn!(user_id = %user.id, github_id = identity.id, "GitHub login for inactive user");
                return Err(AuthError::UserNotFound);
            }

            if user.email != identity.email {
                self.users
                    .update_email(user.id, &identity.email)
                    .await
                    .map_err(AuthError::internal("failed to update user email"))?;
                info!(
                    user_id = %user.id,
                    github_id = identity.id,
                    "Synced user email from GitHub"
                );
                user.email = identity.email.clone();
            }

            let pair = self.issue_tokens(&user, meta).await?;
            info!(user_id = %user.id, github_id = identity.id, "User logged in with GitHub");
            return Ok(pair);
        }

        let existing = self
            .users
            .find_by_email(&identity.email)
            .await
            .map_err(AuthError::internal("failed to find user by email"))?;

        if let Some(existing) = existing {
            warn!(
                user_id = %existing.id,
                github_id = identity.id,
                "GitHub login rejected: email belongs to another account"
            );
            return Err(AuthError::UserExistsWithSystemLogin);
        }

        let user = self
            .users
            .create(NewUser {
                name: identity.display_name(),
                email: identity.email.clone(),
                password_hash: None,
                github_id: Some(identity.id),
            })
            .await
            .map_err(AuthError::internal("failed to create user"))?;
        info!(user_id = %user.id, github_id = identity.id, "Created user from GitHub login");

        self.issue_tokens(&user, meta).await
    }

    /// Redeem a refresh token for a new pair, revoking it in the process.
    pub async fn refresh_token(
        &self,
        raw_token: &str,
        meta: &RequestMeta,
    ) -> Result<TokenPair, AuthError> {
        let token_hash = hash_refresh_token(raw_token);
        let token = self
            .refresh_tokens
            .find_by_hash(&token_hash)
            .await
            .map_err(AuthError::internal("failed to find refresh token"))?
            .ok_or(AuthError::InvalidRefreshToken)?;

        if token.is_expired_at(Utc::now()) {
            debug!(token_id = %token.id, "Refresh token expired");
            return Err(AuthError::RefreshTokenExpired);
        }

        if token.is_revoked() {
            warn!(
                token_id = %token.id,
                user_id = %token.user_id,
                "Revoked refresh token presented"
            );
            return Err(AuthError::RefreshTokenRevoked);
        }

        // Revoke before issuing. Losing the race to a concurrent refresh of
        // the same token counts as reuse.
        let revoked = self
            .refresh_tokens
            .revoke_if_active(token.id)
            .await
            .map_err(AuthError::internal("failed to revoke refresh token"))?;
        if !revoked {
            warn!(
                token_id = %token.id,
                user_id = %token.user_id,
                "Concurrent refresh token reuse"
            );
            return Err(AuthError::RefreshTokenRevoked);
        }

        let user = self
            .users
            .find_by_id(token.user_id)
            .await
            .map_err(AuthError::internal("failed to find user by id"))?
            .ok_or(AuthError::UserNotFound)?;

        let pair = self.issue_tokens(&user, meta).await?;
        debug!(user_id = %user.id, "Refresh token rotated");
        Ok(pair)
    }

    /// Revoke a refresh token. Revoking an already revoked token succeeds.
    pub async fn logout(&self, raw_token: &str) -> Result<(), AuthError> {
        let token_hash = hash_refresh_token(raw_token);
        let token = self
            .refresh_tokens
            .find_by_hash(&token_hash)
            .await
            .map_err(AuthError::internal("failed to find refresh token"))?
            .ok_or(AuthError::InvalidRefreshToken)?;

        self.refresh_tokens
            .revoke(token.id)
            .await
            .map_err(AuthError::internal("failed to revoke refresh token"))?;

        info!(user_id = %token.user_id, "User logged out");
        Ok(())
    }

    /// Hard-delete expired and revoked refresh tokens.
    pub async fn cleanup_expired_or_revoked(&self) -> Result<u64, AuthError> {
        self.refresh_tokens
            .delete_expired_or_revoked()
            .await
            .map_err(AuthError::internal("failed to delete expired refresh tokens"))
    }

    async fn issue_tokens(&self, user: &User, meta: &RequestMeta) -> Result<TokenPair, AuthError> {
        let access_token = self
            .signer
            .issue(user.id, &user.email)
            .map_err(AuthError::internal("failed to sign access token"))?;

        let (refresh_token, token_hash) = generate_refresh_token();
        self.refresh_tokens
            .save(NewRefreshToken {
                user_id: user.id,
                token_hash,
                user_agent: meta.user_agent.clone(),
                ip_address: meta.ip_address.clone(),
                expires_at: Utc::now() + self.refresh_ttl,
            })
            .await
            .map_err(AuthError::internal("failed to save refresh token"))?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    fn compare_dummy(&self, password: &str) {
        let _ = self.hasher.verify(&self.dummy_hash, password);
    }
}
