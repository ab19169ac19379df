//! Database queries for refresh tokens.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::entity::refresh_token::{self, ActiveModel, Entity as RefreshTokenEntity};
use crate::error::{AppError, AppResult};
use crate::models::{NewRefreshToken, RefreshToken};

use super::{DbPool, RefreshTokenStore};

#[async_trait]
impl RefreshTokenStore for DbPool {
    /// Insert a new refresh token (stores the hash, not the raw token).
    async fn save(&self, token: NewRefreshToken) -> AppResult<RefreshToken> {
        let model = ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(token.user_id),
            token_hash: Set(token.token_hash),
            user_agent: Set(token.user_agent),
            ip_address: Set(token.ip_address),
            created_at: Set(Utc::now()),
            expires_at: Set(token.expires_at),
            revoked_at: Set(None),
        };

        let inserted = model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert refresh token: {}", e)))?;

        Ok(model_to_token(inserted))
    }

    async fn find_by_hash(&self, token_hash: &str) -> AppResult<Option<RefreshToken>> {
        let result = RefreshTokenEntity::find()
            .filter(refresh_token::Column::TokenHash.eq(token_hash))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get refresh token: {}", e)))?;

        Ok(result.map(model_to_token))
    }

    async fn revoke_if_active(&self, id: Uuid) -> AppResult<bool> {
        // UPDATE ... SET revoked_at = NOW() WHERE id = $1 AND revoked_at IS NULL
        let result = RefreshTokenEntity::update_many()
            .col_expr(
                refresh_token::Column::RevokedAt,
                Expr::value(Some(Utc::now())),
            )
            .filter(refresh_token::Column::Id.eq(id))
            .filter(refresh_token::Column::RevokedAt.is_null())
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to revoke refresh token: {}", e)))?;

        Ok(result.rows_affected == 1)
    }

    async fn revoke(&self, id: Uuid) -> AppResult<()> {
        self.revoke_if_active(id).await?;
        Ok(())
    }

    async fn delete_expired_or_revoked(&self) -> AppResult<u64> {
        let result = RefreshTokenEntity::delete_many()
            .filter(
                Condition::any()
                    .add(refresh_token::Column::ExpiresAt.lt(Utc::now()))
                    .add(refresh_token::Column::RevokedAt.is_not_null()),
            )
            .exec(self.connection())
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to delete expired refresh tokens: {}", e))
            })?;

        Ok(result.rows_affected)
    }
}

fn model_to_token(m: refresh_token::Model) -> RefreshToken {
    RefreshToken {
        id: m.id,
        user_id: m.user_id,
        token_hash: m.token_hash,
        user_agent: m.user_agent,
        ip_address: m.ip_address,
        created_at: m.created_at,
        expires_at: m.expires_at,
        revoked_at: m.revoked_at,
    }
}
