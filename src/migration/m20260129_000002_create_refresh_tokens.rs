//! Migration: Create refresh_tokens table.
//!
//! Stores hashed refresh tokens for session management.
//! Enables server-side revocation and token rotation.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TABLE refresh_tokens (
                    id UUID PRIMARY KEY,
                    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                    token_hash CHAR(64) NOT NULL,
                    user_agent TEXT,
                    ip_address VARCHAR(64),

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    expires_at TIMESTAMPTZ NOT NULL,
                    revoked_at TIMESTAMPTZ
                );

                -- Lookup by hash; revoked rows stay findable until purged
                CREATE UNIQUE INDEX idx_refresh_tokens_hash
                    ON refresh_tokens(token_hash);

                -- Cleanup: find expired tokens
                CREATE INDEX idx_refresh_tokens_expires_at
                    ON refresh_tokens(expires_at);

                -- Cleanup: find revoked tokens
                CREATE INDEX idx_refresh_tokens_revoked_at
                    ON refresh_tokens(revoked_at)
                    WHERE revoked_at IS NOT NULL;

                CREATE INDEX idx_refresh_tokens_user_id
                    ON refresh_tokens(user_id);
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS refresh_tokens CASCADE;")
            .await?;

        Ok(())
    }
}
