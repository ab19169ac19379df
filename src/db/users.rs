//! Database queries for users.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::entity::user::{self, ActiveModel, Entity as UserEntity};
use crate::error::{AppError, AppResult};
use crate::models::{NewUser, User};

use super::{DbPool, UserStore};

#[async_trait]
impl UserStore for DbPool {
    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        let model = ActiveModel {
            id: Set(id),
            name: Set(new_user.name),
            email: Set(new_user.email),
            password_hash: Set(new_user.password_hash),
            active: Set(true),
            github_id: Set(new_user.github_id),
            created_at: Set(now),
            updated_at: Set(now),
        };

        UserEntity::insert(model)
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert user: {}", e)))?;

        // Fetch back the inserted user
        let inserted = UserEntity::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to fetch inserted user: {}", e)))?
            .ok_or_else(|| AppError::Database("Inserted user not found".to_string()))?;

        Ok(model_to_user(inserted))
    }

    async fn update_email(&self, id: Uuid, email: &str) -> AppResult<()> {
        let result = UserEntity::update_many()
            .col_expr(user::Column::Email, Expr::value(email.to_string()))
            .col_expr(user::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(user::Column::Id.eq(id))
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to update user email: {}", e)))?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("User {}", id)));
        }

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id)
            .filter(user::Column::Active.eq(true))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get user: {}", e)))?;

        Ok(result.map(model_to_user))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get user by email: {}", e)))?;

        Ok(result.map(model_to_user))
    }

    async fn find_by_external_id(&self, github_id: i64) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::GithubId.eq(github_id))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get user by GitHub id: {}", e)))?;

        Ok(result.map(model_to_user))
    }

    async fn exists_by_email(&self, email: &str) -> AppResult<bool> {
        let count = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count users: {}", e)))?;

        Ok(count > 0)
    }
}

fn model_to_user(m: user::Model) -> User {
    User {
        id: m.id,
        name: m.name,
        email: m.email,
        password_hash: m.password_hash,
        active: m.active,
        github_id: m.github_id,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}
