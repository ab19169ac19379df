//! Password signup.

use std::sync::Arc;

use tracing::info;

use crate::auth::PasswordHasher;
use crate::db::UserStore;
use crate::error::{AppError, AppResult};
use crate::models::{CreateUserRequest, NewUser, User};

/// Creates password accounts.
pub struct UserService {
    users: Arc<dyn UserStore>,
    hasher: Arc<dyn PasswordHasher>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { users, hasher }
    }

    /// Validate, reject a taken email, hash the password and store the user.
    pub async fn create_user(&self, request: CreateUserRequest) -> AppResult<User> {
        request.validate()?;

        let email = request.email.trim().to_string();
        if self.users.exists_by_email(&email).await? {
            return Err(AppError::Conflict("email already in use".to_string()));
        }

        let password_hash = self.hasher.hash(&request.password)?;
        let user = self
            .users
            .create(NewUser {
                name: request.name.trim().to_string(),
                email,
                password_hash: Some(password_hash),
                github_id: None,
            })
            .await?;

        info!(user_id = %user.id, "User created");
        Ok(user)
    }
}
