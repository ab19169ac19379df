//! Session credential models: token pairs, access token claims, GitHub identity.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Access + refresh token pair handed to the client.
///
/// The refresh token is given out once; only its hash is stored.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Access token JWT claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String,
    pub iss: String,
    pub exp: usize,
    pub iat: usize,
    pub nbf: usize,
    pub user_id: String,
    pub email: String,
}

/// Width of the `users.name` column.
pub const MAX_DISPLAY_NAME_LENGTH: usize = 255;

/// External identity resolved from GitHub. Never persisted as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubIdentity {
    /// GitHub numeric account id, the stable correlation key
    pub id: i64,
    pub email: String,
    pub name: Option<String>,
    pub login: String,
    pub avatar_url: Option<String>,
}

impl GitHubIdentity {
    /// Name for a new local account: the profile name, else the login.
    pub fn display_name(&self) -> String {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.login)
            .chars()
            .take(MAX_DISPLAY_NAME_LENGTH)
            .collect()
    }
}

/// Request metadata recorded on refresh tokens for auditing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestMeta {
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

/// Password login request body.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Refresh/logout request body.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// GitHub OAuth callback query.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
}
