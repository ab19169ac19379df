//! Domain error types for the blog server.
//!
//! Uses thiserror for ergonomic error handling with automatic Display implementations.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use std::fmt;

/// Application-level errors.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed
    #[error("Database error: {0}")]
    Database(String),

    /// Resource not found
    #[error("{0} not found")]
    NotFound(String),

    /// Invalid input data
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Authentication failed
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Resource already exists
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Unexpected failure outside the database (hashing, signing)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let (status, error_code, response_message) = match self {
            AppError::Database(err_str) => {
                tracing::error!("Database error: {}", err_str);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "An internal database error occurred".to_string(),
                )
            }
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", self.to_string()),
            AppError::InvalidInput(_) => {
                (StatusCode::BAD_REQUEST, "INVALID_INPUT", self.to_string())
            }
            AppError::Unauthorized(_) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", self.to_string())
            }
            AppError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT", self.to_string()),
            AppError::Internal(err_str) => {
                tracing::error!("Internal error: {}", err_str);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                )
            }
        };

        HttpResponse::build(status).json(ErrorResponse {
            error: error_code.to_string(),
            message: response_message,
        })
    }
}

/// Failures of the session lifecycle: login, federated login, refresh, logout.
///
/// Every variant except `Internal` is an expected outcome that the handler
/// layer turns into a 401 or 409. `RefreshTokenRevoked` on a token the client
/// still holds usually means it was already rotated, i.e. possible replay.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Bad credentials, or the owner of a refresh token no longer exists.
    #[error("user not found")]
    UserNotFound,

    /// Password login attempted on an account created through GitHub.
    #[error("user already exists with github login")]
    UserExistsWithGitHubLogin,

    /// GitHub login attempted for an email owned by a password account.
    #[error("user already exists with system login")]
    UserExistsWithSystemLogin,

    #[error("invalid refresh token")]
    InvalidRefreshToken,

    #[error("refresh token expired")]
    RefreshTokenExpired,

    #[error("refresh token revoked")]
    RefreshTokenRevoked,

    /// Storage or signing failure, wrapped with what was being attempted.
    #[error("{context}: {source}")]
    Internal {
        context: &'static str,
        #[source]
        source: AppError,
    },
}

impl AuthError {
    /// Build a mapper that wraps an infrastructure error with context.
    pub fn internal(context: &'static str) -> impl FnOnce(AppError) -> AuthError {
        move |source| AuthError::Internal { context, source }
    }

    /// Stable machine-readable code for the response body.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::UserNotFound => "USER_NOT_FOUND",
            AuthError::UserExistsWithGitHubLogin => "USER_EXISTS_WITH_GITHUB_LOGIN",
            AuthError::UserExistsWithSystemLogin => "USER_EXISTS_WITH_SYSTEM_LOGIN",
            AuthError::InvalidRefreshToken => "INVALID_REFRESH_TOKEN",
            AuthError::RefreshTokenExpired => "REFRESH_TOKEN_EXPIRED",
            AuthError::RefreshTokenRevoked => "REFRESH_TOKEN_REVOKED",
            AuthError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::UserNotFound
            | AuthError::InvalidRefreshToken
            | AuthError::RefreshTokenExpired
            | AuthError::RefreshTokenRevoked => StatusCode::UNAUTHORIZED,
            AuthError::UserExistsWithGitHubLogin | AuthError::UserExistsWithSystemLogin => {
                StatusCode::CONFLICT
            }
            AuthError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AuthError::UserNotFound => "Email or password is incorrect",
            AuthError::UserExistsWithGitHubLogin => {
                "This email is registered with GitHub. Please use GitHub login."
            }
            AuthError::UserExistsWithSystemLogin => {
                "This email is already registered. Please use email/password login instead."
            }
            AuthError::InvalidRefreshToken
            | AuthError::RefreshTokenExpired
            | AuthError::RefreshTokenRevoked => "Invalid or expired refresh token",
            AuthError::Internal { .. } => {
                tracing::error!(error = %self, "Auth operation failed");
                "Internal server error"
            }
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.code().to_string(),
            message: message.to_string(),
        })
    }
}

/// Failures talking to the GitHub OAuth provider.
#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    /// Transport failure, timeout or undecodable body
    #[error("GitHub request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("GitHub returned {status} for {endpoint}")]
    Status {
        endpoint: &'static str,
        status: u16,
    },

    /// Token endpoint answered without an access token
    #[error("GitHub token exchange failed: {0}")]
    TokenExchange(String),

    #[error("GitHub account has no usable email")]
    MissingEmail,

    #[error("GitHub OAuth is not configured")]
    NotConfigured,
}

impl ResponseError for OAuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            OAuthError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let (error_code, message) = match self {
            OAuthError::NotConfigured => ("OAUTH_NOT_CONFIGURED", self.to_string()),
            OAuthError::MissingEmail => ("OAUTH_MISSING_EMAIL", self.to_string()),
            _ => {
                tracing::warn!(error = %self, "GitHub OAuth failed");
                ("OAUTH_PROVIDER_ERROR", "GitHub authentication failed".to_string())
            }
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: error_code.to_string(),
            message,
        })
    }
}

/// Error response body matching OpenAPI schema.
#[derive(Debug, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

// Conversion implementations for common error types

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::InvalidInput(format!("Invalid UUID: {}", err))
    }
}
