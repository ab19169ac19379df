//! Business logic services.

pub mod cleanup;
pub mod github_oauth;
pub mod session;
pub mod users;

pub use cleanup::{CleanupConfig, start_cleanup_task};
pub use github_oauth::GitHubOAuthClient;
pub use session::AuthSessionManager;
pub use users::UserService;
