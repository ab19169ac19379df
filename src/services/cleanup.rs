//! Periodic purge of expired and revoked refresh tokens.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval, timeout};
use tracing::{debug, error, info};

use super::AuthSessionManager;

/// Upper bound on a single cleanup run.
const RUN_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the cleanup task.
#[derive(Debug, Clone)]
pub struct CleanupConfig {
    /// How often to run cleanup (in seconds)
    pub interval_secs: u64,
}

/// Start the cleanup background task.
///
/// Spawns a tokio task that deletes refresh tokens that are expired or
/// revoked on every tick. Failures are logged and the next tick retries.
pub fn start_cleanup_task(
    sessions: Arc<AuthSessionManager>,
    config: CleanupConfig,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "Starting refresh token cleanup (interval: {} seconds)",
            config.interval_secs
        );

        let mut ticker = interval(Duration::from_secs(config.interval_secs.max(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            run_cleanup(&sessions).await;
        }
    })
}

/// Run a single cleanup cycle.
async fn run_cleanup(sessions: &AuthSessionManager) {
    match timeout(RUN_TIMEOUT, sessions.cleanup_expired_or_revoked()).await {
        Ok(Ok(0)) => debug!("Token cleanup: nothing to delete"),
        Ok(Ok(deleted)) => info!(deleted, "Token cleanup: deleted expired or revoked tokens"),
        Ok(Err(e)) => error!("Token cleanup failed: {}", e),
        Err(_) => error!("Token cleanup timed out after {:?}", RUN_TIMEOUT),
    }
}
