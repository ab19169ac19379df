//! Database module providing connection management, migrations, and the
//! credential stores used by the session manager.

pub mod memory;
pub mod refresh_tokens;
pub mod store;
pub mod users;

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::config::Config;
use crate::error::AppResult;
use crate::migration::Migrator;

pub use memory::MemoryStore;
pub use store::{RefreshTokenStore, UserStore};

/// Connection attempt timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Database connection pool wrapper.
///
/// `DatabaseConnection` is already a pooled, cloneable handle.
#[derive(Clone)]
pub struct DbPool {
    conn: DatabaseConnection,
}

impl DbPool {
    /// Create a new database pool from configuration.
    pub async fn new(config: &Config) -> AppResult<Self> {
        let mut opts = ConnectOptions::new(config.database.url.clone());
        opts.max_connections(config.database.max_connections)
            .min_connections(config.database.min_connections)
            .connect_timeout(CONNECT_TIMEOUT)
            .sqlx_logging(false);

        let conn = Database::connect(opts).await?;

        Ok(DbPool { conn })
    }

    /// Get access to the connection for executing queries.
    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Apply pending migrations.
    pub async fn run_migrations(&self) -> AppResult<()> {
        Migrator::up(&self.conn, None).await?;
        info!("Database migrations complete");
        Ok(())
    }
}
