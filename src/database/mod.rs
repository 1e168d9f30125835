pub mod apps;
pub mod shares;
pub mod users;

use crate::config::DatabaseConfig;
use anyhow::{Context, Result};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};

/// Outcome of re-validating a session token against the backing store.
/// Named explicitly (rather than left as emergent control flow) because
/// the fail-open policy on transient database errors is a deliberate
/// design decision, not an accident of error propagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevalidateOutcome {
    Valid,
    Invalid,
    /// The backing store could not be reached; the session is kept alive
    /// rather than logging the user out on a transient blip.
    ValidFailOpen,
}

/// Handle to the sqlite-backed store of users, shares, capability grants
/// and registered apps.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        if !config.url.contains(":memory:") && !Sqlite::database_exists(&config.url).await.unwrap_or(false) {
            Sqlite::create_database(&config.url)
                .await
                .with_context(|| format!("creating database at {}", config.url))?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await
            .with_context(|| format!("connecting to database at {}", config.url))?;

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("running database migrations")?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    #[cfg(test)]
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }
}
