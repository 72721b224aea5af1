use sqlx::migrate::{MigrateError, Migrator};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::config;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid database url")]
    InvalidUrl(#[source] sqlx::Error),
    #[error("could not connect to the database")]
    Connect(#[source] sqlx::Error),
    #[error("could not apply database migrations")]
    Migrate(#[from] MigrateError),
}

/// Owns the connection pool. Cloning hands out another handle to the
/// same pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn connect(cfg: &config::Database) -> Result<Self, Error> {
        let options = SqliteConnectOptions::from_str(&cfg.url)
            .map_err(Error::InvalidUrl)?
            .create_if_missing(cfg.create_if_missing);

        let pool = SqlitePoolOptions::new()
            .max_connections(cfg.max_connections.get())
            .acquire_timeout(Duration::from_secs(cfg.timeout_secs.get()))
            .connect_with(options)
            .await
            .map_err(Error::Connect)?;

        Self::from_pool(pool).await
    }

    /// Private in-memory database with migrations applied.
    ///
    /// Every SQLite connection to `:memory:` opens its own database, so the
    /// pool is pinned to a single connection that is never recycled.
    pub async fn in_memory() -> Result<Self, Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect("sqlite::memory:")
            .await
            .map_err(Error::Connect)?;

        Self::from_pool(pool).await
    }

    async fn from_pool(pool: SqlitePool) -> Result<Self, Error> {
        MIGRATOR.run(&pool).await?;
        log::debug!("database migrations are up to date");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Waits for checked out connections to be returned, then closes them.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
