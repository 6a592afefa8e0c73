use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{PgPool, SqlitePool};

use crate::core::config::DatabaseConfig;
use crate::features::locations::stores::{LocationStore, PgLocationStore, SqliteLocationStore};

/// Connection pool for the configured backend, created once at startup
#[derive(Clone)]
pub enum DatabasePool {
    Sqlite(SqlitePool),
    Postgres(PgPool),
}

impl DatabasePool {
    pub fn backend_name(&self) -> &'static str {
        match self {
            DatabasePool::Sqlite(_) => "sqlite",
            DatabasePool::Postgres(_) => "postgres",
        }
    }

    /// Run the embedded migrations for this backend
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        match self {
            DatabasePool::Sqlite(pool) => sqlx::migrate!("./migrations/sqlite").run(pool).await,
            DatabasePool::Postgres(pool) => sqlx::migrate!("./migrations/postgres").run(pool).await,
        }
    }

    pub fn location_store(&self) -> Arc<dyn LocationStore> {
        match self {
            DatabasePool::Sqlite(pool) => Arc::new(SqliteLocationStore::new(pool.clone())),
            DatabasePool::Postgres(pool) => Arc::new(PgLocationStore::new(pool.clone())),
        }
    }
}

pub async fn create_pool(config: &DatabaseConfig) -> Result<DatabasePool, sqlx::Error> {
    if config.is_postgres() {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
            .connect(&config.url)
            .await?;
        return Ok(DatabasePool::Postgres(pool));
    }

    let options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal);

    ensure_parent_dir(options.get_filename())?;

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
        .connect_with(options)
        .await?;

    Ok(DatabasePool::Sqlite(pool))
}

/// Single-connection in-memory SQLite database with migrations applied.
///
/// The connection never expires, so the database lives as long as the pool.
pub async fn create_in_memory_pool() -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?;

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations/sqlite")
        .run(&pool)
        .await
        .map_err(|e| sqlx::Error::Migrate(Box::new(e)))?;

    Ok(pool)
}

fn ensure_parent_dir(database_file: &Path) -> Result<(), sqlx::Error> {
    if database_file.as_os_str() == ":memory:" {
        return Ok(());
    }

    match database_file.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            std::fs::create_dir_all(dir)?;
            Ok(())
        }
        _ => Ok(()),
    }
}
