//! Helpers to create and configure the SQLite pool.
use std::{
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    SqlitePool,
};

pub async fn create_pool(db_path: &Path) -> Result<SqlitePool, String> {
    let full_path = if db_path.is_absolute() {
        db_path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(db_path)
    };

    if let Some(parent) = full_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| format!("db dir create error: {e}"))?;
    }

    let url = format!("sqlite://{}", full_path.display());
    let opts = SqliteConnectOptions::from_str(&url)
        .map_err(|e| format!("db connect options error: {e}"))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5))
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(opts)
        .await
        .map_err(|e| format!("db connect error: {e}"))?;

    set_synchronous(&pool, "NORMAL").await?;
    Ok(pool)
}

pub async fn create_memory_pool() -> Result<SqlitePool, String> {
    let opts = SqliteConnectOptions::from_str("sqlite::memory:")
        .map_err(|e| format!("db connect options error: {e}"))?;

    // One connection: each in-memory connection is its own database.
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(opts)
        .await
        .map_err(|e| format!("db connect error: {e}"))
}

async fn set_synchronous(pool: &SqlitePool, mode: &str) -> Result<(), String> {
    sqlx::query(&format!("PRAGMA synchronous={mode}"))
        .execute(pool)
        .await
        .map_err(|e| format!("set pragma synchronous: {e}"))?;
    Ok(())
}
