//! Schema creation for the pending queue and the transmission log.
use sqlx::SqlitePool;
use tracing::info;

pub async fn migrate(pool: &SqlitePool) -> Result<(), String> {
    info!("DB migrate start");

    let ddls = [
        r#"
      CREATE TABLE IF NOT EXISTS deferred_requests(
        id TEXT PRIMARY KEY,
        url TEXT NOT NULL,
        method TEXT NOT NULL,
        headers TEXT,
        body BLOB,
        priority INTEGER NOT NULL,
        enqueued_at REAL NOT NULL,
        max_deferral_time REAL NOT NULL
      )"#,
        r#"
      CREATE TABLE IF NOT EXISTS transmission_log(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        timestamp REAL NOT NULL,
        request_count INTEGER NOT NULL,
        total_bytes INTEGER NOT NULL,
        network_type TEXT,
        is_charging INTEGER,
        trigger_reason TEXT
      )"#,
        r#"CREATE INDEX IF NOT EXISTS idx_deferred_requests_priority
       ON deferred_requests(priority)"#,
        r#"CREATE INDEX IF NOT EXISTS idx_deferred_requests_enqueued_at
       ON deferred_requests(enqueued_at)"#,
    ];

    for ddl in ddls {
        sqlx::query(ddl)
            .execute(pool)
            .await
            .map_err(|e| format!("migrate error (ddl): {e}"))?;
    }

    info!("DB migrate done");
    Ok(())
}
