//! SQLite-backed `RequestStore`: WAL journaling, synchronous-normal, two
//! tables (`deferred_requests`, `transmission_log`).
use std::path::{Path, PathBuf};

use sqlx::SqlitePool;

use crate::domain::model::{TransmissionRecord, TransmissionTotals};
use crate::domain::request::DeferredRequest;
use crate::ports::store::RequestStore;

mod connection;
mod log;
mod migrations;
mod models;
mod requests;

/// Directory under the host-provided base where database files live.
const STORE_SUBDIR: &str = "NetworkBatcher";

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens (creating if needed) `<base_dir>/NetworkBatcher/<identifier>.sqlite`
    /// and runs migrations.
    pub async fn open(base_dir: &Path, identifier: &str) -> Result<Self, String> {
        let pool = connection::create_pool(&Self::db_path(base_dir, identifier)).await?;
        migrations::migrate(&pool).await?;
        Ok(Self { pool })
    }

    /// In-memory store for tests; contents vanish on drop.
    pub async fn open_in_memory() -> Result<Self, String> {
        let pool = connection::create_memory_pool().await?;
        migrations::migrate(&pool).await?;
        Ok(Self { pool })
    }

    pub fn db_path(base_dir: &Path, identifier: &str) -> PathBuf {
        base_dir
            .join(STORE_SUBDIR)
            .join(format!("{identifier}.sqlite"))
    }
}

#[async_trait::async_trait]
impl RequestStore for SqliteStore {
    async fn save(&self, request: &DeferredRequest) -> Result<(), String> {
        requests::save(&self.pool, request).await
    }

    async fn fetch_batch(&self, limit: i64) -> Result<Vec<DeferredRequest>, String> {
        requests::fetch_batch(&self.pool, limit).await
    }

    async fn delete(&self, ids: &[String]) -> Result<(), String> {
        requests::delete(&self.pool, ids).await
    }

    async fn delete_expired(&self, now_ms: i64) -> Result<u64, String> {
        requests::delete_expired(&self.pool, now_ms).await
    }

    async fn count(&self) -> Result<u64, String> {
        requests::count(&self.pool).await
    }

    async fn total_payload_size(&self) -> Result<u64, String> {
        requests::total_payload_size(&self.pool).await
    }

    async fn clear(&self) -> Result<(), String> {
        requests::clear(&self.pool).await
    }

    async fn log_transmission(&self, record: &TransmissionRecord) -> Result<(), String> {
        log::log_transmission(&self.pool, record).await
    }

    async fn transmission_stats(&self, since_ms: i64) -> Result<TransmissionTotals, String> {
        log::transmission_stats(&self.pool, since_ms).await
    }

    async fn prune_log(&self, before_ms: i64) -> Result<u64, String> {
        log::prune_log(&self.pool, before_ms).await
    }
}
