//! Persistence abstraction over the pending queue and the transmission log.
use crate::domain::model::{TransmissionRecord, TransmissionTotals};
use crate::domain::request::DeferredRequest;

/// Durable, priority-aware storage for deferred requests.
///
/// Every mutating operation is durable before it returns. Implementations
/// serialize concurrent mutations; readers never observe partial writes.
#[async_trait::async_trait]
pub trait RequestStore: Send + Sync {
    /// Upserts by id. Rejects `immediate` priority, which never enters the
    /// queue.
    async fn save(&self, request: &DeferredRequest) -> Result<(), String>;

    /// Up to `limit` rows ordered by `(priority ASC, enqueued_at ASC)`.
    async fn fetch_batch(&self, limit: i64) -> Result<Vec<DeferredRequest>, String>;

    /// Removes a set of rows in one atomic operation; unknown ids are
    /// ignored.
    async fn delete(&self, ids: &[String]) -> Result<(), String>;

    /// Removes rows whose deadline passed before `now_ms`; returns how many.
    async fn delete_expired(&self, now_ms: i64) -> Result<u64, String>;

    async fn count(&self) -> Result<u64, String>;

    /// Sum of pending payload sizes, as a cheap aggregate.
    async fn total_payload_size(&self) -> Result<u64, String>;

    /// Removes all pending requests; the transmission log is untouched.
    async fn clear(&self) -> Result<(), String>;

    async fn log_transmission(&self, record: &TransmissionRecord) -> Result<(), String>;

    /// Aggregates the transmission log from `since_ms` forward.
    async fn transmission_stats(&self, since_ms: i64) -> Result<TransmissionTotals, String>;

    /// Drops log rows older than `before_ms`; returns how many.
    async fn prune_log(&self, before_ms: i64) -> Result<u64, String>;
}
