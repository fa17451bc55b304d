//! Append and aggregate the `transmission_log` table.
use sqlx::SqlitePool;

use crate::domain::model::{TransmissionRecord, TransmissionTotals};
use crate::infra::time::epoch_ms_to_secs;

pub async fn log_transmission(
    pool: &SqlitePool,
    record: &TransmissionRecord,
) -> Result<(), String> {
    sqlx::query(
        r#"
      INSERT INTO transmission_log(
        timestamp, request_count, total_bytes, network_type, is_charging, trigger_reason
      ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
      "#,
    )
    .bind(epoch_ms_to_secs(record.timestamp_ms))
    .bind(record.request_count as i64)
    .bind(record.total_bytes as i64)
    .bind(record.network_type.as_str())
    .bind(record.is_charging as i64)
    .bind(&record.trigger_reason)
    .execute(pool)
    .await
    .map_err(|e| format!("log_transmission error: {e}"))?;
    Ok(())
}

pub async fn transmission_stats(
    pool: &SqlitePool,
    since_ms: i64,
) -> Result<TransmissionTotals, String> {
    let (batches, requests, bytes): (i64, i64, i64) = sqlx::query_as(
        r#"
      SELECT COUNT(*), COALESCE(SUM(request_count), 0), COALESCE(SUM(total_bytes), 0)
      FROM transmission_log
      WHERE timestamp >= ?1
      "#,
    )
    .bind(epoch_ms_to_secs(since_ms))
    .fetch_one(pool)
    .await
    .map_err(|e| format!("transmission_stats error: {e}"))?;

    Ok(TransmissionTotals {
        batch_count: batches.max(0) as u64,
        total_requests: requests.max(0) as u64,
        total_bytes: bytes.max(0) as u64,
    })
}

pub async fn prune_log(pool: &SqlitePool, before_ms: i64) -> Result<u64, String> {
    let result = sqlx::query("DELETE FROM transmission_log WHERE timestamp < ?1")
        .bind(epoch_ms_to_secs(before_ms))
        .execute(pool)
        .await
        .map_err(|e| format!("prune_log error: {e}"))?;
    Ok(result.rows_affected())
}
