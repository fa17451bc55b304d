//! Queue operations over the `deferred_requests` table.
use sqlx::SqlitePool;

use crate::domain::model::Priority;
use crate::domain::request::DeferredRequest;
use crate::infra::time::epoch_ms_to_secs;

use super::models::RequestRecord;

pub async fn save(pool: &SqlitePool, request: &DeferredRequest) -> Result<(), String> {
    if request.priority == Priority::Immediate {
        return Err("immediate requests are never persisted".to_string());
    }

    let headers_json =
        serde_json::to_string(&request.headers).map_err(|e| format!("encode headers: {e}"))?;

    sqlx::query(
        r#"
      INSERT INTO deferred_requests(
        id, url, method, headers, body, priority, enqueued_at, max_deferral_time
      ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
      ON CONFLICT(id) DO UPDATE SET
        url = excluded.url,
        method = excluded.method,
        headers = excluded.headers,
        body = excluded.body,
        priority = excluded.priority,
        enqueued_at = excluded.enqueued_at,
        max_deferral_time = excluded.max_deferral_time
      "#,
    )
    .bind(&request.id)
    .bind(&request.url)
    .bind(&request.method)
    .bind(&headers_json)
    .bind(&request.body)
    .bind(request.priority.rank())
    .bind(epoch_ms_to_secs(request.enqueued_at_ms))
    .bind(epoch_ms_to_secs(request.max_deferral_ms))
    .execute(pool)
    .await
    .map_err(|e| format!("save request error: {e}"))?;
    Ok(())
}

pub async fn fetch_batch(pool: &SqlitePool, limit: i64) -> Result<Vec<DeferredRequest>, String> {
    let rows = sqlx::query_as::<_, RequestRecord>(
        r#"
      SELECT id, url, method, headers, body, priority, enqueued_at, max_deferral_time
      FROM deferred_requests
      ORDER BY priority ASC, enqueued_at ASC
      LIMIT ?1
      "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await
    .map_err(|e| format!("fetch_batch error: {e}"))?;

    rows.into_iter().map(RequestRecord::into_domain).collect()
}

pub async fn delete(pool: &SqlitePool, ids: &[String]) -> Result<(), String> {
    if ids.is_empty() {
        return Ok(());
    }

    let mut tx = pool.begin().await.map_err(|e| format!("tx begin: {e}"))?;
    for id in ids {
        sqlx::query("DELETE FROM deferred_requests WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| format!("delete request error: {e}"))?;
    }
    tx.commit().await.map_err(|e| format!("tx commit: {e}"))?;
    Ok(())
}

pub async fn delete_expired(pool: &SqlitePool, now_ms: i64) -> Result<u64, String> {
    let result = sqlx::query("DELETE FROM deferred_requests WHERE enqueued_at + max_deferral_time < ?1")
        .bind(epoch_ms_to_secs(now_ms))
        .execute(pool)
        .await
        .map_err(|e| format!("delete_expired error: {e}"))?;
    Ok(result.rows_affected())
}

pub async fn count(pool: &SqlitePool) -> Result<u64, String> {
    let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM deferred_requests")
        .fetch_one(pool)
        .await
        .map_err(|e| format!("count error: {e}"))?;
    Ok(n.max(0) as u64)
}

pub async fn total_payload_size(pool: &SqlitePool) -> Result<u64, String> {
    // Header weight is approximated by the stored JSON length; the exact
    // per-request size is computed in memory at transmit time.
    let n: i64 = sqlx::query_scalar(
        r#"
      SELECT COALESCE(SUM(
        LENGTH(url) + LENGTH(COALESCE(headers, '')) + LENGTH(COALESCE(body, x''))
      ), 0)
      FROM deferred_requests
      "#,
    )
    .fetch_one(pool)
    .await
    .map_err(|e| format!("total_payload_size error: {e}"))?;
    Ok(n.max(0) as u64)
}

pub async fn clear(pool: &SqlitePool) -> Result<(), String> {
    sqlx::query("DELETE FROM deferred_requests")
        .execute(pool)
        .await
        .map_err(|e| format!("clear error: {e}"))?;
    Ok(())
}
