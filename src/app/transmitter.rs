//! Drives one batch through the transport: grouped by host so a warm
//! connection serves a whole host's queue, hosts fanned out concurrently,
//! successes deleted in one atomic operation.
use std::collections::HashMap;
use std::sync::Arc;

use futures::{stream, StreamExt};
use tracing::debug;

use crate::domain::request::DeferredRequest;
use crate::ports::{store::RequestStore, transport::Transport};

/// How many hosts are driven at once. A single host's requests are never
/// split across workers, preserving in-order delivery per connection.
const HOST_FANOUT: usize = 4;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainOutcome {
    pub attempted: usize,
    pub succeeded: usize,
    pub total_bytes: u64,
}

/// Transmits a fetched batch. Per-request failures keep the row for a later
/// drain; only a store failure aborts.
pub async fn transmit<S, T>(
    store: &Arc<S>,
    transport: &Arc<T>,
    batch: Vec<DeferredRequest>,
) -> Result<DrainOutcome, String>
where
    S: RequestStore,
    T: Transport,
{
    let attempted = batch.len();

    // Batch rows arrive in (priority, enqueued_at) order; pushing into
    // per-host groups preserves that order within each host.
    let mut groups: HashMap<String, Vec<DeferredRequest>> = HashMap::new();
    for request in batch {
        let host = request.domain().unwrap_or_default();
        groups.entry(host).or_default().push(request);
    }

    let results: Vec<(Vec<String>, u64)> = stream::iter(groups.into_values())
        .map(|group| {
            let transport = Arc::clone(transport);
            async move { send_group(transport, group).await }
        })
        .buffer_unordered(HOST_FANOUT)
        .collect()
        .await;

    let mut delivered_ids = Vec::new();
    let mut total_bytes = 0u64;
    for (ids, bytes) in results {
        delivered_ids.extend(ids);
        total_bytes += bytes;
    }

    if !delivered_ids.is_empty() {
        store.delete(&delivered_ids).await?;
    }

    Ok(DrainOutcome {
        attempted,
        succeeded: delivered_ids.len(),
        total_bytes,
    })
}

async fn send_group<T: Transport>(
    transport: Arc<T>,
    group: Vec<DeferredRequest>,
) -> (Vec<String>, u64) {
    let mut delivered = Vec::new();
    let mut bytes = 0u64;
    for request in group {
        let outcome = transport
            .send(&request.url, &request.method, &request.headers, &request.body)
            .await;
        if outcome.is_success() {
            bytes += request.payload_size() as u64;
            delivered.push(request.id);
        } else {
            debug!(
                id = %request.id,
                status = ?outcome.status,
                error = ?outcome.error,
                "Request kept for retry"
            );
        }
    }
    (delivered, bytes)
}
