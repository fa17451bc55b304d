//! Public entry point: enqueue, flush, enable/disable, statistics, and the
//! lifecycle hooks. Owns the configuration and the scheduler task.
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, RwLock};
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::app::context::AppContext;
use crate::app::scheduler::{DrainTrigger, Scheduler};
use crate::app::transmitter::DrainOutcome;
use crate::domain::classify;
use crate::domain::config::BatcherConfig;
use crate::domain::model::{DeviceState, Priority, PriorityHint};
use crate::domain::request::{host_of, DeferredRequest};
use crate::domain::stats::BatcherStats;
use crate::infra::logging::init_logging;
use crate::infra::metrics::{CountersSnapshot, DrainCounters};
use crate::infra::monitor::DeviceMonitor;
use crate::infra::reqwest_transport::ReqwestTransport;
use crate::infra::sqlite_store::SqliteStore;
use crate::infra::system_clock::SystemClock;
use crate::ports::signals::PlatformSignals;
use crate::ports::{clock::Clock, store::RequestStore, transport::Transport};

const USER_AGENT: &str = concat!("netbatch/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, thiserror::Error)]
pub enum BatcherError {
    #[error("batcher is disabled")]
    Disabled,
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("request failed (status {status:?})")]
    RequestFailed { status: Option<u16> },
    #[error("storage: {0}")]
    Storage(String),
    #[error("setup: {0}")]
    Setup(String),
}

/// A request handed to [`NetworkBatcher::enqueue`]. Fire-and-forget for
/// everything except `immediate` priority, where the response status is
/// reflected in the enqueue result.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub url: String,
    pub method: String,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
    pub priority: PriorityHint,
    /// Per-request deadline override; the configured default applies when
    /// absent.
    pub max_deferral: Option<Duration>,
}

impl OutboundRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: "GET".to_string(),
            headers: HashMap::new(),
            body: Vec::new(),
            priority: PriorityHint::Auto,
            max_deferral: None,
        }
    }

    pub fn post(url: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            method: "POST".to_string(),
            body,
            ..Self::new(url)
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = PriorityHint::Explicit(priority);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_max_deferral(mut self, max_deferral: Duration) -> Self {
        self.max_deferral = Some(max_deferral);
        self
    }
}

pub struct NetworkBatcher<S, T, C>
where
    S: RequestStore,
    T: Transport,
    C: Clock,
{
    ctx: AppContext<S, T, C>,
    triggers: mpsc::UnboundedSender<DrainTrigger>,
    enabled: AtomicBool,
    scheduler: Mutex<Option<JoinHandle<()>>>,
}

impl<S, T, C> std::fmt::Debug for NetworkBatcher<S, T, C>
where
    S: RequestStore,
    T: Transport,
    C: Clock,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkBatcher").finish_non_exhaustive()
    }
}

/// The production wiring: SQLite store, reqwest transport, system clock.
pub type SqliteBatcher = NetworkBatcher<SqliteStore, ReqwestTransport, SystemClock>;

static SHARED: OnceLock<Arc<SqliteBatcher>> = OnceLock::new();

impl SqliteBatcher {
    /// Opens a batcher backed by
    /// `<base_dir>/NetworkBatcher/<identifier>.sqlite`.
    pub async fn open(
        identifier: &str,
        base_dir: &Path,
        cfg: BatcherConfig,
    ) -> Result<Self, BatcherError> {
        if cfg.enable_logging {
            init_logging("info");
        }
        let store = SqliteStore::open(base_dir, identifier)
            .await
            .map_err(BatcherError::Storage)?;
        let transport =
            ReqwestTransport::new(USER_AGENT).map_err(|e| BatcherError::Setup(e.to_string()))?;
        Ok(Self::with_parts(
            Arc::new(store),
            Arc::new(transport),
            Arc::new(SystemClock),
            Arc::new(DeviceMonitor::new()),
            cfg,
        ))
    }

    /// Initializes the process-wide instance. Fails if called twice.
    pub async fn init_shared(
        identifier: &str,
        base_dir: &Path,
        cfg: BatcherConfig,
    ) -> Result<Arc<SqliteBatcher>, BatcherError> {
        let batcher = Arc::new(Self::open(identifier, base_dir, cfg).await?);
        SHARED
            .set(Arc::clone(&batcher))
            .map_err(|_| BatcherError::Setup("shared batcher already initialized".into()))?;
        Ok(batcher)
    }

    pub fn shared() -> Option<Arc<SqliteBatcher>> {
        SHARED.get().cloned()
    }
}

impl<S, T, C> NetworkBatcher<S, T, C>
where
    S: RequestStore + 'static,
    T: Transport + 'static,
    C: Clock + 'static,
{
    /// Fully injected constructor for tests and multi-tenant hosts.
    pub fn with_parts(
        store: Arc<S>,
        transport: Arc<T>,
        clock: Arc<C>,
        monitor: Arc<DeviceMonitor>,
        cfg: BatcherConfig,
    ) -> Self {
        let ctx = AppContext {
            cfg: Arc::new(RwLock::new(cfg)),
            store,
            transport,
            clock,
            monitor,
            counters: Arc::new(DrainCounters::default()),
        };
        let (triggers, rx) = mpsc::unbounded_channel();
        let handle = Scheduler::spawn(ctx.clone(), rx, true);
        Self {
            ctx,
            triggers,
            enabled: AtomicBool::new(true),
            scheduler: Mutex::new(Some(handle)),
        }
    }

    /// Queues a request for a later drain, or transmits it right away when
    /// its effective priority is `immediate`.
    ///
    /// Returns the persisted record's id. For immediate requests the id is a
    /// fresh value no later lookup will find, since the request never enters
    /// the store.
    pub async fn enqueue(&self, request: OutboundRequest) -> Result<String, BatcherError> {
        if !self.enabled.load(Ordering::SeqCst) {
            return Err(BatcherError::Disabled);
        }
        let host = host_of(&request.url).ok_or_else(|| {
            BatcherError::InvalidRequest(format!("url '{}' has no host", request.url))
        })?;

        let cfg = self.ctx.config();
        let priority = match request.priority {
            PriorityHint::Auto => classify::classify_host(&host, &cfg),
            PriorityHint::Explicit(p) => p,
        };
        let now_ms = self.ctx.clock.now_epoch_ms().await;

        if priority == Priority::Immediate {
            let outcome = self
                .ctx
                .transport
                .send(&request.url, &request.method, &request.headers, &request.body)
                .await;
            if !outcome.is_success() {
                return Err(BatcherError::RequestFailed {
                    status: outcome.status,
                });
            }
            // The radio is warm now; give queued requests a chance to ride
            // along.
            self.ctx.monitor.record_user_network_activity(now_ms);
            let _ = self.triggers.send(DrainTrigger::MaybeDrain);
            return Ok(Uuid::new_v4().to_string());
        }

        let record = DeferredRequest {
            id: Uuid::new_v4().to_string(),
            url: request.url,
            method: request.method,
            headers: request.headers,
            body: request.body,
            priority,
            enqueued_at_ms: now_ms,
            max_deferral_ms: request
                .max_deferral
                .unwrap_or(cfg.max_deferral)
                .as_millis() as i64,
        };
        self.ctx
            .store
            .save(&record)
            .await
            .map_err(BatcherError::Storage)?;
        let _ = self.triggers.send(DrainTrigger::MaybeDrain);
        Ok(record.id)
    }

    /// Forces a drain regardless of policy and interval gates, and waits for
    /// it. Concurrent flushes coalesce into one drain. Honored even while
    /// disabled: an explicit flush expresses caller intent.
    pub async fn flush(&self, reason: &str) -> Result<DrainOutcome, BatcherError> {
        let (done, rx) = oneshot::channel();
        self.triggers
            .send(DrainTrigger::Flush {
                reason: reason.to_string(),
                done,
            })
            .map_err(|_| BatcherError::Setup("scheduler is stopped".into()))?;
        match rx.await {
            Ok(Ok(outcome)) => Ok(outcome),
            Ok(Err(e)) => Err(BatcherError::Storage(e)),
            Err(_) => Err(BatcherError::Setup("scheduler is stopped".into())),
        }
    }

    /// Disabling pauses the periodic tick and rejects new enqueues; an
    /// in-flight drain is never interrupted.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
        let _ = self.triggers.send(DrainTrigger::SetEnabled(enabled));
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Records user-initiated network traffic and, when piggybacking is
    /// enabled, nudges the scheduler while the radio is warm.
    pub async fn notify_user_network_activity(&self) {
        let now_ms = self.ctx.clock.now_epoch_ms().await;
        self.ctx.monitor.record_user_network_activity(now_ms);
        if self.ctx.config().piggyback_on_user_requests && self.is_enabled() {
            let _ = self.triggers.send(DrainTrigger::UserActivity);
        }
    }

    /// Host lifecycle hook: on background transition, force a drain and wait
    /// for it so the host's background-task window can bracket the work.
    /// No-op when `flush_on_background` is off.
    pub async fn notify_backgrounded(&self) -> Result<DrainOutcome, BatcherError> {
        if !self.ctx.config().flush_on_background {
            return Ok(DrainOutcome::default());
        }
        let (done, rx) = oneshot::channel();
        self.triggers
            .send(DrainTrigger::Background { done })
            .map_err(|_| BatcherError::Setup("scheduler is stopped".into()))?;
        match rx.await {
            Ok(Ok(outcome)) => Ok(outcome),
            Ok(Err(e)) => Err(BatcherError::Storage(e)),
            Err(_) => Err(BatcherError::Setup("scheduler is stopped".into())),
        }
    }

    /// Store aggregates composed with live device state.
    pub async fn statistics(&self, since_ms: i64) -> Result<BatcherStats, BatcherError> {
        let totals = self
            .ctx
            .store
            .transmission_stats(since_ms)
            .await
            .map_err(BatcherError::Storage)?;
        let queued_requests = self.ctx.store.count().await.map_err(BatcherError::Storage)?;
        let queued_bytes = self
            .ctx
            .store
            .total_payload_size()
            .await
            .map_err(BatcherError::Storage)?;
        let device = self.ctx.monitor.snapshot();
        Ok(BatcherStats {
            batch_count: totals.batch_count,
            total_requests: totals.total_requests,
            total_bytes: totals.total_bytes,
            queued_requests,
            queued_bytes,
            network_type: device.network_type,
            is_charging: device.is_charging,
            battery_level: device.battery_level,
        })
    }

    /// Swaps the configuration; the scheduler reschedules its tick.
    pub fn set_config(&self, cfg: BatcherConfig) {
        self.ctx.set_config(cfg);
        let _ = self.triggers.send(DrainTrigger::ConfigChanged);
    }

    pub fn config(&self) -> BatcherConfig {
        self.ctx.config()
    }

    pub fn device_state(&self) -> DeviceState {
        self.ctx.monitor.snapshot()
    }

    pub fn monitor(&self) -> Arc<DeviceMonitor> {
        Arc::clone(&self.ctx.monitor)
    }

    /// Feeds OS connectivity/battery signals into the monitor.
    pub fn attach_signals(&self, signals: impl PlatformSignals + 'static) -> JoinHandle<()> {
        self.ctx.monitor.spawn_signal_task(signals)
    }

    pub fn counters(&self) -> CountersSnapshot {
        self.ctx.counters.snapshot()
    }

    /// Drops all pending requests; the transmission log is untouched.
    pub async fn clear_queue(&self) -> Result<(), BatcherError> {
        self.ctx.store.clear().await.map_err(BatcherError::Storage)
    }

    /// Transmission log retention: drops records older than `before_ms`.
    pub async fn prune_transmission_log(&self, before_ms: i64) -> Result<u64, BatcherError> {
        self.ctx
            .store
            .prune_log(before_ms)
            .await
            .map_err(BatcherError::Storage)
    }

    /// Stops accepting triggers and waits for any in-flight drain to finish.
    pub async fn shutdown(&self) {
        let _ = self.triggers.send(DrainTrigger::Shutdown);
        let handle = self.scheduler.lock().await.take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }
}
