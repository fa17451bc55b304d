//! The single serialization point for drain attempts.
//!
//! One task owns the trigger inbox and the periodic tick; drains run inline
//! in that task, so at most one drain is ever in flight process-wide.
use std::ops::ControlFlow;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Interval;
use tracing::{debug, info, warn};

use crate::app::context::AppContext;
use crate::app::transmitter::{self, DrainOutcome};
use crate::domain::config::BatcherConfig;
use crate::domain::model::{Priority, TransmissionRecord};
use crate::domain::policy::{self, Decision};
use crate::infra::time::format_epoch_ms;
use crate::ports::{clock::Clock, store::RequestStore, transport::Transport};

/// Events the facade posts into the scheduler's inbox. Processed FIFO;
/// several triggers may coalesce into a single drain.
pub(crate) enum DrainTrigger {
    /// Something was enqueued; drain if limits or policy say so.
    MaybeDrain,
    /// User traffic warmed the radio; drain if policy says so.
    UserActivity,
    /// Host is backgrounding; forced drain, completion reported back.
    Background {
        done: oneshot::Sender<Result<DrainOutcome, String>>,
    },
    /// Manual flush; forced drain, completion reported back.
    Flush {
        reason: String,
        done: oneshot::Sender<Result<DrainOutcome, String>>,
    },
    ConfigChanged,
    SetEnabled(bool),
    Shutdown,
}

pub(crate) struct Scheduler<S, T, C>
where
    S: RequestStore,
    T: Transport,
    C: Clock,
{
    ctx: AppContext<S, T, C>,
    enabled: bool,
    last_transmission_ms: i64,
}

impl<S, T, C> Scheduler<S, T, C>
where
    S: RequestStore + 'static,
    T: Transport + 'static,
    C: Clock + 'static,
{
    pub fn spawn(
        ctx: AppContext<S, T, C>,
        rx: mpsc::UnboundedReceiver<DrainTrigger>,
        enabled: bool,
    ) -> JoinHandle<()> {
        let scheduler = Scheduler {
            ctx,
            enabled,
            last_transmission_ms: 0,
        };
        tokio::spawn(scheduler.run(rx))
    }

    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<DrainTrigger>) {
        let mut interval = Self::tick_interval(&self.ctx.config());
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if self.enabled {
                        self.maybe_drain("interval tick").await;
                    }
                }
                trigger = rx.recv() => {
                    let Some(trigger) = trigger else { break };
                    let flow = match trigger {
                        DrainTrigger::Flush { reason, done } => {
                            self.handle_flush(reason, done, &mut rx, &mut interval).await
                        }
                        other => self.handle_simple(other, &mut interval).await,
                    };
                    if flow.is_break() {
                        break;
                    }
                }
            }
        }
        info!("Scheduler stopped");
    }

    async fn handle_simple(
        &mut self,
        trigger: DrainTrigger,
        interval: &mut Interval,
    ) -> ControlFlow<()> {
        match trigger {
            DrainTrigger::MaybeDrain => {
                if self.enabled {
                    self.maybe_drain("enqueue").await;
                }
            }
            DrainTrigger::UserActivity => {
                if self.enabled {
                    self.maybe_drain("user activity").await;
                }
            }
            DrainTrigger::Background { done } => {
                let result = self.drain("background flush").await;
                let _ = done.send(result);
            }
            DrainTrigger::Flush { reason, done } => {
                let result = self.drain(&reason).await;
                let _ = done.send(result);
            }
            DrainTrigger::ConfigChanged => {
                *interval = Self::tick_interval(&self.ctx.config());
                debug!("Periodic tick rescheduled");
            }
            DrainTrigger::SetEnabled(enabled) => {
                self.enabled = enabled;
                debug!(enabled, "Scheduler enabled state changed");
            }
            DrainTrigger::Shutdown => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    /// Runs one forced drain for a manual flush. Flushes already sitting in
    /// the inbox coalesce into the same drain; other triggers are replayed
    /// afterwards.
    async fn handle_flush(
        &mut self,
        reason: String,
        done: oneshot::Sender<Result<DrainOutcome, String>>,
        rx: &mut mpsc::UnboundedReceiver<DrainTrigger>,
        interval: &mut Interval,
    ) -> ControlFlow<()> {
        let mut waiters = vec![done];
        let mut deferred = Vec::new();
        while let Ok(extra) = rx.try_recv() {
            match extra {
                DrainTrigger::Flush { done, .. } => waiters.push(done),
                other => deferred.push(other),
            }
        }

        let result = self.drain(&reason).await;
        for waiter in waiters {
            let _ = waiter.send(result.clone());
        }

        for extra in deferred {
            if self.handle_simple(extra, interval).await.is_break() {
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    fn tick_interval(cfg: &BatcherConfig) -> Interval {
        let period = cfg.min_batch_interval.max(Duration::from_millis(10));
        tokio::time::interval(period)
    }

    /// Policy-gated drain path for ticks and soft triggers. Limit breaches
    /// force the drain past both the interval gate and the policy.
    async fn maybe_drain(&mut self, trigger: &str) {
        let cfg = self.ctx.config();
        let forced = match self.forced_reason(&cfg).await {
            Ok(forced) => forced,
            Err(e) => {
                warn!(error = %e, trigger, "Queue pressure check failed");
                return;
            }
        };

        let now = self.ctx.clock.now_epoch_ms().await;
        let reason = match forced {
            Some(reason) => reason,
            None => {
                let elapsed_ms = now - self.last_transmission_ms;
                if elapsed_ms < cfg.min_batch_interval.as_millis() as i64 {
                    debug!(trigger, elapsed_ms, "Batch interval not elapsed");
                    return;
                }
                let device = self.ctx.monitor.snapshot();
                match policy::evaluate(&device, &cfg, Priority::Deferrable, now) {
                    Decision::Wait(why) => {
                        debug!(trigger, reason = why, "Drain deferred");
                        return;
                    }
                    Decision::Transmit(why) => why,
                }
            }
        };

        if let Err(e) = self.drain(reason).await {
            warn!(error = %e, trigger, "Drain failed");
        }
    }

    async fn forced_reason(&self, cfg: &BatcherConfig) -> Result<Option<&'static str>, String> {
        let pending = self.ctx.store.count().await?;
        if pending as usize >= cfg.max_queue_size {
            return Ok(Some("queue size limit"));
        }
        let payload = self.ctx.store.total_payload_size().await?;
        if payload as usize >= cfg.max_payload_size {
            return Ok(Some("payload size limit"));
        }
        Ok(None)
    }

    /// One drain: expiry sweep, bounded fetch, transmit, log. An empty batch
    /// leaves no log record; a batch with zero successes does.
    async fn drain(&mut self, trigger_reason: &str) -> Result<DrainOutcome, String> {
        let cfg = self.ctx.config();
        let now = self.ctx.clock.now_epoch_ms().await;

        let dropped = self.ctx.store.delete_expired(now).await?;
        if dropped > 0 {
            info!(dropped, "Dropped requests past their deadline");
            if cfg.enable_metrics {
                self.ctx.counters.record_expired(dropped);
            }
        }

        let batch = self.ctx.store.fetch_batch(cfg.max_batch_size as i64).await?;
        if batch.is_empty() {
            debug!(trigger = trigger_reason, "Nothing to drain");
            return Ok(DrainOutcome::default());
        }

        let started = Instant::now();
        info!(
            batch = batch.len(),
            trigger = trigger_reason,
            at = %format_epoch_ms(now),
            "Drain start"
        );
        let outcome = transmitter::transmit(&self.ctx.store, &self.ctx.transport, batch).await?;

        let device = self.ctx.monitor.snapshot();
        let record = TransmissionRecord {
            timestamp_ms: now,
            request_count: outcome.succeeded as u64,
            total_bytes: outcome.total_bytes,
            network_type: device.network_type,
            is_charging: device.is_charging,
            trigger_reason: trigger_reason.to_string(),
        };
        self.ctx.store.log_transmission(&record).await?;
        self.last_transmission_ms = now;
        if cfg.enable_metrics {
            self.ctx
                .counters
                .record_drain(outcome.succeeded as u64, outcome.total_bytes);
        }

        info!(
            attempted = outcome.attempted,
            succeeded = outcome.succeeded,
            bytes = outcome.total_bytes,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Drain complete"
        );
        Ok(outcome)
    }
}
