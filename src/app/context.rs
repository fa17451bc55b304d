//! Shared handles threaded through the control plane.
use std::fmt;
use std::sync::{Arc, RwLock};

use crate::domain::config::BatcherConfig;
use crate::infra::metrics::DrainCounters;
use crate::infra::monitor::DeviceMonitor;
use crate::ports::{clock::Clock, store::RequestStore, transport::Transport};

pub struct AppContext<S, T, C>
where
    S: RequestStore,
    T: Transport,
    C: Clock,
{
    pub cfg: Arc<RwLock<BatcherConfig>>,
    pub store: Arc<S>,
    pub transport: Arc<T>,
    pub clock: Arc<C>,
    pub monitor: Arc<DeviceMonitor>,
    pub counters: Arc<DrainCounters>,
}

impl<S, T, C> AppContext<S, T, C>
where
    S: RequestStore,
    T: Transport,
    C: Clock,
{
    /// Copy-on-read: each decision point works from its own snapshot, so a
    /// concurrent `set_config` never changes a decision mid-flight.
    pub fn config(&self) -> BatcherConfig {
        self.cfg
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn set_config(&self, cfg: BatcherConfig) {
        *self.cfg.write().unwrap_or_else(|e| e.into_inner()) = cfg;
    }
}

impl<S, T, C> fmt::Debug for AppContext<S, T, C>
where
    S: RequestStore,
    T: Transport,
    C: Clock,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppContext").finish_non_exhaustive()
    }
}

impl<S, T, C> Clone for AppContext<S, T, C>
where
    S: RequestStore,
    T: Transport,
    C: Clock,
{
    fn clone(&self) -> Self {
        Self {
            cfg: Arc::clone(&self.cfg),
            store: Arc::clone(&self.store),
            transport: Arc::clone(&self.transport),
            clock: Arc::clone(&self.clock),
            monitor: Arc::clone(&self.monitor),
            counters: Arc::clone(&self.counters),
        }
    }
}
