//! Device condition monitor: the single writer of `DeviceState`.
//!
//! State changes are published on a `tokio::sync::watch` channel; every
//! consumer owns its subscription, so observer callbacks never run inside the
//! monitor and reads never block the signal source.
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::domain::model::DeviceState;
use crate::ports::signals::{PlatformSignals, SignalEvent};

pub struct DeviceMonitor {
    tx: watch::Sender<DeviceState>,
}

impl DeviceMonitor {
    pub fn new() -> Self {
        Self {
            tx: watch::channel(DeviceState::default()).0,
        }
    }

    pub fn snapshot(&self) -> DeviceState {
        self.tx.borrow().clone()
    }

    /// A receiver that observes every subsequent state change.
    pub fn subscribe(&self) -> watch::Receiver<DeviceState> {
        self.tx.subscribe()
    }

    /// Applies one platform signal. Public so hosts (and tests) can push
    /// signals directly instead of going through a `PlatformSignals` stream.
    pub fn handle_event(&self, event: SignalEvent) {
        self.tx.send_modify(|state| match event {
            SignalEvent::Connectivity {
                network_type,
                is_connected,
            } => {
                state.network_type = network_type;
                state.is_connected = is_connected;
            }
            SignalEvent::Battery { level, is_charging } => {
                state.battery_level = level.clamp(0.0, 1.0);
                state.is_charging = is_charging;
            }
        });
        debug!(state = ?self.snapshot(), "Device state updated");
    }

    /// Advances the last-user-activity instant, never moving it backwards.
    pub fn record_user_network_activity(&self, now_ms: i64) {
        self.tx.send_modify(|state| {
            state.last_user_activity_ms = Some(match state.last_user_activity_ms {
                Some(prev) => prev.max(now_ms),
                None => now_ms,
            });
        });
    }

    /// Consumes a platform signal stream until it ends.
    pub fn spawn_signal_task<S>(self: &Arc<Self>, mut signals: S) -> JoinHandle<()>
    where
        S: PlatformSignals + 'static,
    {
        let monitor = Arc::clone(self);
        tokio::spawn(async move {
            while let Some(event) = signals.recv().await {
                monitor.handle_event(event);
            }
            debug!("Platform signal stream ended");
        })
    }
}

impl Default for DeviceMonitor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::NetworkType;

    #[test]
    fn user_activity_only_advances() {
        let monitor = DeviceMonitor::new();
        monitor.record_user_network_activity(5_000);
        monitor.record_user_network_activity(3_000);
        assert_eq!(monitor.snapshot().last_user_activity_ms, Some(5_000));
        monitor.record_user_network_activity(7_000);
        assert_eq!(monitor.snapshot().last_user_activity_ms, Some(7_000));
    }

    #[test]
    fn battery_level_is_clamped() {
        let monitor = DeviceMonitor::new();
        monitor.handle_event(SignalEvent::Battery {
            level: 1.4,
            is_charging: true,
        });
        let state = monitor.snapshot();
        assert_eq!(state.battery_level, 1.0);
        assert!(state.is_charging);
    }

    struct ChannelSignals(tokio::sync::mpsc::Receiver<SignalEvent>);

    #[async_trait::async_trait]
    impl PlatformSignals for ChannelSignals {
        async fn recv(&mut self) -> Option<SignalEvent> {
            self.0.recv().await
        }
    }

    #[tokio::test]
    async fn signal_task_feeds_the_monitor() {
        let monitor = Arc::new(DeviceMonitor::new());
        let (tx, rx) = tokio::sync::mpsc::channel(4);
        let handle = monitor.spawn_signal_task(ChannelSignals(rx));

        tx.send(SignalEvent::Battery {
            level: 0.5,
            is_charging: true,
        })
        .await
        .unwrap();
        drop(tx);
        handle.await.unwrap();

        let state = monitor.snapshot();
        assert_eq!(state.battery_level, 0.5);
        assert!(state.is_charging);
    }

    #[tokio::test]
    async fn subscribers_observe_connectivity_changes() {
        let monitor = DeviceMonitor::new();
        let mut rx = monitor.subscribe();
        monitor.handle_event(SignalEvent::Connectivity {
            network_type: NetworkType::Wifi,
            is_connected: true,
        });
        rx.changed().await.unwrap();
        let state = rx.borrow().clone();
        assert_eq!(state.network_type, NetworkType::Wifi);
        assert!(state.is_connected);
    }
}
