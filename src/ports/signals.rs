//! Platform signal abstraction: the host adapts its OS connectivity and
//! battery notifications into this stream.
use crate::domain::model::NetworkType;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SignalEvent {
    Connectivity {
        network_type: NetworkType,
        is_connected: bool,
    },
    Battery {
        level: f64,
        is_charging: bool,
    },
}

/// Source of device condition changes. `recv` returning `None` ends the
/// monitor's consumption task.
#[async_trait::async_trait]
pub trait PlatformSignals: Send {
    async fn recv(&mut self) -> Option<SignalEvent>;
}
