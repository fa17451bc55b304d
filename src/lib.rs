//! In-process, energy-aware batcher for non-urgent outbound HTTP requests.
//!
//! Callers hand the [`NetworkBatcher`] fire-and-forget requests (analytics,
//! telemetry, crash reports); the batcher persists them in an embedded SQLite
//! queue and transmits them together when device conditions are favorable:
//! the radio is already warm, the device is on WiFi or charging, or queue and
//! deadline limits force a flush. Batching trades a little latency for far
//! fewer radio wake-ups, each of which costs multi-second tail energy.

pub mod app;
pub mod domain;
pub mod infra;
pub mod ports;

pub use app::facade::{BatcherError, NetworkBatcher, OutboundRequest, SqliteBatcher};
pub use app::transmitter::DrainOutcome;
pub use domain::config::BatcherConfig;
pub use domain::model::{DeviceState, NetworkType, Priority, PriorityHint};
pub use domain::stats::BatcherStats;
pub use infra::monitor::DeviceMonitor;
