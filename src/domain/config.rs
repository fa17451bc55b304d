//! Batcher configuration and the built-in presets.
use std::time::Duration;

/// Tunables consumed by the policy evaluator, scheduler, and classifier.
///
/// Components never hold onto a `BatcherConfig`; they take a snapshot at each
/// decision point, so the facade can swap the configuration at runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct BatcherConfig {
    /// Default deadline for requests whose caller does not override it.
    pub max_deferral: Duration,
    /// Lower bound between two drain invocations, and the periodic tick rate.
    pub min_batch_interval: Duration,
    /// How long after user-initiated traffic the radio counts as warm.
    pub piggyback_window: Duration,
    /// Pending count at or above this forces a drain.
    pub max_queue_size: usize,
    /// Pending payload bytes at or above this force a drain.
    pub max_payload_size: usize,
    /// Upper bound on requests fetched per drain.
    pub max_batch_size: usize,
    pub prefer_wifi: bool,
    pub prefer_charging: bool,
    pub piggyback_on_user_requests: bool,
    pub flush_on_background: bool,
    pub allow_cellular: bool,
    pub require_wifi_for_bulk: bool,
    /// Host substrings (lowercased) classified as `immediate`.
    pub immediate_domains: Vec<String>,
    /// Host substrings (lowercased) classified as `deferrable`.
    pub deferrable_domains: Vec<String>,
    pub enable_logging: bool,
    pub enable_metrics: bool,
}

impl BatcherConfig {
    /// Reasonable defaults for most applications: 15-minute deadlines, drains
    /// at most once a minute.
    pub fn balanced() -> Self {
        Self {
            max_deferral: Duration::from_secs(900),
            min_batch_interval: Duration::from_secs(60),
            piggyback_window: Duration::from_secs(5),
            max_queue_size: 100,
            max_payload_size: 100_000,
            max_batch_size: 20,
            prefer_wifi: true,
            prefer_charging: true,
            piggyback_on_user_requests: true,
            flush_on_background: true,
            allow_cellular: true,
            require_wifi_for_bulk: true,
            immediate_domains: Vec::new(),
            deferrable_domains: Vec::new(),
            enable_logging: true,
            enable_metrics: true,
        }
    }

    /// Longest deadlines and rarest drains; for hosts that prioritize battery
    /// over data freshness.
    pub fn battery_saver() -> Self {
        Self {
            max_deferral: Duration::from_secs(1800),
            min_batch_interval: Duration::from_secs(300),
            require_wifi_for_bulk: true,
            ..Self::balanced()
        }
    }

    /// Short deadlines and frequent drains; minimal batching for hosts that
    /// want data promptly.
    pub fn minimal() -> Self {
        Self {
            max_deferral: Duration::from_secs(300),
            min_batch_interval: Duration::from_secs(30),
            require_wifi_for_bulk: false,
            ..Self::balanced()
        }
    }
}

impl Default for BatcherConfig {
    fn default() -> Self {
        Self::balanced()
    }
}
