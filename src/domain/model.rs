//! Shared vocabulary types: priorities, device state, transport outcomes,
//! transmission log records.
use serde::{Deserialize, Serialize};

/// Latency tolerance class of a request, from least to most deferrable.
///
/// `Immediate` requests bypass the queue entirely and are handed straight to
/// the transport; the store rejects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Immediate,
    Soon,
    Deferrable,
    Bulk,
}

impl Priority {
    /// Numeric rank used for queue ordering and persistence. Lower is more
    /// urgent.
    pub fn rank(self) -> i64 {
        match self {
            Priority::Immediate => 1,
            Priority::Soon => 2,
            Priority::Deferrable => 3,
            Priority::Bulk => 4,
        }
    }

    pub fn from_rank(rank: i64) -> Option<Priority> {
        match rank {
            1 => Some(Priority::Immediate),
            2 => Some(Priority::Soon),
            3 => Some(Priority::Deferrable),
            4 => Some(Priority::Bulk),
            _ => None,
        }
    }
}

/// Caller-supplied priority: either resolved by the domain classifier or
/// pinned explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorityHint {
    Auto,
    Explicit(Priority),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkType {
    Wifi,
    Cellular,
    Ethernet,
    Other,
    None,
    Unknown,
}

impl NetworkType {
    pub fn as_str(self) -> &'static str {
        match self {
            NetworkType::Wifi => "wifi",
            NetworkType::Cellular => "cellular",
            NetworkType::Ethernet => "ethernet",
            NetworkType::Other => "other",
            NetworkType::None => "none",
            NetworkType::Unknown => "unknown",
        }
    }

}

/// Snapshot of the device conditions the policy evaluator reads.
///
/// `last_user_activity_ms` only ever moves forward; `None` means no
/// user-initiated network traffic has been observed yet.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceState {
    pub network_type: NetworkType,
    pub is_connected: bool,
    pub is_charging: bool,
    pub battery_level: f64,
    pub last_user_activity_ms: Option<i64>,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self {
            network_type: NetworkType::Unknown,
            is_connected: false,
            is_charging: false,
            battery_level: 1.0,
            last_user_activity_ms: None,
        }
    }
}

impl DeviceState {
    /// Whether the radio is presumed warm: user traffic was seen less than
    /// `window_ms` ago.
    pub fn is_within_piggyback_window(&self, window_ms: i64, now_ms: i64) -> bool {
        match self.last_user_activity_ms {
            Some(at_ms) => now_ms - at_ms < window_ms,
            None => false,
        }
    }
}

/// Transport-level failure classes, mapped from the underlying HTTP client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendErrorKind {
    Timeout,
    DnsFailure,
    ConnectionFailure,
    Unexpected,
}

/// Outcome of a single transport submission.
///
/// `status` is present whenever a response came back, including non-2xx;
/// `error` is set for transport-level failures (no response at all).
#[derive(Debug, Clone)]
pub struct SendOutcome {
    pub status: Option<u16>,
    pub error: Option<SendErrorKind>,
    pub latency_ms: u64,
}

impl SendOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none() && matches!(self.status, Some(s) if (200..300).contains(&s))
    }

    pub fn ok(status: u16, latency_ms: u64) -> Self {
        Self {
            status: Some(status),
            error: None,
            latency_ms,
        }
    }

    pub fn failed(kind: SendErrorKind, latency_ms: u64) -> Self {
        Self {
            status: None,
            error: Some(kind),
            latency_ms,
        }
    }
}

/// One row of the append-only transmission log. `request_count` counts only
/// successes; a batch that ran but delivered nothing is recorded with zero.
#[derive(Debug, Clone)]
pub struct TransmissionRecord {
    pub timestamp_ms: i64,
    pub request_count: u64,
    pub total_bytes: u64,
    pub network_type: NetworkType,
    pub is_charging: bool,
    pub trigger_reason: String,
}

/// Aggregate over the transmission log from some instant forward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransmissionTotals {
    pub batch_count: u64,
    pub total_requests: u64,
    pub total_bytes: u64,
}
