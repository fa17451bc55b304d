//! Derived statistics snapshot composed from store aggregates and live
//! device state.
use crate::domain::model::NetworkType;

#[derive(Debug, Clone, PartialEq)]
pub struct BatcherStats {
    pub batch_count: u64,
    /// Successfully transmitted requests over the queried window.
    pub total_requests: u64,
    pub total_bytes: u64,
    pub queued_requests: u64,
    pub queued_bytes: u64,
    pub network_type: NetworkType,
    pub is_charging: bool,
    pub battery_level: f64,
}

impl BatcherStats {
    pub fn average_requests_per_batch(&self) -> f64 {
        if self.batch_count == 0 {
            0.0
        } else {
            self.total_requests as f64 / self.batch_count as f64
        }
    }

    /// Each batch wakes the radio once; every request beyond the first in a
    /// batch is a wake-up the batcher avoided.
    pub fn estimated_wake_ups_saved(&self) -> u64 {
        self.total_requests.saturating_sub(self.batch_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(batch_count: u64, total_requests: u64) -> BatcherStats {
        BatcherStats {
            batch_count,
            total_requests,
            total_bytes: 0,
            queued_requests: 0,
            queued_bytes: 0,
            network_type: NetworkType::Unknown,
            is_charging: false,
            battery_level: 1.0,
        }
    }

    #[test]
    fn average_is_zero_without_batches() {
        assert_eq!(stats(0, 0).average_requests_per_batch(), 0.0);
        assert_eq!(stats(4, 10).average_requests_per_batch(), 2.5);
    }

    #[test]
    fn wake_ups_saved_never_underflows() {
        assert_eq!(stats(5, 3).estimated_wake_ups_saved(), 0);
        assert_eq!(stats(3, 12).estimated_wake_ups_saved(), 9);
    }
}
