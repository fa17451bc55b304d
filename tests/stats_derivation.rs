//! Derived-statistics bounds over arbitrary aggregates.
use proptest::prelude::*;

use netbatch::domain::model::NetworkType;
use netbatch::domain::stats::BatcherStats;

proptest! {
    #[test]
    fn wake_ups_saved_is_bounded(batch_count in 0u64..10_000, total_requests in 0u64..10_000) {
        let stats = BatcherStats {
            batch_count,
            total_requests,
            total_bytes: 0,
            queued_requests: 0,
            queued_bytes: 0,
            network_type: NetworkType::Unknown,
            is_charging: false,
            battery_level: 1.0,
        };
        let saved = stats.estimated_wake_ups_saved();
        prop_assert!(saved <= stats.total_requests);
        if total_requests > batch_count {
            prop_assert_eq!(saved, total_requests - batch_count);
        } else {
            prop_assert_eq!(saved, 0);
        }
    }

    #[test]
    fn average_is_finite_and_consistent(batch_count in 0u64..10_000, total_requests in 0u64..10_000) {
        let stats = BatcherStats {
            batch_count,
            total_requests,
            total_bytes: 0,
            queued_requests: 0,
            queued_bytes: 0,
            network_type: NetworkType::Unknown,
            is_charging: false,
            battery_level: 1.0,
        };
        let avg = stats.average_requests_per_batch();
        prop_assert!(avg.is_finite());
        if batch_count == 0 {
            prop_assert_eq!(avg, 0.0);
        } else {
            prop_assert!((avg * batch_count as f64 - total_requests as f64).abs() < 1e-6);
        }
    }
}
