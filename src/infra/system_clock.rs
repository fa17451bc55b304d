//! Wall-clock `Clock` backed by the system time.
use std::time::UNIX_EPOCH;

use crate::ports::clock::Clock;

/// Production clock. A system clock set before the Unix epoch reads as 0;
/// the expiry math then sees every deadline as already passed, which drops
/// stale rows instead of keeping them forever.
#[derive(Debug, Default)]
pub struct SystemClock;

#[async_trait::async_trait]
impl Clock for SystemClock {
    async fn now_epoch_ms(&self) -> i64 {
        UNIX_EPOCH
            .elapsed()
            .map(|since_epoch| since_epoch.as_millis() as i64)
            .unwrap_or(0)
    }
}
