//! Shared fakes for integration tests: a scripted transport that records
//! call timing, and a manually advanced clock.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use netbatch::domain::model::SendOutcome;
use netbatch::infra::sqlite_store::SqliteStore;
use netbatch::ports::clock::Clock;
use netbatch::ports::store::RequestStore;
use netbatch::ports::transport::Transport;

#[derive(Debug, Clone)]
pub struct CallRecord {
    pub url: String,
    pub started: Instant,
    pub finished: Instant,
}

/// Transport returning scripted outcomes in order, then a fallback. Records
/// every call with start/finish instants so tests can assert serialization.
pub struct ScriptedTransport {
    scripted: Mutex<VecDeque<SendOutcome>>,
    fallback: SendOutcome,
    delay: Duration,
    calls: Mutex<Vec<CallRecord>>,
}

impl ScriptedTransport {
    pub fn always(fallback: SendOutcome) -> Self {
        Self {
            scripted: Mutex::new(VecDeque::new()),
            fallback,
            delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn always_ok() -> Self {
        Self::always(SendOutcome::ok(200, 1))
    }

    pub fn scripted(outcomes: Vec<SendOutcome>) -> Self {
        Self {
            scripted: Mutex::new(outcomes.into()),
            ..Self::always_ok()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<CallRecord> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl Transport for ScriptedTransport {
    async fn send(
        &self,
        url: &str,
        _method: &str,
        _headers: &HashMap<String, String>,
        _body: &[u8],
    ) -> SendOutcome {
        let started = Instant::now();
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let outcome = self
            .scripted
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        self.calls.lock().unwrap().push(CallRecord {
            url: url.to_string(),
            started,
            finished: Instant::now(),
        });
        outcome
    }
}

/// Clock pinned to a test-controlled instant.
pub struct ManualClock {
    now_ms: AtomicI64,
}

impl ManualClock {
    pub fn at(now_ms: i64) -> Self {
        Self {
            now_ms: AtomicI64::new(now_ms),
        }
    }

    pub fn set(&self, now_ms: i64) {
        self.now_ms.store(now_ms, Ordering::SeqCst);
    }

    pub fn advance(&self, delta_ms: i64) {
        self.now_ms.fetch_add(delta_ms, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl Clock for ManualClock {
    async fn now_epoch_ms(&self) -> i64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

/// Polls the store until the pending count reaches `expected`, panicking
/// after two seconds.
pub async fn wait_for_count(store: &Arc<SqliteStore>, expected: u64) {
    let deadline = Instant::now() + Duration::from_secs(2);
    loop {
        let count = store.count().await.expect("count");
        if count == expected {
            return;
        }
        if Instant::now() > deadline {
            panic!("queue count stuck at {count}, expected {expected}");
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
