//! The process-wide shared instance: one successful init, then rejection.
use netbatch::domain::config::BatcherConfig;
use netbatch::{BatcherError, SqliteBatcher};

#[tokio::test]
async fn shared_instance_initializes_once() {
    assert!(SqliteBatcher::shared().is_none());

    let dir = tempfile::tempdir().unwrap();
    let batcher = SqliteBatcher::init_shared("app", dir.path(), BatcherConfig::balanced())
        .await
        .unwrap();
    assert!(batcher.is_enabled());
    assert!(SqliteBatcher::shared().is_some());

    let err = SqliteBatcher::init_shared("app", dir.path(), BatcherConfig::balanced())
        .await
        .unwrap_err();
    assert!(matches!(err, BatcherError::Setup(_)));
}
