//! Preset values, idempotent construction, and the TOML loader.
use std::time::Duration;

use netbatch::domain::config::BatcherConfig;
use netbatch::infra::config::{ConfigError, ConfigLoader};

#[test]
fn balanced_preset_values() {
    let cfg = BatcherConfig::balanced();
    assert_eq!(cfg.max_deferral, Duration::from_secs(900));
    assert_eq!(cfg.min_batch_interval, Duration::from_secs(60));
    assert!(cfg.require_wifi_for_bulk);
    assert_eq!(cfg.piggyback_window, Duration::from_secs(5));
    assert_eq!(cfg.max_queue_size, 100);
    assert_eq!(cfg.max_payload_size, 100_000);
    assert_eq!(cfg.max_batch_size, 20);
}

#[test]
fn battery_saver_preset_values() {
    let cfg = BatcherConfig::battery_saver();
    assert_eq!(cfg.max_deferral, Duration::from_secs(1800));
    assert_eq!(cfg.min_batch_interval, Duration::from_secs(300));
    assert!(cfg.require_wifi_for_bulk);
    assert_eq!(cfg.piggyback_window, Duration::from_secs(5));
    assert_eq!(cfg.max_queue_size, 100);
    assert_eq!(cfg.max_payload_size, 100_000);
    assert_eq!(cfg.max_batch_size, 20);
}

#[test]
fn minimal_preset_values() {
    let cfg = BatcherConfig::minimal();
    assert_eq!(cfg.max_deferral, Duration::from_secs(300));
    assert_eq!(cfg.min_batch_interval, Duration::from_secs(30));
    assert!(!cfg.require_wifi_for_bulk);
    assert_eq!(cfg.piggyback_window, Duration::from_secs(5));
    assert_eq!(cfg.max_queue_size, 100);
    assert_eq!(cfg.max_payload_size, 100_000);
    assert_eq!(cfg.max_batch_size, 20);
}

#[test]
fn preset_construction_is_idempotent() {
    assert_eq!(BatcherConfig::balanced(), BatcherConfig::balanced());
    assert_eq!(BatcherConfig::battery_saver(), BatcherConfig::battery_saver());
    assert_eq!(BatcherConfig::minimal(), BatcherConfig::minimal());
    assert_eq!(BatcherConfig::default(), BatcherConfig::balanced());
}

#[test]
fn loader_accepts_bare_preset() {
    let cfg = ConfigLoader::from_toml_str("preset = \"battery_saver\"").unwrap();
    assert_eq!(cfg, BatcherConfig::battery_saver());
}

#[test]
fn loader_round_trips_every_field() {
    let cfg = ConfigLoader::from_toml_str(
        r#"
        preset = "minimal"

        [batching]
        max_deferral_seconds = 120
        min_batch_interval_seconds = 15
        piggyback_window_seconds = 8
        max_queue_size = 40
        max_payload_size = 50000
        max_batch_size = 10
        piggyback_on_user_requests = false
        flush_on_background = false

        [network]
        prefer_wifi = false
        prefer_charging = false
        allow_cellular = false
        require_wifi_for_bulk = true

        [domains]
        immediate = ["Crash.Example.COM"]
        deferrable = ["analytics"]

        [observability]
        enable_logging = false
        enable_metrics = false
        "#,
    )
    .unwrap();

    assert_eq!(cfg.max_deferral, Duration::from_secs(120));
    assert_eq!(cfg.min_batch_interval, Duration::from_secs(15));
    assert_eq!(cfg.piggyback_window, Duration::from_secs(8));
    assert_eq!(cfg.max_queue_size, 40);
    assert_eq!(cfg.max_payload_size, 50_000);
    assert_eq!(cfg.max_batch_size, 10);
    assert!(!cfg.piggyback_on_user_requests);
    assert!(!cfg.flush_on_background);
    assert!(!cfg.prefer_wifi);
    assert!(!cfg.prefer_charging);
    assert!(!cfg.allow_cellular);
    assert!(cfg.require_wifi_for_bulk);
    assert_eq!(cfg.immediate_domains, vec!["crash.example.com".to_string()]);
    assert_eq!(cfg.deferrable_domains, vec!["analytics".to_string()]);
    assert!(!cfg.enable_logging);
    assert!(!cfg.enable_metrics);
}

#[test]
fn loader_rejects_unknown_preset() {
    let err = ConfigLoader::from_toml_str("preset = \"turbo\"").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn loader_rejects_empty_domain_entry() {
    let err = ConfigLoader::from_toml_str(
        r#"
        [domains]
        immediate = ["  "]
        "#,
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn loader_rejects_zero_batch_size() {
    let err = ConfigLoader::from_toml_str(
        r#"
        [batching]
        max_batch_size = 0
        "#,
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}
