//! Loads a `BatcherConfig` from a TOML file: a named preset as the base plus
//! per-field overrides, validated before use.
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tokio::fs;

use crate::domain::config::BatcherConfig;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize)]
struct RawFile {
    #[serde(default)]
    preset: Option<String>,
    #[serde(default)]
    batching: RawBatching,
    #[serde(default)]
    network: RawNetwork,
    #[serde(default)]
    domains: RawDomains,
    #[serde(default)]
    observability: RawObservability,
}

#[derive(Debug, Default, Deserialize)]
struct RawBatching {
    max_deferral_seconds: Option<u64>,
    min_batch_interval_seconds: Option<u64>,
    piggyback_window_seconds: Option<u64>,
    max_queue_size: Option<usize>,
    max_payload_size: Option<usize>,
    max_batch_size: Option<usize>,
    piggyback_on_user_requests: Option<bool>,
    flush_on_background: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct RawNetwork {
    prefer_wifi: Option<bool>,
    prefer_charging: Option<bool>,
    allow_cellular: Option<bool>,
    require_wifi_for_bulk: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct RawDomains {
    #[serde(default)]
    immediate: Vec<String>,
    #[serde(default)]
    deferrable: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawObservability {
    enable_logging: Option<bool>,
    enable_metrics: Option<bool>,
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub async fn load(path: &Path) -> Result<BatcherConfig, ConfigError> {
        let content = fs::read_to_string(path).await?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<BatcherConfig, ConfigError> {
        let raw: RawFile = toml::from_str(content)?;

        let mut cfg = parse_preset(raw.preset.as_deref())?;

        if let Some(s) = raw.batching.max_deferral_seconds {
            cfg.max_deferral = Duration::from_secs(s);
        }
        if let Some(s) = raw.batching.min_batch_interval_seconds {
            cfg.min_batch_interval = Duration::from_secs(s);
        }
        if let Some(s) = raw.batching.piggyback_window_seconds {
            cfg.piggyback_window = Duration::from_secs(s);
        }
        if let Some(n) = raw.batching.max_queue_size {
            cfg.max_queue_size = n;
        }
        if let Some(n) = raw.batching.max_payload_size {
            cfg.max_payload_size = n;
        }
        if let Some(n) = raw.batching.max_batch_size {
            cfg.max_batch_size = n;
        }
        if let Some(b) = raw.batching.piggyback_on_user_requests {
            cfg.piggyback_on_user_requests = b;
        }
        if let Some(b) = raw.batching.flush_on_background {
            cfg.flush_on_background = b;
        }
        if let Some(b) = raw.network.prefer_wifi {
            cfg.prefer_wifi = b;
        }
        if let Some(b) = raw.network.prefer_charging {
            cfg.prefer_charging = b;
        }
        if let Some(b) = raw.network.allow_cellular {
            cfg.allow_cellular = b;
        }
        if let Some(b) = raw.network.require_wifi_for_bulk {
            cfg.require_wifi_for_bulk = b;
        }
        cfg.immediate_domains = normalize_domains(raw.domains.immediate, "domains.immediate")?;
        cfg.deferrable_domains = normalize_domains(raw.domains.deferrable, "domains.deferrable")?;
        if let Some(b) = raw.observability.enable_logging {
            cfg.enable_logging = b;
        }
        if let Some(b) = raw.observability.enable_metrics {
            cfg.enable_metrics = b;
        }

        validate(&cfg)?;
        Ok(cfg)
    }
}

fn parse_preset(name: Option<&str>) -> Result<BatcherConfig, ConfigError> {
    match name.map(|s| s.to_ascii_lowercase()) {
        None => Ok(BatcherConfig::balanced()),
        Some(p) if p == "balanced" => Ok(BatcherConfig::balanced()),
        Some(p) if p == "battery_saver" => Ok(BatcherConfig::battery_saver()),
        Some(p) if p == "minimal" => Ok(BatcherConfig::minimal()),
        Some(other) => Err(ConfigError::Invalid(format!(
            "invalid preset '{other}', expected balanced|battery_saver|minimal"
        ))),
    }
}

fn normalize_domains(entries: Vec<String>, field: &str) -> Result<Vec<String>, ConfigError> {
    let mut out = Vec::with_capacity(entries.len());
    for entry in entries {
        let entry = entry.trim().to_ascii_lowercase();
        if entry.is_empty() {
            return Err(ConfigError::Invalid(format!("{field} has an empty entry")));
        }
        out.push(entry);
    }
    Ok(out)
}

fn validate(cfg: &BatcherConfig) -> Result<(), ConfigError> {
    if cfg.max_batch_size == 0 {
        return Err(ConfigError::Invalid("max_batch_size must be at least 1".into()));
    }
    if cfg.max_queue_size == 0 {
        return Err(ConfigError::Invalid("max_queue_size must be at least 1".into()));
    }
    if cfg.max_deferral.is_zero() {
        return Err(ConfigError::Invalid("max_deferral_seconds must be positive".into()));
    }
    if cfg.piggyback_window.is_zero() {
        return Err(ConfigError::Invalid(
            "piggyback_window_seconds must be positive".into(),
        ));
    }
    Ok(())
}
