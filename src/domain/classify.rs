//! Maps a URL's host onto a priority using the configured domain lists.
use crate::domain::config::BatcherConfig;
use crate::domain::model::Priority;
use crate::domain::request::host_of;

/// Classifies a URL: `immediate` if the host contains any configured
/// immediate entry, else `deferrable` on a deferrable match, else `soon`.
/// `bulk` is never inferred; callers must request it explicitly.
pub fn classify(url: &str, cfg: &BatcherConfig) -> Priority {
    match host_of(url) {
        Some(host) => classify_host(&host, cfg),
        None => Priority::Soon,
    }
}

/// Same as [`classify`], for callers that already extracted the host.
pub fn classify_host(host: &str, cfg: &BatcherConfig) -> Priority {
    let host = host.to_ascii_lowercase();
    if contains_any(&host, &cfg.immediate_domains) {
        return Priority::Immediate;
    }
    if contains_any(&host, &cfg.deferrable_domains) {
        return Priority::Deferrable;
    }
    Priority::Soon
}

fn contains_any(host: &str, entries: &[String]) -> bool {
    entries
        .iter()
        .any(|entry| !entry.is_empty() && host.contains(&entry.to_ascii_lowercase()))
}
