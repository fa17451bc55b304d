//! The persisted request record and its derived attributes.
use std::collections::HashMap;

use crate::domain::model::Priority;

/// A queued outbound request, owned by the store once persisted.
///
/// `enqueued_at_ms` and `max_deferral_ms` are wall-clock epoch milliseconds
/// and a duration in milliseconds; the store converts to and from its own
/// column representation.
#[derive(Debug, Clone, PartialEq)]
pub struct DeferredRequest {
    pub id: String,
    pub url: String,
    pub method: String,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
    pub priority: Priority,
    pub enqueued_at_ms: i64,
    pub max_deferral_ms: i64,
}

impl DeferredRequest {
    /// The request's host, lowercased. Used to group transmissions so one
    /// warm connection serves a whole host's queue.
    pub fn domain(&self) -> Option<String> {
        host_of(&self.url)
    }

    /// Approximate on-the-wire weight: URL plus header names/values plus body.
    pub fn payload_size(&self) -> usize {
        let header_bytes: usize = self
            .headers
            .iter()
            .map(|(name, value)| name.len() + value.len())
            .sum();
        self.url.len() + header_bytes + self.body.len()
    }

    pub fn expires_at_ms(&self) -> i64 {
        self.enqueued_at_ms.saturating_add(self.max_deferral_ms)
    }

    pub fn is_expired(&self, now_ms: i64) -> bool {
        now_ms > self.expires_at_ms()
    }
}

/// Extracts the lowercased host from an absolute URL, without a full URL
/// parser. Strips scheme, userinfo, port, and path.
pub fn host_of(url: &str) -> Option<String> {
    let u = url.trim();
    let after_scheme = u.split("://").nth(1)?;
    let host_port = after_scheme.split('/').next()?;
    let host = host_port.split('@').last().unwrap_or(host_port);
    let host = host.split(':').next().unwrap_or(host);
    if host.is_empty() {
        None
    } else {
        Some(host.to_ascii_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> DeferredRequest {
        DeferredRequest {
            id: "r1".into(),
            url: "https://metrics.example.com/v1/events".into(),
            method: "POST".into(),
            headers: HashMap::from([("Content-Type".to_string(), "application/json".to_string())]),
            body: vec![0u8; 64],
            priority: Priority::Deferrable,
            enqueued_at_ms: 1_000_000,
            max_deferral_ms: 900_000,
        }
    }

    #[test]
    fn host_is_lowercased_and_stripped() {
        assert_eq!(
            host_of("https://User:Pw@API.Example.COM:8443/path?q=1"),
            Some("api.example.com".to_string())
        );
        assert_eq!(host_of("not a url"), None);
        assert_eq!(host_of("https:///missing-host"), None);
    }

    #[test]
    fn payload_size_counts_url_headers_body() {
        let r = request();
        let expected = r.url.len() + "Content-Type".len() + "application/json".len() + 64;
        assert_eq!(r.payload_size(), expected);
    }

    #[test]
    fn expiry_is_strictly_after_deadline() {
        let r = request();
        assert!(!r.is_expired(1_900_000));
        assert!(r.is_expired(1_900_001));
    }
}
