//! Reqwest-backed `Transport`; replays a stored request verbatim and maps
//! reqwest errors into coarse transport error kinds.
use std::collections::HashMap;
use std::error::Error;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use tracing::{debug, warn};

use crate::domain::model::{SendErrorKind, SendOutcome};
use crate::ports::transport::Transport;

pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .pool_idle_timeout(Duration::from_secs(120))
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { client })
    }

    fn classify_error(e: &reqwest::Error) -> SendErrorKind {
        if e.is_timeout() {
            SendErrorKind::Timeout
        } else if e.is_connect() {
            if Self::is_dns_failure(e) {
                SendErrorKind::DnsFailure
            } else {
                SendErrorKind::ConnectionFailure
            }
        } else {
            SendErrorKind::Unexpected
        }
    }

    /// hyper surfaces resolver failures as a "dns error" inside the connect
    /// error chain; there is no typed accessor for it.
    fn is_dns_failure(e: &(dyn Error + 'static)) -> bool {
        let mut source = e.source();
        while let Some(err) = source {
            if err.to_string().starts_with("dns error") {
                return true;
            }
            source = err.source();
        }
        false
    }

    /// Header names are normalized to lowercase by the HTTP layer; values are
    /// sent verbatim. Entries that are not valid header tokens are skipped.
    fn build_headers(headers: &HashMap<String, String>) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            let parsed_name = HeaderName::from_bytes(name.as_bytes());
            let parsed_value = HeaderValue::from_str(value);
            match (parsed_name, parsed_value) {
                (Ok(n), Ok(v)) => {
                    map.insert(n, v);
                }
                _ => warn!(name, "Skipping invalid header"),
            }
        }
        map
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn send(
        &self,
        url: &str,
        method: &str,
        headers: &HashMap<String, String>,
        body: &[u8],
    ) -> SendOutcome {
        let start = tokio::time::Instant::now();

        let method = match Method::from_bytes(method.as_bytes()) {
            Ok(m) => m,
            Err(_) => {
                warn!(method, url, "Invalid HTTP method");
                return SendOutcome::failed(SendErrorKind::Unexpected, 0);
            }
        };

        debug!(url, method = %method, bytes = body.len(), "Transmit start");
        let result = self
            .client
            .request(method, url)
            .headers(Self::build_headers(headers))
            .body(body.to_vec())
            .send()
            .await;

        let latency_ms = start.elapsed().as_millis() as u64;
        match result {
            Ok(resp) => SendOutcome {
                status: Some(resp.status().as_u16()),
                error: None,
                latency_ms,
            },
            Err(e) => {
                warn!(url, error = %e, "Transmit failed");
                SendOutcome::failed(Self::classify_error(&e), latency_ms)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct Chain {
        msg: &'static str,
        source: Option<Box<Chain>>,
    }

    impl fmt::Display for Chain {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.msg)
        }
    }

    impl Error for Chain {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            self.source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn Error + 'static))
        }
    }

    fn chain(msgs: &[&'static str]) -> Chain {
        let mut nested = None;
        for msg in msgs.iter().rev().copied() {
            nested = Some(Box::new(Chain {
                msg,
                source: nested,
            }));
        }
        *nested.expect("at least one message")
    }

    #[test]
    fn dns_failures_are_found_in_the_error_chain() {
        let err = chain(&[
            "error sending request",
            "client error (Connect)",
            "dns error: failed to lookup address information",
        ]);
        assert!(ReqwestTransport::is_dns_failure(&err));
    }

    #[test]
    fn plain_connect_failures_are_not_dns() {
        let err = chain(&[
            "error sending request",
            "client error (Connect)",
            "tcp connect error: Connection refused",
        ]);
        assert!(!ReqwestTransport::is_dns_failure(&err));
    }
}
