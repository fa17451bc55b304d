//! HTTP transport abstraction: replays a request verbatim and reports the
//! outcome. Timeouts and connection pooling are the transport's business.
use std::collections::HashMap;

use crate::domain::model::SendOutcome;

#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        url: &str,
        method: &str,
        headers: &HashMap<String, String>,
        body: &[u8],
    ) -> SendOutcome;
}
