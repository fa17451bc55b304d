//! Row records and their conversions to domain types.
use std::collections::HashMap;

use crate::domain::model::Priority;
use crate::domain::request::DeferredRequest;
use crate::infra::time::secs_to_epoch_ms;

#[derive(Debug, sqlx::FromRow)]
pub struct RequestRecord {
    pub id: String,
    pub url: String,
    pub method: String,
    pub headers: Option<String>,
    pub body: Option<Vec<u8>>,
    pub priority: i64,
    pub enqueued_at: f64,
    pub max_deferral_time: f64,
}

impl RequestRecord {
    pub fn into_domain(self) -> Result<DeferredRequest, String> {
        let priority = Priority::from_rank(self.priority)
            .ok_or_else(|| format!("row '{}' has invalid priority {}", self.id, self.priority))?;
        let headers: HashMap<String, String> = match self.headers.as_deref() {
            Some(json) if !json.is_empty() => serde_json::from_str(json)
                .map_err(|e| format!("row '{}' has invalid headers: {e}", self.id))?,
            _ => HashMap::new(),
        };
        Ok(DeferredRequest {
            id: self.id,
            url: self.url,
            method: self.method,
            headers,
            body: self.body.unwrap_or_default(),
            priority,
            enqueued_at_ms: secs_to_epoch_ms(self.enqueued_at),
            max_deferral_ms: secs_to_epoch_ms(self.max_deferral_time),
        })
    }
}
