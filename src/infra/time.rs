//! Conversions between epoch milliseconds (the in-process representation)
//! and the store's REAL seconds columns, plus log-friendly formatting.
use chrono::{DateTime, TimeZone, Utc};

pub fn epoch_ms_to_secs(ms: i64) -> f64 {
    ms as f64 / 1000.0
}

pub fn secs_to_epoch_ms(secs: f64) -> i64 {
    (secs * 1000.0).round() as i64
}

pub fn format_epoch_ms(ms: i64) -> String {
    let dt: DateTime<Utc> = Utc
        .timestamp_millis_opt(ms)
        .single()
        .unwrap_or_else(|| Utc.timestamp_millis_opt(0).single().unwrap());
    dt.format("%Y-%m-%d %H:%M:%S%.3f UTC").to_string()
}
