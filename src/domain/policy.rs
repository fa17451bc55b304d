//! Transmit/wait policy: a pure function of device state, configuration, and
//! request priority. Rules are checked in a fixed order; the first match wins.
use crate::domain::config::BatcherConfig;
use crate::domain::model::{DeviceState, NetworkType, Priority};

/// Below this battery fraction, deferrable and bulk traffic waits unless the
/// device is charging.
pub const LOW_BATTERY_LEVEL: f64 = 0.20;

/// Whether to drain now, with the reason carried into logs and the
/// transmission log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Transmit(&'static str),
    Wait(&'static str),
}

impl Decision {
    pub fn should_transmit(&self) -> bool {
        matches!(self, Decision::Transmit(_))
    }

    pub fn reason(&self) -> &'static str {
        match self {
            Decision::Transmit(r) | Decision::Wait(r) => r,
        }
    }
}

/// Evaluates the transmit/wait rules for one priority class.
pub fn evaluate(
    device: &DeviceState,
    cfg: &BatcherConfig,
    priority: Priority,
    now_ms: i64,
) -> Decision {
    if !device.is_connected {
        return Decision::Wait("no network");
    }
    if priority == Priority::Immediate {
        return Decision::Transmit("immediate");
    }
    if device.network_type == NetworkType::Cellular && !cfg.allow_cellular {
        return Decision::Wait("cellular not allowed");
    }
    let on_wifi = device.network_type == NetworkType::Wifi;
    if priority == Priority::Bulk && cfg.require_wifi_for_bulk && !on_wifi {
        return Decision::Wait("bulk requires WiFi");
    }
    if device.battery_level < LOW_BATTERY_LEVEL
        && !device.is_charging
        && matches!(priority, Priority::Deferrable | Priority::Bulk)
    {
        return Decision::Wait("low battery");
    }
    if on_wifi && device.is_charging {
        return Decision::Transmit("optimal");
    }
    if (on_wifi || device.is_charging) && priority != Priority::Bulk {
        return Decision::Transmit("good conditions");
    }
    let window_ms = cfg.piggyback_window.as_millis() as i64;
    if device.is_within_piggyback_window(window_ms, now_ms) {
        return Decision::Transmit("radio warm");
    }
    if matches!(priority, Priority::Deferrable | Priority::Bulk) {
        return Decision::Wait("awaiting better conditions");
    }
    Decision::Transmit("default allow")
}
