//! `From` implementations bridging `stamper_config` types to `stamper_core` types.

use crate::config::{HistoryCfg, MachineCfg, TelemetryCfg, Timeouts};

// ── MachineCfg ───────────────────────────────────────────────────────────────

impl From<&stamper_config::Machine> for MachineCfg {
    fn from(c: &stamper_config::Machine) -> Self {
        Self {
            initial_speed_pps: c.initial_speed_pps,
            initial_threshold: c.initial_threshold,
            allow_reset_while_running: c.allow_reset_while_running,
        }
    }
}

// ── TelemetryCfg ─────────────────────────────────────────────────────────────

impl From<&stamper_config::Telemetry> for TelemetryCfg {
    fn from(c: &stamper_config::Telemetry) -> Self {
        Self {
            sensor_initial_delay_ms: c.sensor_initial_delay_ms,
            sensor_period_ms: c.sensor_period_ms,
            temperature_period_ms: c.temperature_period_ms,
        }
    }
}

// ── HistoryCfg ───────────────────────────────────────────────────────────────

impl From<&stamper_config::History> for HistoryCfg {
    fn from(c: &stamper_config::History) -> Self {
        Self {
            max_entries: c.max_entries,
            max_log_lines: c.max_log_lines,
        }
    }
}

// ── Timeouts ─────────────────────────────────────────────────────────────────

impl From<&stamper_config::Timeouts> for Timeouts {
    fn from(c: &stamper_config::Timeouts) -> Self {
        Self {
            sensor_ms: c.sensor_ms,
        }
    }
}
