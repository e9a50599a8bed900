//! Runtime configuration types for the stamping controller.
//!
//! These are consumed by `StamperCore`. They are separate from the
//! TOML-deserialized config in `stamper_config`; see `conversions`.

/// Machine defaults and command policy.
#[derive(Debug, Clone)]
pub struct MachineCfg {
    /// Speed in papers per second before the operator changes it.
    pub initial_speed_pps: f32,
    /// Initial sensor threshold (0..=100).
    pub initial_threshold: u8,
    /// Allow `reset_counter` while running.
    pub allow_reset_while_running: bool,
}

impl Default for MachineCfg {
    fn default() -> Self {
        Self {
            initial_speed_pps: 10.0,
            initial_threshold: 50,
            allow_reset_while_running: false,
        }
    }
}

/// Telemetry sampling cadence.
#[derive(Debug, Clone)]
pub struct TelemetryCfg {
    /// Delay before the first presence sample (ms).
    pub sensor_initial_delay_ms: u64,
    /// Presence sampling period (ms).
    pub sensor_period_ms: u64,
    /// Temperature sampling period (ms). The first sample fires after one period.
    pub temperature_period_ms: u64,
}

impl Default for TelemetryCfg {
    fn default() -> Self {
        Self {
            sensor_initial_delay_ms: 1000,
            sensor_period_ms: 2000,
            temperature_period_ms: 3000,
        }
    }
}

/// Retention caps for the history log. `None` keeps everything.
#[derive(Debug, Clone, Default)]
pub struct HistoryCfg {
    pub max_entries: Option<usize>,
    pub max_log_lines: Option<usize>,
}

/// Timeouts passed to sensor reads.
#[derive(Debug, Clone)]
pub struct Timeouts {
    /// Max sensor wait per read (ms).
    pub sensor_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { sensor_ms: 150 }
    }
}
