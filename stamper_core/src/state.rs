//! Machine state and the read-only snapshot handed to presentation layers.

use crate::status::{Alert, MachineMode};

/// Mutable machine state, owned by `StamperCore`.
#[derive(Debug, Clone, PartialEq)]
pub struct MachineState {
    pub mode: MachineMode,
    /// Papers per second, always in `[1, 60]`.
    pub speed_pps: f32,
    pub paper_count: u64,
    /// Calibration threshold in `[0, 100]`. Informational.
    pub sensor_threshold: u8,
    /// `None` until the first presence sample.
    pub last_sensor_present: Option<bool>,
    /// `None` until the first temperature sample.
    pub last_temperature_c: Option<f32>,
}

/// Point-in-time copy of everything a dashboard renders.
#[derive(Debug, Clone, PartialEq)]
pub struct MachineSnapshot {
    pub mode: MachineMode,
    pub speed_pps: f32,
    pub interval_ms: u64,
    pub paper_count: u64,
    pub sensor_threshold: u8,
    pub last_sensor_present: Option<bool>,
    pub last_temperature_c: Option<f32>,
    /// Highest-priority active alert.
    pub alert: Option<Alert>,
    pub active_alerts: usize,
    pub history_len: usize,
    pub uptime_ms: u64,
}
