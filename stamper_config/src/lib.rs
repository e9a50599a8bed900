#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the stamping controller.
//!
//! `Config` and its sections are deserialized from TOML and validated. Every
//! section is optional; an empty file yields the defaults.
use serde::Deserialize;
use std::path::Path;

/// Lowest accepted stamping speed (papers per second).
pub const MIN_SPEED_PPS: f32 = 1.0;
/// Highest accepted stamping speed (papers per second).
pub const MAX_SPEED_PPS: f32 = 60.0;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Machine {
    /// Speed used until the operator changes it.
    pub initial_speed_pps: f32,
    /// Sensor threshold shown on the calibration panel (0..=100).
    pub initial_threshold: u8,
    /// Permit `reset` while the machine is running.
    pub allow_reset_while_running: bool,
}

impl Default for Machine {
    fn default() -> Self {
        Self {
            initial_speed_pps: 10.0,
            initial_threshold: 50,
            allow_reset_while_running: false,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Telemetry {
    /// Delay before the first paper-presence sample.
    pub sensor_initial_delay_ms: u64,
    pub sensor_period_ms: u64,
    pub temperature_period_ms: u64,
    pub temperature_min_c: f32,
    pub temperature_max_c: f32,
    /// Probability that the simulated sensor reports paper present.
    pub presence_probability: f64,
    /// Seed for the simulated sensors; entropy when absent.
    pub seed: Option<u64>,
}

impl Default for Telemetry {
    fn default() -> Self {
        Self {
            sensor_initial_delay_ms: 1000,
            sensor_period_ms: 2000,
            temperature_period_ms: 3000,
            temperature_min_c: 20.0,
            temperature_max_c: 30.0,
            presence_probability: 0.5,
            seed: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// Max wait per sensor read (ms). Also accepts alias "sample_ms".
    #[serde(alias = "sample_ms")]
    pub sensor_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { sensor_ms: 150 }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct History {
    /// Keep at most this many stamp samples (oldest dropped). Unbounded when absent.
    pub max_entries: Option<usize>,
    /// Keep at most this many log lines. Unbounded when absent.
    pub max_log_lines: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Dashboard {
    /// Render cadence of the live dashboard.
    pub refresh_ms: u64,
    /// Number of bars in the stamp-rate chart.
    pub chart_buckets: usize,
    /// Width of one chart bar in time.
    pub bucket_ms: u64,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self {
            refresh_ms: 250,
            chart_buckets: 30,
            bucket_ms: 1000,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub machine: Machine,
    pub telemetry: Telemetry,
    pub timeouts: Timeouts,
    pub history: History,
    pub dashboard: Dashboard,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read, parse and validate a config file.
pub fn load_file(path: &Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {:?}: {}", path, e))?;
    let cfg = load_toml(&text).map_err(|e| eyre::eyre!("parse config {:?}: {}", path, e))?;
    cfg.validate()?;
    Ok(cfg)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Machine
        let speed = self.machine.initial_speed_pps;
        if !speed.is_finite() || !(MIN_SPEED_PPS..=MAX_SPEED_PPS).contains(&speed) {
            eyre::bail!("machine.initial_speed_pps must be in [1, 60]");
        }
        if self.machine.initial_threshold > 100 {
            eyre::bail!("machine.initial_threshold must be in [0, 100]");
        }

        // Telemetry
        if self.telemetry.sensor_period_ms == 0 {
            eyre::bail!("telemetry.sensor_period_ms must be >= 1");
        }
        if self.telemetry.temperature_period_ms == 0 {
            eyre::bail!("telemetry.temperature_period_ms must be >= 1");
        }
        let (lo, hi) = (
            self.telemetry.temperature_min_c,
            self.telemetry.temperature_max_c,
        );
        if !(lo.is_finite() && hi.is_finite()) {
            eyre::bail!("telemetry temperature bounds must be finite");
        }
        if lo >= hi {
            eyre::bail!("telemetry.temperature_min_c must be < temperature_max_c");
        }
        let p = self.telemetry.presence_probability;
        if !(0.0..=1.0).contains(&p) {
            eyre::bail!("telemetry.presence_probability must be in [0.0, 1.0]");
        }

        // Timeouts
        if self.timeouts.sensor_ms == 0 {
            eyre::bail!("timeouts.sensor_ms must be >= 1");
        }

        // History
        if self.history.max_entries == Some(0) {
            eyre::bail!("history.max_entries must be >= 1 when set");
        }
        if self.history.max_log_lines == Some(0) {
            eyre::bail!("history.max_log_lines must be >= 1 when set");
        }

        // Dashboard
        if self.dashboard.refresh_ms == 0 {
            eyre::bail!("dashboard.refresh_ms must be >= 1");
        }
        if self.dashboard.chart_buckets == 0 {
            eyre::bail!("dashboard.chart_buckets must be >= 1");
        }
        if self.dashboard.bucket_ms == 0 {
            eyre::bail!("dashboard.bucket_ms must be >= 1");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly, got {rot:?}");
        }

        Ok(())
    }
}
