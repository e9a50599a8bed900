//! Type-state builder for `Stamper` and generic `build_stamper` constructor.
//!
//! The builder enforces at compile time that both sensors are provided
//! before `build()` is available. `try_build()` is always available for
//! dynamic checks.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use stamper_traits::clock::{Clock, MonotonicClock};
use stamper_traits::{PaperSensor, Thermometer};

use crate::command::Command;
use crate::config::{HistoryCfg, MachineCfg, TelemetryCfg, Timeouts};
use crate::controller::StamperCore;
use crate::error::{BuildError, Result, StamperError};
use crate::history::HistoryLog;
use crate::state::{MachineSnapshot, MachineState};
use crate::status::{Alert, MachineMode};
use crate::telemetry::Telemetry;
use crate::util::{MAX_SPEED_PPS, MAX_THRESHOLD, MIN_SPEED_PPS};

// ── Public dynamic-dispatch wrapper ──────────────────────────────────────────

/// Stamping controller over boxed sensors.
pub struct Stamper {
    pub(crate) inner: StamperCore<Box<dyn PaperSensor>, Box<dyn Thermometer>>,
}

impl core::fmt::Debug for Stamper {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Stamper")
            .field("mode", &self.inner.mode())
            .field("speed_pps", &self.inner.speed_pps())
            .field("paper_count", &self.inner.paper_count())
            .finish()
    }
}

impl Stamper {
    /// Start building a Stamper.
    pub fn builder() -> StamperBuilder<Missing, Missing> {
        StamperBuilder::default()
    }

    pub fn start(&mut self) -> std::result::Result<(), StamperError> {
        self.inner.start()
    }

    pub fn stop(&mut self) -> std::result::Result<(), StamperError> {
        self.inner.stop()
    }

    pub fn emergency_stop(&mut self) {
        self.inner.emergency_stop();
    }

    pub fn reset_counter(&mut self) -> std::result::Result<(), StamperError> {
        self.inner.reset_counter()
    }

    pub fn set_speed(&mut self, pps: f32) -> f32 {
        self.inner.set_speed(pps)
    }

    pub fn calibrate_sensor(&mut self, threshold: i32) -> u8 {
        self.inner.calibrate_sensor(threshold)
    }

    pub fn acknowledge_alert(&mut self) -> std::result::Result<(), StamperError> {
        self.inner.acknowledge_alert()
    }

    pub fn stamp_once(&mut self) -> std::result::Result<(), StamperError> {
        self.inner.stamp_once()
    }

    pub fn apply(&mut self, cmd: Command) -> std::result::Result<(), StamperError> {
        self.inner.apply(cmd)
    }

    /// Fire due timers; see `StamperCore::poll`.
    pub fn poll(&mut self) -> usize {
        self.inner.poll()
    }

    pub fn mode(&self) -> MachineMode {
        self.inner.mode()
    }

    pub fn paper_count(&self) -> u64 {
        self.inner.paper_count()
    }

    pub fn state(&self) -> &MachineState {
        self.inner.state()
    }

    pub fn snapshot(&self) -> MachineSnapshot {
        self.inner.snapshot()
    }

    pub fn history(&self) -> &HistoryLog {
        self.inner.history()
    }

    pub fn active_alert(&self) -> Option<&Alert> {
        self.inner.active_alert()
    }

    pub fn next_due_in(&self) -> Option<Duration> {
        self.inner.next_due_in()
    }

    /// Borrow the underlying controller (for the runner and diagnostics).
    pub fn core(&self) -> &StamperCore<Box<dyn PaperSensor>, Box<dyn Thermometer>> {
        &self.inner
    }

    pub fn core_mut(&mut self) -> &mut StamperCore<Box<dyn PaperSensor>, Box<dyn Thermometer>> {
        &mut self.inner
    }
}

// ── Type-state markers ───────────────────────────────────────────────────────

pub struct Missing;
pub struct Set;

/// Builder for `Stamper`. All fields are validated on `build()`.
pub struct StamperBuilder<P, T> {
    paper: Option<Box<dyn PaperSensor>>,
    thermometer: Option<Box<dyn Thermometer>>,
    machine: Option<MachineCfg>,
    telemetry: Option<TelemetryCfg>,
    history: Option<HistoryCfg>,
    timeouts: Option<Timeouts>,
    clock: Option<Box<dyn Clock + Send + Sync>>,
    _p: PhantomData<P>,
    _t: PhantomData<T>,
}

impl Default for StamperBuilder<Missing, Missing> {
    fn default() -> Self {
        Self {
            paper: None,
            thermometer: None,
            machine: None,
            telemetry: None,
            history: None,
            timeouts: None,
            clock: None,
            _p: PhantomData,
            _t: PhantomData,
        }
    }
}

impl<P, T> StamperBuilder<P, T> {
    fn retag<P2, T2>(self) -> StamperBuilder<P2, T2> {
        StamperBuilder {
            paper: self.paper,
            thermometer: self.thermometer,
            machine: self.machine,
            telemetry: self.telemetry,
            history: self.history,
            timeouts: self.timeouts,
            clock: self.clock,
            _p: PhantomData,
            _t: PhantomData,
        }
    }

    pub fn with_paper_sensor(
        mut self,
        sensor: impl PaperSensor + 'static,
    ) -> StamperBuilder<Set, T> {
        self.paper = Some(Box::new(sensor));
        self.retag()
    }

    pub fn with_thermometer(
        mut self,
        thermometer: impl Thermometer + 'static,
    ) -> StamperBuilder<P, Set> {
        self.thermometer = Some(Box::new(thermometer));
        self.retag()
    }

    pub fn with_machine(mut self, machine: MachineCfg) -> Self {
        self.machine = Some(machine);
        self
    }

    pub fn with_telemetry(mut self, telemetry: TelemetryCfg) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    pub fn with_history(mut self, history: HistoryCfg) -> Self {
        self.history = Some(history);
        self
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = Some(timeouts);
        self
    }

    /// Shortcut for the initial speed.
    pub fn with_speed(mut self, pps: f32) -> Self {
        let mut m = self.machine.take().unwrap_or_default();
        m.initial_speed_pps = pps;
        self.machine = Some(m);
        self
    }

    /// Inject a clock; defaults to `MonotonicClock`.
    pub fn with_clock(mut self, clock: Box<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Map every section of a file config onto the builder.
    pub fn with_config(self, cfg: &stamper_config::Config) -> Self {
        self.with_machine((&cfg.machine).into())
            .with_telemetry((&cfg.telemetry).into())
            .with_history((&cfg.history).into())
            .with_timeouts((&cfg.timeouts).into())
    }

    /// Build without compile-time guarantees; reports missing sensors at runtime.
    pub fn try_build(self) -> Result<Stamper> {
        let paper = self
            .paper
            .ok_or_else(|| eyre::Report::new(BuildError::MissingPaperSensor))?;
        let thermometer = self
            .thermometer
            .ok_or_else(|| eyre::Report::new(BuildError::MissingThermometer))?;
        let inner = validate_and_build(
            paper,
            thermometer,
            self.machine.unwrap_or_default(),
            self.telemetry.unwrap_or_default(),
            self.history.unwrap_or_default(),
            self.timeouts.unwrap_or_default(),
            self.clock,
        )?;
        Ok(Stamper { inner })
    }
}

impl StamperBuilder<Set, Set> {
    pub fn build(self) -> Result<Stamper> {
        self.try_build()
    }
}

/// Validate configuration and construct a `StamperCore`.
///
/// Single source of truth for validation, used by both
/// `StamperBuilder::try_build()` and `build_stamper()`.
fn validate_and_build<P: PaperSensor, T: Thermometer>(
    paper: P,
    thermometer: T,
    machine: MachineCfg,
    telemetry: TelemetryCfg,
    history: HistoryCfg,
    timeouts: Timeouts,
    clock: Option<Box<dyn Clock + Send + Sync>>,
) -> Result<StamperCore<P, T>> {
    let speed = machine.initial_speed_pps;
    if !speed.is_finite() || !(MIN_SPEED_PPS..=MAX_SPEED_PPS).contains(&speed) {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "initial speed must be in [1, 60] pps",
        )));
    }
    if machine.initial_threshold > MAX_THRESHOLD {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "initial threshold must be in [0, 100]",
        )));
    }
    if telemetry.sensor_period_ms == 0 || telemetry.temperature_period_ms == 0 {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "telemetry periods must be >= 1 ms",
        )));
    }
    if timeouts.sensor_ms == 0 {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "sensor_ms must be >= 1",
        )));
    }
    if history.max_entries == Some(0) || history.max_log_lines == Some(0) {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "history caps must be >= 1 when set",
        )));
    }

    let clock: Arc<dyn Clock + Send + Sync> = match clock {
        Some(c) => Arc::from(c),
        None => Arc::new(MonotonicClock::new()),
    };
    let telemetry_io = Telemetry::new(
        paper,
        thermometer,
        Duration::from_millis(timeouts.sensor_ms),
    );
    let log = HistoryLog::new(&history);
    tracing::debug!(
        speed_pps = speed,
        threshold = machine.initial_threshold,
        sensor_period_ms = telemetry.sensor_period_ms,
        temperature_period_ms = telemetry.temperature_period_ms,
        "stamper built"
    );
    Ok(StamperCore::assemble(
        telemetry_io,
        machine,
        telemetry,
        log,
        clock,
    ))
}

/// Generic (static-dispatch) constructor sharing the builder's validation.
pub fn build_stamper<P: PaperSensor, T: Thermometer>(
    paper: P,
    thermometer: T,
    machine: MachineCfg,
    telemetry: TelemetryCfg,
    history: HistoryCfg,
    timeouts: Timeouts,
    clock: Option<Box<dyn Clock + Send + Sync>>,
) -> Result<StamperCore<P, T>> {
    validate_and_build(
        paper,
        thermometer,
        machine,
        telemetry,
        history,
        timeouts,
        clock,
    )
}
