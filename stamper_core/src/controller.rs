//! The stamping controller (`StamperCore`).
//!
//! Owns machine state, the history log, active alerts, the timer queue and
//! the sensors. Every mutation goes through the command methods or through
//! `poll()`, which fires due timers in order. Nothing here blocks.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use stamper_traits::clock::Clock;
use stamper_traits::{PaperSensor, Thermometer};

use crate::command::Command;
use crate::config::{MachineCfg, TelemetryCfg};
use crate::error::{RejectReason, StamperError};
use crate::history::{HistoryLog, LogLevel};
use crate::state::{MachineSnapshot, MachineState};
use crate::status::{Alert, AlertKind, MachineMode};
use crate::telemetry::Telemetry;
use crate::timer::{TimerKind, TimerQueue};
use crate::util::{clamp_speed, clamp_threshold, stamp_interval_ms};

pub struct StamperCore<P: PaperSensor, T: Thermometer> {
    pub(crate) state: MachineState,
    pub(crate) telemetry: Telemetry<P, T>,
    pub(crate) history: HistoryLog,
    pub(crate) alerts: BTreeMap<AlertKind, Alert>,
    pub(crate) timers: TimerQueue,
    // Bumped on every start/stop/estop and on running speed changes.
    pub(crate) generation: u64,
    pub(crate) machine: MachineCfg,
    pub(crate) telemetry_cfg: TelemetryCfg,
    pub(crate) clock: Arc<dyn Clock + Send + Sync>,
    pub(crate) epoch: Instant,
}

impl<P: PaperSensor, T: Thermometer> core::fmt::Debug for StamperCore<P, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StamperCore")
            .field("mode", &self.state.mode)
            .field("speed_pps", &self.state.speed_pps)
            .field("paper_count", &self.state.paper_count)
            .field("generation", &self.generation)
            .field("pending_timers", &self.timers.len())
            .finish()
    }
}

impl<P: PaperSensor, T: Thermometer> StamperCore<P, T> {
    /// Assemble a controller and arm the telemetry timers. Inputs are assumed
    /// validated (see `builder::validate_and_build`).
    pub(crate) fn assemble(
        telemetry: Telemetry<P, T>,
        machine: MachineCfg,
        telemetry_cfg: TelemetryCfg,
        history: HistoryLog,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        let epoch = clock.now();
        let state = MachineState {
            mode: MachineMode::Stopped,
            speed_pps: clamp_speed(machine.initial_speed_pps),
            paper_count: 0,
            sensor_threshold: machine.initial_threshold.min(crate::util::MAX_THRESHOLD),
            last_sensor_present: None,
            last_temperature_c: None,
        };
        let mut timers = TimerQueue::new();
        timers.arm(
            telemetry_cfg.sensor_initial_delay_ms,
            TimerKind::PresenceSample,
        );
        timers.arm(
            telemetry_cfg.temperature_period_ms,
            TimerKind::TemperatureSample,
        );
        Self {
            state,
            telemetry,
            history,
            alerts: BTreeMap::new(),
            timers,
            generation: 0,
            machine,
            telemetry_cfg,
            clock,
            epoch,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────────────

    /// Milliseconds since the controller was built.
    pub fn now_ms(&self) -> u64 {
        self.clock.ms_since(self.epoch)
    }

    pub fn mode(&self) -> MachineMode {
        self.state.mode
    }

    pub fn paper_count(&self) -> u64 {
        self.state.paper_count
    }

    pub fn speed_pps(&self) -> f32 {
        self.state.speed_pps
    }

    pub fn state(&self) -> &MachineState {
        &self.state
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    /// Highest-priority active alert.
    pub fn active_alert(&self) -> Option<&Alert> {
        self.alerts.values().next()
    }

    /// All active alerts, highest priority first.
    pub fn alerts(&self) -> impl Iterator<Item = &Alert> + '_ {
        self.alerts.values()
    }

    pub fn snapshot(&self) -> MachineSnapshot {
        MachineSnapshot {
            mode: self.state.mode,
            speed_pps: self.state.speed_pps,
            interval_ms: stamp_interval_ms(self.state.speed_pps),
            paper_count: self.state.paper_count,
            sensor_threshold: self.state.sensor_threshold,
            last_sensor_present: self.state.last_sensor_present,
            last_temperature_c: self.state.last_temperature_c,
            alert: self.active_alert().cloned(),
            active_alerts: self.alerts.len(),
            history_len: self.history.len(),
            uptime_ms: self.now_ms(),
        }
    }

    /// Earliest pending timer deadline in controller milliseconds.
    pub fn next_due_ms(&self) -> Option<u64> {
        self.timers.next_due()
    }

    /// Time until the next timer fires; zero if one is already due.
    pub fn next_due_in(&self) -> Option<Duration> {
        let now = self.now_ms();
        self.timers
            .next_due()
            .map(|due| Duration::from_millis(due.saturating_sub(now)))
    }

    /// Pending stamp timers. At most one; exactly one while running.
    pub fn pending_stamp_timers(&self) -> usize {
        self.timers.pending_stamps()
    }

    /// Telemetry samples attempted: `(presence, temperature)`.
    pub fn telemetry_samples(&self) -> (u64, u64) {
        self.telemetry.sample_counts()
    }

    pub fn clock(&self) -> &Arc<dyn Clock + Send + Sync> {
        &self.clock
    }

    // ── Commands ─────────────────────────────────────────────────────────────

    /// Dispatch a presentation-layer command.
    pub fn apply(&mut self, cmd: Command) -> Result<(), StamperError> {
        match cmd {
            Command::Start => self.start(),
            Command::Stop => self.stop(),
            Command::EmergencyStop => {
                self.emergency_stop();
                Ok(())
            }
            Command::ResetCounter => self.reset_counter(),
            Command::SetSpeed(v) => {
                self.set_speed(v);
                Ok(())
            }
            Command::CalibrateSensor(v) => {
                self.calibrate_sensor(v);
                Ok(())
            }
            Command::AcknowledgeAlert => self.acknowledge_alert(),
            Command::StampOnce => self.stamp_once(),
        }
    }

    /// Start stamping. Also the only way out of an emergency stop.
    pub fn start(&mut self) -> Result<(), StamperError> {
        let prev = self.state.mode;
        if prev == MachineMode::Running {
            return self.reject("start", RejectReason::AlreadyRunning);
        }
        let now = self.now_ms();
        self.state.mode = MachineMode::Running;
        self.rearm_stamp(now);
        if self.alerts.remove(&AlertKind::EmergencyStop).is_some() {
            tracing::debug!("emergency alert cleared by restart");
        }
        let msg = if prev == MachineMode::EmergencyStopped {
            format!(
                "Machine restarted after emergency stop at {:.1} pps",
                self.state.speed_pps
            )
        } else {
            format!("Machine started at {:.1} pps", self.state.speed_pps)
        };
        tracing::info!(
            speed_pps = self.state.speed_pps,
            from = %prev,
            paper_count = self.state.paper_count,
            "machine start"
        );
        self.history.log(now, LogLevel::Info, msg);
        Ok(())
    }

    /// Normal stop. The count is kept.
    pub fn stop(&mut self) -> Result<(), StamperError> {
        match self.state.mode {
            MachineMode::Running => {}
            MachineMode::Stopped => return self.reject("stop", RejectReason::NotRunning),
            MachineMode::EmergencyStopped => {
                return self.reject("stop", RejectReason::EmergencyLatched);
            }
        }
        let now = self.now_ms();
        self.state.mode = MachineMode::Stopped;
        self.cancel_cadence();
        tracing::info!(paper_count = self.state.paper_count, "machine stop");
        self.history.log(
            now,
            LogLevel::Info,
            format!("Machine stopped at {} papers", self.state.paper_count),
        );
        Ok(())
    }

    /// Halt from any mode and raise the blocking emergency alert.
    pub fn emergency_stop(&mut self) {
        let now = self.now_ms();
        let prev = self.state.mode;
        self.state.mode = MachineMode::EmergencyStopped;
        self.cancel_cadence();
        let msg = format!(
            "EMERGENCY STOP at {} papers (was {prev})",
            self.state.paper_count
        );
        tracing::error!(
            paper_count = self.state.paper_count,
            from = %prev,
            "emergency stop"
        );
        self.raise_alert(AlertKind::EmergencyStop, msg.clone(), now);
        self.history.log(now, LogLevel::Alert, msg);
    }

    /// Zero the counter and clear the history log.
    pub fn reset_counter(&mut self) -> Result<(), StamperError> {
        if self.state.mode == MachineMode::Running && !self.machine.allow_reset_while_running {
            return self.reject("reset", RejectReason::ResetWhileRunning);
        }
        let now = self.now_ms();
        let was = self.state.paper_count;
        self.state.paper_count = 0;
        self.history.clear();
        tracing::info!(previous = was, "counter reset");
        self.history
            .log(now, LogLevel::Info, format!("Counter reset (was {was})"));
        Ok(())
    }

    /// Set the stamping speed, clamped to `[1, 60]` pps. Returns the effective
    /// speed. While running, the pending tick is replaced by one at
    /// `now + interval(new speed)`.
    pub fn set_speed(&mut self, pps: f32) -> f32 {
        let effective = clamp_speed(pps);
        let now = self.now_ms();
        self.state.speed_pps = effective;
        if self.state.mode == MachineMode::Running {
            self.rearm_stamp(now);
        }
        if effective == pps {
            tracing::info!(speed_pps = effective, "speed set");
        } else {
            tracing::info!(requested = pps, speed_pps = effective, "speed clamped");
        }
        self.history.log(
            now,
            LogLevel::Info,
            format!(
                "Speed set to {effective:.1} pps ({} ms interval)",
                stamp_interval_ms(effective)
            ),
        );
        effective
    }

    /// Store the sensor threshold, clamped to `[0, 100]`. Returns the stored value.
    pub fn calibrate_sensor(&mut self, threshold: i32) -> u8 {
        let t = clamp_threshold(threshold);
        let now = self.now_ms();
        self.state.sensor_threshold = t;
        tracing::info!(requested = threshold, threshold = t, "sensor calibrated");
        self.history.log(
            now,
            LogLevel::Info,
            format!("Sensor threshold calibrated to {t}"),
        );
        t
    }

    /// Operator acknowledgment of the emergency alert. The machine stays
    /// emergency-stopped until `start()`.
    pub fn acknowledge_alert(&mut self) -> Result<(), StamperError> {
        if self.alerts.remove(&AlertKind::EmergencyStop).is_none() {
            return self.reject("ack", RejectReason::NothingToAcknowledge);
        }
        let now = self.now_ms();
        tracing::info!("emergency alert acknowledged");
        self.history
            .log(now, LogLevel::Info, "Emergency alert acknowledged");
        Ok(())
    }

    /// Stamp one paper on operator request. Only accepted while running; the
    /// regular cadence is left untouched.
    pub fn stamp_once(&mut self) -> Result<(), StamperError> {
        match self.state.mode {
            MachineMode::Running => {}
            MachineMode::Stopped => return self.reject("stamp", RejectReason::NotRunning),
            MachineMode::EmergencyStopped => {
                return self.reject("stamp", RejectReason::EmergencyLatched);
            }
        }
        // Ticks already due go first so history stays time-ordered.
        self.poll();
        let now = self.now_ms();
        self.state.paper_count = self.state.paper_count.saturating_add(1);
        let count = self.state.paper_count;
        self.history.record(now, count);
        self.history
            .log(now, LogLevel::Info, format!("Manually stamped paper #{count}"));
        tracing::info!(paper_count = count, at_ms = now, "manual stamp");
        Ok(())
    }

    // ── Timers ───────────────────────────────────────────────────────────────

    /// Fire every timer due at the current clock time, in deadline order.
    /// Returns the number of effective ticks (stale stamp ticks excluded).
    pub fn poll(&mut self) -> usize {
        let now = self.now_ms();
        let mut fired = 0;
        while let Some(timer) = self.timers.pop_due(now) {
            let effective = match timer.kind {
                TimerKind::Stamp { generation } => self.on_stamp_tick(generation, timer.due_ms),
                TimerKind::PresenceSample => {
                    self.on_presence_sample(timer.due_ms);
                    true
                }
                TimerKind::TemperatureSample => {
                    self.on_temperature_sample(timer.due_ms);
                    true
                }
            };
            if effective {
                fired += 1;
            }
        }
        fired
    }

    fn on_stamp_tick(&mut self, generation: u64, due_ms: u64) -> bool {
        if generation != self.generation || self.state.mode != MachineMode::Running {
            tracing::trace!(generation, current = self.generation, "stale stamp tick");
            return false;
        }
        self.state.paper_count = self.state.paper_count.saturating_add(1);
        let count = self.state.paper_count;
        self.history.record(due_ms, count);
        self.history
            .log(due_ms, LogLevel::Info, format!("Stamped paper #{count}"));
        tracing::debug!(paper_count = count, at_ms = due_ms, "stamp");
        // Fixed-rate: the next deadline follows this one, using the current speed.
        let next = due_ms.saturating_add(stamp_interval_ms(self.state.speed_pps));
        self.timers.arm(next, TimerKind::Stamp { generation });
        true
    }

    fn on_presence_sample(&mut self, due_ms: u64) {
        match self.telemetry.sample_presence() {
            Ok(present) => {
                self.state.last_sensor_present = Some(present);
                if self.alerts.remove(&AlertKind::SensorFault).is_some() {
                    self.history
                        .log(due_ms, LogLevel::Info, "Paper sensor recovered");
                }
                if present {
                    if self.alerts.remove(&AlertKind::PaperMissing).is_some() {
                        tracing::info!("paper present again");
                        self.history
                            .log(due_ms, LogLevel::Info, "Paper detected");
                    }
                } else if !self.alerts.contains_key(&AlertKind::PaperMissing) {
                    tracing::warn!("no paper detected");
                    self.raise_alert(AlertKind::PaperMissing, "No paper detected".into(), due_ms);
                    self.history
                        .log(due_ms, LogLevel::Warn, "No paper detected");
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "paper sensor read failed");
                let msg = format!("Paper sensor fault: {e}");
                self.raise_alert(AlertKind::SensorFault, msg.clone(), due_ms);
                self.history.log(due_ms, LogLevel::Warn, msg);
            }
        }
        let next = due_ms.saturating_add(self.telemetry_cfg.sensor_period_ms);
        self.timers.arm(next, TimerKind::PresenceSample);
    }

    fn on_temperature_sample(&mut self, due_ms: u64) {
        match self.telemetry.sample_temperature() {
            Ok(t) => {
                self.state.last_temperature_c = Some(t);
                tracing::trace!(celsius = t, "temperature sample");
            }
            Err(e) => {
                tracing::warn!(error = %e, "thermometer read failed");
                self.history.log(
                    due_ms,
                    LogLevel::Warn,
                    format!("Temperature read failed: {e}"),
                );
            }
        }
        let next = due_ms.saturating_add(self.telemetry_cfg.temperature_period_ms);
        self.timers.arm(next, TimerKind::TemperatureSample);
    }

    // ── Internals ────────────────────────────────────────────────────────────

    /// New generation, drop the pending tick, arm one at `now + interval`.
    fn rearm_stamp(&mut self, now_ms: u64) {
        self.cancel_cadence();
        let due = now_ms.saturating_add(stamp_interval_ms(self.state.speed_pps));
        self.timers.arm(
            due,
            TimerKind::Stamp {
                generation: self.generation,
            },
        );
    }

    fn cancel_cadence(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.timers.cancel_stamps();
    }

    fn raise_alert(&mut self, kind: AlertKind, message: String, at_ms: u64) {
        self.alerts.insert(
            kind,
            Alert {
                kind,
                message,
                raised_at_ms: at_ms,
            },
        );
    }

    fn reject(&mut self, cmd: &'static str, reason: RejectReason) -> Result<(), StamperError> {
        let now = self.now_ms();
        tracing::warn!(command = cmd, %reason, mode = %self.state.mode, "command rejected");
        self.history.log(
            now,
            LogLevel::Warn,
            format!("{cmd} ignored: {reason}"),
        );
        Err(StamperError::Rejected(reason))
    }
}
