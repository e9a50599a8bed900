#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core stamping-machine control (hardware-agnostic).
//!
//! All hardware interactions go through `stamper_traits::PaperSensor` and
//! `stamper_traits::Thermometer`.
//!
//! ## Architecture
//!
//! - **State**: run mode, speed, count, threshold, last readings (`state`, `status`)
//! - **Commands**: start/stop/emergency stop/reset/speed/calibrate (`controller`, `command`)
//! - **Timers**: cancellable stamp cadence and telemetry sampling (`timer`)
//! - **Telemetry**: sensor sampling behind the hardware seams (`telemetry`)
//! - **History**: stamp samples and the event log (`history`)
//! - **Runner**: single-threaded cooperative driver (`runner`)
//!
//! Single-threaded by construction: commands and timer callbacks run to
//! completion, and time only matters through the injected `Clock`.

pub mod builder;
pub mod command;
pub mod config;
pub mod conversions;
pub mod controller;
pub mod error;
pub mod history;
pub mod hw_error;
pub mod mocks;
pub mod runner;
pub mod state;
pub mod status;
pub mod telemetry;
pub mod timer;
pub mod util;

pub use builder::{Stamper, StamperBuilder, build_stamper};
pub use command::{Command, ParseCommandError};
pub use config::{HistoryCfg, MachineCfg, TelemetryCfg, Timeouts};
pub use controller::StamperCore;
pub use error::{BuildError, RejectReason, StamperError};
pub use history::{HistoryEntry, HistoryLog, LogLevel, LogLine};
pub use state::{MachineSnapshot, MachineState};
pub use status::{Alert, AlertKind, MachineMode};
