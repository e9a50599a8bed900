//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

/// Config path used when `--config` is not given. Missing is fine: defaults apply.
pub const DEFAULT_CONFIG: &str = "etc/stamper.toml";

#[derive(Parser, Debug)]
#[command(name = "stamper", version, about = "Paper stamping machine controller")]
pub struct Cli {
    /// Path to config TOML [default: etc/stamper.toml]
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Emit JSON lines (dashboard frames, summaries, errors) instead of text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "warn")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Live dashboard driven by console commands on stdin
    Run {
        /// Stop the session after this many milliseconds
        #[arg(long, value_name = "MS")]
        duration_ms: Option<u64>,
        /// Write the stamp history as CSV when the session ends
        #[arg(long, value_name = "FILE")]
        export_history: Option<PathBuf>,
    },
    /// Deterministic scenario on virtual time; prints a summary
    Simulate {
        /// Stamping speed in papers per second (clamped to 1..=60)
        #[arg(long, value_name = "PPS")]
        speed: f32,
        /// Virtual run time in milliseconds
        #[arg(long, value_name = "MS")]
        run_ms: u64,
        /// Trigger an emergency stop at this virtual time
        #[arg(long, value_name = "MS")]
        estop_at_ms: Option<u64>,
        /// Write the stamp history as CSV at the end
        #[arg(long, value_name = "FILE")]
        export_history: Option<PathBuf>,
    },
    /// Read every simulated sensor once
    SelfCheck,
}
