//! `stamper simulate`: a fixed scenario on a `ManualClock`.
//!
//! Runs instantly. The stamp count depends only on speed, run time and the
//! optional emergency stop, so the summary is reproducible.

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use crossbeam_channel as xch;
use serde_json::json;
use stamper_config::Config;
use stamper_core::runner::{self, Control, RunOptions};
use stamper_core::{MachineMode, StamperCore};
use stamper_traits::{ManualClock, PaperSensor, Thermometer};

use crate::error::CliError;
use crate::{devices, export};

/// Seed for the simulated sensors when the config does not set one.
const DEFAULT_SEED: u64 = 0x5eed;

#[derive(Debug, Clone)]
pub struct Scenario {
    pub speed_pps: f32,
    pub run_ms: u64,
    pub estop_at_ms: Option<u64>,
    pub export_to: Option<PathBuf>,
}

pub fn run_scenario(cfg: &Config, sc: &Scenario, json: bool) -> eyre::Result<()> {
    let clock = ManualClock::new();
    let (paper, thermometer) =
        devices::simulated(cfg, Some(cfg.telemetry.seed.unwrap_or(DEFAULT_SEED)))?;
    let mut core = devices::assemble(cfg, paper, thermometer, Some(Box::new(clock)))?;

    let effective = core.set_speed(sc.speed_pps);
    if effective != sc.speed_pps {
        tracing::warn!(requested = sc.speed_pps, effective, "speed clamped");
    }
    core.start()?;
    tracing::info!(speed_pps = effective, run_ms = sc.run_ms, estop_at_ms = ?sc.estop_at_ms, "scenario start");

    match sc.estop_at_ms.filter(|&at| at <= sc.run_ms) {
        Some(at) => {
            advance(&mut core, at);
            core.emergency_stop();
            advance(&mut core, sc.run_ms - at);
        }
        None => advance(&mut core, sc.run_ms),
    }

    print_summary(&core, sc, json);
    if let Some(path) = &sc.export_to {
        let rows = export::export_history(core.history(), path)?;
        if !json {
            println!("history: {rows} rows written to {}", path.display());
        }
    }
    if core.mode() == MachineMode::EmergencyStopped {
        return Err(CliError::EmergencyStopped {
            paper_count: core.paper_count(),
        }
        .into());
    }
    Ok(())
}

/// Drive the runner for `ms` of virtual time with no operator input.
fn advance<P: PaperSensor, T: Thermometer>(core: &mut StamperCore<P, T>, ms: u64) {
    let (_tx, rx) = xch::bounded::<Control>(1);
    let idle = AtomicBool::new(false);
    let opts = RunOptions {
        deadline: Some(Duration::from_millis(ms)),
        ..RunOptions::default()
    };
    runner::run(core, &rx, &idle, &opts, |_| {});
}

fn print_summary<P: PaperSensor, T: Thermometer>(
    core: &StamperCore<P, T>,
    sc: &Scenario,
    json: bool,
) {
    let snap = core.snapshot();
    let alerts: Vec<&str> = core.alerts().map(|a| a.kind.as_str()).collect();
    if json {
        let obj = json!({
            "event": "summary",
            "paper_count": snap.paper_count,
            "mode": snap.mode.as_str(),
            "speed_pps": snap.speed_pps,
            "interval_ms": snap.interval_ms,
            "run_ms": sc.run_ms,
            "estop_at_ms": sc.estop_at_ms,
            "history_len": snap.history_len,
            "last_temperature_c": snap.last_temperature_c,
            "alerts": alerts,
        });
        println!("{obj}");
        return;
    }
    println!("papers stamped: {}", snap.paper_count);
    println!("final mode: {}", snap.mode);
    println!(
        "speed: {:.1} pps ({} ms interval)",
        snap.speed_pps, snap.interval_ms
    );
    println!("virtual time: {} ms", sc.run_ms);
    println!("history entries: {}", snap.history_len);
    if alerts.is_empty() {
        println!("alerts: none");
    } else {
        println!("alerts: {}", alerts.join(", "));
    }
}
