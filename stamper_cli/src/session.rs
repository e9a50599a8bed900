//! `stamper run`: live dashboard on the wall clock.

use std::io;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossbeam_channel as xch;
use eyre::WrapErr;
use stamper_config::Config;
use stamper_core::runner::{self, RunExit, RunOptions};
use stamper_core::MachineMode;

use crate::dashboard::Dashboard;
use crate::error::CliError;
use crate::{devices, export, input};

/// Commands queued between two loop turns before the reader blocks.
const CONTROL_QUEUE: usize = 64;

pub fn run_live(
    cfg: &Config,
    duration_ms: Option<u64>,
    export_to: Option<&Path>,
    json: bool,
) -> eyre::Result<()> {
    let (paper, thermometer) = devices::simulated(cfg, cfg.telemetry.seed)?;
    let mut core = devices::assemble(cfg, paper, thermometer, None)?;

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let flag = Arc::clone(&shutdown);
        ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
            .wrap_err("install Ctrl-C handler")?;
    }

    let (tx, rx) = xch::bounded(CONTROL_QUEUE);
    input::spawn_stdin_reader(tx).wrap_err("spawn console reader")?;
    if !json {
        println!("{}", input::HELP);
    }

    let mut dashboard = Dashboard::new(&cfg.dashboard, json);
    let opts = RunOptions {
        frame_every: Duration::from_millis(cfg.dashboard.refresh_ms),
        deadline: duration_ms.map(Duration::from_millis),
    };
    let stdout = io::stdout();
    let exit = runner::run(&mut core, &rx, &shutdown, &opts, |core| {
        if let Err(e) = dashboard.render(core, &mut stdout.lock()) {
            tracing::warn!(error = %e, "dashboard write failed");
        }
    });

    if exit == RunExit::Shutdown && core.mode() == MachineMode::Running {
        // Ctrl-C halts the machine; the result is always Ok from Running
        let _ = core.stop();
        if let Err(e) = dashboard.render(&core, &mut stdout.lock()) {
            tracing::warn!(error = %e, "dashboard write failed");
        }
    }
    tracing::info!(?exit, paper_count = core.paper_count(), "session ended");

    if let Some(path) = export_to {
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
