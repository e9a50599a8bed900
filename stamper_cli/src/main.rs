mod cli;
mod dashboard;
mod devices;
mod error;
mod error_fmt;
mod export;
mod input;
mod session;
mod simulate;

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use eyre::WrapErr;
use stamper_config::Config;
use stamper_traits::{PaperSensor, Thermometer};

use crate::cli::{Cli, Commands, DEFAULT_CONFIG, FILE_GUARD, JSON_MODE};
use crate::error::CliError;
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);
    if let Err(e) = color_eyre::install() {
        eprintln!("failed to install error reporter: {e}");
    }

    if let Err(err) = real_main(cli) {
        tracing::error!(error = %err, "command failed");
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", format_error_json(&err));
        } else {
            eprintln!("{}", humanize(&err));
        }
        std::process::exit(exit_code_for_error(&err));
    }
}

fn real_main(cli: Cli) -> eyre::Result<()> {
    let cfg = load_config(cli.config.as_deref())?;
    init_tracing(cli.json, &cli.log_level, &cfg.logging);

    match cli.cmd {
        Commands::Run {
            duration_ms,
            export_history,
        } => session::run_live(&cfg, duration_ms, export_history.as_deref(), cli.json),
        Commands::Simulate {
            speed,
            run_ms,
            estop_at_ms,
            export_history,
        } => simulate::run_scenario(
            &cfg,
            &simulate::Scenario {
                speed_pps: speed,
                run_ms,
                estop_at_ms,
                export_to: export_history,
            },
            cli.json,
        ),
        Commands::SelfCheck => self_check(&cfg, cli.json),
    }
}

/// Explicit paths must exist; a missing default path means built-in defaults.
fn load_config(explicit: Option<&Path>) -> eyre::Result<Config> {
    let path: PathBuf = explicit.map_or_else(|| PathBuf::from(DEFAULT_CONFIG), Path::to_path_buf);
    if explicit.is_none() && !path.exists() {
        return Ok(Config::default());
    }
    let shown = path.display().to_string();
    let text = std::fs::read_to_string(&path).map_err(|e| CliError::Config {
        path: shown.clone(),
        reason: format!("cannot read file: {e}"),
    })?;
    let cfg: Config = toml::from_str(&text).map_err(|e| CliError::Config {
        path: shown.clone(),
        reason: e.message().to_string(),
    })?;
    cfg.validate().map_err(|e| CliError::Config {
        path: shown,
        reason: e.to_string(),
    })?;
    Ok(cfg)
}

fn init_tracing(json: bool, level: &str, logging: &stamper_config::Logging) {
    use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let console = if json {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed()
    };

    // Optional JSON file log with rotation
    let file_layer = logging.file.as_deref().map(|file| {
        let path = Path::new(file);
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let name = path
            .file_name()
            .map_or_else(|| "stamper.log".into(), std::ffi::OsStr::to_os_string);
        let appender = match logging.rotation.as_deref() {
            Some("daily") => tracing_appender::rolling::daily(dir, name),
            Some("hourly") => tracing_appender::rolling::hourly(dir, name),
            _ => tracing_appender::rolling::never(dir, name),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        fmt::layer()
            .json()
            .with_ansi(false)
            .with_writer(writer)
            .with_filter(EnvFilter::new(logging.level.as_deref().unwrap_or("info")))
    });

    let _ = tracing_subscriber::registry()
        .with(console.with_filter(console_filter))
        .with(file_layer)
        .try_init();
}

fn self_check(cfg: &Config, json: bool) -> eyre::Result<()> {
    let (mut paper, mut thermometer) = devices::simulated(cfg, cfg.telemetry.seed)?;
    let timeout = Duration::from_millis(cfg.timeouts.sensor_ms);
    let present = paper
        .paper_present(timeout)
        .map_err(|e| eyre::eyre!("paper sensor: {e}"))?;
    let celsius = thermometer
        .read_celsius(timeout)
        .map_err(|e| eyre::eyre!("thermometer: {e}"))
        .wrap_err("self-check failed")?;
    tracing::info!(present, celsius, "self-check");
    if json {
        println!(
            "{}",
            serde_json::json!({
                "event": "self_check",
                "status": "ok",
                "paper_present": present,
                "temperature_c": celsius,
            })
        );
    } else {
        println!("paper sensor: ok (paper present: {present})");
        println!("thermometer: ok ({celsius:.1}C)");
        println!("ok");
    }
    Ok(())
}
