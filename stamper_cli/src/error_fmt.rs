//! Human-readable error descriptions and structured JSON error formatting.

use crate::error::CliError;

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    use stamper_core::error::{BuildError, StamperError};

    // Typed matches first
    if let Some(ce) = err.downcast_ref::<CliError>() {
        return match ce {
            CliError::Config { path, reason } => format!(
                "What happened: The config file {path} was rejected ({reason}).\nLikely causes: A value is out of range, misspelled, or has the wrong type.\nHow to fix: Edit the file (see etc/stamper.toml for every key and its default), then rerun."
            ),
            CliError::EmergencyStopped { paper_count } => format!(
                "What happened: The run ended with the machine emergency-stopped at {paper_count} papers.\nLikely causes: An operator issued `estop` or the scenario scheduled one.\nHow to fix: Nothing if intended; otherwise restart with `start` before the session ends."
            ),
        };
    }

    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingPaperSensor => {
                "What happened: No paper sensor was provided to the controller.\nLikely causes: The sensor failed to initialize or was not wired into the builder.\nHow to fix: Pass a sensor via with_paper_sensor(...).".to_string()
            }
            BuildError::MissingThermometer => {
                "What happened: No thermometer was provided to the controller.\nLikely causes: The thermometer failed to initialize or was not wired into the builder.\nHow to fix: Pass a thermometer via with_thermometer(...).".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
        };
    }

    if let Some(se) = err.downcast_ref::<StamperError>() {
        if matches!(se, StamperError::Timeout) {
            return "What happened: A sensor read timed out.\nLikely causes: Sensor unplugged or timeout too low.\nHow to fix: Check the sensor and consider raising timeouts.sensor_ms in the config.".to_string();
        }
        return format!(
            "What happened: {se}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
        );
    }

    if let Some(he) = err.downcast_ref::<stamper_hardware::error::HwError>() {
        return format!(
            "What happened: Simulated device setup failed ({he}).\nLikely causes: [telemetry] bounds or probability out of range.\nHow to fix: Fix the [telemetry] section of the config."
        );
    }

    // Generic fallback
    let msg = err.to_string();
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Exit codes: 3 for a rejected config, 4 for a run that ended emergency-stopped, 1 otherwise.
/// Usage errors exit with 2 from clap before any of this runs.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match err.downcast_ref::<CliError>() {
        Some(CliError::Config { .. }) => 3,
        Some(CliError::EmergencyStopped { .. }) => 4,
        None => {
            if err
                .downcast_ref::<stamper_core::error::BuildError>()
                .is_some()
            {
                3
            } else {
                1
            }
        }
    }
}

/// Stable machine-readable name for the error kind.
pub fn reason_name(err: &eyre::Report) -> &'static str {
    use stamper_core::error::{BuildError, StamperError};
    if let Some(ce) = err.downcast_ref::<CliError>() {
        return match ce {
            CliError::Config { .. } => "ConfigInvalid",
            CliError::EmergencyStopped { .. } => "EmergencyStopped",
        };
    }
    if err.downcast_ref::<BuildError>().is_some() {
        return "ConfigInvalid";
    }
    if let Some(se) = err.downcast_ref::<StamperError>() {
        return match se {
            StamperError::Rejected(_) => "Rejected",
            StamperError::Hardware(_) | StamperError::HardwareFault(_) => "Hardware",
            StamperError::Timeout => "Timeout",
            StamperError::Config(_) => "ConfigInvalid",
        };
    }
    "Error"
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let mut obj = json!({
        "reason": reason_name(err),
        "exit_code": exit_code_for_error(err),
        "message": humanize(err),
    });
    match err.downcast_ref::<CliError>() {
        Some(CliError::Config { path, .. }) => {
            obj["details"] = json!({ "path": path });
        }
        Some(CliError::EmergencyStopped { paper_count }) => {
            obj["details"] = json!({ "paper_count": paper_count });
        }
        None => {}
    }
    obj.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_map_to_exit_three() {
        let err = eyre::Report::new(CliError::Config {
            path: "x.toml".into(),
            reason: "machine.initial_speed_pps must be in [1, 60]".into(),
        });
        assert_eq!(exit_code_for_error(&err), 3);
        assert!(humanize(&err).contains("initial_speed_pps"));
        let v: serde_json::Value = serde_json::from_str(&format_error_json(&err)).unwrap();
        assert_eq!(v["reason"], "ConfigInvalid");
        assert_eq!(v["details"]["path"], "x.toml");
    }

    #[test]
    fn emergency_stop_maps_to_exit_four() {
        let err = eyre::Report::new(CliError::EmergencyStopped { paper_count: 7 });
        assert_eq!(exit_code_for_error(&err), 4);
        assert_eq!(reason_name(&err), "EmergencyStopped");
    }

    #[test]
    fn unknown_errors_are_generic() {
        let err = eyre::eyre!("disk full");
        assert_eq!(exit_code_for_error(&err), 1);
        assert!(humanize(&err).contains("disk full"));
    }
}
