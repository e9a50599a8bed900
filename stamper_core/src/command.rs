//! Operator commands forwarded by the presentation layer.

use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Start,
    Stop,
    EmergencyStop,
    ResetCounter,
    /// Requested speed in papers per second (clamped on apply).
    SetSpeed(f32),
    /// Requested threshold (clamped to 0..=100 on apply).
    CalibrateSensor(i32),
    AcknowledgeAlert,
    /// Stamp one paper by hand (running only).
    StampOnce,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseCommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command {0:?}")]
    Unknown(String),
    #[error("{0} needs a numeric argument")]
    MissingArgument(&'static str),
    #[error("invalid number {0:?}")]
    BadNumber(String),
}

impl FromStr for Command {
    type Err = ParseCommandError;

    /// Console syntax: `start`, `stop`, `estop`, `reset`, `speed <pps>`,
    /// `calibrate <0-100>`, `ack`, `stamp`. Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let Some(head) = parts.next() else {
            return Err(ParseCommandError::Empty);
        };
        let arg = parts.next();
        match head.to_ascii_lowercase().as_str() {
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            "estop" | "emergency" | "e-stop" => Ok(Self::EmergencyStop),
            "reset" => Ok(Self::ResetCounter),
            "ack" | "acknowledge" => Ok(Self::AcknowledgeAlert),
            "stamp" => Ok(Self::StampOnce),
            "speed" => {
                let raw = arg.ok_or(ParseCommandError::MissingArgument("speed"))?;
                raw.parse::<f32>()
                    .map(Self::SetSpeed)
                    .map_err(|_| ParseCommandError::BadNumber(raw.to_string()))
            }
            "calibrate" | "threshold" => {
                let raw = arg.ok_or(ParseCommandError::MissingArgument("calibrate"))?;
                raw.parse::<i32>()
                    .map(Self::CalibrateSensor)
                    .map_err(|_| ParseCommandError::BadNumber(raw.to_string()))
            }
            other => Err(ParseCommandError::Unknown(other.to_string())),
        }
    }
}
