use thiserror::Error;

/// Why a command was refused. Rejections are reported, never fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    AlreadyRunning,
    NotRunning,
    EmergencyLatched,
    ResetWhileRunning,
    NothingToAcknowledge,
}

impl core::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            Self::AlreadyRunning => "machine is already running",
            Self::NotRunning => "machine is not running",
            Self::EmergencyLatched => "emergency stop is latched; start to resume",
            Self::ResetWhileRunning => "counter cannot be reset while running",
            Self::NothingToAcknowledge => "no emergency alert to acknowledge",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum StamperError {
    #[error("command rejected: {0}")]
    Rejected(RejectReason),
    #[error("hardware error: {0}")]
    Hardware(String),
    #[error("hardware fault: {0}")]
    HardwareFault(String),
    #[error("timeout waiting for sensor")]
    Timeout,
    #[error("configuration error: {0}")]
    Config(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing paper sensor")]
    MissingPaperSensor,
    #[error("missing thermometer")]
    MissingThermometer,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
