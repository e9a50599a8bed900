//! Machine mode and operator alerts.

/// Run state of the stamping machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MachineMode {
    #[default]
    Stopped,
    Running,
    EmergencyStopped,
}

impl MachineMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Running => "running",
            Self::EmergencyStopped => "emergency-stopped",
        }
    }
}

impl core::fmt::Display for MachineMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alert categories, ordered by display priority (highest first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AlertKind {
    /// Operator-triggered halt; the presentation layer must block until acknowledged.
    EmergencyStop,
    /// The paper sensor could not be read.
    SensorFault,
    /// The sensor reported no paper under the head.
    PaperMissing,
}

impl AlertKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EmergencyStop => "EmergencyStop",
            Self::SensorFault => "SensorFault",
            Self::PaperMissing => "PaperMissing",
        }
    }

    /// Whether the presentation layer should demand an acknowledgment.
    pub fn is_blocking(self) -> bool {
        matches!(self, Self::EmergencyStop)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub kind: AlertKind,
    pub message: String,
    pub raised_at_ms: u64,
}
