//! Sensor sampling behind the hardware seams.
//!
//! `Telemetry` owns the presence sensor and the thermometer and turns their
//! boxed trait errors into `StamperError`. It has no notion of run state;
//! the controller decides when to sample.

use std::time::Duration;

use stamper_traits::{PaperSensor, Thermometer};

use crate::error::StamperError;
use crate::hw_error::map_hw_error;

pub struct Telemetry<P: PaperSensor, T: Thermometer> {
    pub(crate) paper: P,
    pub(crate) thermometer: T,
    pub(crate) timeout: Duration,
    pub(crate) presence_samples: u64,
    pub(crate) temperature_samples: u64,
}

impl<P: PaperSensor, T: Thermometer> Telemetry<P, T> {
    pub fn new(paper: P, thermometer: T, timeout: Duration) -> Self {
        Self {
            paper,
            thermometer,
            timeout,
            presence_samples: 0,
            temperature_samples: 0,
        }
    }

    pub fn sample_presence(&mut self) -> Result<bool, StamperError> {
        self.presence_samples = self.presence_samples.saturating_add(1);
        self.paper
            .paper_present(self.timeout)
            .map_err(|e| map_hw_error(&*e))
    }

    pub fn sample_temperature(&mut self) -> Result<f32, StamperError> {
        self.temperature_samples = self.temperature_samples.saturating_add(1);
        let t = self
            .thermometer
            .read_celsius(self.timeout)
            .map_err(|e| map_hw_error(&*e))?;
        if !t.is_finite() {
            return Err(StamperError::HardwareFault(format!(
                "thermometer returned non-finite value {t}"
            )));
        }
        Ok(t)
    }

    /// Samples attempted so far: `(presence, temperature)`.
    pub fn sample_counts(&self) -> (u64, u64) {
        (self.presence_samples, self.temperature_samples)
    }
}
