//! Simulated stamping-machine devices.
//!
//! These stand in for the laser paper sensor and the head thermometer. Both
//! draw from a `StdRng` that can be seeded for reproducible runs.
pub mod error;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use stamper_traits::{PaperSensor, Thermometer};

use crate::error::{HwError, Result};

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

/// Simulated paper-presence sensor: each read is a Bernoulli draw.
#[derive(Debug)]
pub struct SimulatedPaperSensor {
    rng: StdRng,
    presence_probability: f64,
    reads: u64,
}

impl SimulatedPaperSensor {
    /// Fair coin (probability 0.5), unseeded.
    pub fn new() -> Self {
        Self {
            rng: make_rng(None),
            presence_probability: 0.5,
            reads: 0,
        }
    }

    /// Custom probability of reporting paper present, optionally seeded.
    pub fn with_probability(presence_probability: f64, seed: Option<u64>) -> Result<Self> {
        if !(0.0..=1.0).contains(&presence_probability) {
            return Err(HwError::InvalidParam(
                "presence probability must be in [0, 1]",
            ));
        }
        Ok(Self {
            rng: make_rng(seed),
            presence_probability,
            reads: 0,
        })
    }

    /// Number of reads served so far.
    pub fn reads(&self) -> u64 {
        self.reads
    }
}

impl Default for SimulatedPaperSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl PaperSensor for SimulatedPaperSensor {
    fn paper_present(
        &mut self,
        _timeout: std::time::Duration,
    ) -> std::result::Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        self.reads = self.reads.saturating_add(1);
        let present = self.rng.gen_bool(self.presence_probability);
        tracing::trace!(present, reads = self.reads, "paper sensor (simulated)");
        Ok(present)
    }
}

/// Simulated thermometer: uniform draw in `[min_c, max_c)`.
#[derive(Debug)]
pub struct SimulatedThermometer {
    rng: StdRng,
    min_c: f32,
    max_c: f32,
}

impl SimulatedThermometer {
    /// Room-temperature range `[20, 30)` °C, unseeded.
    pub fn new() -> Self {
        Self {
            rng: make_rng(None),
            min_c: 20.0,
            max_c: 30.0,
        }
    }

    pub fn with_range(min_c: f32, max_c: f32, seed: Option<u64>) -> Result<Self> {
        if !(min_c.is_finite() && max_c.is_finite()) {
            return Err(HwError::InvalidParam("temperature bounds must be finite"));
        }
        if min_c >= max_c {
            return Err(HwError::InvalidParam(
                "temperature min must be below max",
            ));
        }
        Ok(Self {
            rng: make_rng(seed),
            min_c,
            max_c,
        })
    }
}

impl Default for SimulatedThermometer {
    fn default() -> Self {
        Self::new()
    }
}

impl Thermometer for SimulatedThermometer {
    fn read_celsius(
        &mut self,
        _timeout: std::time::Duration,
    ) -> std::result::Result<f32, Box<dyn std::error::Error + Send + Sync>> {
        let t = self.rng.gen_range(self.min_c..self.max_c);
        tracing::trace!(celsius = t, "thermometer (simulated)");
        Ok(t)
    }
}

/// A presence sensor that always fails; handy for exercising fault alerts.
#[derive(Debug, Default)]
pub struct DisconnectedSensor;

impl PaperSensor for DisconnectedSensor {
    fn paper_present(
        &mut self,
        _timeout: std::time::Duration,
    ) -> std::result::Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        Err(Box::new(HwError::Disconnected("paper sensor".into())))
    }
}

impl Thermometer for DisconnectedSensor {
    fn read_celsius(
        &mut self,
        _timeout: std::time::Duration,
    ) -> std::result::Result<f32, Box<dyn std::error::Error + Send + Sync>> {
        Err(Box::new(HwError::Timeout))
    }
}
