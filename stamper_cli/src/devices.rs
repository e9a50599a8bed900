//! Simulated device construction and controller assembly from the file config.

use stamper_config::Config;
use stamper_core::StamperCore;
use stamper_hardware::{SimulatedPaperSensor, SimulatedThermometer};
use stamper_traits::{Clock, PaperSensor, Thermometer};

pub fn simulated(
    cfg: &Config,
    seed: Option<u64>,
) -> eyre::Result<(SimulatedPaperSensor, SimulatedThermometer)> {
    let t = &cfg.telemetry;
    let paper = SimulatedPaperSensor::with_probability(t.presence_probability, seed)?;
    // separate stream so the two devices are not correlated
    let thermo = SimulatedThermometer::with_range(
        t.temperature_min_c,
        t.temperature_max_c,
        seed.map(|s| s.wrapping_add(1)),
    )?;
    Ok((paper, thermo))
}

pub fn assemble<P: PaperSensor, T: Thermometer>(
    cfg: &Config,
    paper: P,
    thermometer: T,
    clock: Option<Box<dyn Clock + Send + Sync>>,
) -> eyre::Result<StamperCore<P, T>> {
    stamper_core::build_stamper(
        paper,
        thermometer,
        (&cfg.machine).into(),
        (&cfg.telemetry).into(),
        (&cfg.history).into(),
        (&cfg.timeouts).into(),
        clock,
    )
}
