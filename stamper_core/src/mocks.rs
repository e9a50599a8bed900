//! Test and helper doubles for stamper_core.

use std::collections::VecDeque;

/// Presence sensor that replays a script, then repeats its last reading.
/// `Err` entries surface as read failures.
pub struct ScriptedPaperSensor {
    script: VecDeque<Result<bool, &'static str>>,
    last: Result<bool, &'static str>,
}

impl ScriptedPaperSensor {
    pub fn new(script: impl IntoIterator<Item = Result<bool, &'static str>>) -> Self {
        Self {
            script: script.into_iter().collect(),
            last: Ok(true),
        }
    }

    /// Sensor that always sees paper.
    pub fn always(present: bool) -> Self {
        Self::new([Ok(present)])
    }
}

impl stamper_traits::PaperSensor for ScriptedPaperSensor {
    fn paper_present(
        &mut self,
        _timeout: std::time::Duration,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        if let Some(next) = self.script.pop_front() {
            self.last = next;
        }
        self.last
            .map_err(|msg| Box::new(std::io::Error::other(msg)) as Box<dyn std::error::Error + Send + Sync>)
    }
}

/// Thermometer that always reads the same value.
pub struct FixedThermometer(pub f32);

impl stamper_traits::Thermometer for FixedThermometer {
    fn read_celsius(
        &mut self,
        _timeout: std::time::Duration,
    ) -> Result<f32, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.0)
    }
}
