//! Hardware seams shared by the stamping controller and its device backends.
//!
//! Both sensor traits take a read timeout and return a boxed error so a real
//! device driver can plug in without the core knowing its error type.
pub mod clock;

pub use clock::{Clock, ManualClock, MonotonicClock};

/// Paper-presence sensor in front of the stamping head.
pub trait PaperSensor {
    fn paper_present(
        &mut self,
        timeout: std::time::Duration,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;
}

/// Machine temperature probe, degrees Celsius.
pub trait Thermometer {
    fn read_celsius(
        &mut self,
        timeout: std::time::Duration,
    ) -> Result<f32, Box<dyn std::error::Error + Send + Sync>>;
}

impl<T: PaperSensor + ?Sized> PaperSensor for Box<T> {
    fn paper_present(
        &mut self,
        timeout: std::time::Duration,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        (**self).paper_present(timeout)
    }
}

impl<T: Thermometer + ?Sized> Thermometer for Box<T> {
    fn read_celsius(
        &mut self,
        timeout: std::time::Duration,
    ) -> Result<f32, Box<dyn std::error::Error + Send + Sync>> {
        (**self).read_celsius(timeout)
    }
}
