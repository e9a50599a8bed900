//! Maps `Box<dyn Error>` from trait boundaries to typed `StamperError`.
//!
//! The traits in `stamper_traits` use `Box<dyn Error + Send + Sync>` so any
//! device driver can plug in; this module converts those to our typed error
//! enum, with an optional feature-gated path for `stamper_hardware::HwError`.

use crate::error::StamperError;

/// Map a trait-boundary error to a typed `StamperError`.
///
/// Attempts to downcast known hardware error types first, then falls back
/// to string-based heuristics.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> StamperError {
    #[cfg(feature = "hardware-errors")]
    {
        use stamper_hardware::error::HwError;
        if let Some(hw) = e.downcast_ref::<HwError>() {
            return match hw {
                HwError::Timeout => StamperError::Timeout,
                other => StamperError::HardwareFault(other.to_string()),
            };
        }
    }

    let s = e.to_string();
    if s.to_lowercase().contains("timeout") {
        StamperError::Timeout
    } else {
        StamperError::Hardware(s)
    }
}
