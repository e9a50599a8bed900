#![no_main]
use libfuzzer_sys::fuzz_target;
use stamper_core::Command;

fuzz_target!(|data: &str| {
    if let Ok(Command::CalibrateSensor(v)) = data.parse::<Command>() {
        // clamping happens on apply, parsing keeps the raw value
        let _ = stamper_core::util::clamp_threshold(v);
    }
});
