#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parsing and validation may reject anything, but must never panic.
    let Ok(cfg) = toml::from_str::<stamper_config::Config>(data) else {
        return;
    };
    if cfg.validate().is_ok() {
        // A validated file must always map onto runtime config the builder accepts.
        let machine: stamper_core::MachineCfg = (&cfg.machine).into();
        let telemetry: stamper_core::TelemetryCfg = (&cfg.telemetry).into();
        assert!((1.0..=60.0).contains(&machine.initial_speed_pps));
        assert!(telemetry.sensor_period_ms > 0 && telemetry.temperature_period_ms > 0);
    }
});
