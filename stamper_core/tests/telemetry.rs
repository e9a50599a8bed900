use stamper_core::mocks::{FixedThermometer, ScriptedPaperSensor};
use stamper_core::{AlertKind, MachineMode, Stamper, TelemetryCfg};
use stamper_hardware::{DisconnectedSensor, SimulatedPaperSensor, SimulatedThermometer};
use stamper_traits::ManualClock;

fn with_sensor(sensor: ScriptedPaperSensor) -> (Stamper, ManualClock) {
    let clock = ManualClock::new();
    let s = Stamper::builder()
        .with_paper_sensor(sensor)
        .with_thermometer(FixedThermometer(26.5))
        .with_clock(Box::new(clock.clone()))
        .build()
        .expect("build stamper");
    (s, clock)
}

#[test]
fn presence_is_sampled_at_one_second_then_every_two() {
    let (mut s, clock) = with_sensor(ScriptedPaperSensor::always(true));
    clock.advance_ms(999);
    s.poll();
    assert_eq!(s.snapshot().last_sensor_present, None);
    clock.advance_ms(1);
    s.poll();
    assert_eq!(s.snapshot().last_sensor_present, Some(true));
    clock.advance_ms(4_000); // t = 5000: samples at 3000 and 5000
    s.poll();
    assert_eq!(s.core().telemetry_samples().0, 3);
}

#[test]
fn temperature_is_sampled_every_three_seconds() {
    let (mut s, clock) = with_sensor(ScriptedPaperSensor::always(true));
    clock.advance_ms(2_999);
    s.poll();
    assert_eq!(s.snapshot().last_temperature_c, None);
    clock.advance_ms(1);
    s.poll();
    assert_eq!(s.snapshot().last_temperature_c, Some(26.5));
    clock.advance_ms(6_000);
    s.poll();
    assert_eq!(s.core().telemetry_samples().1, 3);
}

#[test]
fn missing_paper_raises_and_clears_alert() {
    let (mut s, clock) = with_sensor(ScriptedPaperSensor::new([Ok(false), Ok(false), Ok(true)]));
    clock.advance_ms(1_000);
    s.poll();
    let alert = s.active_alert().expect("paper missing alert");
    assert_eq!(alert.kind, AlertKind::PaperMissing);
    assert_eq!(alert.raised_at_ms, 1_000);
    assert!(!alert.kind.is_blocking());

    clock.advance_ms(2_000);
    s.poll();
    assert_eq!(
        s.active_alert().map(|a| a.raised_at_ms),
        Some(1_000),
        "alert stays raised, not re-raised"
    );

    clock.advance_ms(2_000);
    s.poll();
    assert!(s.active_alert().is_none());
    assert_eq!(s.snapshot().last_sensor_present, Some(true));
}

#[test]
fn telemetry_runs_regardless_of_mode() {
    let (mut s, clock) = with_sensor(ScriptedPaperSensor::always(false));
    s.emergency_stop();
    clock.advance_ms(3_000);
    s.poll();
    assert_eq!(s.mode(), MachineMode::EmergencyStopped);
    assert_eq!(s.snapshot().last_sensor_present, Some(false));
    assert_eq!(s.snapshot().last_temperature_c, Some(26.5));
    let kinds: Vec<AlertKind> = s.core().alerts().map(|a| a.kind).collect();
    assert_eq!(kinds, vec![AlertKind::EmergencyStop, AlertKind::PaperMissing]);
}

#[test]
fn sensor_fault_is_an_alert_that_recovers() {
    let (mut s, clock) = with_sensor(ScriptedPaperSensor::new([Err("laser offline"), Ok(true)]));
    clock.advance_ms(1_000);
    s.poll();
    let alert = s.active_alert().expect("fault alert");
    assert_eq!(alert.kind, AlertKind::SensorFault);
    assert!(alert.message.contains("laser offline"));
    assert_eq!(s.snapshot().last_sensor_present, None);

    clock.advance_ms(2_000);
    s.poll();
    assert!(s.active_alert().is_none());
}

#[test]
fn hardware_faults_do_not_disturb_stamping() {
    let clock = ManualClock::new();
    let mut s = Stamper::builder()
        .with_paper_sensor(DisconnectedSensor)
        .with_thermometer(DisconnectedSensor)
        .with_speed(10.0)
        .with_clock(Box::new(clock.clone()))
        .build()
        .expect("build");
    s.start().unwrap();
    clock.advance_ms(3_000);
    s.poll();
    assert_eq!(s.paper_count(), 30);
    assert_eq!(s.active_alert().map(|a| a.kind), Some(AlertKind::SensorFault));
    assert_eq!(s.snapshot().last_temperature_c, None);
    assert!(
        s.history()
            .log_lines()
            .any(|l| l.message.starts_with("Temperature read failed"))
    );
}

#[test]
fn simulated_devices_respect_their_contracts() {
    let clock = ManualClock::new();
    let mut s = Stamper::builder()
        .with_paper_sensor(SimulatedPaperSensor::with_probability(0.5, Some(9)).unwrap())
        .with_thermometer(SimulatedThermometer::with_range(20.0, 30.0, Some(9)).unwrap())
        .with_telemetry(TelemetryCfg {
            sensor_initial_delay_ms: 10,
            sensor_period_ms: 10,
            temperature_period_ms: 10,
        })
        .with_clock(Box::new(clock.clone()))
        .build()
        .expect("build");
    for _ in 0..200 {
        clock.advance_ms(10);
        s.poll();
        let t = s.snapshot().last_temperature_c.expect("sampled");
        assert!((20.0..30.0).contains(&t));
        let present = s.snapshot().last_sensor_present.expect("sampled");
        let missing_alert = s
            .core()
            .alerts()
            .any(|a| a.kind == AlertKind::PaperMissing);
        assert_eq!(missing_alert, !present);
    }
}
