use rstest::rstest;
use stamper_core::mocks::{FixedThermometer, ScriptedPaperSensor};
use stamper_core::{AlertKind, Command, MachineMode, RejectReason, Stamper, StamperError};
use stamper_traits::ManualClock;

fn stamper() -> (Stamper, ManualClock) {
    let clock = ManualClock::new();
    let s = Stamper::builder()
        .with_paper_sensor(ScriptedPaperSensor::always(true))
        .with_thermometer(FixedThermometer(22.5))
        .with_speed(60.0)
        .with_clock(Box::new(clock.clone()))
        .build()
        .expect("build stamper");
    (s, clock)
}

#[rstest]
#[case::from_stopped(false)]
#[case::from_running(true)]
fn emergency_stop_from_any_mode(#[case] running: bool) {
    let (mut s, clock) = stamper();
    if running {
        s.start().unwrap();
        clock.advance_ms(17);
        s.poll();
    }
    s.emergency_stop();
    assert_eq!(s.mode(), MachineMode::EmergencyStopped);
    assert_eq!(s.core().pending_stamp_timers(), 0);
    let alert = s.active_alert().expect("alert raised");
    assert_eq!(alert.kind, AlertKind::EmergencyStop);
    assert!(alert.kind.is_blocking());
}

#[test]
fn emergency_stop_freezes_count_and_start_resumes() {
    let (mut s, clock) = stamper();
    s.start().unwrap();
    clock.advance_ms(51);
    s.poll();
    assert_eq!(s.paper_count(), 3);

    s.emergency_stop();
    clock.advance_ms(1_000);
    s.poll();
    assert_eq!(s.paper_count(), 3, "no stamping after emergency stop");

    s.start().expect("restart after emergency stop");
    assert_eq!(s.mode(), MachineMode::Running);
    assert!(
        s.core()
            .alerts()
            .all(|a| a.kind != AlertKind::EmergencyStop),
        "restart clears the emergency alert"
    );
    clock.advance_ms(17);
    s.poll();
    assert_eq!(s.paper_count(), 4);
}

#[test]
fn emergency_stop_is_distinct_from_normal_stop() {
    let (mut s, _clock) = stamper();
    s.start().unwrap();
    s.stop().unwrap();
    assert!(s.active_alert().is_none());
    s.start().unwrap();
    s.emergency_stop();
    assert!(s.active_alert().is_some());
}

#[test]
fn stop_does_not_leave_emergency_state() {
    let (mut s, _clock) = stamper();
    s.emergency_stop();
    assert_eq!(
        s.stop(),
        Err(StamperError::Rejected(RejectReason::EmergencyLatched))
    );
    assert_eq!(s.mode(), MachineMode::EmergencyStopped);
}

#[test]
fn acknowledge_clears_alert_but_keeps_machine_halted() {
    let (mut s, clock) = stamper();
    s.start().unwrap();
    s.emergency_stop();
    s.apply(Command::AcknowledgeAlert).expect("ack");
    assert!(s.active_alert().is_none());
    assert_eq!(s.mode(), MachineMode::EmergencyStopped);
    clock.advance_ms(500);
    s.poll();
    assert_eq!(s.paper_count(), 0);
    assert_eq!(
        s.acknowledge_alert(),
        Err(StamperError::Rejected(RejectReason::NothingToAcknowledge))
    );
}

#[test]
fn repeated_emergency_stops_are_harmless() {
    let (mut s, _clock) = stamper();
    s.emergency_stop();
    s.emergency_stop();
    assert_eq!(s.mode(), MachineMode::EmergencyStopped);
    assert_eq!(s.core().alerts().count(), 1);
}
