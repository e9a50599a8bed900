use stamper_core::mocks::{FixedThermometer, ScriptedPaperSensor};
use stamper_core::{MachineMode, Stamper};
use stamper_traits::ManualClock;

fn stamper_at(speed: f32) -> (Stamper, ManualClock) {
    let clock = ManualClock::new();
    let s = Stamper::builder()
        .with_paper_sensor(ScriptedPaperSensor::always(true))
        .with_thermometer(FixedThermometer(24.0))
        .with_speed(speed)
        .with_clock(Box::new(clock.clone()))
        .build()
        .expect("build stamper");
    (s, clock)
}

#[test]
fn five_intervals_at_full_speed_stamp_five_papers() {
    let (mut s, clock) = stamper_at(60.0);
    s.start().expect("start");
    for _ in 0..5 {
        clock.advance_ms(17);
        s.poll();
    }
    assert_eq!(s.paper_count(), 5);
    assert_eq!(s.history().len(), 5);
    let stamps: Vec<u64> = s.history().entries().map(|e| e.timestamp_ms).collect();
    assert_eq!(stamps, vec![17, 34, 51, 68, 85]);
}

#[test]
fn one_late_poll_catches_up_in_order() {
    let (mut s, clock) = stamper_at(60.0);
    s.start().unwrap();
    clock.advance_ms(85);
    s.poll();
    assert_eq!(s.paper_count(), 5);
    let counts: Vec<u64> = s.history().entries().map(|e| e.paper_count).collect();
    assert_eq!(counts, vec![1, 2, 3, 4, 5]);
}

#[test]
fn no_tick_before_the_first_interval() {
    let (mut s, clock) = stamper_at(10.0);
    s.start().unwrap();
    clock.advance_ms(99);
    s.poll();
    assert_eq!(s.paper_count(), 0);
    clock.advance_ms(1);
    s.poll();
    assert_eq!(s.paper_count(), 1);
}

#[test]
fn slowing_down_mid_run_delays_the_next_tick() {
    let (mut s, clock) = stamper_at(60.0);
    s.start().unwrap();
    clock.advance_ms(17);
    s.poll();
    assert_eq!(s.paper_count(), 1);

    clock.advance_ms(5); // t = 22
    assert_eq!(s.set_speed(1.0), 1.0);
    // the tick that was due at 34 must not fire
    clock.advance_ms(1_000 - 1); // t = 1021
    s.poll();
    assert_eq!(s.paper_count(), 1);
    clock.advance_ms(1); // t = 1022
    s.poll();
    assert_eq!(s.paper_count(), 2);
    assert_eq!(s.history().last().map(|e| e.timestamp_ms), Some(1_022));
    assert_eq!(s.core().pending_stamp_timers(), 1);
}

#[test]
fn speeding_up_takes_effect_from_the_next_tick() {
    let (mut s, clock) = stamper_at(1.0);
    s.start().unwrap();
    clock.advance_ms(500);
    s.set_speed(50.0); // 20 ms interval from t = 500
    clock.advance_ms(20);
    s.poll();
    assert_eq!(s.paper_count(), 1);
    clock.advance_ms(40);
    s.poll();
    assert_eq!(s.paper_count(), 3);
}

#[test]
fn speed_changes_while_stopped_only_affect_the_next_run() {
    let (mut s, clock) = stamper_at(10.0);
    s.set_speed(20.0);
    assert_eq!(s.core().pending_stamp_timers(), 0);
    clock.advance_ms(500);
    s.poll();
    assert_eq!(s.paper_count(), 0);
    s.start().unwrap();
    clock.advance_ms(50);
    s.poll();
    assert_eq!(s.paper_count(), 1);
}

#[test]
fn stop_cancels_the_pending_tick() {
    let (mut s, clock) = stamper_at(60.0);
    s.start().unwrap();
    clock.advance_ms(34);
    s.poll();
    assert_eq!(s.paper_count(), 2);
    s.stop().unwrap();
    assert_eq!(s.mode(), MachineMode::Stopped);
    assert_eq!(s.core().pending_stamp_timers(), 0);
    clock.advance_ms(10_000);
    s.poll();
    assert_eq!(s.paper_count(), 2);
    assert_eq!(s.history().len(), 2);
}

#[test]
fn restart_continues_from_retained_count() {
    let (mut s, clock) = stamper_at(60.0);
    s.start().unwrap();
    clock.advance_ms(51);
    s.poll();
    s.stop().unwrap();
    clock.advance_ms(100);
    s.start().unwrap();
    clock.advance_ms(17);
    s.poll();
    assert_eq!(s.paper_count(), 4);
}
