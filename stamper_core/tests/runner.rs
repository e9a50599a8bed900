use std::sync::atomic::AtomicBool;
use std::time::Duration;

use crossbeam_channel as xch;
use stamper_core::mocks::{FixedThermometer, ScriptedPaperSensor};
use stamper_core::runner::{Control, RunExit, RunOptions, run};
use stamper_core::{Command, MachineMode, Stamper};
use stamper_traits::ManualClock;

fn stamper(clock: &ManualClock) -> Stamper {
    Stamper::builder()
        .with_paper_sensor(ScriptedPaperSensor::always(true))
        .with_thermometer(FixedThermometer(21.0))
        .with_speed(10.0)
        .with_clock(Box::new(clock.clone()))
        .build()
        .expect("build stamper")
}

#[test]
fn deadline_ends_the_session_on_virtual_time() {
    let clock = ManualClock::new();
    let mut s = stamper(&clock);
    let (tx, rx) = xch::unbounded();
    tx.send(Control::Command(Command::Start)).unwrap();
    let shutdown = AtomicBool::new(false);
    let opts = RunOptions {
        frame_every: Duration::from_millis(250),
        deadline: Some(Duration::from_secs(2)),
    };
    let mut frames = 0;
    let exit = run(s.core_mut(), &rx, &shutdown, &opts, |_| frames += 1);

    assert_eq!(exit, RunExit::Deadline);
    assert_eq!(s.core().now_ms(), 2_000);
    assert_eq!(s.paper_count(), 20);
    assert_eq!(s.mode(), MachineMode::Running);
    assert!(frames >= 8, "frames rendered: {frames}");
}

#[test]
fn quit_is_honoured_after_earlier_commands() {
    let clock = ManualClock::new();
    let mut s = stamper(&clock);
    let (tx, rx) = xch::unbounded();
    tx.send(Control::Command(Command::SetSpeed(30.0))).unwrap();
    tx.send(Control::Command(Command::CalibrateSensor(80))).unwrap();
    tx.send(Control::Quit).unwrap();
    let shutdown = AtomicBool::new(false);
    let mut last_frame_speed = 0.0;
    let exit = run(
        s.core_mut(),
        &rx,
        &shutdown,
        &RunOptions::default(),
        |core| last_frame_speed = core.speed_pps(),
    );
    assert_eq!(exit, RunExit::Quit);
    assert_eq!(last_frame_speed, 30.0);
    assert_eq!(s.snapshot().sensor_threshold, 80);
}

#[test]
fn rejected_commands_do_not_end_the_loop() {
    let clock = ManualClock::new();
    let mut s = stamper(&clock);
    let (tx, rx) = xch::unbounded();
    tx.send(Control::Command(Command::Stop)).unwrap();
    tx.send(Control::Command(Command::AcknowledgeAlert)).unwrap();
    let shutdown = AtomicBool::new(false);
    let opts = RunOptions {
        deadline: Some(Duration::from_millis(100)),
        ..RunOptions::default()
    };
    let exit = run(s.core_mut(), &rx, &shutdown, &opts, |_| {});
    assert_eq!(exit, RunExit::Deadline);
    let warnings = s
        .history()
        .log_lines()
        .filter(|l| l.message.contains("ignored"))
        .count();
    assert_eq!(warnings, 2);
}

#[test]
fn shutdown_flag_stops_immediately() {
    let clock = ManualClock::new();
    let mut s = stamper(&clock);
    let (_tx, rx) = xch::unbounded::<Control>();
    let shutdown = AtomicBool::new(true);
    let mut frames = 0;
    let exit = run(s.core_mut(), &rx, &shutdown, &RunOptions::default(), |_| {
        frames += 1
    });
    assert_eq!(exit, RunExit::Shutdown);
    assert_eq!(frames, 1, "final frame only");
}

#[test]
fn emergency_stop_mid_session_freezes_count() {
    let clock = ManualClock::new();
    let mut s = stamper(&clock);
    s.start().unwrap();
    let (tx, rx) = xch::unbounded();
    let shutdown = AtomicBool::new(false);
    let opts = RunOptions {
        deadline: Some(Duration::from_millis(1_000)),
        ..RunOptions::default()
    };
    // nothing is due at t = 0, so the estop lands before the first tick
    tx.send(Control::Command(Command::EmergencyStop)).unwrap();
    let exit = run(s.core_mut(), &rx, &shutdown, &opts, |_| {});
    assert_eq!(exit, RunExit::Deadline);
    assert_eq!(s.paper_count(), 0);
    assert_eq!(s.mode(), MachineMode::EmergencyStopped);
}

#[test]
fn late_turn_fires_due_ticks_before_queued_commands() {
    let clock = ManualClock::new();
    let mut s = stamper(&clock);
    s.set_speed(60.0);
    s.start().unwrap();
    // the loop wakes late: ticks at 17 and 34 ms are already due
    clock.advance_ms(40);
    let (tx, rx) = xch::unbounded();
    tx.send(Control::Command(Command::CalibrateSensor(70))).unwrap();
    tx.send(Control::Command(Command::Stop)).unwrap();
    tx.send(Control::Quit).unwrap();
    let shutdown = AtomicBool::new(false);
    let exit = run(s.core_mut(), &rx, &shutdown, &RunOptions::default(), |_| {});

    assert_eq!(exit, RunExit::Quit);
    assert_eq!(s.paper_count(), 2);
    assert_eq!(s.mode(), MachineMode::Stopped);
    let stamps: Vec<u64> = s.history().entries().map(|e| e.timestamp_ms).collect();
    assert_eq!(stamps, vec![17, 34]);
    let times: Vec<u64> = s.history().log_lines().map(|l| l.timestamp_ms).collect();
    assert!(
        times.windows(2).all(|w| w[0] <= w[1]),
        "log went back in time: {times:?}"
    );
}
