use proptest::prelude::*;
use stamper_core::mocks::{FixedThermometer, ScriptedPaperSensor};
use stamper_core::{Command, MachineMode, Stamper};
use stamper_traits::ManualClock;

#[derive(Debug, Clone)]
enum Step {
    Cmd(Command),
    Advance(u64),
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        Just(Step::Cmd(Command::Start)),
        Just(Step::Cmd(Command::Stop)),
        Just(Step::Cmd(Command::EmergencyStop)),
        Just(Step::Cmd(Command::ResetCounter)),
        Just(Step::Cmd(Command::AcknowledgeAlert)),
        Just(Step::Cmd(Command::StampOnce)),
        (-10.0f32..100.0).prop_map(|v| Step::Cmd(Command::SetSpeed(v))),
        (-50i32..200).prop_map(|v| Step::Cmd(Command::CalibrateSensor(v))),
        (0u64..3_000).prop_map(Step::Advance),
    ]
}

proptest! {
    #[test]
    fn invariants_hold_for_any_command_sequence(steps in prop::collection::vec(step(), 1..60)) {
        let clock = ManualClock::new();
        let mut s = Stamper::builder()
            .with_paper_sensor(ScriptedPaperSensor::new([Ok(true), Ok(false), Err("glitch")]))
            .with_thermometer(FixedThermometer(23.0))
            .with_clock(Box::new(clock.clone()))
            .build()
            .unwrap();

        for step in steps {
            let before = s.paper_count();
            let mode_before = s.mode();
            match step {
                Step::Cmd(cmd) => {
                    let _ = s.apply(cmd);
                    match cmd {
                        Command::ResetCounter => {}
                        Command::StampOnce if mode_before == MachineMode::Running => {
                            prop_assert_eq!(s.paper_count(), before + 1, "one manual stamp");
                        }
                        _ => prop_assert_eq!(s.paper_count(), before, "only stamps change the count"),
                    }
                }
                Step::Advance(ms) => {
                    clock.advance_ms(ms);
                    s.poll();
                    if mode_before != MachineMode::Running {
                        prop_assert_eq!(s.paper_count(), before, "no stamping unless running");
                    } else {
                        prop_assert!(s.paper_count() >= before);
                    }
                }
            }

            let snap = s.snapshot();
            prop_assert!((1.0..=60.0).contains(&snap.speed_pps));
            prop_assert!(snap.sensor_threshold <= 100);
            prop_assert_eq!(snap.history_len as u64, snap.paper_count);
            let expected_timers = usize::from(snap.mode == MachineMode::Running);
            prop_assert_eq!(s.core().pending_stamp_timers(), expected_timers);
            if let Some(last) = s.history().last() {
                prop_assert_eq!(last.paper_count, snap.paper_count);
            }
            let times: Vec<u64> = s.history().entries().map(|e| e.timestamp_ms).collect();
            prop_assert!(times.windows(2).all(|w| w[0] <= w[1]));
        }
    }
}
