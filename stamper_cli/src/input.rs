//! Console command feed: a reader thread turns stdin lines into `Control`s.
//!
//! The thread never touches controller state. It only parses and forwards.
//! After it forwards `estop` it holds back everything but `ack`, `estop` and
//! `quit` until the operator acknowledges.

use std::io::{self, BufRead};
use std::thread::JoinHandle;

use crossbeam_channel as xch;
use stamper_core::runner::Control;
use stamper_core::{Command, ParseCommandError};

pub const HELP: &str =
    "commands: start, stop, stamp, estop, reset, speed <pps>, calibrate <0-100>, ack, quit";

/// `Ok(None)` for blank lines.
pub fn parse_line(line: &str) -> Result<Option<Control>, ParseCommandError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if matches!(trimmed.to_ascii_lowercase().as_str(), "quit" | "exit" | "q") {
        return Ok(Some(Control::Quit));
    }
    trimmed.parse::<Command>().map(|c| Some(Control::Command(c)))
}

/// What the operator may still do while the emergency alert is unacknowledged.
pub fn allowed_while_modal(ctl: &Control) -> bool {
    matches!(
        ctl,
        Control::Quit | Control::Command(Command::AcknowledgeAlert | Command::EmergencyStop)
    )
}

/// Spawn the stdin reader. It ends on EOF or when the receiver is gone.
pub fn spawn_stdin_reader(tx: xch::Sender<Control>) -> io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("stdin-commands".into())
        .spawn(move || {
            let stdin = io::stdin();
            let mut latched = false;
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                match parse_line(&line) {
                    Ok(None) => {}
                    Ok(Some(ctl)) => {
                        if latched && !allowed_while_modal(&ctl) {
                            eprintln!("emergency stop active: acknowledge with `ack` first");
                            continue;
                        }
                        match ctl {
                            Control::Command(Command::EmergencyStop) => latched = true,
                            Control::Command(Command::AcknowledgeAlert) => latched = false,
                            _ => {}
                        }
                        if tx.send(ctl).is_err() {
                            break;
                        }
                    }
                    Err(e) => eprintln!("{e}; {HELP}"),
                }
            }
            tracing::debug!("console reader finished");
        })
}
