//! Cooperative driver loop.
//!
//! One thread does everything: fire due timers, drain operator commands from
//! a channel, fire anything those commands armed, hand the controller to a render callback on its own cadence,
//! then sleep on the controller's clock until the next deadline. With a
//! `ManualClock` the sleep only advances virtual time, so whole sessions run
//! instantly and deterministically.

use crossbeam_channel as xch;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use stamper_traits::{PaperSensor, Thermometer};

use crate::command::Command;
use crate::controller::StamperCore;

/// Longest single sleep, so commands and shutdown are noticed promptly.
pub const MAX_IDLE_MS: u64 = 20;

/// Messages from the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Control {
    Command(Command),
    /// End the session after a final frame.
    Quit,
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Render cadence.
    pub frame_every: Duration,
    /// Stop after this much controller time; run until told otherwise when `None`.
    pub deadline: Option<Duration>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            frame_every: Duration::from_millis(250),
            deadline: None,
        }
    }
}

/// Why `run` returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunExit {
    Shutdown,
    Deadline,
    Quit,
}

/// Compute how long to sleep before the next piece of work.
///
/// Picks the earliest of the next timer, the next frame and the deadline,
/// never less than 1 ms and never more than `MAX_IDLE_MS`.
#[inline]
fn idle_ms(now_ms: u64, next_timer_ms: Option<u64>, next_frame_ms: u64, deadline_ms: Option<u64>) -> u64 {
    let mut wake = next_frame_ms;
    if let Some(t) = next_timer_ms {
        wake = wake.min(t);
    }
    if let Some(d) = deadline_ms {
        wake = wake.min(d);
    }
    wake.saturating_sub(now_ms).clamp(1, MAX_IDLE_MS)
}

/// Drive `core` until shutdown, deadline or `Control::Quit`.
///
/// Rejected commands are logged by the controller and never end the loop.
/// `on_frame` always sees one final frame before return.
pub fn run<P, T, F>(
    core: &mut StamperCore<P, T>,
    controls: &xch::Receiver<Control>,
    shutdown: &AtomicBool,
    opts: &RunOptions,
    mut on_frame: F,
) -> RunExit
where
    P: PaperSensor,
    T: Thermometer,
    F: FnMut(&StamperCore<P, T>),
{
    let frame_ms = u64::try_from(opts.frame_every.as_millis())
        .unwrap_or(u64::MAX)
        .max(1);
    let start_ms = core.now_ms();
    let deadline_ms = opts.deadline.map(|d| {
        start_ms.saturating_add(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    });
    let mut next_frame_ms = start_ms;
    tracing::info!(frame_ms, ?deadline_ms, "runner start");

    let exit = loop {
        if shutdown.load(Ordering::Relaxed) {
            tracing::info!("runner received shutdown signal");
            break RunExit::Shutdown;
        }

        // Timers already due fire before any command that arrived after them.
        core.poll();

        let mut quit = false;
        for ctl in controls.try_iter() {
            match ctl {
                Control::Command(cmd) => {
                    if let Err(e) = core.apply(cmd) {
                        tracing::debug!(?cmd, error = %e, "command not applied");
                    }
                }
                Control::Quit => {
                    quit = true;
                    break;
                }
            }
        }
        if quit {
            break RunExit::Quit;
        }

        core.poll();

        let now = core.now_ms();
        if now >= next_frame_ms {
            on_frame(core);
            next_frame_ms = now.saturating_add(frame_ms);
        }
        if deadline_ms.is_some_and(|d| now >= d) {
            break RunExit::Deadline;
        }

        let idle = idle_ms(now, core.next_due_ms(), next_frame_ms, deadline_ms);
        core.clock().sleep(Duration::from_millis(idle));
    };

    on_frame(core);
    tracing::info!(?exit, paper_count = core.paper_count(), "runner exit");
    exit
}

#[cfg(test)]
mod tests {
    use super::idle_ms;

    #[test]
    fn idle_picks_earliest_wakeup() {
        assert_eq!(idle_ms(100, Some(105), 110, None), 5);
        assert_eq!(idle_ms(100, None, 103, Some(102)), 2);
        assert_eq!(idle_ms(100, Some(400), 500, None), super::MAX_IDLE_MS);
    }

    #[test]
    fn idle_never_spins() {
        assert_eq!(idle_ms(100, Some(100), 100, None), 1);
        assert_eq!(idle_ms(100, Some(50), 90, Some(10)), 1);
    }
}
