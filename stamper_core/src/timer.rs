//! Cooperative timer queue.
//!
//! Timers are plain deadlines in controller milliseconds; nothing blocks and
//! nothing runs on another thread. Cancellation is by generation: the stamp
//! timer carries the generation it was armed with and the controller ignores
//! it when the generation has moved on.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimerKind {
    /// Stamp one paper. Stale when `generation` no longer matches.
    Stamp { generation: u64 },
    /// Sample the paper-presence sensor.
    PresenceSample,
    /// Sample the thermometer.
    TemperatureSample,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    pub due_ms: u64,
    pub kind: TimerKind,
}

/// Min-heap of pending timers. Ties on `due_ms` fire in arm order.
#[derive(Debug, Default)]
pub struct TimerQueue {
    heap: BinaryHeap<Reverse<(u64, u64, TimerKind)>>,
    seq: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&mut self, due_ms: u64, kind: TimerKind) {
        let seq = self.seq;
        self.seq = self.seq.wrapping_add(1);
        self.heap.push(Reverse((due_ms, seq, kind)));
    }

    /// Remove and return the earliest timer if it is due at `now_ms`.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<Timer> {
        match self.heap.peek() {
            Some(Reverse((due, _, _))) if *due <= now_ms => {
                let Reverse((due_ms, _, kind)) = self.heap.pop()?;
                Some(Timer { due_ms, kind })
            }
            _ => None,
        }
    }

    /// Earliest deadline, if any.
    pub fn next_due(&self) -> Option<u64> {
        self.heap.peek().map(|Reverse((due, _, _))| *due)
    }

    /// Drop every pending stamp timer (any generation).
    pub fn cancel_stamps(&mut self) {
        self.heap
            .retain(|Reverse((_, _, kind))| !matches!(kind, TimerKind::Stamp { .. }));
    }

    /// Pending stamp timers; at most one while the machine runs.
    pub fn pending_stamps(&self) -> usize {
        self.heap
            .iter()
            .filter(|Reverse((_, _, kind))| matches!(kind, TimerKind::Stamp { .. }))
            .count()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
