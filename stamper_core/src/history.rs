//! Append-only stamp history and event log.
//!
//! Entries are ordered by time. Optional retention caps drop the oldest
//! items first; without caps the log grows for the life of the process.

use std::collections::VecDeque;

use crate::config::HistoryCfg;

/// One stamp event: the count right after the paper was stamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryEntry {
    pub timestamp_ms: u64,
    pub paper_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Alert,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Alert => "alert",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub timestamp_ms: u64,
    pub level: LogLevel,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct HistoryLog {
    entries: VecDeque<HistoryEntry>,
    lines: VecDeque<LogLine>,
    max_entries: Option<usize>,
    max_lines: Option<usize>,
    // Lines ever appended, including those dropped by the cap or cleared.
    lines_total: u64,
}

impl HistoryLog {
    pub fn new(cfg: &HistoryCfg) -> Self {
        Self {
            entries: VecDeque::new(),
            lines: VecDeque::new(),
            max_entries: cfg.max_entries,
            max_lines: cfg.max_log_lines,
            lines_total: 0,
        }
    }

    pub fn record(&mut self, timestamp_ms: u64, paper_count: u64) {
        debug_assert!(
            self.entries
                .back()
                .is_none_or(|e| e.timestamp_ms <= timestamp_ms),
            "history must stay time-ordered"
        );
        self.entries.push_back(HistoryEntry {
            timestamp_ms,
            paper_count,
        });
        if let Some(cap) = self.max_entries {
            while self.entries.len() > cap {
                self.entries.pop_front();
            }
        }
    }

    pub fn log(&mut self, timestamp_ms: u64, level: LogLevel, message: impl Into<String>) {
        self.lines.push_back(LogLine {
            timestamp_ms,
            level,
            message: message.into(),
        });
        self.lines_total = self.lines_total.saturating_add(1);
        if let Some(cap) = self.max_lines {
            while self.lines.len() > cap {
                self.lines.pop_front();
            }
        }
    }

    /// Drop every entry and log line.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.lines.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.back()
    }

    pub fn entries(&self) -> impl ExactSizeIterator<Item = &HistoryEntry> + '_ {
        self.entries.iter()
    }

    pub fn log_lines(&self) -> impl ExactSizeIterator<Item = &LogLine> + '_ {
        self.lines.iter()
    }

    /// Count of log lines appended since construction. Monotonic; lets a
    /// renderer print only what is new without holding a borrow.
    pub fn lines_total(&self) -> u64 {
        self.lines_total
    }

    /// Lines appended after the caller had seen `seen_total` of them.
    pub fn lines_after(&self, seen_total: u64) -> impl Iterator<Item = &LogLine> + '_ {
        let fresh = self.lines_total.saturating_sub(seen_total);
        let fresh = usize::try_from(fresh).unwrap_or(usize::MAX).min(self.lines.len());
        self.lines.iter().skip(self.lines.len() - fresh)
    }

    /// Entries strictly newer than `timestamp_ms`.
    pub fn since(&self, timestamp_ms: u64) -> impl Iterator<Item = &HistoryEntry> + '_ {
        let start = self
            .entries
            .partition_point(|e| e.timestamp_ms <= timestamp_ms);
        self.entries.range(start..)
    }

    /// Stamps per bucket for the last `buckets` windows of `bucket_ms` ending at `now_ms`.
    /// Index 0 is the oldest bucket.
    pub fn rate_buckets(&self, now_ms: u64, bucket_ms: u64, buckets: usize) -> Vec<u32> {
        let mut out = vec![0u32; buckets];
        if buckets == 0 || bucket_ms == 0 {
            return out;
        }
        let span = bucket_ms.saturating_mul(buckets as u64);
        let window_start = now_ms.saturating_sub(span);
        for e in self.entries.iter().rev() {
            if e.timestamp_ms > now_ms {
                continue;
            }
            if e.timestamp_ms < window_start {
                break;
            }
            let age = now_ms - e.timestamp_ms;
            let from_end = usize::try_from(age / bucket_ms).unwrap_or(usize::MAX);
            if from_end < buckets {
                let idx = buckets - 1 - from_end;
                out[idx] = out[idx].saturating_add(1);
            }
        }
        out
    }
}
