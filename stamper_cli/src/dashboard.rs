//! Console dashboard: status line, stamp-rate sparkline and log feed.
//!
//! In JSON mode every frame is one JSON object per line on stdout, and new
//! log lines are emitted as their own `{"event":"log",...}` objects.

use std::io::{self, Write};

use serde_json::json;
use stamper_core::{AlertKind, LogLine, MachineSnapshot, StamperCore};
use stamper_traits::{PaperSensor, Thermometer};

const BARS: [char; 9] = [' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

pub struct Dashboard {
    json: bool,
    chart_buckets: usize,
    bucket_ms: u64,
    seen_lines: u64,
}

impl Dashboard {
    pub fn new(cfg: &stamper_config::Dashboard, json: bool) -> Self {
        Self {
            json,
            chart_buckets: cfg.chart_buckets,
            bucket_ms: cfg.bucket_ms,
            seen_lines: 0,
        }
    }

    /// Print log lines appended since the last frame, then the status line.
    pub fn render<P, T, W>(&mut self, core: &StamperCore<P, T>, out: &mut W) -> io::Result<()>
    where
        P: PaperSensor,
        T: Thermometer,
        W: Write,
    {
        let history = core.history();
        for line in history.lines_after(self.seen_lines) {
            if self.json {
                writeln!(out, "{}", log_json(line))?;
            } else {
                writeln!(out, "{}", log_text(line))?;
            }
        }
        self.seen_lines = history.lines_total();

        let snap = core.snapshot();
        let rates = history.rate_buckets(snap.uptime_ms, self.bucket_ms, self.chart_buckets);
        if self.json {
            let mut frame = snapshot_json(&snap);
            frame["rate"] = json!(rates);
            writeln!(out, "{frame}")?;
        } else {
            writeln!(out, "{} |{}|", status_line(&snap), sparkline(&rates))?;
            if let Some(banner) = emergency_banner(&snap) {
                writeln!(out, "{banner}")?;
            }
        }
        out.flush()
    }
}

pub fn log_text(line: &LogLine) -> String {
    format!(
        "[{:>9.3}s] {:<5} {}",
        line.timestamp_ms as f64 / 1000.0,
        line.level.as_str().to_ascii_uppercase(),
        line.message
    )
}

pub fn log_json(line: &LogLine) -> serde_json::Value {
    json!({
        "event": "log",
        "timestamp_ms": line.timestamp_ms,
        "level": line.level.as_str(),
        "message": line.message,
    })
}

pub fn status_line(snap: &MachineSnapshot) -> String {
    let paper = match snap.last_sensor_present {
        Some(true) => "yes",
        Some(false) => "NO",
        None => "checking",
    };
    let temp = snap
        .last_temperature_c
        .map_or_else(|| "--".to_string(), |t| format!("{t:.1}C"));
    let alert = snap
        .alert
        .as_ref()
        .map_or("none", |a| a.kind.as_str());
    format!(
        "{:<17} speed={:>4.1}pps ({:>4}ms) count={:<6} paper={:<8} temp={:<6} threshold={:<3} alert={}",
        snap.mode.as_str(),
        snap.speed_pps,
        snap.interval_ms,
        snap.paper_count,
        paper,
        temp,
        snap.sensor_threshold,
        alert
    )
}

/// Scale bucket counts to block characters; the fullest bucket gets a full bar.
pub fn sparkline(buckets: &[u32]) -> String {
    let max = buckets.iter().copied().max().unwrap_or(0);
    if max == 0 {
        return " ".repeat(buckets.len());
    }
    let top = (BARS.len() - 1) as u32;
    buckets
        .iter()
        .map(|&n| {
            let level = (n * top).div_ceil(max);
            BARS[level.min(top) as usize]
        })
        .collect()
}

/// Modal banner shown while the emergency alert is active.
pub fn emergency_banner(snap: &MachineSnapshot) -> Option<String> {
    let alert = snap.alert.as_ref()?;
    (alert.kind == AlertKind::EmergencyStop).then(|| {
        format!(
            "!!! {} !!! type `ack` to acknowledge, then `start` to resume",
            alert.message
        )
    })
}

pub fn snapshot_json(snap: &MachineSnapshot) -> serde_json::Value {
    json!({
        "event": "frame",
        "uptime_ms": snap.uptime_ms,
        "mode": snap.mode.as_str(),
        "speed_pps": snap.speed_pps,
        "interval_ms": snap.interval_ms,
        "paper_count": snap.paper_count,
        "sensor_threshold": snap.sensor_threshold,
        "paper_present": snap.last_sensor_present,
        "temperature_c": snap.last_temperature_c,
        "alert": snap.alert.as_ref().map(|a| json!({
            "kind": a.kind.as_str(),
            "message": a.message,
            "raised_at_ms": a.raised_at_ms,
        })),
        "active_alerts": snap.active_alerts,
        "history_len": snap.history_len,
    })
}
