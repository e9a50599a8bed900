//! History CSV export.

use std::{fs, io::Write, path::Path};

use eyre::WrapErr;
use stamper_core::HistoryLog;

pub const HEADER: [&str; 2] = ["timestamp_ms", "paper_count"];

/// Serialize the stamp history as `timestamp_ms,paper_count` rows.
pub fn history_csv(history: &HistoryLog) -> eyre::Result<Vec<u8>> {
    let mut w = csv::Writer::from_writer(Vec::new());
    w.write_record(HEADER)?;
    for e in history.entries() {
        w.write_record([e.timestamp_ms.to_string(), e.paper_count.to_string()])?;
    }
    w.into_inner()
        .map_err(|e| eyre::eyre!("flush csv buffer: {}", e.error()))
}

/// Write the history next to `path` and rename it into place.
pub fn export_history(history: &HistoryLog, path: &Path) -> eyre::Result<usize> {
    let bytes = history_csv(history)?;
    write_atomic(path, &bytes).wrap_err_with(|| format!("write history to {}", path.display()))?;
    tracing::info!(path = %path.display(), rows = history.len(), "history exported");
    Ok(history.len())
}

fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let tmp = path.with_extension("new");
    {
        let mut f = fs::File::create(&tmp)?;
        f.write_all(bytes)?;
        f.sync_all()?;
    }
    fs::rename(tmp, path)
}
