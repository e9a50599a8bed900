//! CLI-level failures that carry their own exit code.

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("invalid configuration in {path}: {reason}")]
    Config { path: String, reason: String },
    #[error("machine halted by emergency stop at {paper_count} papers")]
    EmergencyStopped { paper_count: u64 },
}
