use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A file that could not be encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Summary of one batch run.
///
/// `total` counts every discovered file; files not reached because the run
/// was aborted or cancelled appear in none of the other counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub total: usize,
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: Vec<FileFailure>,
    pub cancelled: bool,
    /// Reason the run stopped early after a failure, if it did.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aborted: Option<String>,
}

impl BatchReport {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    /// Files that were written, skipped or failed.
    pub fn processed(&self) -> usize {
        self.succeeded + self.skipped + self.failed.len()
    }

    /// True when every discovered file was written or skipped.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && !self.cancelled && self.aborted.is_none()
    }

    pub fn log(&self) {
        if self.is_success() {
            tracing::info!(
                total = self.total,
                succeeded = self.succeeded,
                skipped = self.skipped,
                "batch complete"
            );
        } else {
            tracing::warn!(
                total = self.total,
                succeeded = self.succeeded,
                skipped = self.skipped,
                failed = self.failed.len(),
                cancelled = self.cancelled,
                aborted = self.aborted.as_deref().unwrap_or(""),
                "batch incomplete"
            );
        }
    }
}
