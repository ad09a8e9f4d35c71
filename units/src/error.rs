use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by codebook, quantizer and extractor operations.
#[derive(Debug, Error)]
pub enum UnitsError {
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("audio too short: need at least {min_samples} samples, got {got_samples}")]
    AudioTooShort {
        min_samples: usize,
        got_samples: usize,
    },

    #[error("codebook {path}: {reason}")]
    Codebook { path: PathBuf, reason: String },

    #[error("extractor has no layer {0}")]
    UnknownLayer(usize),

    #[error("invalid extractor config: {0}")]
    Config(String),

    #[error("model error: {0}")]
    Model(String),

    #[error("write {path}: {reason}")]
    Export { path: PathBuf, reason: String },
}

impl UnitsError {
    /// Reports whether the error is a shape violation that must stop the
    /// whole run rather than a single file.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::DimensionMismatch { .. })
    }
}
