use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by audio operations.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("read {path}: {source}")]
    Wav {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },

    #[error("{path}: no samples in the requested range")]
    Empty { path: PathBuf },

    #[error("sample rate mismatch: expected {expected} Hz, got {got} Hz")]
    SampleRateMismatch { expected: u32, got: u32 },

    #[error("unsupported sample format: {bits}-bit {kind}")]
    UnsupportedFormat { bits: u16, kind: &'static str },

    #[error("invalid time window: {0}")]
    InvalidWindow(String),

    #[error("invalid length bounds: min {min}, max {max}")]
    InvalidBounds { min: usize, max: usize },
}
