use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("write npy {path}: {source}")]
    WriteNpy {
        path: PathBuf,
        source: ndarray_npy::WriteNpyError,
    },

    #[error("read npy {path}: {source}")]
    ReadNpy {
        path: PathBuf,
        source: ndarray_npy::ReadNpyError,
    },

    #[error("{path}:{line}: {reason}")]
    Parse {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("unknown artifact format: {0:?} (expected \"txt\" or \"npy\")")]
    UnknownFormat(String),

    #[error("{kind} artifact: {reason}")]
    LayoutMismatch { kind: &'static str, reason: String },
}

impl ArtifactError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
