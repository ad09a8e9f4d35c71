use std::path::PathBuf;

use thiserror::Error;
use unitcoder_artifact::ArtifactError;
use unitcoder_audio::AudioError;
use unitcoder_units::UnitsError;

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error(transparent)]
    Audio(#[from] AudioError),

    #[error(transparent)]
    Units(#[from] UnitsError),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error("input directory {path}: {reason}")]
    Discover { path: PathBuf, reason: String },

    #[error("stem {stem:?} appears twice: {first} and {second}")]
    DuplicateStem {
        stem: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("manifest {path}: {reason}")]
    Manifest { path: PathBuf, reason: String },

    #[error("configuration: {0}")]
    Config(String),
}

impl EncodeError {
    /// Reports whether the error must stop the whole run, whatever the
    /// per-file error policy says.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Audio(AudioError::SampleRateMismatch { .. }) => true,
            Self::Units(e) => e.is_fatal(),
            Self::Audio(_) | Self::Artifact(_) => false,
            Self::Discover { .. }
            | Self::DuplicateStem { .. }
            | Self::Manifest { .. }
            | Self::Config(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_classes() {
        let rate: EncodeError = AudioError::SampleRateMismatch {
            expected: 16000,
            got: 8000,
        }
        .into();
        assert!(rate.is_fatal());

        let dim: EncodeError = UnitsError::DimensionMismatch {
            expected: 256,
            got: 768,
        }
        .into();
        assert!(dim.is_fatal());

        let empty: EncodeError = AudioError::Empty {
            path: "a.wav".into(),
        }
        .into();
        assert!(!empty.is_fatal());

        let model: EncodeError = UnitsError::Model("oom".into()).into();
        assert!(!model.is_fatal());
    }
}
