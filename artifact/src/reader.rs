use std::fs;
use std::path::Path;

use ndarray::{Array1, Array2};
use ndarray_npy::read_npy;

use crate::{text, ArtifactError, ArtifactFormat};

fn format_of(path: &Path) -> Result<ArtifactFormat, ArtifactError> {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .parse()
}

fn read_text(path: &Path) -> Result<String, ArtifactError> {
    fs::read_to_string(path).map_err(|e| ArtifactError::io(path, e))
}

/// Loads a unit index file written in either format.
pub fn read_units(path: &Path) -> Result<Array1<i64>, ArtifactError> {
    match format_of(path)? {
        ArtifactFormat::Npy => read_npy(path).map_err(|source| ArtifactError::ReadNpy {
            path: path.to_path_buf(),
            source,
        }),
        ArtifactFormat::Text => text::parse_column(path, &read_text(path)?),
    }
}

/// Loads a one-hot matrix written in either format.
pub fn read_one_hot(path: &Path) -> Result<Array2<i64>, ArtifactError> {
    match format_of(path)? {
        ArtifactFormat::Npy => read_npy(path).map_err(|source| ArtifactError::ReadNpy {
            path: path.to_path_buf(),
            source,
        }),
        ArtifactFormat::Text => text::parse_matrix(path, &read_text(path)?),
    }
}

/// Loads a feature matrix written in either format.
pub fn read_features(path: &Path) -> Result<Array2<f32>, ArtifactError> {
    match format_of(path)? {
        ArtifactFormat::Npy => read_npy(path).map_err(|source| ArtifactError::ReadNpy {
            path: path.to_path_buf(),
            source,
        }),
        ArtifactFormat::Text => text::parse_matrix(path, &read_text(path)?),
    }
}
