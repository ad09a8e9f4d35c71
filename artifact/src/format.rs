use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ArtifactError;

/// Serialization used for every per-file artifact of a run.
///
/// The codebook export is always npy regardless of this choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ArtifactFormat {
    /// Whitespace-delimited text, one row per frame.
    #[default]
    #[serde(rename = "txt")]
    Text,
    /// NumPy `.npy` arrays with the dtype preserved.
    #[serde(rename = "npy")]
    Npy,
}

impl ArtifactFormat {
    /// File extension without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Npy => "npy",
        }
    }
}

impl fmt::Display for ArtifactFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ArtifactFormat {
    type Err = ArtifactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "txt" | "text" => Ok(Self::Text),
            "npy" => Ok(Self::Npy),
            other => Err(ArtifactError::UnknownFormat(other.to_string())),
        }
    }
}
