use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// File name of the exported codebook, relative to the output root.
pub const CODEBOOK_FILE: &str = "embedding.npy";

/// The kinds of per-file artifact an encoder run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Indices,
    OneHot,
    Features,
    Auxiliary,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Indices => "indices",
            Self::OneHot => "one_hot",
            Self::Features => "features",
            Self::Auxiliary => "auxiliary",
        }
    }
}

/// Directory names, relative to the output root, of each artifact kind.
///
/// `one_hot` and `auxiliary` are optional; a layout without them simply
/// does not produce those artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputLayout {
    pub indices: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one_hot: Option<String>,
    pub features: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auxiliary: Option<String>,
}

impl OutputLayout {
    /// Layout for HuBERT-style runs: primary features under `prequant/`
    /// and the auxiliary layer under `layer09/`.
    pub fn hubert() -> Self {
        Self {
            indices: "indices".into(),
            one_hot: Some("one_hot".into()),
            features: "prequant".into(),
            auxiliary: Some("layer09".into()),
        }
    }

    /// Layout for CPC-style runs.
    pub fn cpc() -> Self {
        Self {
            indices: "indices".into(),
            one_hot: Some("one_hot".into()),
            features: "auxiliary_embedding2".into(),
            auxiliary: None,
        }
    }

    /// Directory name for `kind`, if the layout produces it.
    pub fn dir(&self, kind: ArtifactKind) -> Option<&str> {
        match kind {
            ArtifactKind::Indices => Some(&self.indices),
            ArtifactKind::OneHot => self.one_hot.as_deref(),
            ArtifactKind::Features => Some(&self.features),
            ArtifactKind::Auxiliary => self.auxiliary.as_deref(),
        }
    }

    /// Kinds produced by this layout, indices last.
    pub fn kinds(&self) -> Vec<ArtifactKind> {
        [
            ArtifactKind::OneHot,
            ArtifactKind::Features,
            ArtifactKind::Auxiliary,
            ArtifactKind::Indices,
        ]
        .into_iter()
        .filter(|k| self.dir(*k).is_some())
        .collect()
    }

    /// Full path of the `kind` artifact for `stem` under `root`.
    pub fn path(&self, root: &Path, kind: ArtifactKind, stem: &str, ext: &str) -> Option<PathBuf> {
        self.dir(kind)
            .map(|dir| root.join(dir).join(format!("{stem}.{ext}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hubert_has_four_kinds_indices_last() {
        let kinds = OutputLayout::hubert().kinds();
        assert_eq!(kinds.len(), 4);
        assert_eq!(kinds.last(), Some(&ArtifactKind::Indices));
    }

    #[test]
    fn cpc_has_no_auxiliary() {
        let layout = OutputLayout::cpc();
        assert_eq!(layout.dir(ArtifactKind::Auxiliary), None);
        assert_eq!(layout.kinds().len(), 3);
        assert_eq!(
            layout.path(Path::new("/out"), ArtifactKind::Features, "s01", "npy"),
            Some(PathBuf::from("/out/auxiliary_embedding2/s01.npy"))
        );
    }
}
