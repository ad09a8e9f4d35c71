use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use unitcoder_artifact::OutputLayout;
use unitcoder_audio::LengthBounds;
use unitcoder_units::{ExtractorConfig, LAYER_CMVN, LAYER_LOG_MEL};

use crate::EncodeError;

/// Built-in extractor profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileName {
    #[default]
    Hubert,
    Cpc,
}

impl ProfileName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hubert => "hubert",
            Self::Cpc => "cpc",
        }
    }
}

impl fmt::Display for ProfileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProfileName {
    type Err = EncodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hubert" => Ok(Self::Hubert),
            "cpc" => Ok(Self::Cpc),
            other => Err(EncodeError::Config(format!(
                "unknown profile {other:?} (expected \"hubert\" or \"cpc\")"
            ))),
        }
    }
}

/// How a pretrained extractor is driven: analysis geometry, which layers
/// are read, length bounds and the output layout.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractorProfile {
    pub name: ProfileName,
    /// Analysis window in samples.
    pub window: usize,
    /// Hop between frames in samples.
    pub stride: usize,
    /// Layer whose frames are quantized and written as features.
    pub primary_layer: usize,
    /// Extra layer written verbatim, never quantized.
    pub auxiliary_layer: Option<usize>,
    pub bounds: Option<LengthBounds>,
    /// Maximum samples per extractor call. Longer inputs are split.
    pub chunk_size: Option<usize>,
    pub layout: OutputLayout,
}

impl ExtractorProfile {
    /// HuBERT base geometry: 25 ms window, 20 ms hop at 16 kHz.
    pub fn hubert() -> Self {
        Self {
            name: ProfileName::Hubert,
            window: 400,
            stride: 320,
            primary_layer: 7,
            auxiliary_layer: Some(9),
            bounds: LengthBounds::new(640, 2_000_000).ok(),
            chunk_size: None,
            layout: OutputLayout::hubert(),
        }
    }

    /// CPC geometry: 10 ms hop, extraction in 10240-sample chunks.
    pub fn cpc() -> Self {
        Self {
            name: ProfileName::Cpc,
            window: 160,
            stride: 160,
            primary_layer: 0,
            auxiliary_layer: None,
            bounds: None,
            chunk_size: Some(10240),
            layout: OutputLayout::cpc(),
        }
    }

    pub fn by_name(name: ProfileName) -> Self {
        match name {
            ProfileName::Hubert => Self::hubert(),
            ProfileName::Cpc => Self::cpc(),
        }
    }

    /// Replaces the primary layer and, when the profile has one, the
    /// auxiliary layer.
    pub fn with_layers(mut self, primary: Option<usize>, auxiliary: Option<usize>) -> Self {
        if let Some(p) = primary {
            self.primary_layer = p;
        }
        if let (Some(a), Some(_)) = (auxiliary, self.auxiliary_layer) {
            self.auxiliary_layer = Some(a);
        }
        self
    }

    /// Points the profile at layers the configured backend exposes. The
    /// in-process filterbank has only log mel (primary) and CMVN
    /// (auxiliary); other backends keep the profile's layers.
    pub fn for_extractor(self, config: &ExtractorConfig) -> Self {
        match config {
            ExtractorConfig::Fbank(_) => self.with_layers(Some(LAYER_LOG_MEL), Some(LAYER_CMVN)),
            _ => self,
        }
    }

    /// Zeros added on each side so frames are centered on the hop grid.
    pub fn edge_pad(&self) -> usize {
        self.window.saturating_sub(self.stride) / 2
    }

    /// Layers read from the extractor, primary first.
    pub fn layers(&self) -> impl Iterator<Item = usize> + '_ {
        std::iter::once(self.primary_layer).chain(self.auxiliary_layer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hubert_geometry() {
        let p = ExtractorProfile::hubert();
        assert_eq!(p.edge_pad(), 40);
        let b = p.bounds.unwrap();
        assert_eq!((b.min_samples(), b.max_samples()), (640, 2_000_000));
        assert_eq!(p.layers().collect::<Vec<_>>(), vec![7, 9]);
    }

    #[test]
    fn cpc_geometry() {
        let p = ExtractorProfile::cpc();
        assert_eq!(p.edge_pad(), 0);
        assert!(p.bounds.is_none());
        assert_eq!(p.chunk_size, Some(10240));
        assert_eq!(p.layers().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn layer_overrides() {
        let p = ExtractorProfile::hubert().with_layers(Some(0), Some(1));
        assert_eq!((p.primary_layer, p.auxiliary_layer), (0, Some(1)));

        // No auxiliary slot in the CPC layout, so the override is ignored.
        let p = ExtractorProfile::cpc().with_layers(None, Some(3));
        assert_eq!(p.auxiliary_layer, None);
    }

    #[test]
    fn fbank_backend_layers() {
        let fbank = ExtractorConfig::default();
        let p = ExtractorProfile::hubert().for_extractor(&fbank);
        assert_eq!(p.layers().collect::<Vec<_>>(), vec![LAYER_LOG_MEL, LAYER_CMVN]);
        assert_eq!(p.window, 400);

        let p = ExtractorProfile::cpc().for_extractor(&fbank);
        assert_eq!(p.layers().collect::<Vec<_>>(), vec![LAYER_LOG_MEL]);
    }

    #[test]
    fn parse_names() {
        assert_eq!("HuBERT".parse::<ProfileName>().unwrap(), ProfileName::Hubert);
        assert_eq!("cpc".parse::<ProfileName>().unwrap(), ProfileName::Cpc);
        assert!("wav2vec".parse::<ProfileName>().is_err());
    }
}
