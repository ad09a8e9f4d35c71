use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::extractor_fbank::FbankExtractor;
use crate::fbank::FbankConfig;
use crate::{FrameSequence, UnitsError};

/// Produces frame-level feature vectors from a waveform.
///
/// The input is mono f32 audio at [`FeatureExtractor::sample_rate`] that has
/// already been length-normalized and edge-padded. Implementations add the
/// batch dimension their runtime needs. The output holds one
/// [`FeatureExtractor::dimension`]-wide vector per analysis frame.
///
/// `layer` selects an internal layer or output of the model. Requesting a
/// layer the model does not expose returns [`UnitsError::UnknownLayer`].
///
/// # Thread Safety
///
/// Implementations must be safe for concurrent use.
pub trait FeatureExtractor: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Returns the dimensionality of every frame vector.
    fn dimension(&self) -> usize;

    /// Expected input sample rate in Hz.
    fn sample_rate(&self) -> u32 {
        16000
    }

    /// Reports whether `layer` can be requested from [`FeatureExtractor::extract`].
    fn has_layer(&self, _layer: usize) -> bool {
        true
    }

    /// Computes the frame sequence of `samples` at `layer`.
    fn extract(&self, samples: &[f32], layer: usize) -> Result<FrameSequence, UnitsError>;
}

/// Selects and configures an extractor backend.
///
/// Serialized with a `backend` tag, e.g. in YAML:
///
/// ```yaml
/// backend: onnx
/// model: /models/hubert_base.onnx
/// dim: 768
/// input: waveform
/// layers:
///   - { index: 7, output: layer7 }
///   - { index: 9, output: layer9 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum ExtractorConfig {
    /// Log mel filterbank features computed in-process.
    Fbank(FbankConfig),
    /// A pretrained network exported to ONNX. Requires the `onnx` feature.
    Onnx(OnnxConfig),
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self::Fbank(FbankConfig::default())
    }
}

/// Configuration for an ONNX feature extractor.
///
/// The model must accept a `[1, L]` float32 waveform and expose each usable
/// layer as a `[1, T, D]` float32 output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnnxConfig {
    /// Path to the `.onnx` file.
    pub model: PathBuf,
    /// Frame dimension D of every output.
    pub dim: usize,
    /// Input tensor name (default: "waveform").
    #[serde(default = "default_input_name")]
    pub input: String,
    /// Output tensors exposed as selectable layers.
    pub layers: Vec<OnnxLayer>,
    /// Expected input sample rate (default: 16000).
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    /// ONNX Runtime intra-op threads (default: 4).
    #[serde(default = "default_threads")]
    pub threads: usize,
}

/// Binds a layer index to a named model output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnnxLayer {
    pub index: usize,
    pub output: String,
}

impl OnnxConfig {
    /// Returns the output tensor name for `layer`.
    pub fn output_for(&self, layer: usize) -> Option<&str> {
        self.layers
            .iter()
            .find(|l| l.index == layer)
            .map(|l| l.output.as_str())
    }
}

fn default_input_name() -> String {
    "waveform".to_string()
}

fn default_sample_rate() -> u32 {
    16000
}

fn default_threads() -> usize {
    4
}

/// Constructs the extractor described by `cfg`.
///
/// Loading is the only step that touches the filesystem; the returned
/// extractor performs no I/O.
pub fn load_extractor(cfg: &ExtractorConfig) -> Result<Box<dyn FeatureExtractor>, UnitsError> {
    match cfg {
        ExtractorConfig::Fbank(fbank) => Ok(Box::new(FbankExtractor::new(fbank.clone())?)),
        #[cfg(feature = "onnx")]
        ExtractorConfig::Onnx(onnx) => Ok(Box::new(crate::extractor_onnx::OnnxExtractor::load(
            onnx,
        )?)),
        #[cfg(not(feature = "onnx"))]
        ExtractorConfig::Onnx(onnx) => Err(UnitsError::Config(format!(
            "ONNX extractor {} requires the `onnx` feature; rebuild with --features onnx",
            onnx.model.display()
        ))),
    }
}
