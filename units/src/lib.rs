//! Frame features, codebooks and nearest-centroid quantization.
//!
//! # Architecture
//!
//! Encoding one utterance runs three stages:
//!
//! 1. [`FeatureExtractor::extract`]: f32 waveform -> [`FrameSequence`] (T x D)
//! 2. [`Quantizer::quantize`]: frames -> [`UnitSequence`] of codebook indices
//! 3. [`UnitSequence::one_hot`]: units -> T x K one-hot matrix
//!
//! The [`Codebook`] is loaded once and borrowed by every quantizer call.
//!
//! # Extractor Backends
//!
//! Extractors are chosen at runtime through [`ExtractorConfig`] and
//! [`load_extractor`]:
//!
//! - `fbank`: Kaldi-style log mel filterbanks, no model weights needed
//! - `onnx`: a pretrained network run by ONNX Runtime (cargo feature `onnx`)

mod codebook;
mod error;
mod extractor;
mod extractor_fbank;
#[cfg(feature = "onnx")]
mod extractor_onnx;
pub mod fbank;
mod frames;
mod quantizer;

pub use codebook::{Codebook, Precision};
pub use error::UnitsError;
pub use extractor::{load_extractor, ExtractorConfig, FeatureExtractor, OnnxConfig, OnnxLayer};
pub use extractor_fbank::{FbankExtractor, LAYER_CMVN, LAYER_LOG_MEL};
#[cfg(feature = "onnx")]
pub use extractor_onnx::OnnxExtractor;
pub use fbank::{cmvn, compute_fbank, FbankConfig, FbankPlan};
pub use frames::{FrameSequence, UnitSequence};
pub use quantizer::Quantizer;
