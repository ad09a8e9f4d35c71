//! [`FeatureExtractor`] implementation backed by log mel filterbanks.

use crate::extractor::FeatureExtractor;
use crate::fbank::{cmvn, FbankConfig, FbankPlan};
use crate::{FrameSequence, UnitsError};

/// Layer 0: raw log mel energies.
pub const LAYER_LOG_MEL: usize = 0;

/// Layer 1: log mel energies with per-utterance CMVN.
pub const LAYER_CMVN: usize = 1;

/// Computes Kaldi-style filterbank frames in-process.
///
/// Useful as a model-free baseline and for tests: it needs no weights, is
/// fully deterministic and shares the analysis-window geometry of the neural
/// extractors (`frame_length` / `frame_shift`).
///
/// # Layers
///
/// - [`LAYER_LOG_MEL`]: log mel energies
/// - [`LAYER_CMVN`]: the same after mean/variance normalization per bin
pub struct FbankExtractor {
    plan: FbankPlan,
}

impl FbankExtractor {
    pub fn new(cfg: FbankConfig) -> Result<Self, UnitsError> {
        let plan = FbankPlan::new(cfg).ok_or_else(|| {
            UnitsError::Config(
                "fbank frame_length, frame_shift and num_mels must be positive".into(),
            )
        })?;
        Ok(Self { plan })
    }

    pub fn config(&self) -> &FbankConfig {
        self.plan.config()
    }
}

impl FeatureExtractor for FbankExtractor {
    fn name(&self) -> &str {
        "fbank"
    }

    fn dimension(&self) -> usize {
        self.plan.config().num_mels
    }

    fn sample_rate(&self) -> u32 {
        self.plan.config().sample_rate as u32
    }

    fn has_layer(&self, layer: usize) -> bool {
        layer == LAYER_LOG_MEL || layer == LAYER_CMVN
    }

    fn extract(&self, samples: &[f32], layer: usize) -> Result<FrameSequence, UnitsError> {
        if !self.has_layer(layer) {
            return Err(UnitsError::UnknownLayer(layer));
        }
        let mut rows = self
            .plan
            .compute(samples)
            .ok_or(UnitsError::AudioTooShort {
                min_samples: self.plan.config().frame_length,
                got_samples: samples.len(),
            })?;
        if layer == LAYER_CMVN {
            cmvn(&mut rows);
        }
        FrameSequence::from_rows(self.dimension(), &rows)
    }
}
