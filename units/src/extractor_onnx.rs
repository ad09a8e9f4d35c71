//! [`FeatureExtractor`] implementation using ONNX Runtime.

use std::sync::Mutex;

use ndarray::Array2;
use ort::session::Session;
use ort::value::Tensor;

use crate::extractor::{FeatureExtractor, OnnxConfig};
use crate::{FrameSequence, UnitsError};

/// Runs a pretrained speech model exported to ONNX.
///
/// The session is loaded once and reused for every call. Runs are
/// serialized through a mutex because a session is not re-entrant.
pub struct OnnxExtractor {
    session: Mutex<Session>,
    cfg: OnnxConfig,
    name: String,
}

impl OnnxExtractor {
    pub fn load(cfg: &OnnxConfig) -> Result<Self, UnitsError> {
        if cfg.layers.is_empty() {
            return Err(UnitsError::Config(format!(
                "{}: at least one layer output must be configured",
                cfg.model.display()
            )));
        }
        if !cfg.model.is_file() {
            return Err(UnitsError::Config(format!(
                "model file not found: {}",
                cfg.model.display()
            )));
        }

        let model_err = |e: ort::Error| {
            UnitsError::Model(format!("load {}: {e}", cfg.model.display()))
        };
        let session = Session::builder()
            .map_err(model_err)?
            .with_intra_threads(cfg.threads.max(1))
            .map_err(model_err)?
            .commit_from_file(&cfg.model)
            .map_err(model_err)?;

        let name = cfg
            .model
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("onnx")
            .to_string();

        Ok(Self {
            session: Mutex::new(session),
            cfg: cfg.clone(),
            name,
        })
    }
}

impl FeatureExtractor for OnnxExtractor {
    fn name(&self) -> &str {
        &self.name
    }

    fn dimension(&self) -> usize {
        self.cfg.dim
    }

    fn sample_rate(&self) -> u32 {
        self.cfg.sample_rate
    }

    fn has_layer(&self, layer: usize) -> bool {
        self.cfg.output_for(layer).is_some()
    }

    fn extract(&self, samples: &[f32], layer: usize) -> Result<FrameSequence, UnitsError> {
        let output = self
            .cfg
            .output_for(layer)
            .ok_or(UnitsError::UnknownLayer(layer))?;

        let batch = Array2::from_shape_vec((1, samples.len()), samples.to_vec())
            .map_err(|e| UnitsError::Model(format!("create input: {e}")))?;
        let input = Tensor::from_array(batch)
            .map_err(|e| UnitsError::Model(format!("create input tensor: {e}")))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| UnitsError::Model("session lock poisoned".into()))?;
        let outputs = session
            .run(ort::inputs![self.cfg.input.as_str() => input])
            .map_err(|e| UnitsError::Model(e.to_string()))?;

        let view = outputs[output]
            .try_extract_array::<f32>()
            .map_err(|e| UnitsError::Model(format!("extract {output}: {e}")))?;

        // Expect [1, T, D]; tolerate a squeezed [T, D].
        let shape = view.shape().to_vec();
        let (frames, dim) = match shape.as_slice() {
            [1, t, d] => (*t, *d),
            [t, d] => (*t, *d),
            other => {
                return Err(UnitsError::Model(format!(
                    "output {output} has shape {other:?}, expected [1, T, D]"
                )));
            }
        };
        if dim != self.cfg.dim {
            return Err(UnitsError::DimensionMismatch {
                expected: self.cfg.dim,
                got: dim,
            });
        }
        let flat: Vec<f32> = view.iter().copied().collect();
        debug_assert_eq!(flat.len(), frames * dim);
        FrameSequence::from_flat(dim, flat)
    }
}
