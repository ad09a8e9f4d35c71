use std::path::Path;

use ndarray::Array2;
use unitcoder_audio::{edge_pad, load_wav, Waveform};
use unitcoder_units::{Codebook, FeatureExtractor, FrameSequence, Quantizer, UnitSequence};

use crate::{EncodeError, ExtractorProfile};

/// Everything computed for one waveform.
#[derive(Debug, Clone)]
pub struct EncodedFile {
    pub units: UnitSequence,
    pub one_hot: Array2<i64>,
    pub features: FrameSequence,
    pub auxiliary: Option<FrameSequence>,
}

/// The per-file encoding path: sample-rate check, length bounds, edge
/// padding, extraction, quantization and one-hot expansion.
///
/// Holds borrowed references only; one pipeline can serve many threads.
#[derive(Clone, Copy)]
pub struct Pipeline<'a> {
    extractor: &'a dyn FeatureExtractor,
    codebook: &'a Codebook,
    profile: &'a ExtractorProfile,
    sample_rate: u32,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        extractor: &'a dyn FeatureExtractor,
        codebook: &'a Codebook,
        profile: &'a ExtractorProfile,
        sample_rate: u32,
    ) -> Self {
        Self {
            extractor,
            codebook,
            profile,
            sample_rate,
        }
    }

    pub fn profile(&self) -> &ExtractorProfile {
        self.profile
    }

    pub fn codebook(&self) -> &Codebook {
        self.codebook
    }

    pub fn encode_file(&self, path: &Path) -> Result<EncodedFile, EncodeError> {
        let wav = load_wav(path, None)?;
        self.encode_waveform(&wav)
    }

    pub fn encode_waveform(&self, wav: &Waveform) -> Result<EncodedFile, EncodeError> {
        let input = self.prepare(wav)?;

        let features = self.extract(&input, self.profile.primary_layer)?;
        let auxiliary = match self.profile.auxiliary_layer {
            Some(layer) => Some(self.extract(&input, layer)?),
            None => None,
        };

        let units = Quantizer::new(self.codebook).quantize(&features)?;
        let one_hot = units.one_hot(self.codebook.len())?;

        Ok(EncodedFile {
            units,
            one_hot,
            features,
            auxiliary,
        })
    }

    /// Returns the extractor input for `wav`: bounded and edge-padded.
    pub fn prepare(&self, wav: &Waveform) -> Result<Vec<f32>, EncodeError> {
        wav.ensure_sample_rate(self.sample_rate)?;
        let pad = self.profile.edge_pad();
        Ok(match &self.profile.bounds {
            Some(bounds) => edge_pad(&bounds.apply(wav.samples()), pad),
            None => edge_pad(wav.samples(), pad),
        })
    }

    /// Runs the extractor on `samples`, splitting into chunks when the
    /// profile has a chunk size.
    ///
    /// Full chunks are extracted one after another. The remainder is
    /// extracted from the last `chunk_size` samples of the input so it
    /// gets a full window of context, and only its trailing
    /// `remainder / stride` frames are kept.
    pub fn extract(&self, samples: &[f32], layer: usize) -> Result<FrameSequence, EncodeError> {
        let chunk = match self.profile.chunk_size {
            Some(c) if c > 0 && samples.len() > c => c,
            _ => return Ok(self.extractor.extract(samples, layer)?),
        };

        let mut out: Option<FrameSequence> = None;
        let mut start = 0;
        while start + chunk < samples.len() {
            let part = self.extractor.extract(&samples[start..start + chunk], layer)?;
            append(&mut out, &part)?;
            start += chunk;
        }

        let keep = (samples.len() - start) / self.profile.stride.max(1);
        if keep > 0 {
            let last = self
                .extractor
                .extract(&samples[samples.len() - chunk..], layer)?;
            let keep = keep.min(last.len());
            append(&mut out, &last.slice(last.len() - keep, last.len()))?;
        }

        Ok(out.unwrap_or_else(|| FrameSequence::empty(self.extractor.dimension())))
    }
}

fn append(acc: &mut Option<FrameSequence>, part: &FrameSequence) -> Result<(), EncodeError> {
    match acc {
        Some(seq) => seq.append(part)?,
        None => *acc = Some(part.clone()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use unitcoder_audio::AudioError;
    use unitcoder_units::UnitsError;

    use super::*;

    /// Emits one frame per `stride` samples; frame i holds [start_sample, layer].
    struct Recorder {
        stride: usize,
        calls: Mutex<Vec<(usize, usize)>>,
    }

    impl Recorder {
        fn new(stride: usize) -> Self {
            Self {
                stride,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl FeatureExtractor for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }

        fn dimension(&self) -> usize {
            2
        }

        fn extract(&self, samples: &[f32], layer: usize) -> Result<FrameSequence, UnitsError> {
            self.calls.lock().unwrap().push((samples.len(), layer));
            let rows: Vec<Vec<f32>> = (0..samples.len() / self.stride)
                .map(|i| vec![samples[i * self.stride], layer as f32])
                .collect();
            FrameSequence::from_rows(2, &rows)
        }
    }

    fn codebook() -> Codebook {
        Codebook::from_rows(vec![vec![0.0, 0.0], vec![10.0, 0.0], vec![0.0, 9.0]]).unwrap()
    }

    #[test]
    fn short_input_padded_to_minimum_then_edges() {
        let ext = Recorder::new(320);
        let cb = codebook();
        let profile = ExtractorProfile::hubert();
        let p = Pipeline::new(&ext, &cb, &profile, 16000);

        let out = p.encode_waveform(&Waveform::new(vec![0.5; 639], 16000)).unwrap();

        let calls = ext.calls.lock().unwrap().clone();
        assert_eq!(calls, vec![(720, 7), (720, 9)]);
        assert_eq!(out.units.len(), 2);
        assert!(out.auxiliary.is_some());
    }

    #[test]
    fn long_input_truncated() {
        let ext = Recorder::new(320);
        let cb = codebook();
        let mut profile = ExtractorProfile::hubert();
        profile.bounds = unitcoder_audio::LengthBounds::new(640, 1000).ok();
        let p = Pipeline::new(&ext, &cb, &profile, 16000);

        let prepared = p.prepare(&Waveform::new(vec![0.1; 5000], 16000)).unwrap();
        assert_eq!(prepared.len(), 1080);
        assert_eq!(prepared[0], 0.0);
        assert_eq!(prepared[40], 0.1);
    }

    #[test]
    fn sample_rate_mismatch() {
        let ext = Recorder::new(320);
        let cb = codebook();
        let profile = ExtractorProfile::hubert();
        let p = Pipeline::new(&ext, &cb, &profile, 16000);

        let err = p.encode_waveform(&Waveform::new(vec![0.0; 16000], 8000)).unwrap_err();
        assert!(matches!(
            err,
            EncodeError::Audio(AudioError::SampleRateMismatch { .. })
        ));
        assert!(err.is_fatal());
        assert!(ext.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn chunked_extraction_keeps_tail_frames() {
        let ext = Recorder::new(160);
        let cb = codebook();
        let profile = ExtractorProfile::cpc();
        let p = Pipeline::new(&ext, &cb, &profile, 16000);

        // Two full chunks plus 800 samples: 64 + 64 + 5 frames.
        let n = 2 * 10240 + 800;
        let samples: Vec<f32> = (0..n).map(|i| i as f32).collect();
        let frames = p.extract(&samples, 0).unwrap();
        assert_eq!(frames.len(), 133);

        let calls = ext.calls.lock().unwrap().clone();
        assert_eq!(calls, vec![(10240, 0), (10240, 0), (10240, 0)]);

        // Frames stay on the global hop grid across chunk borders.
        for t in 0..frames.len() {
            assert_eq!(frames.frame(t)[0], (t * 160) as f32);
        }
    }

    #[test]
    fn short_input_is_one_call() {
        let ext = Recorder::new(160);
        let cb = codebook();
        let profile = ExtractorProfile::cpc();
        let p = Pipeline::new(&ext, &cb, &profile, 16000);

        let frames = p.extract(&vec![0.0; 10240], 0).unwrap();
        assert_eq!(frames.len(), 64);
        assert_eq!(ext.calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn dimension_mismatch_is_fatal() {
        let ext = Recorder::new(320);
        let cb = Codebook::from_rows(vec![vec![0.0; 3]]).unwrap();
        let profile = ExtractorProfile::hubert();
        let p = Pipeline::new(&ext, &cb, &profile, 16000);

        let err = p.encode_waveform(&Waveform::new(vec![0.0; 16000], 16000)).unwrap_err();
        assert!(err.is_fatal());
    }
}
