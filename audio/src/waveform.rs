use std::time::Duration;

use crate::AudioError;

/// Sample rate every extractor in this workspace expects.
pub const DEFAULT_SAMPLE_RATE: u32 = 16000;

/// Mono audio as f32 samples in [-1, 1] at a fixed sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl Waveform {
    /// Creates a waveform from raw samples.
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Creates `n` zero-valued samples.
    pub fn silence(n: usize, sample_rate: u32) -> Self {
        Self::new(vec![0.0; n], sample_rate)
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Returns the number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Returns the playback duration.
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.samples.len() as f64 / self.sample_rate as f64)
    }

    /// Fails unless the waveform was recorded at `expected` Hz.
    /// Resampling is never attempted.
    pub fn ensure_sample_rate(&self, expected: u32) -> Result<(), AudioError> {
        if self.sample_rate != expected {
            return Err(AudioError::SampleRateMismatch {
                expected,
                got: self.sample_rate,
            });
        }
        Ok(())
    }
}
