//! WAV file I/O backed by `hound`.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::{AudioError, Waveform};

/// Selects a time range of a longer recording, in seconds.
///
/// Sample offsets are computed as `round(seconds * sample_rate)`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TimeWindow {
    /// Start of the window in seconds.
    pub offset: f64,
    /// Length of the window in seconds. `None` reads to the end.
    pub duration: Option<f64>,
}

impl TimeWindow {
    pub fn new(offset: f64, duration: Option<f64>) -> Self {
        Self { offset, duration }
    }

    fn validate(&self) -> Result<(), AudioError> {
        if !self.offset.is_finite() || self.offset < 0.0 {
            return Err(AudioError::InvalidWindow(format!(
                "offset must be a non-negative number, got {}",
                self.offset
            )));
        }
        if let Some(d) = self.duration {
            if !d.is_finite() || d < 0.0 {
                return Err(AudioError::InvalidWindow(format!(
                    "duration must be a non-negative number, got {d}"
                )));
            }
        }
        Ok(())
    }

    /// Returns `(start, count)` in sample frames for the given rate,
    /// clamped to `total` frames.
    fn frames(&self, sample_rate: u32, total: u32) -> (u32, u32) {
        let rate = sample_rate as f64;
        let start = ((self.offset * rate).round() as u64).min(total as u64) as u32;
        let remaining = total - start;
        let count = match self.duration {
            Some(d) => ((d * rate).round() as u64).min(remaining as u64) as u32,
            None => remaining,
        };
        (start, count)
    }
}

/// Loads a WAV file as a mono [`Waveform`].
///
/// Only the first channel of multi-channel files is kept. Integer PCM is
/// scaled by `2^(bits-1)` into [-1, 1); 32-bit float PCM is used verbatim.
/// The file's own sample rate is preserved; callers check it with
/// [`Waveform::ensure_sample_rate`].
///
/// Returns [`AudioError::Empty`] if the (windowed) result has no samples.
pub fn load_wav(path: &Path, window: Option<TimeWindow>) -> Result<Waveform, AudioError> {
    let wav_err = |source| AudioError::Wav {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = WavReader::open(path).map_err(wav_err)?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let (start, count) = match window {
        Some(w) => {
            w.validate()?;
            w.frames(spec.sample_rate, reader.duration())
        }
        None => (0, reader.duration()),
    };
    if start > 0 {
        reader.seek(start).map_err(|e| wav_err(hound::Error::IoError(e)))?;
    }
    let n_values = count as usize * channels;

    let samples: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, 32) => reader
            .samples::<f32>()
            .take(n_values)
            .step_by(channels)
            .collect::<Result<_, _>>()
            .map_err(wav_err)?,
        (SampleFormat::Int, bits @ 1..=32) => {
            let scale = (1u64 << (bits - 1)) as f32;
            reader
                .samples::<i32>()
                .take(n_values)
                .step_by(channels)
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()
                .map_err(wav_err)?
        }
        (SampleFormat::Float, bits) => {
            return Err(AudioError::UnsupportedFormat { bits, kind: "float" });
        }
        (SampleFormat::Int, bits) => {
            return Err(AudioError::UnsupportedFormat { bits, kind: "int" });
        }
    };

    if samples.is_empty() {
        return Err(AudioError::Empty {
            path: path.to_path_buf(),
        });
    }
    Ok(Waveform::new(samples, spec.sample_rate))
}

/// Writes a waveform as a mono 32-bit float WAV file.
pub fn write_wav(path: &Path, wav: &Waveform) -> Result<(), AudioError> {
    let wav_err = |source| AudioError::Wav {
        path: path.to_path_buf(),
        source,
    };

    let spec = WavSpec {
        channels: 1,
        sample_rate: wav.sample_rate(),
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(path, spec).map_err(wav_err)?;
    for &s in wav.samples() {
        writer.write_sample(s).map_err(wav_err)?;
    }
    writer.finalize().map_err(wav_err)?;
    Ok(())
}
