//! Kaldi-style log mel filterbank features.
//!
//! - Povey window (hamming^0.85)
//! - Per-frame DC removal and pre-emphasis 0.97
//! - Radix-2 Cooley-Tukey FFT
//! - Triangular mel filterbank, natural log with an energy floor

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// Configures mel filterbank feature extraction.
///
/// The defaults use 25ms frames with a 10ms shift and 80 mel bins over
/// 20-7600 Hz at 16kHz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FbankConfig {
    /// Input sample rate in Hz (default: 16000).
    pub sample_rate: usize,
    /// Number of mel filterbank channels (default: 80).
    pub num_mels: usize,
    /// Frame length in samples (default: 400 = 25ms @ 16kHz).
    pub frame_length: usize,
    /// Frame shift in samples (default: 160 = 10ms @ 16kHz).
    pub frame_shift: usize,
    /// Pre-emphasis coefficient (default: 0.97).
    pub pre_emphasis: f64,
    /// Floor for log energy (default: 1e-10).
    pub energy_floor: f64,
    /// Low cutoff frequency for mel bins (default: 20 Hz).
    pub low_freq: f64,
    /// High cutoff frequency, non-positive = offset from Nyquist (default: -400).
    pub high_freq: f64,
    /// Remove DC offset per frame (default: true).
    pub remove_dc: bool,
    /// Use Povey window (hamming^0.85) instead of Hamming (default: true).
    pub povey_window: bool,
}

impl Default for FbankConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            num_mels: 80,
            frame_length: 400,  // 25ms @ 16kHz
            frame_shift: 160,   // 10ms @ 16kHz
            pre_emphasis: 0.97,
            energy_floor: 1e-10,
            low_freq: 20.0,
            high_freq: -400.0,  // Nyquist - 400 = 7600 Hz for 16kHz
            remove_dc: true,
            povey_window: true,
        }
    }
}

/// Pre-computed window and mel filters for one [`FbankConfig`].
///
/// Building the plan once and reusing it across utterances avoids
/// recomputing the filterbank on every call.
#[derive(Debug, Clone)]
pub struct FbankPlan {
    cfg: FbankConfig,
    fft_size: usize,
    window: Vec<f64>,
    filterbank: Vec<Vec<f64>>,
}

impl FbankPlan {
    /// Returns `None` if any of the frame length, frame shift or mel count
    /// is zero.
    pub fn new(cfg: FbankConfig) -> Option<Self> {
        if cfg.frame_shift == 0 || cfg.frame_length == 0 || cfg.num_mels == 0 {
            return None;
        }
        let fft_size = next_pow2(cfg.frame_length);
        let window = if cfg.povey_window {
            povey_window(cfg.frame_length)
        } else {
            hamming_window(cfg.frame_length)
        };
        let high_freq = if cfg.high_freq <= 0.0 {
            cfg.sample_rate as f64 / 2.0 + cfg.high_freq
        } else {
            cfg.high_freq
        };
        let filterbank =
            mel_filterbank(cfg.num_mels, fft_size, cfg.sample_rate, cfg.low_freq, high_freq);
        Some(Self {
            cfg,
            fft_size,
            window,
            filterbank,
        })
    }

    pub fn config(&self) -> &FbankConfig {
        &self.cfg
    }

    /// Number of frames produced for `n_samples` input samples.
    pub fn num_frames(&self, n_samples: usize) -> usize {
        if n_samples < self.cfg.frame_length {
            return 0;
        }
        (n_samples - self.cfg.frame_length) / self.cfg.frame_shift + 1
    }

    /// Computes `[num_frames][num_mels]` log mel energies.
    /// Returns `None` if the input is shorter than one frame.
    pub fn compute(&self, samples: &[f32]) -> Option<Vec<Vec<f32>>> {
        let num_frames = self.num_frames(samples.len());
        if num_frames == 0 {
            return None;
        }
        let frame_length = self.cfg.frame_length;
        let half_fft = self.fft_size / 2 + 1;
        let mut fft_buf = vec![(0.0f64, 0.0f64); self.fft_size];
        let mut frame_buf = vec![0.0f64; frame_length];
        let mut power_spec = vec![0.0f64; half_fft];

        let mut result = Vec::with_capacity(num_frames);
        for f in 0..num_frames {
            let offset = f * self.cfg.frame_shift;
            for (dst, &src) in frame_buf
                .iter_mut()
                .zip(&samples[offset..offset + frame_length])
            {
                *dst = src as f64;
            }

            if self.cfg.remove_dc {
                let mean = frame_buf.iter().sum::<f64>() / frame_length as f64;
                frame_buf.iter_mut().for_each(|v| *v -= mean);
            }

            // Pre-emphasis, applied after DC removal.
            let pe = self.cfg.pre_emphasis;
            if pe > 0.0 {
                for i in (1..frame_length).rev() {
                    frame_buf[i] -= pe * frame_buf[i - 1];
                }
                frame_buf[0] *= 1.0 - pe;
            }

            fft_buf.fill((0.0, 0.0));
            for ((dst, &x), &w) in fft_buf.iter_mut().zip(&frame_buf).zip(&self.window) {
                *dst = (x * w, 0.0);
            }
            fft(&mut fft_buf);

            for (p, &(re, im)) in power_spec.iter_mut().zip(&fft_buf) {
                *p = re * re + im * im;
            }

            let frame: Vec<f32> = self
                .filterbank
                .iter()
                .map(|filter| {
                    let energy: f64 = filter.iter().zip(&power_spec).map(|(w, p)| w * p).sum();
                    energy.max(self.cfg.energy_floor).ln() as f32
                })
                .collect();
            result.push(frame);
        }
        Some(result)
    }
}

/// Extracts log mel filterbank features from f32 samples.
///
/// Output: `[num_frames][num_mels]` with
/// `num_frames = (len - frame_length) / frame_shift + 1`.
///
/// Returns `None` if the audio is too short for a single frame or the
/// configuration has a zero size.
pub fn compute_fbank(samples: &[f32], cfg: &FbankConfig) -> Option<Vec<Vec<f32>>> {
    FbankPlan::new(cfg.clone())?.compute(samples)
}

/// CMVN: subtract mean and divide by std per mel bin.
/// Removes channel and environment effects.
pub fn cmvn(features: &mut [Vec<f32>]) {
    if features.is_empty() {
        return;
    }
    let num_mels = features[0].len();
    let t = features.len() as f64;

    for m in 0..num_mels {
        let mut sum: f64 = 0.0;
        for f in features.iter() {
            sum += f[m] as f64;
        }
        let mean = sum / t;

        let mut var_sum: f64 = 0.0;
        for f in features.iter() {
            let d = f[m] as f64 - mean;
            var_sum += d * d;
        }
        let mut std = (var_sum / t).sqrt();
        if std < 1e-10 {
            std = 1e-10;
        }

        for f in features.iter_mut() {
            f[m] = ((f[m] as f64 - mean) / std) as f32;
        }
    }
}

fn next_pow2(n: usize) -> usize {
    let mut p = 1;
    while p < n {
        p <<= 1;
    }
    p
}

fn hamming_window(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 0.54 - 0.46 * (2.0 * PI * i as f64 / (n - 1) as f64).cos())
        .collect()
}

/// Povey window (hamming^0.85) used by Kaldi.
fn povey_window(n: usize) -> Vec<f64> {
    hamming_window(n)
        .into_iter()
        .map(|w| w.powf(0.85))
        .collect()
}

fn hz_to_mel(hz: f64) -> f64 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

fn mel_to_hz(mel: f64) -> f64 {
    700.0 * (10.0_f64.powf(mel / 2595.0) - 1.0)
}

/// Computes triangular mel filterbank weights.
/// Returns `[num_mels][half_fft]` weights.
fn mel_filterbank(
    num_mels: usize,
    fft_size: usize,
    sample_rate: usize,
    low_freq: f64,
    high_freq: f64,
) -> Vec<Vec<f64>> {
    let half_fft = fft_size / 2 + 1;
    let mel_low = hz_to_mel(low_freq);
    let mel_high = hz_to_mel(high_freq);

    // Equally spaced mel points.
    let mel_points: Vec<f64> = (0..num_mels + 2)
        .map(|i| mel_low + i as f64 * (mel_high - mel_low) / (num_mels + 1) as f64)
        .collect();

    // Convert back to Hz and then to FFT bin indices.
    let bin_indices: Vec<usize> = mel_points
        .iter()
        .map(|&m| {
            let hz = mel_to_hz(m);
            let bin = (hz * fft_size as f64 / sample_rate as f64).floor() as isize;
            bin.max(0).min(half_fft as isize - 1) as usize
        })
        .collect();

    // Build triangular filters.
    let mut fb = Vec::with_capacity(num_mels);
    for m in 0..num_mels {
        let mut filter = vec![0.0f64; half_fft];
        let left = bin_indices[m];
        let center = bin_indices[m + 1];
        let right = bin_indices[m + 2];

        // Rising slope.
        if center > left {
            for k in left..=center {
                filter[k] = (k - left) as f64 / (center - left) as f64;
            }
        }
        // Falling slope.
        if right > center {
            for k in center..=right {
                filter[k] = (right - k) as f64 / (right - center) as f64;
            }
        }
        fb.push(filter);
    }
    fb
}

/// In-place Cooley-Tukey FFT.
/// Input length must be a power of 2.
/// Uses (real, imag) tuples instead of a complex number type.
fn fft(x: &mut [(f64, f64)]) {
    let n = x.len();
    if n <= 1 {
        return;
    }

    // Bit-reversal permutation.
    let mut j = 0usize;
    for i in 1..n {
        let mut bit = n >> 1;
        while j & bit != 0 {
            j ^= bit;
            bit >>= 1;
        }
        j ^= bit;
        if i < j {
            x.swap(i, j);
        }
    }

    // Butterfly operations.
    let mut size = 2;
    while size <= n {
        let half = size / 2;
        let angle = -2.0 * PI / size as f64;
        let wn = (angle.cos(), angle.sin());
        let mut start = 0;
        while start < n {
            let mut w = (1.0, 0.0);
            for k in 0..half {
                let u = x[start + k];
                // Complex multiply: w * x[start + k + half]
                let t_re = w.0 * x[start + k + half].0 - w.1 * x[start + k + half].1;
                let t_im = w.0 * x[start + k + half].1 + w.1 * x[start + k + half].0;
                x[start + k] = (u.0 + t_re, u.1 + t_im);
                x[start + k + half] = (u.0 - t_re, u.1 - t_im);
                // Complex multiply: w *= wn
                let new_w_re = w.0 * wn.0 - w.1 * wn.1;
                let new_w_im = w.0 * wn.1 + w.1 * wn.0;
                w = (new_w_re, new_w_im);
            }
            start += size;
        }
        size <<= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq_hz: f64, n: usize) -> Vec<f32> {
        (0..n)
            .map(|i| (0.5 * (freq_hz * 2.0 * PI * i as f64 / 16000.0).sin()) as f32)
            .collect()
    }

    #[test]
    fn fbank_config_default() {
        let cfg = FbankConfig::default();
        assert_eq!(cfg.sample_rate, 16000);
        assert_eq!(cfg.num_mels, 80);
        assert_eq!(cfg.frame_length, 400);
        assert_eq!(cfg.frame_shift, 160);
    }

    #[test]
    fn compute_fbank_too_short() {
        let cfg = FbankConfig::default();
        assert!(compute_fbank(&[0.0; 399], &cfg).is_none());
    }

    #[test]
    fn compute_fbank_silence() {
        let cfg = FbankConfig::default();
        // (800 - 400) / 160 + 1 = 3 frames.
        let features = compute_fbank(&[0.0; 800], &cfg).unwrap();
        assert_eq!(features.len(), 3);
        assert_eq!(features[0].len(), 80);
        // Silence hits the energy floor in every bin.
        let floor = (cfg.energy_floor.ln()) as f32;
        assert!(features.iter().flatten().all(|&v| v == floor));
    }

    #[test]
    fn compute_fbank_hubert_stride() {
        let cfg = FbankConfig {
            frame_shift: 320,
            ..Default::default()
        };
        // 1s of audio edge-padded by 40 on each side: (16080 - 400) / 320 + 1 = 50.
        let features = compute_fbank(&sine(440.0, 16080), &cfg).unwrap();
        assert_eq!(features.len(), 50);
    }

    #[test]
    fn compute_fbank_tone_varies() {
        let cfg = FbankConfig::default();
        let features = compute_fbank(&sine(440.0, 16000), &cfg).unwrap();
        assert_eq!(features.len(), 98);
        let first_frame = &features[0];
        let not_all_same = first_frame.windows(2).any(|w| (w[0] - w[1]).abs() > 0.01);
        assert!(not_all_same, "tone should produce varied mel energies");
    }

    #[test]
    fn cmvn_normalizes() {
        let mut features = vec![
            vec![1.0f32, 2.0, 3.0],
            vec![3.0, 4.0, 5.0],
            vec![5.0, 6.0, 7.0],
        ];
        cmvn(&mut features);

        for m in 0..3 {
            let vals: Vec<f64> = features.iter().map(|f| f[m] as f64).collect();
            let mean: f64 = vals.iter().sum::<f64>() / vals.len() as f64;
            assert!(mean.abs() < 1e-5, "mean should be ~0, got {mean}");
        }
    }

    #[test]
    fn fft_simple() {
        // FFT of [1,0,0,0] is [1,1,1,1].
        let mut buf = vec![(1.0, 0.0), (0.0, 0.0), (0.0, 0.0), (0.0, 0.0)];
        fft(&mut buf);
        for (re, im) in &buf {
            assert!((re - 1.0).abs() < 1e-10, "real should be 1, got {re}");
            assert!(im.abs() < 1e-10, "imag should be 0, got {im}");
        }
    }

    #[test]
    fn fft_parseval() {
        let n = 8;
        let mut buf: Vec<(f64, f64)> = (0..n)
            .map(|i| ((2.0 * PI * i as f64 / n as f64).sin(), 0.0))
            .collect();

        let time_energy: f64 = buf.iter().map(|(r, im)| r * r + im * im).sum();
        fft(&mut buf);
        let freq_energy: f64 = buf.iter().map(|(r, im)| r * r + im * im).sum();

        assert!(
            (time_energy * n as f64 - freq_energy).abs() < 1e-8,
            "Parseval violated: {} vs {}",
            time_energy * n as f64,
            freq_energy
        );
    }

    #[test]
    fn mel_hz_roundtrip() {
        for &hz in &[0.0, 100.0, 440.0, 1000.0, 8000.0] {
            let back = mel_to_hz(hz_to_mel(hz));
            assert!((hz - back).abs() < 1e-6, "roundtrip failed for {hz}: got {back}");
        }
    }
}
