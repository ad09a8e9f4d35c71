use std::borrow::Cow;

use crate::AudioError;

/// Minimum and maximum sample counts enforced before feature extraction.
///
/// - longer than `max_samples`: truncated to the first `max_samples`
/// - shorter than `min_samples`: right-padded with zeros to `min_samples`
/// - otherwise: passed through unchanged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthBounds {
    min_samples: usize,
    max_samples: usize,
}

impl LengthBounds {
    /// Creates bounds. Fails if `min_samples > max_samples` or
    /// `max_samples` is zero.
    pub fn new(min_samples: usize, max_samples: usize) -> Result<Self, AudioError> {
        if min_samples > max_samples || max_samples == 0 {
            return Err(AudioError::InvalidBounds {
                min: min_samples,
                max: max_samples,
            });
        }
        Ok(Self {
            min_samples,
            max_samples,
        })
    }

    pub fn min_samples(&self) -> usize {
        self.min_samples
    }

    pub fn max_samples(&self) -> usize {
        self.max_samples
    }

    /// Applies the bounds. Borrows the input when no change is needed.
    pub fn apply<'a>(&self, samples: &'a [f32]) -> Cow<'a, [f32]> {
        let n = samples.len();
        if n > self.max_samples {
            Cow::Borrowed(&samples[..self.max_samples])
        } else if n < self.min_samples {
            let mut padded = Vec::with_capacity(self.min_samples);
            padded.extend_from_slice(samples);
            padded.resize(self.min_samples, 0.0);
            Cow::Owned(padded)
        } else {
            Cow::Borrowed(samples)
        }
    }
}

/// Adds `pad` zero samples to both ends.
///
/// Extractors with an analysis window wider than their stride use
/// `(window - stride) / 2` so that frame centers line up with the stride grid.
pub fn edge_pad(samples: &[f32], pad: usize) -> Vec<f32> {
    let mut out = Vec::with_capacity(samples.len() + 2 * pad);
    out.resize(pad, 0.0);
    out.extend_from_slice(samples);
    out.resize(samples.len() + 2 * pad, 0.0);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize) -> Vec<f32> {
        (0..n).map(|i| i as f32 + 1.0).collect()
    }

    #[test]
    fn short_input_padded_to_min() {
        let bounds = LengthBounds::new(640, 2_000_000).unwrap();
        for len in [1, 100, 639] {
            let input = ramp(len);
            let out = bounds.apply(&input);
            assert_eq!(out.len(), 640);
            assert_eq!(&out[..len], input.as_slice(), "original samples are a prefix");
            assert!(out[len..].iter().all(|&s| s == 0.0), "tail must be zeros");
        }
    }

    #[test]
    fn long_input_truncated_to_max() {
        let bounds = LengthBounds::new(4, 10).unwrap();
        let input = ramp(25);
        let out = bounds.apply(&input);
        assert_eq!(out.len(), 10);
        assert_eq!(&out[..], &input[..10]);
    }

    #[test]
    fn in_range_unchanged() {
        let bounds = LengthBounds::new(4, 10).unwrap();
        for len in [4, 7, 10] {
            let input = ramp(len);
            let out = bounds.apply(&input);
            assert!(matches!(out, Cow::Borrowed(_)));
            assert_eq!(&out[..], input.as_slice());
        }
    }

    #[test]
    fn invalid_bounds() {
        assert!(LengthBounds::new(10, 4).is_err());
        let err = LengthBounds::new(0, 0).unwrap_err();
        assert_eq!(err.to_string(), "invalid length bounds: min 0, max 0");
        assert!(LengthBounds::new(0, 1).is_ok());
    }

    #[test]
    fn edge_pad_both_sides() {
        let out = edge_pad(&[1.0, 2.0], 3);
        assert_eq!(out, vec![0.0, 0.0, 0.0, 1.0, 2.0, 0.0, 0.0, 0.0]);
        assert_eq!(edge_pad(&[1.0], 0), vec![1.0]);
    }

    #[test]
    fn hubert_geometry_pad() {
        let padded = edge_pad(&vec![0.5; 16000], (400 - 320) / 2);
        assert_eq!(padded.len(), 16080);
        assert_eq!(padded[39], 0.0);
        assert_eq!(padded[40], 0.5);
        assert_eq!(padded[16039], 0.5);
        assert_eq!(padded[16040], 0.0);
    }
}
