use ndarray::ArrayView1;

use crate::{Codebook, FrameSequence, UnitSequence, UnitsError};

/// Maps frame vectors to the index of their nearest codebook centroid.
///
/// # Algorithm
///
/// For every frame the squared Euclidean distance to every centroid is
/// computed in full (no approximate search) against the f64 centroids. Centroids
/// are scanned in index order and a candidate replaces the current best only
/// when strictly closer, so ties resolve to the lowest index. A frame whose
/// distances are all NaN maps to index 0.
///
/// Cost is O(T * K * D) per sequence.
pub struct Quantizer<'a> {
    codebook: &'a Codebook,
}

impl<'a> Quantizer<'a> {
    pub fn new(codebook: &'a Codebook) -> Self {
        Self { codebook }
    }

    pub fn codebook(&self) -> &Codebook {
        self.codebook
    }

    /// Quantizes every frame. The output has one unit per frame.
    pub fn quantize(&self, frames: &FrameSequence) -> Result<UnitSequence, UnitsError> {
        if frames.dim() != self.codebook.dim() {
            return Err(UnitsError::DimensionMismatch {
                expected: self.codebook.dim(),
                got: frames.dim(),
            });
        }
        let units = frames
            .as_array()
            .rows()
            .into_iter()
            .map(|frame| self.nearest_unchecked(frame))
            .collect();
        Ok(UnitSequence::new(units))
    }

    /// Returns the nearest centroid index for a single vector.
    pub fn nearest(&self, v: &[f32]) -> Result<usize, UnitsError> {
        if v.len() != self.codebook.dim() {
            return Err(UnitsError::DimensionMismatch {
                expected: self.codebook.dim(),
                got: v.len(),
            });
        }
        Ok(self.nearest_unchecked(ArrayView1::from(v)))
    }

    fn nearest_unchecked(&self, v: ArrayView1<'_, f32>) -> usize {
        let mut best_idx = 0usize;
        let mut best_dist = f64::INFINITY;
        for (i, c) in self.codebook.centroids().rows().into_iter().enumerate() {
            let d = squared_distance(v, c);
            if d < best_dist {
                best_dist = d;
                best_idx = i;
            }
        }
        best_idx
    }
}

fn squared_distance(a: ArrayView1<'_, f32>, b: ArrayView1<'_, f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let d = f64::from(x) - y;
            d * d
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn codebook() -> Codebook {
        Codebook::new(array![
            [0.0f32, 0.0],
            [1.0, 0.0],
            [0.0, 1.0],
            [1.0, 1.0],
        ])
        .unwrap()
    }

    #[test]
    fn one_unit_per_frame_in_range() {
        let cb = codebook();
        let q = Quantizer::new(&cb);
        let frames = FrameSequence::from_flat(
            2,
            vec![0.1, 0.1, 0.9, 0.2, -3.0, 7.0, 0.6, 0.7, 100.0, 100.0],
        )
        .unwrap();
        let units = q.quantize(&frames).unwrap();
        assert_eq!(units.len(), frames.len());
        assert!(units.as_slice().iter().all(|&u| u < cb.len()));
        assert_eq!(units.as_slice(), &[0, 1, 2, 3, 3]);
    }

    #[test]
    fn exact_centroid_maps_to_itself() {
        let cb = codebook();
        let q = Quantizer::new(&cb);
        for j in 0..cb.len() {
            let c: Vec<f32> = cb.centroid(j).iter().map(|&v| v as f32).collect();
            assert_eq!(q.nearest(&c).unwrap(), j);
        }
    }

    #[test]
    fn ties_resolve_to_lowest_index() {
        // (0.5, 0.5) is equidistant from all four corners.
        let cb = codebook();
        let q = Quantizer::new(&cb);
        assert_eq!(q.nearest(&[0.5, 0.5]).unwrap(), 0);
        // (1.0, 0.5) ties between 1 and 3.
        assert_eq!(q.nearest(&[1.0, 0.5]).unwrap(), 1);

        // Duplicate centroids: zero distance to both 1 and 2.
        let dup = Codebook::new(array![[5.0f32], [2.0], [2.0], [9.0]]).unwrap();
        let q = Quantizer::new(&dup);
        assert_eq!(q.nearest(&[2.0]).unwrap(), 1);
    }

    #[test]
    fn nan_frame_maps_to_zero() {
        let cb = codebook();
        let q = Quantizer::new(&cb);
        assert_eq!(q.nearest(&[f32::NAN, 0.0]).unwrap(), 0);
    }

    #[test]
    fn dimension_mismatch_is_fatal() {
        let cb = codebook();
        let q = Quantizer::new(&cb);
        let frames = FrameSequence::from_flat(3, vec![0.0; 6]).unwrap();
        let err = q.quantize(&frames).unwrap_err();
        assert!(matches!(err, UnitsError::DimensionMismatch { expected: 2, got: 3 }));
        assert!(err.is_fatal());
        assert!(q.nearest(&[0.0]).is_err());
    }

    #[test]
    fn empty_sequence() {
        let cb = codebook();
        let units = Quantizer::new(&cb).quantize(&FrameSequence::empty(2)).unwrap();
        assert!(units.is_empty());
    }
}
