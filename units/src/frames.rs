use ndarray::{s, Array1, Array2, ArrayView1, Axis};

use crate::UnitsError;

/// T frame vectors of dimension D, stored row-major as a T x D matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSequence {
    data: Array2<f32>,
}

impl FrameSequence {
    pub fn new(data: Array2<f32>) -> Self {
        Self { data }
    }

    /// Builds a sequence from a flat row-major buffer.
    pub fn from_flat(dim: usize, values: Vec<f32>) -> Result<Self, UnitsError> {
        if dim == 0 || values.len() % dim != 0 {
            return Err(UnitsError::DimensionMismatch {
                expected: dim,
                got: values.len(),
            });
        }
        let rows = values.len() / dim;
        let data = Array2::from_shape_vec((rows, dim), values)
            .map_err(|e| UnitsError::Model(e.to_string()))?;
        Ok(Self { data })
    }

    /// Builds a sequence from per-frame vectors. Every row must have `dim`
    /// entries.
    pub fn from_rows(dim: usize, rows: &[Vec<f32>]) -> Result<Self, UnitsError> {
        let mut flat = Vec::with_capacity(rows.len() * dim);
        for row in rows {
            if row.len() != dim {
                return Err(UnitsError::DimensionMismatch {
                    expected: dim,
                    got: row.len(),
                });
            }
            flat.extend_from_slice(row);
        }
        Self::from_flat(dim, flat)
    }

    /// An empty sequence with zero frames.
    pub fn empty(dim: usize) -> Self {
        Self {
            data: Array2::zeros((0, dim)),
        }
    }

    /// Number of frames (T).
    pub fn len(&self) -> usize {
        self.data.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.data.nrows() == 0
    }

    /// Frame dimension (D).
    pub fn dim(&self) -> usize {
        self.data.ncols()
    }

    pub fn frame(&self, i: usize) -> ArrayView1<'_, f32> {
        self.data.row(i)
    }

    pub fn as_array(&self) -> &Array2<f32> {
        &self.data
    }

    pub fn into_array(self) -> Array2<f32> {
        self.data
    }

    /// Appends the frames of `other` after this sequence's frames.
    pub fn append(&mut self, other: &FrameSequence) -> Result<(), UnitsError> {
        if other.dim() != self.dim() {
            return Err(UnitsError::DimensionMismatch {
                expected: self.dim(),
                got: other.dim(),
            });
        }
        self.data
            .append(Axis(0), other.data.view())
            .map_err(|e| UnitsError::Model(e.to_string()))
    }

    /// Returns frames `[start, end)`.
    pub fn slice(&self, start: usize, end: usize) -> FrameSequence {
        Self {
            data: self.data.slice(s![start..end, ..]).to_owned(),
        }
    }
}

/// Codebook indices, one per frame of the quantized [`FrameSequence`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UnitSequence {
    units: Vec<usize>,
}

impl UnitSequence {
    pub fn new(units: Vec<usize>) -> Self {
        Self { units }
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.units
    }

    /// The sequence as the signed 64-bit array written to disk.
    pub fn to_array(&self) -> Array1<i64> {
        self.units.iter().map(|&u| u as i64).collect()
    }

    /// Expands the units into a T x K one-hot matrix.
    ///
    /// Row `i` holds a single 1 at column `units[i]`. Every unit must be
    /// below `k`.
    pub fn one_hot(&self, k: usize) -> Result<Array2<i64>, UnitsError> {
        let mut m = Array2::<i64>::zeros((self.units.len(), k));
        for (i, &u) in self.units.iter().enumerate() {
            if u >= k {
                return Err(UnitsError::DimensionMismatch { expected: k, got: u + 1 });
            }
            m[[i, u]] = 1;
        }
        Ok(m)
    }
}

impl From<Vec<usize>> for UnitSequence {
    fn from(units: Vec<usize>) -> Self {
        Self::new(units)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_flat_shape() {
        let seq = FrameSequence::from_flat(3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.dim(), 3);
        assert_eq!(seq.frame(1).to_vec(), vec![4.0, 5.0, 6.0]);
    }

    #[test]
    fn from_flat_rejects_ragged() {
        assert!(FrameSequence::from_flat(3, vec![1.0; 7]).is_err());
        assert!(FrameSequence::from_flat(0, vec![]).is_err());
    }

    #[test]
    fn from_rows_checks_dim() {
        let err = FrameSequence::from_rows(2, &[vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(matches!(err, UnitsError::DimensionMismatch { expected: 2, got: 1 }));
    }

    #[test]
    fn append_concatenates_frames() {
        let mut a = FrameSequence::from_flat(2, vec![1.0, 2.0]).unwrap();
        let b = FrameSequence::from_flat(2, vec![3.0, 4.0, 5.0, 6.0]).unwrap();
        a.append(&b).unwrap();
        assert_eq!(a.len(), 3);
        assert_eq!(a.frame(2).to_vec(), vec![5.0, 6.0]);

        let c = FrameSequence::empty(3);
        assert!(a.append(&c).is_err());
    }

    #[test]
    fn one_hot_rows() {
        let units = UnitSequence::new(vec![2, 0, 4, 2]);
        let m = units.one_hot(5).unwrap();
        assert_eq!(m.dim(), (4, 5));
        for (i, row) in m.rows().into_iter().enumerate() {
            assert_eq!(row.sum(), 1, "row {i} must hold exactly one 1");
            assert_eq!(row[units.as_slice()[i]], 1);
        }
    }

    #[test]
    fn one_hot_out_of_range() {
        let units = UnitSequence::new(vec![5]);
        assert!(units.one_hot(5).is_err());
    }

    #[test]
    fn one_hot_empty() {
        let m = UnitSequence::default().one_hot(50).unwrap();
        assert_eq!(m.dim(), (0, 50));
    }
}
