use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use ndarray::{Array2, ArrayView1};
use ndarray_npy::{read_npy, WriteNpyError, WriteNpyExt};

use crate::UnitsError;

/// Element type of the array a codebook was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Precision {
    #[default]
    F32,
    F64,
}

/// An immutable set of K centroid vectors of dimension D.
///
/// Loaded once per run and shared read-only by every quantization call.
/// Centroids are held as f64; the source element type is remembered so the
/// codebook is exported with the same dtype and values it was loaded with.
///
/// # Persisted formats
///
/// - `.npy`: a K x D float32 or float64 array
/// - `.json`: `{"centroids": [[...], ...]}`, the same layout the k-means
///   training scripts dump for inspection (read as float64)
#[derive(Debug, Clone, PartialEq)]
pub struct Codebook {
    centroids: Array2<f64>,
    precision: Precision,
}

/// JSON format for persisted centroid matrices.
#[derive(serde::Deserialize)]
struct CentroidsFile {
    centroids: Vec<Vec<f64>>,
}

impl Codebook {
    /// Creates a float32 codebook from a K x D matrix. K and D must be
    /// positive.
    pub fn new(centroids: Array2<f32>) -> Result<Self, UnitsError> {
        Self::with_precision(centroids.mapv(f64::from), Precision::F32)
    }

    /// Creates a float64 codebook from a K x D matrix.
    pub fn from_f64(centroids: Array2<f64>) -> Result<Self, UnitsError> {
        Self::with_precision(centroids, Precision::F64)
    }

    fn with_precision(centroids: Array2<f64>, precision: Precision) -> Result<Self, UnitsError> {
        let (k, d) = centroids.dim();
        if k == 0 || d == 0 {
            return Err(UnitsError::Codebook {
                path: Default::default(),
                reason: format!("codebook must be non-empty, got shape {k}x{d}"),
            });
        }
        Ok(Self {
            centroids,
            precision,
        })
    }

    /// Creates a float32 codebook from centroid rows.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self, UnitsError> {
        let rows = rows
            .into_iter()
            .map(|r| r.into_iter().map(f64::from).collect())
            .collect();
        let centroids = stack_rows(rows)?;
        Self::with_precision(centroids, Precision::F32)
    }

    /// Loads a codebook from a `.npy` or `.json` file.
    pub fn load(path: &Path) -> Result<Self, UnitsError> {
        let codebook_err = |reason: String| UnitsError::Codebook {
            path: path.to_path_buf(),
            reason,
        };

        if !path.is_file() {
            return Err(codebook_err("file not found".into()));
        }

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        let loaded = match ext.as_deref() {
            Some("json") => {
                let data = std::fs::read(path).map_err(|e| codebook_err(e.to_string()))?;
                let file: CentroidsFile =
                    serde_json::from_slice(&data).map_err(|e| codebook_err(e.to_string()))?;
                stack_rows(file.centroids).and_then(Self::from_f64)
            }
            _ => match read_npy::<_, Array2<f64>>(path) {
                Ok(c) => Self::from_f64(c),
                Err(f64_err) => read_npy::<_, Array2<f32>>(path)
                    .map_err(|_| codebook_err(f64_err.to_string()))
                    .and_then(Self::new),
            },
        };

        loaded.map_err(|e| match e {
            UnitsError::Codebook { reason, .. } => codebook_err(reason),
            other => other,
        })
    }

    /// Writes the centroids as `.npy` in the element type they were loaded
    /// with.
    pub fn write_npy<W: Write>(&self, writer: W) -> Result<(), WriteNpyError> {
        match self.precision {
            Precision::F64 => self.centroids.write_npy(writer),
            Precision::F32 => self.centroids.mapv(|v| v as f32).write_npy(writer),
        }
    }

    /// Writes the centroids verbatim as a K x D `.npy` file.
    pub fn export(&self, path: &Path) -> Result<(), UnitsError> {
        let export_err = |reason: String| UnitsError::Export {
            path: path.to_path_buf(),
            reason,
        };
        let file = File::create(path).map_err(|e| export_err(e.to_string()))?;
        let mut w = BufWriter::new(file);
        self.write_npy(&mut w)
            .map_err(|e| export_err(e.to_string()))?;
        w.flush().map_err(|e| export_err(e.to_string()))
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// Number of centroids (K).
    pub fn len(&self) -> usize {
        self.centroids.nrows()
    }

    /// Always false: constructors reject empty codebooks.
    pub fn is_empty(&self) -> bool {
        self.centroids.nrows() == 0
    }

    /// Centroid dimension (D).
    pub fn dim(&self) -> usize {
        self.centroids.ncols()
    }

    pub fn centroid(&self, i: usize) -> ArrayView1<'_, f64> {
        self.centroids.row(i)
    }

    pub fn centroids(&self) -> &Array2<f64> {
        &self.centroids
    }
}

fn stack_rows(rows: Vec<Vec<f64>>) -> Result<Array2<f64>, UnitsError> {
    let codebook_err = |reason: String| UnitsError::Codebook {
        path: Default::default(),
        reason,
    };
    let d = rows.first().map(|r| r.len()).unwrap_or(0);
    let k = rows.len();
    let mut flat = Vec::with_capacity(k * d);
    for (i, row) in rows.into_iter().enumerate() {
        if row.len() != d {
            return Err(codebook_err(format!(
                "centroid {i} has dimension {}, expected {d}",
                row.len()
            )));
        }
        flat.extend(row);
    }
    Array2::from_shape_vec((k, d), flat).map_err(|e| codebook_err(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use ndarray_npy::write_npy;

    #[test]
    fn rejects_empty() {
        assert!(Codebook::new(Array2::zeros((0, 4))).is_err());
        assert!(Codebook::new(Array2::zeros((4, 0))).is_err());
        assert!(Codebook::from_rows(vec![]).is_err());
    }

    #[test]
    fn from_rows_ragged() {
        let err = Codebook::from_rows(vec![vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(err.to_string().contains("centroid 1"));
    }

    #[test]
    fn load_npy_f32_and_export_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("codebook.npy");
        let centroids = array![[0.0f32, 1.0, 2.0], [3.0, 4.0, 5.0]];
        write_npy(&src, &centroids).unwrap();

        let cb = Codebook::load(&src).unwrap();
        assert_eq!(cb.len(), 2);
        assert_eq!(cb.dim(), 3);
        assert_eq!(cb.precision(), Precision::F32);

        let out = dir.path().join("embedding.npy");
        cb.export(&out).unwrap();
        let back: Array2<f32> = read_npy(&out).unwrap();
        assert_eq!(back, centroids);
        // Export is byte-identical to a plain npy write of the same array.
        assert_eq!(std::fs::read(&src).unwrap(), std::fs::read(&out).unwrap());
    }

    #[test]
    fn load_npy_f64_keeps_dtype_and_values() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("kmeans.npy");
        let centroids = array![[0.1f64, 0.2], [1.0 / 3.0, 2.0]];
        write_npy(&src, &centroids).unwrap();

        let cb = Codebook::load(&src).unwrap();
        assert_eq!(cb.precision(), Precision::F64);
        assert_eq!(cb.centroids(), &centroids);

        let out = dir.path().join("embedding.npy");
        cb.export(&out).unwrap();
        let back: Array2<f64> = read_npy(&out).unwrap();
        assert_eq!(back[[0, 0]], 0.1);
        assert_eq!(std::fs::read(&src).unwrap(), std::fs::read(&out).unwrap());
    }

    #[test]
    fn load_json() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("codebook.json");
        std::fs::write(&src, r#"{"centroids": [[1, 0], [0, 1], [1, 1]]}"#).unwrap();

        let cb = Codebook::load(&src).unwrap();
        assert_eq!(cb.len(), 3);
        assert_eq!(cb.centroid(2).to_vec(), vec![1.0, 1.0]);
    }

    #[test]
    fn load_missing_reports_path() {
        let err = Codebook::load(Path::new("/nope/codebook.npy")).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("/nope/codebook.npy"), "{msg}");
        assert!(msg.contains("not found"), "{msg}");
    }
}
