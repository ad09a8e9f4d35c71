use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use ndarray::Array2;
use ndarray_npy::WriteNpyExt;
use tempfile::NamedTempFile;
use unitcoder_units::{Codebook, FrameSequence, UnitSequence};

use crate::layout::{ArtifactKind, CODEBOOK_FILE, OutputLayout};
use crate::{text, ArtifactError, ArtifactFormat};

/// Everything produced for one input file.
#[derive(Debug, Clone, Copy)]
pub struct ArtifactSet<'a> {
    pub stem: &'a str,
    pub units: &'a UnitSequence,
    pub one_hot: Option<&'a Array2<i64>>,
    pub features: &'a FrameSequence,
    pub auxiliary: Option<&'a FrameSequence>,
}

/// Writes artifact sets under an output root following an [`OutputLayout`].
///
/// Each set is written all-or-nothing: every artifact is staged into a
/// hidden temp file next to its target and only renamed into place after
/// all of them were written. The indices file is renamed last, so its
/// presence implies the rest of the set is present too.
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    root: PathBuf,
    layout: OutputLayout,
    format: ArtifactFormat,
}

impl ArtifactWriter {
    pub fn new(root: impl Into<PathBuf>, layout: OutputLayout, format: ArtifactFormat) -> Self {
        Self {
            root: root.into(),
            layout,
            format,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    pub fn format(&self) -> ArtifactFormat {
        self.format
    }

    /// Creates the output root and every artifact directory.
    pub fn prepare(&self) -> Result<(), ArtifactError> {
        fs::create_dir_all(&self.root).map_err(|e| ArtifactError::io(&self.root, e))?;
        for kind in self.layout.kinds() {
            if let Some(dir) = self.layout.dir(kind) {
                let dir = self.root.join(dir);
                fs::create_dir_all(&dir).map_err(|e| ArtifactError::io(&dir, e))?;
            }
        }
        Ok(())
    }

    /// Path of the `kind` artifact for `stem`, if the layout produces it.
    pub fn path_for(&self, kind: ArtifactKind, stem: &str) -> Option<PathBuf> {
        self.layout
            .path(&self.root, kind, stem, self.format.extension())
    }

    pub fn codebook_path(&self) -> PathBuf {
        self.root.join(CODEBOOK_FILE)
    }

    /// Writes the codebook as `embedding.npy` under the root, always npy and
    /// in the codebook's source element type.
    pub fn export_codebook(&self, codebook: &Codebook) -> Result<PathBuf, ArtifactError> {
        let target = self.codebook_path();
        let staged = stage(&self.root, CODEBOOK_FILE, |w| {
            codebook
                .write_npy(w)
                .map_err(|source| ArtifactError::WriteNpy {
                    path: target.clone(),
                    source,
                })
        })?;
        persist(staged, &target)?;
        tracing::debug!(
            path = %target.display(),
            k = codebook.len(),
            d = codebook.dim(),
            "codebook exported"
        );
        Ok(target)
    }

    /// Reports whether every artifact of `stem` already exists.
    pub fn is_complete(&self, stem: &str) -> bool {
        self.layout
            .kinds()
            .into_iter()
            .filter_map(|kind| self.path_for(kind, stem))
            .all(|p| p.is_file())
    }

    /// Writes one artifact set, replacing any previous artifacts of the stem.
    /// Returns the written paths, indices last.
    ///
    /// An existing indices file is removed before the first rename, so an
    /// overwrite interrupted midway leaves the stem incomplete.
    pub fn write(&self, set: &ArtifactSet<'_>) -> Result<Vec<PathBuf>, ArtifactError> {
        self.check_set(set)?;

        let mut staged = Vec::new();
        for kind in self.layout.kinds() {
            let Some(target) = self.path_for(kind, set.stem) else {
                continue;
            };
            let dir = target.parent().unwrap_or(&self.root).to_path_buf();
            fs::create_dir_all(&dir).map_err(|e| ArtifactError::io(&dir, e))?;
            let tmp = stage(&dir, set.stem, |w| self.encode(kind, set, &target, w))?;
            staged.push((tmp, target));
        }

        // A stale indices file would mark a half-replaced set as complete.
        if let Some(indices) = self.path_for(ArtifactKind::Indices, set.stem) {
            match fs::remove_file(&indices) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(ArtifactError::io(&indices, e)),
            }
        }

        let mut written = Vec::with_capacity(staged.len());
        for (tmp, target) in staged {
            persist(tmp, &target)?;
            written.push(target);
        }
        tracing::debug!(stem = set.stem, files = written.len(), "artifacts written");
        Ok(written)
    }

    fn check_set(&self, set: &ArtifactSet<'_>) -> Result<(), ArtifactError> {
        check_present(ArtifactKind::OneHot, self.layout.one_hot.is_some(), set.one_hot.is_some())?;
        check_present(
            ArtifactKind::Auxiliary,
            self.layout.auxiliary.is_some(),
            set.auxiliary.is_some(),
        )
    }

    fn encode<W: Write>(
        &self,
        kind: ArtifactKind,
        set: &ArtifactSet<'_>,
        target: &Path,
        w: &mut W,
    ) -> Result<(), ArtifactError> {
        let npy_err = |source| ArtifactError::WriteNpy {
            path: target.to_path_buf(),
            source,
        };
        let io_err = |e| ArtifactError::io(target, e);

        match (kind, self.format) {
            (ArtifactKind::Indices, ArtifactFormat::Npy) => {
                set.units.to_array().write_npy(w).map_err(npy_err)
            }
            (ArtifactKind::Indices, ArtifactFormat::Text) => {
                text::write_column(w, set.units.to_array().view()).map_err(io_err)
            }
            (ArtifactKind::OneHot, fmt) => {
                let Some(m) = set.one_hot else {
                    return Ok(());
                };
                match fmt {
                    ArtifactFormat::Npy => m.write_npy(w).map_err(npy_err),
                    ArtifactFormat::Text => text::write_int_rows(w, m.view()).map_err(io_err),
                }
            }
            (ArtifactKind::Features | ArtifactKind::Auxiliary, fmt) => {
                let frames = if kind == ArtifactKind::Features {
                    set.features
                } else {
                    match set.auxiliary {
                        Some(f) => f,
                        None => return Ok(()),
                    }
                };
                match fmt {
                    ArtifactFormat::Npy => frames.as_array().write_npy(w).map_err(npy_err),
                    ArtifactFormat::Text => {
                        text::write_float_rows(w, frames.as_array().view()).map_err(io_err)
                    }
                }
            }
        }
    }
}

fn check_present(kind: ArtifactKind, expected: bool, given: bool) -> Result<(), ArtifactError> {
    let reason = match (expected, given) {
        (true, false) => "layout expects it but none was given",
        (false, true) => "given but the layout has no directory for it",
        _ => return Ok(()),
    };
    Err(ArtifactError::LayoutMismatch {
        kind: kind.as_str(),
        reason: reason.to_string(),
    })
}

/// Writes into a hidden temp file inside `dir`.
fn stage<F>(dir: &Path, stem: &str, write: F) -> Result<NamedTempFile, ArtifactError>
where
    F: FnOnce(&mut BufWriter<&mut NamedTempFile>) -> Result<(), ArtifactError>,
{
    let mut tmp = tempfile::Builder::new()
        .prefix(&format!(".{stem}."))
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| ArtifactError::io(dir, e))?;
    {
        let mut w = BufWriter::new(&mut tmp);
        write(&mut w)?;
        w.flush().map_err(|e| ArtifactError::io(dir, e))?;
    }
    Ok(tmp)
}

fn persist(tmp: NamedTempFile, target: &Path) -> Result<(), ArtifactError> {
    tmp.persist(target)
        .map(|_| ())
        .map_err(|e| ArtifactError::io(target, e.error))
}
