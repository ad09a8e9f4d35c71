use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use unitcoder_audio::{load_wav, write_wav, TimeWindow};

use crate::EncodeError;

/// One utterance of a slicing manifest:
/// `[input_path, start_seconds, duration_seconds, output_path]`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ManifestEntry(pub String, pub f64, pub f64, pub String);

impl ManifestEntry {
    pub fn input(&self) -> &str {
        &self.0
    }

    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.1, Some(self.2))
    }

    pub fn output(&self) -> &str {
        &self.3
    }
}

pub fn read_manifest(path: &Path) -> Result<Vec<ManifestEntry>, EncodeError> {
    let manifest_err = |reason: String| EncodeError::Manifest {
        path: path.to_path_buf(),
        reason,
    };
    let data = fs::read(path).map_err(|e| manifest_err(e.to_string()))?;
    serde_json::from_slice(&data).map_err(|e| manifest_err(e.to_string()))
}

/// Cuts every manifest entry out of its source recording and writes it to
/// `output_root/<stem>.wav` as 32-bit float mono. Returns the number of
/// files written.
pub fn slice_manifest(
    manifest: &Path,
    input_root: &Path,
    output_root: &Path,
    sample_rate: u32,
) -> Result<usize, EncodeError> {
    let entries = read_manifest(manifest)?;
    fs::create_dir_all(output_root).map_err(|e| EncodeError::Manifest {
        path: output_root.to_path_buf(),
        reason: e.to_string(),
    })?;

    tracing::info!(
        manifest = %manifest.display(),
        entries = entries.len(),
        "slicing utterances"
    );

    for entry in &entries {
        let source = source_path(input_root, entry.input());
        if !source.is_file() {
            return Err(EncodeError::Manifest {
                path: manifest.to_path_buf(),
                reason: format!("{} does not exist", source.display()),
            });
        }
        let wav = load_wav(&source, Some(entry.window()))?;
        wav.ensure_sample_rate(sample_rate)?;

        let stem = Path::new(entry.output())
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let target = output_root.join(format!("{stem}.wav"));
        write_wav(&target, &wav)?;
        tracing::debug!(source = %source.display(), target = %target.display(), "sliced");
    }
    Ok(entries.len())
}

/// Source file for a manifest input: any extension is replaced by `.wav`.
fn source_path(root: &Path, input: &str) -> PathBuf {
    root.join(input).with_extension("wav")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_parse_from_arrays() {
        let json = r#"[["s01/s0101a", 1.5, 0.25, "s01_0101a_001"]]"#;
        let entries: Vec<ManifestEntry> = serde_json::from_str(json).unwrap();
        assert_eq!(entries[0].input(), "s01/s0101a");
        assert_eq!(entries[0].window(), TimeWindow::new(1.5, Some(0.25)));
        assert_eq!(entries[0].output(), "s01_0101a_001");
    }

    #[test]
    fn source_extension_becomes_wav() {
        let root = Path::new("/data");
        assert_eq!(source_path(root, "a/b"), PathBuf::from("/data/a/b.wav"));
        assert_eq!(source_path(root, "a/b.wav"), PathBuf::from("/data/a/b.wav"));
        assert_eq!(source_path(root, "a/b.flac"), PathBuf::from("/data/a/b.wav"));
    }
}
