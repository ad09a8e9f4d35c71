use std::collections::HashMap;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::EncodeError;

/// Finds every regular file under `root` whose extension is exactly
/// `extension`, sorted by full path.
///
/// Unreadable entries are logged and skipped.
pub fn discover(root: &Path, extension: &str) -> Result<Vec<PathBuf>, EncodeError> {
    if !root.is_dir() {
        let reason = if root.exists() {
            "not a directory"
        } else {
            "does not exist"
        };
        return Err(EncodeError::Discover {
            path: root.to_path_buf(),
            reason: reason.into(),
        });
    }

    let extension = extension.trim_start_matches('.');
    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        match entry {
            Ok(entry) => {
                if entry.file_type().is_file()
                    && entry.path().extension().and_then(|e| e.to_str()) == Some(extension)
                {
                    files.push(entry.into_path());
                }
            }
            Err(e) => tracing::warn!("skipping unreadable entry: {}", e),
        }
    }
    files.sort();
    tracing::debug!(root = %root.display(), files = files.len(), "discovered input files");
    Ok(files)
}

/// Output stem of an input file.
pub fn stem_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Returns every pair of inputs that map to the same output stem, in
/// discovery order.
pub fn duplicate_stems(files: &[PathBuf]) -> Vec<(String, PathBuf, PathBuf)> {
    let mut seen: HashMap<String, &PathBuf> = HashMap::new();
    let mut dups = Vec::new();
    for path in files {
        let stem = stem_of(path);
        match seen.get(&stem) {
            Some(first) => dups.push((stem, (*first).clone(), path.clone())),
            None => {
                seen.insert(stem, path);
            }
        }
    }
    dups
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn sorted_recursive_exact_extension() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("b/z.wav"));
        touch(&root.join("a.wav"));
        touch(&root.join("b/a.wav"));
        touch(&root.join("c.WAV"));
        touch(&root.join("d.wav.bak"));
        touch(&root.join("notes.txt"));
        fs::create_dir_all(root.join("dir.wav")).unwrap();

        let files = discover(root, "wav").unwrap();
        let rel: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            rel,
            vec![
                PathBuf::from("a.wav"),
                PathBuf::from("b/a.wav"),
                PathBuf::from("b/z.wav"),
            ]
        );
    }

    #[test]
    fn missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let err = discover(&dir.path().join("nope"), "wav").unwrap_err();
        assert!(matches!(err, EncodeError::Discover { .. }));

        let file = dir.path().join("f.wav");
        touch(&file);
        assert!(discover(&file, "wav").is_err());
    }

    #[test]
    fn finds_duplicates() {
        let files = vec![
            PathBuf::from("/in/a.wav"),
            PathBuf::from("/in/b/a.wav"),
            PathBuf::from("/in/c.wav"),
        ];
        let dups = duplicate_stems(&files);
        assert_eq!(dups.len(), 1);
        assert_eq!(dups[0].0, "a");
        assert_eq!(dups[0].2, PathBuf::from("/in/b/a.wav"));
    }
}
