//! YAML/JSON document loading.

use std::fs;
use std::io;
use std::path::Path;

use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to read file: {0}")]
    ReadFile(#[from] io::Error),
    #[error("failed to parse YAML: {0}")]
    ParseYaml(#[from] serde_yaml::Error),
    #[error("failed to parse JSON: {0}")]
    ParseJson(#[from] serde_json::Error),
    #[error("failed to parse file (tried YAML and JSON)")]
    ParseFailed,
}

/// Loads a YAML or JSON file into `T`.
pub fn load_document<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, DocumentError> {
    let data = fs::read(path.as_ref())?;
    parse_document(&data, path.as_ref())
}

/// Parses by file extension; unknown extensions try YAML, then JSON.
pub fn parse_document<T: DeserializeOwned>(
    data: &[u8],
    path: impl AsRef<Path>,
) -> Result<T, DocumentError> {
    let ext = path
        .as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match ext.as_deref() {
        Some("yaml") | Some("yml") => Ok(serde_yaml::from_slice(data)?),
        Some("json") => Ok(serde_json::from_slice(data)?),
        _ => {
            if let Ok(v) = serde_yaml::from_slice(data) {
                return Ok(v);
            }
            if let Ok(v) = serde_json::from_slice(data) {
                return Ok(v);
            }
            Err(DocumentError::ParseFailed)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serde::Deserialize;
    use tempfile::NamedTempFile;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(tag = "backend", rename_all = "lowercase")]
    enum Backend {
        Fbank { num_mels: usize },
        Onnx { model: String },
    }

    #[test]
    fn yaml_file() {
        let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
        writeln!(file, "backend: fbank\nnum_mels: 40").unwrap();
        let b: Backend = load_document(file.path()).unwrap();
        assert_eq!(b, Backend::Fbank { num_mels: 40 });
    }

    #[test]
    fn json_file() {
        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        writeln!(file, r#"{{"backend": "onnx", "model": "hubert.onnx"}}"#).unwrap();
        let b: Backend = load_document(file.path()).unwrap();
        assert_eq!(
            b,
            Backend::Onnx {
                model: "hubert.onnx".into()
            }
        );
    }

    #[test]
    fn unknown_extension_falls_back() {
        let b: Backend = parse_document(b"backend: fbank\nnum_mels: 80", "extractor.conf").unwrap();
        assert_eq!(b, Backend::Fbank { num_mels: 80 });
        let bad: Result<Backend, _> = parse_document(b"{{{{ not valid", "extractor.conf");
        assert!(matches!(bad, Err(DocumentError::ParseFailed)));
    }
}
