//! CLI support for unitcoder.
//!
//! Named configuration contexts, YAML/JSON document loading and result
//! output shared by the `unitcoder` binary.

pub mod config;
pub mod document;
pub mod output;

pub use config::{load_config, Config, Context};
pub use document::{load_document, parse_document, DocumentError};
pub use output::{Output, OutputFormat};
