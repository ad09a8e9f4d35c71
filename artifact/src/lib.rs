//! Output artifacts of a unit-encoding run.
//!
//! For every input file three artifacts are written under parallel
//! directories of the output root (see [`OutputLayout`]):
//!
//! - `indices/<stem>`: the unit sequence, one index per frame
//! - `one_hot/<stem>`: the T x K one-hot matrix
//! - `<features>/<stem>`: the continuous frame features
//!
//! plus an optional auxiliary feature layer. The codebook is exported once
//! as `embedding.npy` at the root.
//!
//! # Formats
//!
//! [`ArtifactFormat::Text`] writes whitespace-delimited tables; integers
//! without decimals and floats with 16 fixed decimals.
//! [`ArtifactFormat::Npy`] writes `.npy` arrays: units and one-hot as
//! `int64`, features as `float32`.

mod error;
mod format;
mod layout;
mod reader;
pub mod text;
mod writer;

pub use error::ArtifactError;
pub use format::ArtifactFormat;
pub use layout::{ArtifactKind, OutputLayout, CODEBOOK_FILE};
pub use reader::{read_features, read_one_hot, read_units};
pub use writer::{ArtifactSet, ArtifactWriter};
