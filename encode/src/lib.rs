//! Batch encoding of audio into discrete speech units.
//!
//! An [`Encoder`] loads the codebook and the feature extractor once,
//! checks that they fit together, creates the output directories and
//! exports the codebook. Its [`BatchDriver`] then walks the input files in
//! sorted order and runs each through the [`Pipeline`]:
//!
//! ```text
//! load wav -> sample-rate check -> length bounds -> edge pad
//!          -> extract (chunked) -> quantize -> one-hot -> write
//! ```
//!
//! Pipeline geometry comes from an [`ExtractorProfile`] (`hubert` or
//! `cpc`). Per-file failures are handled according to [`ErrorPolicy`];
//! sample-rate and dimension mismatches always stop the run.
//!
//! # Example
//!
//! ```rust,no_run
//! use unitcoder_artifact::ArtifactFormat;
//! use unitcoder_encode::{BatchOptions, Encoder, EncoderSettings, ExtractorProfile};
//! use unitcoder_units::ExtractorConfig;
//!
//! # fn main() -> Result<(), unitcoder_encode::EncodeError> {
//! let encoder = Encoder::open(EncoderSettings {
//!     codebook: "kmeans100.npy".into(),
//!     extractor: ExtractorConfig::default(),
//!     profile: ExtractorProfile::hubert().with_layers(Some(0), Some(1)),
//!     sample_rate: 16000,
//!     output: "out".into(),
//!     format: ArtifactFormat::Npy,
//! })?;
//! let report = encoder
//!     .driver(BatchOptions::default())
//!     .run_dir("wavs".as_ref(), "wav")?;
//! println!("{} files encoded", report.succeeded);
//! # Ok(())
//! # }
//! ```

mod batch;
mod discover;
mod encoder;
mod error;
mod pipeline;
mod profile;
mod report;
mod slice;

pub use batch::{BatchDriver, BatchOptions, ErrorPolicy, FileOutcome};
pub use discover::{discover, duplicate_stems, stem_of};
pub use encoder::{Encoder, EncoderSettings};
pub use error::EncodeError;
pub use pipeline::{EncodedFile, Pipeline};
pub use profile::{ExtractorProfile, ProfileName};
pub use report::{BatchReport, FileFailure};
pub use slice::{read_manifest, slice_manifest, ManifestEntry};
