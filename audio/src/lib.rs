//! Waveform handling for the unit encoder.
//!
//! This crate provides:
//!
//! - [`Waveform`]: mono f32 samples at a known sample rate
//! - [`load_wav`] / [`write_wav`]: WAV I/O with optional time windowing
//! - [`LengthBounds`] and [`edge_pad`]: length normalization applied before
//!   feature extraction
//!
//! # Example
//!
//! ```rust
//! use unitcoder_audio::{edge_pad, LengthBounds, Waveform};
//!
//! let wav = Waveform::new(vec![0.25; 100], 16000);
//! let bounds = LengthBounds::new(640, 2_000_000).unwrap();
//!
//! // Short input is right-padded with zeros up to the minimum.
//! let normalized = bounds.apply(wav.samples());
//! assert_eq!(normalized.len(), 640);
//!
//! // Frame-center alignment for a 400/320 analysis window.
//! let padded = edge_pad(&normalized, (400 - 320) / 2);
//! assert_eq!(padded.len(), 720);
//! ```

mod error;
mod normalize;
mod waveform;
mod wav;

pub use error::AudioError;
pub use normalize::{edge_pad, LengthBounds};
pub use waveform::{Waveform, DEFAULT_SAMPLE_RATE};
pub use wav::{load_wav, write_wav, TimeWindow};
