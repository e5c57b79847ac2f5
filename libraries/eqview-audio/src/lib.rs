//! Eqview Audio
//!
//! The signal side of the Eqview controller:
//! - Track loading: HTTP fetch plus Symphonia decode into an in-memory
//!   stereo sample buffer
//! - The coefficient calculator (filter parameters -> biquad coefficients)
//! - The filter cascade: an ordered chain of biquad sections with a
//!   bypass switch
//! - Analysis taps and the segment meter that feeds the visualizer
//!
//! Everything here is independent of playback state; the playback engine in
//! `eqview-playback` owns the graph and decides when these pieces run.

pub mod analysis;
pub mod asset;
pub mod cascade;
pub mod coeffs;
pub mod error;
pub mod loader;
pub mod meter;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use analysis::{AnalyserTap, SharedTap, DEFAULT_FFT_SIZE};
pub use asset::DecodedAsset;
pub use cascade::{BiquadStage, FilterCascade};
pub use coeffs::biquad_coefficients;
pub use error::{AudioError, Result};
pub use loader::TrackLoader;
pub use meter::{HslColor, MeterConfig, MeterFrame, MeterSegment, Reduction, SpectrumMeter};
