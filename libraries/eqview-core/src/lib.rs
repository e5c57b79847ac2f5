//! Eqview Core
//!
//! Shared domain types for the Eqview audio controller:
//! - Track descriptors supplied by the host UI
//! - Biquad coefficient sets and filter parameters
//! - Playback state
//! - Timestamp formatting for the callback surface
//!
//! This crate is dependency-light on purpose: the decoding, filtering and
//! playback machinery live in `eqview-audio` and `eqview-playback`.

pub mod time;
pub mod types;

pub use time::format_timestamp;
pub use types::{BiquadCoefficients, FilterKind, FilterParams, PlaybackState, TrackRef};
