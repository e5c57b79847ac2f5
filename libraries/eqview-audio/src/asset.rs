//! Decoded audio assets

use std::time::Duration;

/// A fully decoded audio asset held in memory
///
/// Samples are interleaved stereo f32 in the [-1.0, 1.0] range; the loader
/// downmixes whatever channel layout the container carried. The asset is
/// never mutated after creation - the playback engine shares it with source
/// nodes behind an `Arc` and replaces the whole thing on track change.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAsset {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl DecodedAsset {
    /// Build an asset from interleaved stereo samples
    ///
    /// A trailing odd sample (half a frame) is dropped.
    pub fn from_interleaved(mut samples: Vec<f32>, sample_rate: u32) -> Self {
        if samples.len() % 2 != 0 {
            samples.pop();
        }
        Self {
            samples,
            sample_rate,
        }
    }

    /// Interleaved stereo samples (L, R, L, R, ...)
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of stereo frames
    pub fn frames(&self) -> usize {
        self.samples.len() / 2
    }

    /// Total duration of the asset
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frames() as f64 / f64::from(self.sample_rate))
    }

    /// Convert a position into an interleaved sample index, clamped to the
    /// end of the buffer and aligned to a frame boundary
    pub fn sample_index_at(&self, position: Duration) -> usize {
        if self.sample_rate == 0 {
            return 0;
        }
        let frame = (position.as_secs_f64() * f64::from(self.sample_rate)) as usize;
        (frame * 2).min(self.samples.len())
    }
}
