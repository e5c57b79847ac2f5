//! Core types shared between the audio and playback crates

use serde::{Deserialize, Serialize};

/// Track descriptor supplied by the host UI
///
/// Immutable; one per user track selection. The controller only ever reads
/// `src`, the rest is display metadata carried for the UI's convenience.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRef {
    /// URL of the audio asset
    pub src: String,

    /// Artist name
    pub artist: String,

    /// Track title
    pub title: String,

    /// URL of the cover image
    pub cover: String,
}

/// Coefficients for a single biquad filter section
///
/// `a0`, `a1`, `a2` are the feedforward coefficients and `b1`, `b2` the
/// feedback coefficients, matching the convention of the graph library the
/// demo UI uses (note: the opposite letter assignment from the RBJ cookbook).
///
/// Difference equation, with `x` the input and `y` the output stream:
///
/// ```text
/// y[n] = a0*x[n] + a1*x[n-1] + a2*x[n-2] - b1*y[n-1] - b2*y[n-2]
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BiquadCoefficients {
    /// Feedforward coefficient applied to `x[n]`
    pub a0: f32,
    /// Feedforward coefficient applied to `x[n-1]`
    pub a1: f32,
    /// Feedforward coefficient applied to `x[n-2]`
    pub a2: f32,
    /// Feedback coefficient applied to `y[n-1]`
    pub b1: f32,
    /// Feedback coefficient applied to `y[n-2]`
    pub b2: f32,
}

impl BiquadCoefficients {
    /// Pass-through section: output equals input
    pub const IDENTITY: Self = Self {
        a0: 1.0,
        a1: 0.0,
        a2: 0.0,
        b1: 0.0,
        b2: 0.0,
    };
}

impl Default for BiquadCoefficients {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Filter shape of one equalizer band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterKind {
    /// Second-order highpass: attenuates below the corner frequency
    Highpass,

    /// Peaking: boosts/cuts around the center frequency with Q bandwidth
    Peak,

    /// Low shelf: boosts/cuts below the corner frequency
    LowShelf,

    /// High shelf: boosts/cuts above the corner frequency
    HighShelf,
}

/// One equalizer band as the UI edits it
///
/// A pure parameter snapshot; the coefficient calculator in `eqview-audio`
/// turns it into a [`BiquadCoefficients`] set for a given sample rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterParams {
    /// Filter shape
    pub kind: FilterKind,

    /// Center/corner frequency in Hz
    pub freq: f32,

    /// Gain in dB (ignored by the highpass shape)
    pub gain: f32,

    /// Q factor, controls bandwidth/slope
    pub q: f32,
}

/// Playback state of the audio controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    /// No processing graph yet (nothing loaded since creation or cleanup)
    Idle,

    /// A track load is in flight
    Loading,

    /// A decoded track is present, playback not yet started
    Ready,

    /// Currently playing
    Playing,

    /// Paused mid-track (or at the end of the track)
    Paused,

    /// Explicitly stopped; position reset to zero
    Stopped,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_coefficients_are_default() {
        let c = BiquadCoefficients::default();
        assert_eq!(c, BiquadCoefficients::IDENTITY);
        assert_eq!(c.a0, 1.0);
        assert_eq!(c.b1, 0.0);
    }

    #[test]
    fn track_ref_round_trips_through_serde() {
        let track = TrackRef {
            src: "https://example.com/track.aac".to_string(),
            artist: "BalloonPlanet".to_string(),
            title: "Cool My Bass".to_string(),
            cover: "https://example.com/cover.png".to_string(),
        };

        let json = serde_json::to_string(&track).unwrap();
        let back: TrackRef = serde_json::from_str(&json).unwrap();
        assert_eq!(track, back);
    }
}
