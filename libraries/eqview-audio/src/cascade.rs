//! The filter cascade: an ordered chain of biquad sections
//!
//! Building a cascade is synchronous and touches nothing outside the returned
//! value; the playback engine decides when to splice it into the live graph.

use eqview_core::BiquadCoefficients;
use tracing::debug;

/// One biquad section with independent left/right state
///
/// Direct-form I. Coefficients are fixed for the life of the stage; parameter
/// edits arrive as a whole-cascade rebuild, never as in-place mutation.
#[derive(Debug, Clone)]
pub struct BiquadStage {
    coeffs: BiquadCoefficients,

    // State variables (per channel)
    x1_l: f32,
    x2_l: f32,
    y1_l: f32,
    y2_l: f32,

    x1_r: f32,
    x2_r: f32,
    y1_r: f32,
    y2_r: f32,
}

impl BiquadStage {
    /// Create a stage from one coefficient set
    pub fn new(coeffs: BiquadCoefficients) -> Self {
        Self {
            coeffs,
            x1_l: 0.0,
            x2_l: 0.0,
            y1_l: 0.0,
            y2_l: 0.0,
            x1_r: 0.0,
            x2_r: 0.0,
            y1_r: 0.0,
            y2_r: 0.0,
        }
    }

    /// Coefficients this stage was built from
    pub fn coefficients(&self) -> BiquadCoefficients {
        self.coeffs
    }

    /// Process a stereo sample pair
    #[inline]
    fn process_sample(&mut self, left: f32, right: f32) -> (f32, f32) {
        let c = self.coeffs;

        let mut out_l = c.a0 * left + c.a1 * self.x1_l + c.a2 * self.x2_l
            - c.b1 * self.y1_l
            - c.b2 * self.y2_l;

        // Flush denormals to keep the feedback path cheap
        if out_l.abs() < 1e-15 {
            out_l = 0.0;
        }

        self.x2_l = self.x1_l;
        self.x1_l = left;
        self.y2_l = self.y1_l;
        self.y1_l = out_l;

        let mut out_r = c.a0 * right + c.a1 * self.x1_r + c.a2 * self.x2_r
            - c.b1 * self.y1_r
            - c.b2 * self.y2_r;

        if out_r.abs() < 1e-15 {
            out_r = 0.0;
        }

        self.x2_r = self.x1_r;
        self.x1_r = right;
        self.y2_r = self.y1_r;
        self.y1_r = out_r;

        (out_l, out_r)
    }

    /// Clear filter state, keeping coefficients
    pub fn reset(&mut self) {
        self.x1_l = 0.0;
        self.x2_l = 0.0;
        self.y1_l = 0.0;
        self.y2_l = 0.0;
        self.x1_r = 0.0;
        self.x2_r = 0.0;
        self.y1_r = 0.0;
        self.y2_r = 0.0;
    }
}

/// Ordered chain of biquad stages
///
/// The first stage processes raw input. An empty cascade (and a disabled one,
/// via the power flag) is a plain passthrough, so the graph stays connectable
/// with zero active stages.
#[derive(Debug, Clone, Default)]
pub struct FilterCascade {
    stages: Vec<BiquadStage>,
    enabled: bool,
}

impl FilterCascade {
    /// Build a cascade from an ordered list of coefficient sets
    ///
    /// The returned cascade is detached: nothing plays through it until the
    /// caller wires it into a graph.
    pub fn build(sets: &[BiquadCoefficients]) -> Self {
        debug!(stages = sets.len(), "building filter cascade");
        Self {
            stages: sets.iter().copied().map(BiquadStage::new).collect(),
            enabled: true,
        }
    }

    /// Empty passthrough cascade
    pub fn passthrough() -> Self {
        Self {
            stages: Vec::new(),
            enabled: true,
        }
    }

    /// Number of stages
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Whether the cascade has no stages
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Enable or bypass the whole cascade (the equalizer power flag)
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Whether the cascade is active
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Process an interleaved stereo buffer in place
    pub fn process(&mut self, buffer: &mut [f32]) {
        if !self.enabled || self.stages.is_empty() {
            return;
        }

        for frame in buffer.chunks_exact_mut(2) {
            let mut left = frame[0];
            let mut right = frame[1];

            for stage in &mut self.stages {
                (left, right) = stage.process_sample(left, right);
            }

            frame[0] = left;
            frame[1] = right;
        }
    }

    /// Clear the state of every stage
    pub fn reset(&mut self) {
        for stage in &mut self.stages {
            stage.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coeffs::biquad_coefficients;
    use crate::test_utils::sine_wave;
    use eqview_core::{FilterKind, FilterParams};

    #[test]
    fn empty_cascade_is_exact_passthrough() {
        let mut cascade = FilterCascade::build(&[]);
        assert!(cascade.is_empty());

        let original = sine_wave(440.0, 44100, 0.1, 0.8);
        let mut buffer = original.clone();
        cascade.process(&mut buffer);

        assert_eq!(buffer, original);
    }

    #[test]
    fn identity_stage_is_exact_passthrough() {
        let mut cascade = FilterCascade::build(&[BiquadCoefficients::IDENTITY]);
        assert_eq!(cascade.len(), 1);

        let original = sine_wave(440.0, 44100, 0.1, 0.8);
        let mut buffer = original.clone();
        cascade.process(&mut buffer);

        assert_eq!(buffer, original);
    }

    #[test]
    fn disabled_cascade_bypasses_stages() {
        let coeffs = biquad_coefficients(
            FilterParams {
                kind: FilterKind::Peak,
                freq: 440.0,
                gain: 12.0,
                q: 2.0,
            },
            44100,
        );
        let mut cascade = FilterCascade::build(&[coeffs]);
        cascade.set_enabled(false);

        let original = sine_wave(440.0, 44100, 0.1, 0.5);
        let mut buffer = original.clone();
        cascade.process(&mut buffer);

        assert_eq!(buffer, original);
        assert!(!cascade.is_enabled());
    }

    #[test]
    fn stages_apply_in_cascade_order() {
        let boost = biquad_coefficients(
            FilterParams {
                kind: FilterKind::Peak,
                freq: 1000.0,
                gain: 6.0,
                q: 0.7,
            },
            44100,
        );
        let cut = biquad_coefficients(
            FilterParams {
                kind: FilterKind::Peak,
                freq: 1000.0,
                gain: -6.0,
                q: 0.7,
            },
            44100,
        );

        // Chained boost+cut should come out close to unity
        let mut cascade = FilterCascade::build(&[boost, cut]);
        let mut buffer = sine_wave(1000.0, 44100, 0.5, 0.5);
        let original = buffer.clone();
        cascade.process(&mut buffer);

        let tail = buffer.len() / 2;
        let out_rms = crate::test_utils::rms(&buffer[tail..]);
        let in_rms = crate::test_utils::rms(&original[tail..]);
        assert!(((out_rms / in_rms) - 1.0).abs() < 0.02);
    }

    #[test]
    fn reset_clears_ringing_state() {
        let coeffs = biquad_coefficients(
            FilterParams {
                kind: FilterKind::Peak,
                freq: 200.0,
                gain: 12.0,
                q: 8.0,
            },
            44100,
        );
        let mut cascade = FilterCascade::build(&[coeffs]);

        let mut buffer = sine_wave(200.0, 44100, 0.1, 1.0);
        cascade.process(&mut buffer);
        cascade.reset();

        // After reset, silence in produces silence out
        let mut silence = vec![0.0_f32; 128];
        cascade.process(&mut silence);
        assert!(silence.iter().all(|s| *s == 0.0));
    }
}
