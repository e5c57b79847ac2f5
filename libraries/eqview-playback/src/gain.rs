//! The output gain stage with anti-click ramps
//!
//! Gain changes at play/pause are ramped linearly over a short window rather
//! than switched, applied sample-accurately in the render path.

use std::time::Duration;

/// Output gain with linear per-frame ramping
#[derive(Debug, Clone)]
pub struct GainStage {
    current: f32,
    target: f32,
    /// Per-frame increment while ramping; 0.0 when settled
    step: f32,
}

impl GainStage {
    /// Create a stage at the given gain
    pub fn new(initial: f32) -> Self {
        Self {
            current: initial,
            target: initial,
            step: 0.0,
        }
    }

    /// Snap to a gain immediately, cancelling any ramp
    pub fn set(&mut self, value: f32) {
        self.current = value;
        self.target = value;
        self.step = 0.0;
    }

    /// Ramp linearly to `target` over `duration`
    ///
    /// A zero duration (or zero sample rate) snaps instead.
    pub fn fade_to(&mut self, target: f32, duration: Duration, sample_rate: u32) {
        let frames = (duration.as_secs_f64() * f64::from(sample_rate)) as usize;
        if frames == 0 {
            self.set(target);
            return;
        }
        self.target = target;
        self.step = (target - self.current) / frames as f32;
    }

    /// Current gain value
    pub fn current(&self) -> f32 {
        self.current
    }

    /// Whether a ramp is still in progress
    pub fn is_ramping(&self) -> bool {
        self.step != 0.0
    }

    /// Apply gain to an interleaved stereo buffer, advancing the ramp
    pub fn process(&mut self, buffer: &mut [f32]) {
        for frame in buffer.chunks_exact_mut(2) {
            if self.step != 0.0 {
                self.current += self.step;
                let overshot = (self.step > 0.0 && self.current >= self.target)
                    || (self.step < 0.0 && self.current <= self.target);
                if overshot {
                    self.current = self.target;
                    self.step = 0.0;
                }
            }

            frame[0] *= self.current;
            frame[1] *= self.current;
        }
    }
}

impl Default for GainStage {
    fn default() -> Self {
        Self::new(1.0)
    }
}
