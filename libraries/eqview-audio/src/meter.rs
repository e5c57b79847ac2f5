//! The segment meter that feeds the visualizer
//!
//! One meter per channel. Each sample reduces the tap's magnitude bins to a
//! single 0..1 loudness ratio, discretizes it into a fixed number of visual
//! segments and colors them along a monotonic ramp. Sampling is capped at a
//! configurable frame rate: ticks arriving faster than the cap are dropped,
//! never queued.

use crate::analysis::SharedTap;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How the magnitude bins collapse into one loudness ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reduction {
    /// Mean of all bins
    Average,

    /// Loudest bin (peak hold within the sample)
    Peak,
}

/// Meter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeterConfig {
    /// Maximum sampling rate; `None` samples on every tick
    pub max_fps: Option<f32>,

    /// Bin reduction policy
    pub reduction: Reduction,

    /// Number of visual segments
    pub segments: usize,
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self {
            max_fps: Some(30.0),
            reduction: Reduction::Average,
            segments: 16,
        }
    }
}

/// HSL color of a lit segment (saturation is always 100%)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HslColor {
    /// Hue in degrees
    pub hue: f32,
    /// Lightness percentage
    pub lightness: f32,
}

/// One visual segment of a meter frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeterSegment {
    /// Whether the segment is lit at the current level
    pub lit: bool,

    /// Whether this is the topmost lit segment (drawn with emphasis)
    pub emphasized: bool,

    /// Color of a lit segment; `None` when unlit
    pub color: Option<HslColor>,
}

/// One sampled meter state, ready to draw
#[derive(Debug, Clone, PartialEq)]
pub struct MeterFrame {
    /// Reduced loudness ratio, 0..1
    pub ratio: f32,

    /// Number of lit segments
    pub active: usize,

    /// Per-segment paint state, bottom first
    pub segments: Vec<MeterSegment>,
}

/// Hue of the held (quiet) portion of the ramp - a warm green
const HOLD_HUE: f32 = 100.0;

/// Total hue travel across the alert portion of the ramp
const ALERT_HUE_SPAN: f32 = 120.0;

/// Lightness for the emphasized topmost segment / the rest
const EMPHASIS_LIGHTNESS: f32 = 50.0;
const BASE_LIGHTNESS: f32 = 30.0;

/// Color of segment `index` out of `total`
///
/// The lower two thirds hold the green hue; the top third ramps smoothly
/// toward the alert color. Monotonic in `index`.
pub fn segment_color(index: usize, total: usize, emphasized: bool) -> HslColor {
    let ramp_start = 2.0 * total as f32 / 3.0;
    let hue = if (index as f32) < ramp_start {
        HOLD_HUE
    } else {
        let fraction = (index as f32 - ramp_start) / (total as f32 - ramp_start);
        HOLD_HUE - fraction * ALERT_HUE_SPAN
    };

    HslColor {
        hue,
        lightness: if emphasized {
            EMPHASIS_LIGHTNESS
        } else {
            BASE_LIGHTNESS
        },
    }
}

/// Frame-rate-capped spectrum meter for one channel
pub struct SpectrumMeter {
    tap: SharedTap,
    config: MeterConfig,
    last_sample: Option<Duration>,
    bins: Vec<f32>,
}

impl SpectrumMeter {
    /// Create a meter over a shared tap handle
    pub fn new(tap: SharedTap, config: MeterConfig) -> Self {
        let bin_count = tap.lock().map(|t| t.bin_count()).unwrap_or_default();
        Self {
            tap,
            config,
            last_sample: None,
            bins: vec![0.0; bin_count],
        }
    }

    /// Meter configuration
    pub fn config(&self) -> &MeterConfig {
        &self.config
    }

    /// Sample the tap at `now`, one tick of the animation loop
    ///
    /// Returns `None` when the tick lands inside the frame-rate cap (the tick
    /// is dropped) or when the tap is unavailable.
    pub fn sample(&mut self, now: Duration) -> Option<MeterFrame> {
        if let (Some(fps), Some(last)) = (self.config.max_fps, self.last_sample) {
            let interval = Duration::from_secs_f32(1.0 / fps);
            if now.saturating_sub(last) < interval {
                return None;
            }
        }

        {
            let mut tap = self.tap.lock().ok()?;
            tap.magnitudes(&mut self.bins);
        }
        self.last_sample = Some(now);

        let ratio = match self.config.reduction {
            Reduction::Average => {
                if self.bins.is_empty() {
                    0.0
                } else {
                    self.bins.iter().sum::<f32>() / self.bins.len() as f32
                }
            }
            Reduction::Peak => self.bins.iter().copied().fold(0.0, f32::max),
        };
        let ratio = ratio.clamp(0.0, 1.0);

        let total = self.config.segments;
        let active = ((ratio * total as f32) as usize).min(total);

        let segments = (0..total)
            .map(|i| {
                let lit = i < active;
                let emphasized = lit && i + 1 == active;
                MeterSegment {
                    lit,
                    emphasized,
                    color: lit.then(|| segment_color(i, total, emphasized)),
                }
            })
            .collect();

        Some(MeterFrame {
            ratio,
            active,
            segments,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::AnalyserTap;
    use std::sync::Arc;

    fn loud_tap() -> SharedTap {
        let tap = AnalyserTap::shared(32);
        tap.lock().unwrap().write(&crate::test_utils::mono_sine(
            4.0 * 44100.0 / 32.0,
            44100,
            64,
            0.9,
        ));
        tap
    }

    #[test]
    fn uncapped_meter_samples_every_tick() {
        let mut meter = SpectrumMeter::new(
            loud_tap(),
            MeterConfig {
                max_fps: None,
                ..MeterConfig::default()
            },
        );

        for i in 0..10 {
            let now = Duration::from_millis(i);
            assert!(meter.sample(now).is_some());
        }
    }

    #[test]
    fn capped_meter_drops_fast_ticks() {
        let mut meter = SpectrumMeter::new(loud_tap(), MeterConfig::default());

        // 120 fps ticks over 100 ms against a 30 fps cap: at most 3 frames
        let mut produced = 0;
        for k in 0..12 {
            let now = Duration::from_micros(k * 8_333);
            if meter.sample(now).is_some() {
                produced += 1;
            }
        }
        assert!(produced <= 3, "expected at most 3 frames, got {produced}");
        assert!(produced >= 2, "cap should still let frames through");
    }

    #[test]
    fn peak_reduction_is_at_least_average() {
        let tap = loud_tap();
        let mut avg = SpectrumMeter::new(
            Arc::clone(&tap),
            MeterConfig {
                max_fps: None,
                reduction: Reduction::Average,
                segments: 16,
            },
        );
        let mut peak = SpectrumMeter::new(
            tap,
            MeterConfig {
                max_fps: None,
                reduction: Reduction::Peak,
                segments: 16,
            },
        );

        let a = avg.sample(Duration::ZERO).unwrap();
        let p = peak.sample(Duration::ZERO).unwrap();
        assert!(p.ratio >= a.ratio);
        assert!(p.active >= a.active);
    }

    #[test]
    fn topmost_lit_segment_is_emphasized() {
        let mut meter = SpectrumMeter::new(
            loud_tap(),
            MeterConfig {
                max_fps: None,
                reduction: Reduction::Peak,
                segments: 16,
            },
        );

        let frame = meter.sample(Duration::ZERO).unwrap();
        assert!(frame.active > 0);

        let emphasized: Vec<usize> = frame
            .segments
            .iter()
            .enumerate()
            .filter(|(_, s)| s.emphasized)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(emphasized, vec![frame.active - 1]);

        let top = &frame.segments[frame.active - 1];
        assert_eq!(top.color.unwrap().lightness, EMPHASIS_LIGHTNESS);
    }

    #[test]
    fn color_ramp_holds_then_falls_monotonically() {
        let total = 16;
        let colors: Vec<HslColor> = (0..total).map(|i| segment_color(i, total, false)).collect();

        // Lower two thirds hold the green hue
        for c in &colors[..(2 * total / 3)] {
            assert_eq!(c.hue, HOLD_HUE);
        }

        // Hue never rises along the ramp
        for pair in colors.windows(2) {
            assert!(pair[1].hue <= pair[0].hue);
        }

        // The top segment has travelled well into the alert range
        assert!(colors[total - 1].hue < HOLD_HUE - 60.0);
    }
}
