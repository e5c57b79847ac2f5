//! Coefficient calculator: filter parameters -> biquad coefficients
//!
//! RBJ cookbook formulas for the band shapes the demo presets use. The
//! cookbook labels numerator coefficients `b` and denominator coefficients
//! `a`; [`BiquadCoefficients`] uses the graph library's opposite convention,
//! so results are mapped on the way out.

use eqview_core::{BiquadCoefficients, FilterKind, FilterParams};
use std::f32::consts::PI;

/// Highest representable fraction of the sample rate
///
/// Frequencies are clamped below Nyquist to keep the sections stable when a
/// preset band sits near or above half the sample rate.
const MAX_FREQ_RATIO: f32 = 0.45;

/// Smallest accepted Q, to avoid division blowups from degenerate input
const MIN_Q: f32 = 0.01;

/// Compute biquad coefficients for one band at the given sample rate
///
/// Pure function of its inputs; the engine calls it once per band whenever
/// the cascade is (re)built.
pub fn biquad_coefficients(params: FilterParams, sample_rate: u32) -> BiquadCoefficients {
    let sample_rate = sample_rate as f32;
    if sample_rate < 1.0 {
        return BiquadCoefficients::IDENTITY;
    }

    let freq = params.freq.clamp(1.0, sample_rate * MAX_FREQ_RATIO);
    let q = params.q.max(MIN_Q);
    let omega = 2.0 * PI * freq / sample_rate;
    let sin_omega = omega.sin();
    let cos_omega = omega.cos();

    // Cookbook terms: (b0, b1, b2) numerator, (a0, a1, a2) denominator
    let (b0, b1, b2, a0, a1, a2) = match params.kind {
        FilterKind::Highpass => {
            let alpha = sin_omega / (2.0 * q);
            (
                (1.0 + cos_omega) / 2.0,
                -(1.0 + cos_omega),
                (1.0 + cos_omega) / 2.0,
                1.0 + alpha,
                -2.0 * cos_omega,
                1.0 - alpha,
            )
        }
        FilterKind::Peak => {
            let a = 10.0_f32.powf(params.gain / 40.0);
            let alpha = sin_omega / (2.0 * q);
            (
                1.0 + alpha * a,
                -2.0 * cos_omega,
                1.0 - alpha * a,
                1.0 + alpha / a,
                -2.0 * cos_omega,
                1.0 - alpha / a,
            )
        }
        FilterKind::LowShelf => {
            let a = 10.0_f32.powf(params.gain / 40.0);
            let alpha = sin_omega / 2.0 * ((a + 1.0 / a) * (1.0 / q - 1.0) + 2.0).sqrt();
            let beta = 2.0 * a.sqrt() * alpha;
            (
                a * ((a + 1.0) - (a - 1.0) * cos_omega + beta),
                2.0 * a * ((a - 1.0) - (a + 1.0) * cos_omega),
                a * ((a + 1.0) - (a - 1.0) * cos_omega - beta),
                (a + 1.0) + (a - 1.0) * cos_omega + beta,
                -2.0 * ((a - 1.0) + (a + 1.0) * cos_omega),
                (a + 1.0) + (a - 1.0) * cos_omega - beta,
            )
        }
        FilterKind::HighShelf => {
            let a = 10.0_f32.powf(params.gain / 40.0);
            let alpha = sin_omega / 2.0 * ((a + 1.0 / a) * (1.0 / q - 1.0) + 2.0).sqrt();
            let beta = 2.0 * a.sqrt() * alpha;
            (
                a * ((a + 1.0) + (a - 1.0) * cos_omega + beta),
                -2.0 * a * ((a - 1.0) + (a + 1.0) * cos_omega),
                a * ((a + 1.0) + (a - 1.0) * cos_omega - beta),
                (a + 1.0) - (a - 1.0) * cos_omega + beta,
                2.0 * ((a - 1.0) - (a + 1.0) * cos_omega),
                (a + 1.0) - (a - 1.0) * cos_omega - beta,
            )
        }
    };

    // Normalize by a0 and map into the feedforward/feedback convention
    BiquadCoefficients {
        a0: b0 / a0,
        a1: b1 / a0,
        a2: b2 / a0,
        b1: a1 / a0,
        b2: a2 / a0,
    }
}
