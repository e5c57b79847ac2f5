//! Test signal generation and measurement helpers
//!
//! Available to dependents through the `test-utils` feature.

use std::f32::consts::PI;

/// Generate a stereo interleaved sine wave
///
/// # Arguments
/// * `frequency` - Frequency in Hz
/// * `sample_rate` - Sample rate in Hz
/// * `duration` - Duration in seconds
/// * `amplitude` - Peak amplitude (0.0 to 1.0)
pub fn sine_wave(frequency: f32, sample_rate: u32, duration: f32, amplitude: f32) -> Vec<f32> {
    let num_samples = (sample_rate as f32 * duration) as usize;
    let mut samples = Vec::with_capacity(num_samples * 2);

    for i in 0..num_samples {
        let t = i as f32 / sample_rate as f32;
        let sample = (2.0 * PI * frequency * t).sin() * amplitude;
        samples.push(sample);
        samples.push(sample);
    }

    samples
}

/// Generate a single-channel sine wave
pub fn mono_sine(frequency: f32, sample_rate: u32, count: usize, amplitude: f32) -> Vec<f32> {
    (0..count)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            (2.0 * PI * frequency * t).sin() * amplitude
        })
        .collect()
}

/// Generate stereo interleaved silence
pub fn silence(sample_rate: u32, duration: f32) -> Vec<f32> {
    vec![0.0; (sample_rate as f32 * duration) as usize * 2]
}

/// Root-mean-square level of a buffer
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    (samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sine_wave_is_stereo_interleaved() {
        let samples = sine_wave(1000.0, 44100, 0.01, 0.5);
        assert_eq!(samples.len() % 2, 0);
        for frame in samples.chunks_exact(2) {
            assert_eq!(frame[0], frame[1]);
        }
    }

    #[test]
    fn full_scale_sine_rms() {
        let samples = sine_wave(1000.0, 44100, 1.0, 1.0);
        // RMS of a unit sine is 1/sqrt(2)
        assert!((rms(&samples) - std::f32::consts::FRAC_1_SQRT_2).abs() < 0.01);
    }

    #[test]
    fn silence_is_zeroed() {
        assert!(silence(44100, 0.01).iter().all(|s| *s == 0.0));
    }
}
