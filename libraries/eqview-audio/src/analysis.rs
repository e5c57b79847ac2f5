//! Analysis taps: non-destructive frequency-domain read points
//!
//! The playback engine writes each channel's post-cascade samples into a tap
//! from its render path; the spectrum meter reads magnitudes out on the UI's
//! animation ticks. Reading never alters the signal.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::{Arc, Mutex};

/// Default analysis window, matching the visualizer's 16 output bins
pub const DEFAULT_FFT_SIZE: usize = 32;

/// Shared handle to a tap, as handed to the UI via `on_analysers_ready`
pub type SharedTap = Arc<Mutex<AnalyserTap>>;

/// Frequency-domain read point for one channel
///
/// Keeps a ring of the most recent `fft_size` samples and produces
/// Hann-windowed magnitude bins normalized to 0..1.
pub struct AnalyserTap {
    ring: Vec<f32>,
    write_pos: usize,
    fft: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex<f32>>,
}

impl std::fmt::Debug for AnalyserTap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyserTap")
            .field("fft_size", &self.ring.len())
            .finish_non_exhaustive()
    }
}

impl AnalyserTap {
    /// Create a tap with the given analysis window size
    pub fn new(fft_size: usize) -> Self {
        let fft_size = fft_size.max(2);
        let fft = FftPlanner::new().plan_fft_forward(fft_size);
        Self {
            ring: vec![0.0; fft_size],
            write_pos: 0,
            fft,
            scratch: vec![Complex::new(0.0, 0.0); fft_size],
        }
    }

    /// Create a shared tap handle
    pub fn shared(fft_size: usize) -> SharedTap {
        Arc::new(Mutex::new(Self::new(fft_size)))
    }

    /// Analysis window size in samples
    pub fn fft_size(&self) -> usize {
        self.ring.len()
    }

    /// Number of magnitude bins produced by [`AnalyserTap::magnitudes`]
    pub fn bin_count(&self) -> usize {
        self.ring.len() / 2
    }

    /// Append one channel's samples to the analysis window
    pub fn write(&mut self, samples: &[f32]) {
        for &sample in samples {
            self.ring[self.write_pos] = sample;
            self.write_pos = (self.write_pos + 1) % self.ring.len();
        }
    }

    /// Compute magnitude bins from the current window
    ///
    /// Fills `out` (up to [`AnalyserTap::bin_count`] values) with
    /// Hann-windowed magnitudes scaled so a full-scale sine lands near 1.0;
    /// values are clamped to 0..1.
    pub fn magnitudes(&mut self, out: &mut [f32]) {
        let n = self.ring.len();

        // Oldest sample first so the window shape lines up with time order
        for (i, slot) in self.scratch.iter_mut().enumerate() {
            let sample = self.ring[(self.write_pos + i) % n];
            let window = 0.5 * (1.0 - (2.0 * PI * i as f32 / n as f32).cos());
            *slot = Complex::new(sample * window, 0.0);
        }

        self.fft.process(&mut self.scratch);

        // Hann coherent gain is 0.5, so amplitude ~= norm * 4 / N
        let scale = 4.0 / n as f32;
        for (bin, value) in out.iter_mut().take(self.bin_count()).enumerate() {
            *value = (self.scratch[bin].norm() * scale).clamp(0.0, 1.0);
        }
    }
}
