//! Controller configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the audio controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Gain ramp window applied at play (fade-in) and pause (fade-out)
    ///
    /// The anti-click measure: output gain is ramped rather than switched.
    /// `Duration::ZERO` disables fading (useful in tests).
    pub fade: Duration,

    /// Analysis window of the per-channel taps, in samples
    pub fft_size: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            fade: Duration::from_millis(50),
            fft_size: eqview_audio::DEFAULT_FFT_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ControllerConfig::default();
        assert_eq!(config.fade, Duration::from_millis(50));
        assert_eq!(config.fft_size, 32);
    }
}
