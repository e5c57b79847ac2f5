//! Error types for the playback controller

use thiserror::Error;

/// Controller errors
///
/// Per the propagation policy, only load/decode failures surface here.
/// Misuse of play/pause/stop on missing resources is absorbed as a logged
/// no-op instead.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Asset fetch or decode failed during `init`/track change
    #[error(transparent)]
    Load(#[from] eqview_audio::AudioError),
}

/// Result type for controller operations
pub type Result<T> = std::result::Result<T, ControllerError>;
