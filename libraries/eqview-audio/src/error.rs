//! Error types for asset loading and decoding

use thiserror::Error;

/// Audio loading/decoding errors
///
/// Only these reach the caller; playback-side misuse (play before load and
/// the like) is absorbed and logged by the controller instead.
#[derive(Debug, Error)]
pub enum AudioError {
    /// Asset fetch failed: transport error or non-success HTTP status
    #[error("network error fetching {url}: {reason}")]
    Network {
        /// URL of the asset that failed to fetch
        url: String,
        /// Underlying transport/status description
        reason: String,
    },

    /// Audio data was malformed or uses an unsupported codec
    #[error("failed to decode audio data: {0}")]
    Decode(String),

    /// The container held no audio track
    #[error("no audio track found in container")]
    NoAudioTrack,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for audio operations
pub type Result<T> = std::result::Result<T, AudioError>;
