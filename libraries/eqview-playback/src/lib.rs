//! Eqview Playback
//!
//! The playback/analysis controller behind the demo player UI.
//!
//! This crate provides:
//! - [`AudioController`]: owns the processing graph (source, filter cascade,
//!   gain stage, analysis taps) and drives play/pause/stop/filter updates
//!   with accurate position tracking across graph rebuilds
//! - The engine clock abstraction ([`EngineClock`]) so hosts and tests can
//!   control time
//! - [`ControllerCallbacks`]: the push surface the UI consumes (loading and
//!   duration changes, formatted time updates, track end, analyser handles)
//!
//! # Architecture
//!
//! The controller is single-threaded and event-driven: the host invokes
//! operations sequentially, drives `render` from its audio callback, and
//! calls `on_frame` once per display frame for position reporting. The only
//! suspension point is `init`, which fetches and decodes the track; every
//! async continuation re-checks the controller epoch so a stale load can
//! never corrupt a newer graph.
//!
//! # Example
//!
//! ```rust,no_run
//! use eqview_playback::{AudioController, ControllerCallbacks, ControllerConfig};
//!
//! # async fn demo() -> Result<(), eqview_playback::ControllerError> {
//! let callbacks = ControllerCallbacks {
//!     on_time_update: Some(Box::new(|time| println!("at {time}"))),
//!     ..ControllerCallbacks::default()
//! };
//!
//! let mut controller =
//!     AudioController::new(Vec::new(), ControllerConfig::default(), callbacks);
//! controller.init("https://example.com/track.aac").await?;
//! controller.play();
//! # Ok(())
//! # }
//! ```

mod callbacks;
mod clock;
mod controller;
mod error;
mod gain;
mod position;
mod source;
mod types;

pub use callbacks::ControllerCallbacks;
pub use clock::{EngineClock, MonotonicClock};
pub use controller::AudioController;
pub use error::{ControllerError, Result};
pub use gain::GainStage;
pub use position::TickSlot;
pub use source::SourceNode;
pub use types::ControllerConfig;

// The playback state lives in eqview-core with the other shared types
pub use eqview_core::PlaybackState;
