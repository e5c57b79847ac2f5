//! The callback surface pushed to the host UI
//!
//! The UI only ever receives derived, already-formatted values - position and
//! duration strings, a loading flag, shared analyser handles. Engine
//! internals are never exposed for external mutation.

use eqview_audio::SharedTap;

/// Host-supplied hooks, all optional
///
/// Invoked synchronously from controller operations and the position tick;
/// they should return quickly.
#[derive(Default)]
pub struct ControllerCallbacks {
    /// Loading flag changed (set during `init`, cleared on completion/failure)
    pub on_loading_change: Option<Box<dyn FnMut(bool)>>,

    /// Track duration became known, formatted as `m:ss`
    pub on_duration_change: Option<Box<dyn FnMut(&str)>>,

    /// Playback position update, formatted as `m:ss`
    pub on_time_update: Option<Box<dyn FnMut(&str)>>,

    /// The track played to its end
    pub on_track_end: Option<Box<dyn FnMut()>>,

    /// The left/right analysis taps exist; fired once per controller lifetime
    pub on_analysers_ready: Option<Box<dyn FnMut(SharedTap, SharedTap)>>,
}

impl std::fmt::Debug for ControllerCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerCallbacks")
            .field("on_loading_change", &self.on_loading_change.is_some())
            .field("on_duration_change", &self.on_duration_change.is_some())
            .field("on_time_update", &self.on_time_update.is_some())
            .field("on_track_end", &self.on_track_end.is_some())
            .field("on_analysers_ready", &self.on_analysers_ready.is_some())
            .finish()
    }
}
