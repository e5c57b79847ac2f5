//! The audio controller: graph owner, playback engine and position clock
//!
//! One controller instance exists per UI mount. It owns the whole processing
//! graph (source node, filter cascade, gain stage, analysis taps), the
//! decoded asset, and the position state pair, and it is the only thing that
//! mutates any of them. The host drives it with sequential operations, an
//! audio-callback `render`, and a per-display-frame `on_frame`.

use crate::callbacks::ControllerCallbacks;
use crate::clock::{EngineClock, MonotonicClock};
use crate::error::Result;
use crate::gain::GainStage;
use crate::position::TickSlot;
use crate::source::SourceNode;
use crate::types::ControllerConfig;
use eqview_audio::{AnalyserTap, DecodedAsset, FilterCascade, SharedTap, TrackLoader};
use eqview_core::{format_timestamp, BiquadCoefficients, PlaybackState};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// A source node fading out after pause
///
/// The fade-out must finish before the node is torn down (the anti-click
/// rule), so the node is parked here with a deadline instead of being dropped
/// inside `pause`. The render path keeps playing it, faded, until the
/// deadline passes; a superseding play/stop/cleanup drops it immediately.
#[derive(Debug)]
struct DrainingSource {
    node: SourceNode,
    deadline: Duration,
}

/// The playback/analysis controller
///
/// State machine: Idle -> Loading -> Ready -> Playing <-> Paused, with
/// Stopped reachable from anywhere and "ended" reported as a transient event
/// that lands in Paused-at-end.
///
/// Position invariant: when not playing, `paused_at` is the displayed
/// position and `clock_start` is `None`; while playing, the true position is
/// `paused_at + (clock.now() - clock_start)`. Filter-chain rebuilds preserve
/// this pair (plus the measured rebuild latency), so they never jump the
/// position.
pub struct AudioController {
    config: ControllerConfig,
    clock: Arc<dyn EngineClock>,
    callbacks: ControllerCallbacks,
    state: PlaybackState,

    /// Current coefficient snapshot; replaced wholesale by `update_filters`
    coefficients: Vec<BiquadCoefficients>,
    filters_enabled: bool,

    // The processing graph. Exactly one instance; gain and taps are created
    // once per controller lifetime, source and cascade turn over with
    // track/filter changes.
    asset: Option<Arc<DecodedAsset>>,
    source: Option<SourceNode>,
    draining: Option<DrainingSource>,
    cascade: FilterCascade,
    gain: GainStage,
    taps: Option<(SharedTap, SharedTap)>,

    // Position state pair
    paused_at: Duration,
    clock_start: Option<Duration>,

    tick: TickSlot,

    /// Graph generation. Every async continuation re-checks this before
    /// mutating state, so a slow load finishing after a newer load, a stop
    /// or a cleanup is discarded instead of corrupting the graph.
    epoch: u64,
    closed: bool,

    // Scratch for splitting render output into the taps
    split_l: Vec<f32>,
    split_r: Vec<f32>,
}

impl AudioController {
    /// Create a controller with the wall clock
    pub fn new(
        coefficients: Vec<BiquadCoefficients>,
        config: ControllerConfig,
        callbacks: ControllerCallbacks,
    ) -> Self {
        Self::with_clock(
            coefficients,
            config,
            callbacks,
            Arc::new(MonotonicClock::new()),
        )
    }

    /// Create a controller with an explicit engine clock
    pub fn with_clock(
        coefficients: Vec<BiquadCoefficients>,
        config: ControllerConfig,
        callbacks: ControllerCallbacks,
        clock: Arc<dyn EngineClock>,
    ) -> Self {
        Self {
            config,
            clock,
            callbacks,
            state: PlaybackState::Idle,
            coefficients,
            filters_enabled: true,
            asset: None,
            source: None,
            draining: None,
            cascade: FilterCascade::passthrough(),
            gain: GainStage::default(),
            taps: None,
            paused_at: Duration::ZERO,
            clock_start: None,
            tick: TickSlot::new(),
            epoch: 0,
            closed: false,
            split_l: Vec::new(),
            split_r: Vec::new(),
        }
    }

    // ===== Lifecycle =====

    /// Load a track, replacing whatever was loaded before
    ///
    /// Lazily creates the analysis taps and gain stage on first use, then
    /// fetches and decodes the asset. Re-entrant for track changes: only the
    /// source/filter portion of the graph turns over; taps and gain survive.
    ///
    /// Fails with the load error on transport/decode problems, leaving the
    /// previous graph untouched. A load superseded by a newer `init`, `stop`
    /// or `cleanup` is silently discarded.
    pub async fn init(&mut self, url: &str) -> Result<()> {
        if self.closed {
            warn!("init ignored: controller has been cleaned up");
            return Ok(());
        }
        self.ensure_graph();

        let previous = self.state;
        self.state = PlaybackState::Loading;
        self.emit_loading(true);

        let epoch = self.bump_epoch();
        let result = TrackLoader::new().fetch(url).await;

        if self.epoch != epoch || self.closed {
            debug!(url, "discarding stale track load");
            return Ok(());
        }

        match result {
            Ok(asset) => {
                self.commit_asset(asset);
                Ok(())
            }
            Err(e) => {
                warn!(url, error = %e, "track load failed");
                self.state = previous;
                if previous == PlaybackState::Playing {
                    // The position loop dies while loading; revive it
                    self.tick.arm();
                }
                self.emit_loading(false);
                Err(e.into())
            }
        }
    }

    /// Install an already decoded asset, replacing whatever was loaded before
    ///
    /// The synchronous tail of [`AudioController::init`], also usable
    /// directly when the host has the buffer in hand.
    pub fn load_decoded(&mut self, asset: DecodedAsset) {
        if self.closed {
            warn!("load_decoded ignored: controller has been cleaned up");
            return;
        }
        self.ensure_graph();
        self.bump_epoch();
        self.commit_asset(asset);
    }

    /// Release every resource the controller holds
    ///
    /// The cancellation-on-teardown path: stops any live source, cancels the
    /// position loop and in-flight loads, and releases all node references.
    /// Safe to call repeatedly and from a state where `init` never completed.
    pub fn cleanup(&mut self) {
        self.bump_epoch();
        self.tick.cancel();

        if self.source.take().is_some() {
            debug!("released live source node");
        }
        if self.draining.take().is_some() {
            debug!("released draining source node");
        }
        if self.asset.take().is_some() {
            debug!("released decoded asset");
        }
        if self.taps.take().is_some() {
            debug!("released analysis taps");
        }

        self.cascade = FilterCascade::passthrough();
        self.paused_at = Duration::ZERO;
        self.clock_start = None;
        self.state = PlaybackState::Idle;
        self.closed = true;
    }

    // ===== Transport =====

    /// Start or resume playback from the stored position
    ///
    /// A logged no-op when no decoded track is present or the stored
    /// position is already at the end; the UI gates these, the engine
    /// defends against the races anyway.
    pub fn play(&mut self) {
        let Some(asset) = self.asset.as_ref() else {
            warn!("play ignored: no decoded track");
            return;
        };
        if self.state == PlaybackState::Playing {
            debug!("play ignored: already playing");
            return;
        }
        if self.paused_at >= asset.duration() {
            warn!("play ignored: position is at the end of the track");
            return;
        }

        let now = self.clock.now();
        self.start_playback(now);
    }

    /// Pause playback, capturing the exact position
    ///
    /// A logged no-op unless currently playing.
    pub fn pause(&mut self) {
        if self.state != PlaybackState::Playing {
            warn!(state = ?self.state, "pause ignored: not playing");
            return;
        }
        let now = self.clock.now();
        self.halt_playback(now);
    }

    /// Stop playback and reset the position to zero
    ///
    /// Unconditional: valid from every state, including mid-load (the
    /// in-flight load is discarded).
    pub fn stop(&mut self) {
        self.bump_epoch();
        if self.state == PlaybackState::Loading {
            self.emit_loading(false);
        }

        self.source = None;
        self.draining = None;
        self.cascade.reset();
        self.paused_at = Duration::ZERO;
        self.clock_start = None;
        self.tick.cancel();
        self.state = if self.asset.is_some() {
            PlaybackState::Stopped
        } else {
            PlaybackState::Idle
        };

        self.emit_time(Duration::ZERO);
        debug!("playback stopped");
    }

    /// Replace the filter chain with a new coefficient snapshot
    ///
    /// While playing, the position is captured, the cascade rebuilt, and the
    /// measured rebuild latency added to the captured position before
    /// resuming - so the rebuild can delay but never rewind the reported
    /// position. While not playing, the chain is swapped in place.
    pub fn update_filters(&mut self, sets: &[BiquadCoefficients]) {
        self.coefficients = sets.to_vec();

        if self.state == PlaybackState::Playing {
            let rebuild_started = self.clock.now();
            self.halt_playback(rebuild_started);
            self.rebuild_cascade();
            let rebuild_finished = self.clock.now();

            let latency = rebuild_finished.saturating_sub(rebuild_started);
            self.paused_at = self.clamp_to_duration(self.paused_at + latency);

            if self.at_end() {
                debug!("filter rebuild ran past the end of the track");
            } else {
                self.start_playback(rebuild_finished);
            }
        } else {
            self.rebuild_cascade();
        }
    }

    /// Gate the filter cascade (the equalizer power flag)
    ///
    /// Disabled leaves the graph connected with the cascade bypassed.
    pub fn set_filters_enabled(&mut self, enabled: bool) {
        self.filters_enabled = enabled;
        self.cascade.set_enabled(enabled);
        debug!(enabled, "filter cascade power set");
    }

    // ===== Rendering =====

    /// Produce the next interleaved stereo block
    ///
    /// The host's audio callback drives this. Signal path: source (live or
    /// draining) -> cascade -> analysis taps -> gain. The taps sit before the
    /// gain stage, like the splitter in the graph, so the visualizer is
    /// unaffected by fades.
    pub fn render(&mut self, out: &mut [f32]) {
        out.fill(0.0);
        let now = self.clock.now();

        // A draining source whose fade window has passed can finally go
        if self
            .draining
            .as_ref()
            .is_some_and(|d| now >= d.deadline)
        {
            self.draining = None;
            debug!("draining source released after fade-out");
        }

        if self.state == PlaybackState::Playing {
            if let Some(source) = self.source.as_mut() {
                source.render(out);
                if source.is_exhausted() {
                    // The position clock raises the actual track-end event
                    debug!("source buffer exhausted");
                    self.source = None;
                }
            }
        } else if let Some(d) = self.draining.as_mut() {
            d.node.render(out);
        }

        self.cascade.process(out);

        if let Some((left, right)) = &self.taps {
            self.split_l.clear();
            self.split_r.clear();
            for frame in out.chunks_exact(2) {
                self.split_l.push(frame[0]);
                self.split_r.push(frame[1]);
            }
            if let Ok(mut tap) = left.lock() {
                tap.write(&self.split_l);
            }
            if let Ok(mut tap) = right.lock() {
                tap.write(&self.split_r);
            }
        }

        self.gain.process(out);
    }

    // ===== Position reporting =====

    /// One display frame of the position loop
    ///
    /// Fires the pending tick, if any: reports the formatted position,
    /// detects end-of-track, and re-arms. The single-slot tick means rapid
    /// play/pause toggles can never stack loops.
    pub fn on_frame(&mut self) {
        if !self.tick.fire() {
            return;
        }
        self.report_position();
    }

    /// Current playback position derived from the engine clock
    pub fn position(&self) -> Duration {
        let elapsed = match (self.state, self.clock_start) {
            (PlaybackState::Playing, Some(start)) => self.clock.now().saturating_sub(start),
            _ => Duration::ZERO,
        };
        self.clamp_to_duration(self.paused_at + elapsed)
    }

    /// Duration of the loaded track, if any
    pub fn duration(&self) -> Option<Duration> {
        self.asset.as_ref().map(|a| a.duration())
    }

    /// Current playback state
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Shared handles to the analysis taps, once the graph exists
    pub fn analysers(&self) -> Option<(SharedTap, SharedTap)> {
        self.taps
            .as_ref()
            .map(|(l, r)| (Arc::clone(l), Arc::clone(r)))
    }

    // ===== Internals =====

    /// Create the long-lived graph portion exactly once
    fn ensure_graph(&mut self) {
        if self.taps.is_some() {
            return;
        }
        let left = AnalyserTap::shared(self.config.fft_size);
        let right = AnalyserTap::shared(self.config.fft_size);
        self.taps = Some((Arc::clone(&left), Arc::clone(&right)));
        if let Some(cb) = self.callbacks.on_analysers_ready.as_mut() {
            cb(left, right);
        }
        debug!("created analysis taps");
    }

    /// Install a decoded asset and wire the source/filter portion fresh
    fn commit_asset(&mut self, asset: DecodedAsset) {
        self.tick.cancel();
        self.source = None;
        self.draining = None;
        self.paused_at = Duration::ZERO;
        self.clock_start = None;
        self.rebuild_cascade();

        let duration = asset.duration();
        debug!(
            sample_rate = asset.sample_rate(),
            duration_secs = duration.as_secs_f64(),
            "track ready"
        );
        self.asset = Some(Arc::new(asset));
        self.state = PlaybackState::Ready;

        self.emit_duration(duration);
        self.emit_loading(false);
    }

    /// Begin playing from `paused_at`, with a fresh source node
    fn start_playback(&mut self, now: Duration) {
        let Some(asset) = self.asset.as_ref() else {
            return;
        };

        // Any source still fading out is stale once a new one starts
        if self.draining.take().is_some() {
            debug!("discarded stale draining source");
        }

        let sample_rate = asset.sample_rate();
        self.source = Some(SourceNode::start(Arc::clone(asset), self.paused_at));
        self.gain.set(0.0);
        self.gain.fade_to(1.0, self.config.fade, sample_rate);
        self.clock_start = Some(now);
        self.state = PlaybackState::Playing;
        self.tick.arm();
        debug!(
            offset_secs = self.paused_at.as_secs_f64(),
            "playback started"
        );
    }

    /// Capture the position at `now` and wind playback down
    fn halt_playback(&mut self, now: Duration) {
        let elapsed = self
            .clock_start
            .map(|start| now.saturating_sub(start))
            .unwrap_or_default();
        self.paused_at = self.clamp_to_duration(self.paused_at + elapsed);
        self.clock_start = None;

        let sample_rate = self.sample_rate();
        self.gain.fade_to(0.0, self.config.fade, sample_rate);

        // The fade must complete before the node is torn down; park it
        if let Some(node) = self.source.take() {
            self.draining = Some(DrainingSource {
                node,
                deadline: now + self.config.fade,
            });
        }

        self.state = PlaybackState::Paused;
        self.tick.cancel();
        debug!(
            paused_at_secs = self.paused_at.as_secs_f64(),
            "playback paused"
        );
    }

    /// The armed position tick: report, detect end, re-arm
    fn report_position(&mut self) {
        if self.state != PlaybackState::Playing {
            return;
        }
        let Some(duration) = self.duration() else {
            return;
        };

        let now = self.clock.now();
        let elapsed = self
            .clock_start
            .map(|start| now.saturating_sub(start))
            .unwrap_or_default();
        let position = self.paused_at + elapsed;

        if position >= duration {
            // Paused-at-end: clamp, notify once, leave the loop disarmed
            self.source = None;
            self.draining = None;
            self.paused_at = duration;
            self.clock_start = None;
            self.state = PlaybackState::Paused;

            self.emit_time(duration);
            if let Some(cb) = self.callbacks.on_track_end.as_mut() {
                cb();
            }
            debug!("track ended");
            return;
        }

        self.emit_time(position);
        self.tick.arm();
    }

    fn rebuild_cascade(&mut self) {
        self.cascade = FilterCascade::build(&self.coefficients);
        self.cascade.set_enabled(self.filters_enabled);
    }

    fn bump_epoch(&mut self) -> u64 {
        self.epoch += 1;
        self.epoch
    }

    fn sample_rate(&self) -> u32 {
        self.asset.as_ref().map_or(44100, |a| a.sample_rate())
    }

    fn clamp_to_duration(&self, position: Duration) -> Duration {
        match self.duration() {
            Some(duration) => position.min(duration),
            None => position,
        }
    }

    fn at_end(&self) -> bool {
        self.duration()
            .is_some_and(|duration| self.paused_at >= duration)
    }

    fn emit_loading(&mut self, loading: bool) {
        if let Some(cb) = self.callbacks.on_loading_change.as_mut() {
            cb(loading);
        }
    }

    fn emit_duration(&mut self, duration: Duration) {
        if let Some(cb) = self.callbacks.on_duration_change.as_mut() {
            cb(&format_timestamp(duration));
        }
    }

    fn emit_time(&mut self, position: Duration) {
        if let Some(cb) = self.callbacks.on_time_update.as_mut() {
            cb(&format_timestamp(position));
        }
    }
}

impl std::fmt::Debug for AudioController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioController")
            .field("state", &self.state)
            .field("paused_at", &self.paused_at)
            .field("clock_start", &self.clock_start)
            .field("stages", &self.cascade.len())
            .field("epoch", &self.epoch)
            .finish_non_exhaustive()
    }
}
