//! The observer engine: the playback timeline of the replay viewer.
//!
//! Owns the frame store, the selection, and two independent clocks:
//!   1. `PlaybackClock`: discrete frame advancement during playback,
//!      driven by `tick_playback` at the host's poll cadence.
//!   2. `Transition`:    smooth seek/step blending, driven by
//!      `update_transition` from the host's render loop.
//!
//! RULES:
//!   - Each clock is advanced only from its own update call.
//!   - `transition.source` always equals the frame store's index.
//!   - A new seek overwrites an in-flight transition in place. The index
//!     stays put and the old target is never committed.
//!   - The displayed snapshot is always a complete snapshot: the current
//!     frame, or a blend of the current frame and the transition target.
//!   - Every observable change is appended to the event outbox.

use crate::{
    clock::PlaybackClock,
    command::{ControlKey, ViewerCommand},
    config::ViewerConfig,
    entity::{pick, resolve, wormhole_partner, Entity, EntityKind, EntityRef},
    error::ObserverResult,
    event::{event_type_name, StopReason, ViewerEvent},
    frame_store::{FrameStore, StepDirection},
    interpolation::{interpolate, Transition},
    snapshot::{frames_from_json, Snapshot},
    summary::{self, PlayerSummary, SelectionStatus, TimelineStatus},
    types::{FrameIndex, Millis, Vec2},
};
use std::borrow::Cow;

pub struct ObserverEngine {
    pub config: ViewerConfig,
    frames:     FrameStore,
    clock:      PlaybackClock,
    transition: Transition,
    selection:  Option<EntityRef>,
    events:     Vec<ViewerEvent>,
}

impl ObserverEngine {
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            clock:      PlaybackClock::new(config.playback_speed_ms),
            transition: Transition::new(config.transition_duration_ms, config.interpolation_enabled),
            frames:     FrameStore::new(),
            selection:  None,
            events:     Vec::new(),
            config,
        }
    }

    /// Build an engine with default config and `frames` already loaded.
    pub fn with_frames(frames: Vec<Snapshot>) -> ObserverResult<Self> {
        let mut engine = Self::new(ViewerConfig::default());
        engine.load(frames)?;
        Ok(engine)
    }

    // ── Loading ────────────────────────────────────────────────────

    /// Replace the replay. Playback stops, the index rewinds to 0, and
    /// selection and transition state are cleared. A malformed sequence
    /// is rejected and leaves the engine untouched.
    pub fn load(&mut self, frames: Vec<Snapshot>) -> ObserverResult<()> {
        let count = frames.len();
        if let Err(err) = self.frames.load(frames) {
            log::warn!("Rejected replay of {count} frames: {err}");
            return Err(err);
        }

        if self.clock.is_playing() {
            self.clock.stop();
            self.emit(ViewerEvent::PlaybackStopped { index: 0, reason: StopReason::DataReloaded });
        }
        self.transition.reset(0);
        self.set_selection(None);

        log::info!("Loaded {count} frames");
        self.emit(ViewerEvent::DataLoaded { frames: count });
        if count > 0 {
            self.emit(ViewerEvent::FrameChanged { index: 0 });
        }
        Ok(())
    }

    pub fn load_json(&mut self, json: &str) -> ObserverResult<()> {
        let frames = frames_from_json(json)?;
        self.load(frames)
    }

    // ── Reads ──────────────────────────────────────────────────────

    pub fn current_index(&self) -> FrameIndex {
        self.frames.current_index()
    }

    pub fn total_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn is_playing(&self) -> bool {
        self.clock.is_playing()
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.enabled && self.transition.in_flight()
    }

    pub fn interpolation_enabled(&self) -> bool {
        self.transition.enabled
    }

    pub fn frames(&self) -> &FrameStore {
        &self.frames
    }

    pub fn clock(&self) -> &PlaybackClock {
        &self.clock
    }

    pub fn transition(&self) -> &Transition {
        &self.transition
    }

    pub fn selection(&self) -> Option<EntityRef> {
        self.selection
    }

    /// The discrete snapshot at the current index.
    pub fn current_snapshot(&self) -> Option<&Snapshot> {
        self.frames.current_snapshot()
    }

    /// What the renderer should draw right now: the current frame, or a
    /// blend towards the transition target while one is mid-flight.
    pub fn displayed_snapshot(&self) -> Option<Cow<'_, Snapshot>> {
        let current = self.frames.current_snapshot()?;
        let blended = self
            .transition
            .blend_ratio()
            .zip(self.frames.get(self.transition.target))
            .map(|(t, target)| interpolate(current, target, t));

        Some(match blended {
            Some(snapshot) => Cow::Owned(snapshot),
            None => Cow::Borrowed(current),
        })
    }

    /// The selection resolved against the displayed snapshot.
    pub fn displayed_selection(&self) -> Option<Entity> {
        let reference = self.selection?;
        let snapshot = self.displayed_snapshot()?;
        resolve(&snapshot, reference)
    }

    /// Endpoints of the selected wormhole's link in the displayed
    /// snapshot, when its partner is present there.
    pub fn selected_wormhole_link(&self) -> Option<(Vec2, Vec2)> {
        let reference = self.selection.filter(|r| r.kind == EntityKind::Wormhole)?;
        let snapshot = self.displayed_snapshot()?;
        let wormhole = snapshot.wormholes.iter().find(|w| w.id == reference.id)?;
        wormhole_partner(&snapshot, wormhole).map(|partner| (wormhole.position, partner.position))
    }

    pub fn selection_status(&self) -> SelectionStatus {
        match self.selection {
            None => SelectionStatus::NoSelection,
            Some(reference) => match self.displayed_selection() {
                Some(entity) => SelectionStatus::Found { entity },
                None => SelectionStatus::NotFound { reference },
            },
        }
    }

    pub fn status(&self) -> TimelineStatus {
        TimelineStatus {
            current_index:         self.current_index(),
            total_frames:          self.total_frames(),
            label:                 summary::frame_label(self.current_index(), self.total_frames()),
            is_playing:            self.is_playing(),
            can_play:              self.total_frames() > 1,
            is_transitioning:      self.is_transitioning(),
            transition_progress:   self.transition.progress(),
            speed_ms:              self.clock.speed_ms,
            interpolation_enabled: self.transition.enabled,
        }
    }

    /// Player panels follow the discrete frame; players never blend.
    pub fn player_summaries(&self) -> Vec<PlayerSummary> {
        self.current_snapshot()
            .map(summary::player_summaries)
            .unwrap_or_default()
    }

    // ── Playback ───────────────────────────────────────────────────

    pub fn play(&mut self) {
        if self.frames.len() <= 1 {
            log::debug!("play ignored: {} frame(s) loaded", self.frames.len());
            return;
        }
        if self.clock.is_playing() {
            return;
        }
        if self.frames.is_at_last() && !self.transition.in_flight() {
            log::debug!("play ignored: already at the last frame");
            return;
        }
        self.clock.start();
        log::info!(
            "Playback started at frame {} ({}ms per frame)",
            self.current_index(),
            self.clock.speed_ms
        );
        self.emit(ViewerEvent::PlaybackStarted { index: self.current_index() });
    }

    /// Stop playback. An in-flight transition is completed on the spot.
    pub fn pause(&mut self) {
        let was_playing = self.clock.is_playing();
        self.clock.stop();
        if let Some(target) = self.settle_transition() {
            self.emit(ViewerEvent::TransitionCompleted { index: target });
        }
        if was_playing {
            log::info!("Playback paused at frame {}", self.current_index());
            self.emit(ViewerEvent::PlaybackStopped {
                index:  self.current_index(),
                reason: StopReason::Paused,
            });
        }
    }

    pub fn toggle_play_pause(&mut self) {
        if self.clock.is_playing() {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Change the playback interval. Zero is ignored.
    pub fn set_speed(&mut self, speed_ms: u64) {
        if speed_ms == 0 {
            log::warn!("Ignoring playback speed of 0ms");
            return;
        }
        self.clock.set_speed(speed_ms);
        log::debug!("Playback speed set to {speed_ms}ms");
        self.emit(ViewerEvent::SpeedChanged { speed_ms });
    }

    /// Playback poll. Feeds `delta` into the playback clock and advances
    /// one frame each time a full interval elapses. Reaching an interval
    /// at the last frame stops playback. An in-flight transition keeps
    /// its target and progress. Returns whether the index moved.
    pub fn tick_playback(&mut self, delta: Millis) -> bool {
        if !self.clock.tick(delta) {
            return false;
        }

        if self.frames.is_at_last() {
            self.clock.stop();
            log::info!("Playback reached the last frame ({})", self.current_index());
            self.emit(ViewerEvent::PlaybackStopped {
                index:  self.current_index(),
                reason: StopReason::EndOfSequence,
            });
            return false;
        }

        let next = self.current_index() + 1;
        if !self.frames.set_index(next) {
            return false;
        }
        self.emit(ViewerEvent::FrameChanged { index: next });
        if self.transition.rebase(next) {
            log::debug!("Playback reached the transition target {next}");
            self.emit(ViewerEvent::TransitionCompleted { index: next });
        }
        true
    }

    /// Render-loop update for the smooth transition. Returns true on
    /// the call that completes it.
    pub fn update_transition(&mut self, delta: Millis) -> bool {
        match self.transition.advance(delta) {
            Some(target) => {
                self.move_to(target);
                log::debug!("Transition completed at frame {target}");
                self.emit(ViewerEvent::TransitionCompleted { index: target });
                true
            }
            None => false,
        }
    }

    // ── Navigation ─────────────────────────────────────────────────

    /// Navigate to `index`, smoothly when interpolation is enabled.
    /// A transition already in flight is overwritten: the index stays
    /// put, the new target replaces the old one and progress restarts.
    /// Seeking back to the current index cancels it. Out-of-range
    /// requests are ignored. Returns whether anything changed.
    pub fn seek(&mut self, index: FrameIndex) -> bool {
        if !self.frames.contains(index) {
            log::debug!("seek to {index} ignored ({} frames)", self.frames.len());
            return false;
        }
        if self.transition.in_flight() && self.transition.target == index {
            return true;
        }

        let from = self.current_index();
        let abandoned = self.transition.in_flight().then_some(self.transition.target);
        if let Some(pending) = abandoned {
            log::debug!("Transition to {pending} abandoned for {index}");
            self.emit(ViewerEvent::TransitionAbandoned { index: pending });
        }

        if index == from {
            self.transition.reset(from);
            return abandoned.is_some();
        }
        if !self.transition.enabled {
            return self.move_to(index);
        }

        self.transition.begin(from, index);
        log::debug!("Transition {from} -> {index} started");
        self.emit(ViewerEvent::TransitionStarted { from, to: index });
        true
    }

    /// One frame in `direction` from the current index. Returns whether
    /// movement occurred.
    pub fn step(&mut self, direction: StepDirection) -> bool {
        match direction.apply(self.current_index(), self.frames.len()) {
            Some(next) => self.seek(next),
            None => false,
        }
    }

    pub fn step_forward(&mut self) -> bool {
        self.step(StepDirection::Forward)
    }

    pub fn step_back(&mut self) -> bool {
        self.step(StepDirection::Back)
    }

    pub fn first_frame(&mut self) -> bool {
        self.seek(0)
    }

    pub fn last_frame(&mut self) -> bool {
        match self.frames.last_index() {
            Some(last) => self.seek(last),
            None => false,
        }
    }

    /// Slider-style jump: applied at once, abandoning any transition.
    pub fn scrub(&mut self, index: FrameIndex) -> bool {
        if !self.frames.contains(index) {
            return false;
        }
        if self.transition.in_flight() {
            let pending = self.transition.target;
            self.emit(ViewerEvent::TransitionAbandoned { index: pending });
        }
        self.move_to(index)
    }

    /// Turning interpolation off snaps an in-flight transition to its
    /// target.
    pub fn set_interpolation_enabled(&mut self, enabled: bool) {
        if self.transition.enabled == enabled {
            return;
        }
        if !enabled {
            if let Some(target) = self.settle_transition() {
                log::debug!("Transition abandoned; snapped to frame {target}");
                self.emit(ViewerEvent::TransitionAbandoned { index: target });
            }
        }
        self.transition.enabled = enabled;
        self.emit(ViewerEvent::InterpolationToggled { enabled });
    }

    // ── Selection ──────────────────────────────────────────────────

    /// Pick against the displayed snapshot. A miss clears the selection.
    pub fn select_at(&mut self, point: Vec2) -> Option<EntityRef> {
        let picked = self.displayed_snapshot().and_then(|s| pick(&s, point));
        self.set_selection(picked);
        picked
    }

    pub fn select(&mut self, reference: EntityRef) {
        self.set_selection(Some(reference));
    }

    pub fn clear_selection(&mut self) {
        self.set_selection(None);
    }

    // ── Commands and events ────────────────────────────────────────

    pub fn submit_command(&mut self, command: ViewerCommand) {
        log::debug!("command: {command:?}");
        match command {
            ViewerCommand::Play                          => self.play(),
            ViewerCommand::Pause                         => self.pause(),
            ViewerCommand::TogglePlayPause               => self.toggle_play_pause(),
            ViewerCommand::SetSpeed { speed_ms }         => self.set_speed(speed_ms),
            ViewerCommand::StepForward                   => { self.step_forward(); }
            ViewerCommand::StepBack                      => { self.step_back(); }
            ViewerCommand::FirstFrame                    => { self.first_frame(); }
            ViewerCommand::LastFrame                     => { self.last_frame(); }
            ViewerCommand::Seek { index }                => { self.seek(index); }
            ViewerCommand::Scrub { index }               => { self.scrub(index); }
            ViewerCommand::SetInterpolation { enabled }  => self.set_interpolation_enabled(enabled),
            ViewerCommand::SelectAt { x, y }             => { self.select_at(Vec2::new(x, y)); }
            ViewerCommand::ClearSelection                => self.clear_selection(),
        }
    }

    pub fn handle_key(&mut self, key: ControlKey) {
        self.submit_command(key.command());
    }

    pub fn drain_events(&mut self) -> Vec<ViewerEvent> {
        std::mem::take(&mut self.events)
    }

    // ── Internals ──────────────────────────────────────────────────

    /// Write the index and rest the transition there.
    fn move_to(&mut self, index: FrameIndex) -> bool {
        let before = self.frames.current_index();
        if !self.frames.set_index(index) {
            return false;
        }
        self.transition.reset(index);
        if before != index {
            self.emit(ViewerEvent::FrameChanged { index });
        }
        true
    }

    /// Force an in-flight transition to its target. Returns that target.
    fn settle_transition(&mut self) -> Option<FrameIndex> {
        let target = self.transition.finish_now()?;
        self.move_to(target);
        Some(target)
    }

    fn set_selection(&mut self, selection: Option<EntityRef>) {
        if self.selection != selection {
            self.selection = selection;
            self.emit(ViewerEvent::SelectionChanged { selection });
        }
    }

    fn emit(&mut self, event: ViewerEvent) {
        log::trace!("event {}", event_type_name(&event));
        self.events.push(event);
    }
}

impl Default for ObserverEngine {
    fn default() -> Self {
        Self::new(ViewerConfig::default())
    }
}
