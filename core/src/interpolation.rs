//! Interpolation engine: blended snapshots between two discrete frames.
//!
//! Entities are matched by id across the two snapshots:
//!   - present on both sides: continuous fields are blended, every
//!     discrete field is copied from the source;
//!   - source only: shown fading out during the first half (t < 0.5);
//!   - target only: shown fading in during the second half (t >= 0.5).
//!
//! Players and wormholes are never blended; they are copied from the
//! source. The id maps are rebuilt on every call.

use crate::{
    snapshot::{Asteroid, Fade, FadeDirection, Ship, Snapshot},
    types::{lerp, EntityId, FrameIndex, Millis},
};
use serde::Serialize;
use std::collections::HashMap;

pub const DEFAULT_TRANSITION_MS: Millis = 500.0;

/// Entity kinds that take part in blending.
pub trait Blend: Clone {
    fn entity_id(&self) -> EntityId;

    /// Blend towards `target` at ratio `t`.
    fn blend(&self, target: &Self, t: f64) -> Self;

    fn faded(&self, fade: Fade) -> Self;
}

impl Blend for Ship {
    fn entity_id(&self) -> EntityId {
        self.id
    }

    fn blend(&self, target: &Self, t: f64) -> Self {
        Ship {
            position: self.position.lerp(target.position, t),
            vector:   self.vector.lerp(target.vector, t),
            health:   lerp(self.health as f64, target.health as f64, t).round() as i64,
            fuel:     lerp(self.fuel, target.fuel, t).round(),
            cargo:    lerp(self.cargo as f64, target.cargo as f64, t).round() as i64,
            ..self.clone()
        }
    }

    fn faded(&self, fade: Fade) -> Self {
        Ship { fade: Some(fade), ..self.clone() }
    }
}

impl Blend for Asteroid {
    fn entity_id(&self) -> EntityId {
        self.id
    }

    fn blend(&self, target: &Self, t: f64) -> Self {
        Asteroid {
            position: self.position.lerp(target.position, t),
            ..self.clone()
        }
    }

    fn faded(&self, fade: Fade) -> Self {
        Asteroid { fade: Some(fade), ..self.clone() }
    }
}

/// Blend one entity list. Output order: source ids in source order,
/// then target-only ids in target order.
pub fn interpolate_entities<E: Blend>(source: &[E], target: &[E], t: f64) -> Vec<E> {
    let source_ids: HashMap<EntityId, &E> = source.iter().map(|e| (e.entity_id(), e)).collect();
    let target_ids: HashMap<EntityId, &E> = target.iter().map(|e| (e.entity_id(), e)).collect();

    let mut blended = Vec::with_capacity(source.len().max(target.len()));

    for entity in source {
        match target_ids.get(&entity.entity_id()) {
            Some(matched) => blended.push(entity.blend(matched, t)),
            None if t < 0.5 => blended.push(entity.faded(Fade {
                direction: FadeDirection::Out,
                alpha:     1.0 - 2.0 * t,
            })),
            None => {}
        }
    }

    if t >= 0.5 {
        let arriving = target
            .iter()
            .filter(|e| !source_ids.contains_key(&e.entity_id()))
            .map(|e| {
                e.faded(Fade {
                    direction: FadeDirection::In,
                    alpha:     2.0 * (t - 0.5),
                })
            });
        blended.extend(arriving);
    }

    blended
}

/// Synthesize the snapshot shown at ratio `t` between `source` and
/// `target`. `t <= 0` yields the source unchanged; `t >= 1` yields the
/// target's ships and asteroids unchanged.
pub fn interpolate(source: &Snapshot, target: &Snapshot, t: f64) -> Snapshot {
    if t.is_nan() || t <= 0.0 {
        return source.clone();
    }
    if t >= 1.0 {
        return Snapshot {
            ships:     target.ships.clone(),
            asteroids: target.asteroids.clone(),
            ..source.clone()
        };
    }

    Snapshot {
        players:   source.players.clone(),
        ships:     interpolate_entities(&source.ships, &target.ships, t),
        asteroids: interpolate_entities(&source.asteroids, &target.asteroids, t),
        wormholes: source.wormholes.clone(),
        radius:    source.radius,
    }
}

/// Interpolation state: a smooth transition between two frame indices.
///
/// RULE: progress is advanced only by `advance`, fed from the host's
/// render loop. It is independent of the playback clock.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transition {
    pub source:  FrameIndex,
    pub target:  FrameIndex,
    progress:    f64,
    pub enabled: bool,
    duration_ms: Millis,
}

impl Transition {
    pub fn new(duration_ms: Millis, enabled: bool) -> Self {
        Self {
            source: 0,
            target: 0,
            progress: 0.0,
            enabled,
            duration_ms,
        }
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn duration_ms(&self) -> Millis {
        self.duration_ms
    }

    pub fn in_flight(&self) -> bool {
        self.source != self.target
    }

    /// Rest at `index` with nothing pending.
    pub fn reset(&mut self, index: FrameIndex) {
        self.source = index;
        self.target = index;
        self.progress = 0.0;
    }

    /// Overwrite any previous transition; stale progress is discarded.
    pub fn begin(&mut self, source: FrameIndex, target: FrameIndex) {
        self.source = source;
        self.target = target;
        self.progress = 0.0;
    }

    /// Move the source under an in-flight transition, keeping its target
    /// and progress. Returns true when the new source is the target, in
    /// which case the transition has landed and rests there.
    pub fn rebase(&mut self, source: FrameIndex) -> bool {
        if !self.in_flight() || source == self.target {
            let landed = self.in_flight();
            self.reset(source);
            return landed;
        }
        self.source = source;
        false
    }

    /// The ratio to blend at, or `None` while the displayed state is
    /// simply the source frame.
    pub fn blend_ratio(&self) -> Option<f64> {
        let mid_flight = self.progress > 0.0 && self.progress < 1.0;
        (self.enabled && self.in_flight() && mid_flight).then_some(self.progress)
    }

    /// Advance by a wall-clock delta. Returns the target once the
    /// transition completes; the state then rests at that target.
    pub fn advance(&mut self, delta: Millis) -> Option<FrameIndex> {
        if !self.enabled || !self.in_flight() {
            return None;
        }
        self.progress += if self.duration_ms > 0.0 {
            delta.max(0.0) / self.duration_ms
        } else {
            1.0
        };
        if self.progress >= 1.0 {
            let target = self.target;
            self.reset(target);
            return Some(target);
        }
        None
    }

    /// Cut the transition short. Returns the pending target, if any.
    pub fn finish_now(&mut self) -> Option<FrameIndex> {
        if !self.in_flight() {
            self.progress = 0.0;
            return None;
        }
        let target = self.target;
        self.reset(target);
        Some(target)
    }
}

impl Default for Transition {
    fn default() -> Self {
        Self::new(DEFAULT_TRANSITION_MS, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completes_after_full_duration() {
        let mut transition = Transition::default();
        transition.begin(0, 3);
        assert_eq!(transition.advance(250.0), None);
        assert_eq!(transition.blend_ratio(), Some(0.5));
        assert_eq!(transition.advance(250.0), Some(3));
        assert!(!transition.in_flight());
        assert_eq!(transition.progress(), 0.0);
        assert_eq!(transition.source, 3);
    }

    #[test]
    fn fresh_transition_shows_source() {
        let mut transition = Transition::default();
        transition.begin(1, 2);
        assert_eq!(transition.blend_ratio(), None);
    }

    #[test]
    fn rebase_keeps_target_and_progress() {
        let mut transition = Transition::default();
        transition.begin(0, 3);
        transition.advance(100.0);

        assert!(!transition.rebase(1));
        assert_eq!((transition.source, transition.target), (1, 3));
        assert!((transition.progress() - 0.2).abs() < 1e-9);

        assert!(transition.rebase(3));
        assert!(!transition.in_flight());
        assert_eq!(transition.progress(), 0.0);
    }

    #[test]
    fn rebase_at_rest_just_moves() {
        let mut transition = Transition::default();
        assert!(!transition.rebase(2));
        assert_eq!((transition.source, transition.target), (2, 2));
    }

    #[test]
    fn begin_discards_stale_progress() {
        let mut transition = Transition::default();
        transition.begin(0, 1);
        transition.advance(400.0);
        transition.begin(1, 2);
        assert_eq!(transition.progress(), 0.0);
        assert_eq!(transition.advance(100.0), None);
        assert!((transition.progress() - 0.2).abs() < 1e-9);
    }

    #[test]
    fn disabled_transition_does_not_advance() {
        let mut transition = Transition::new(500.0, false);
        transition.begin(0, 1);
        assert_eq!(transition.advance(1_000.0), None);
        assert_eq!(transition.blend_ratio(), None);
        assert_eq!(transition.finish_now(), Some(1));
    }

    #[test]
    fn zero_duration_completes_on_first_advance() {
        let mut transition = Transition::new(0.0, true);
        transition.begin(0, 1);
        assert_eq!(transition.advance(0.0), Some(1));
    }
}
