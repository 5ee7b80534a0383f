//! Playback clock: play mode plus the interval accumulator that paces
//! discrete frame advancement.
//!
//! RULE: this clock is advanced only by the playback poll
//! (`ObserverEngine::tick_playback`). Transition progress has its own
//! clock in `interpolation::Transition` and never touches this one.

use crate::types::Millis;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PLAYBACK_SPEED_MS: u64 = 1000;

/// Recommended playback poll cadence (~60 polls per second).
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 16;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackMode {
    Stopped,
    Playing,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaybackClock {
    pub mode:     PlaybackMode,
    /// Wall-clock time each frame stays on screen during playback.
    pub speed_ms: u64,
    accumulated:  Millis,
}

impl PlaybackClock {
    pub fn new(speed_ms: u64) -> Self {
        Self {
            mode:        PlaybackMode::Stopped,
            speed_ms:    speed_ms.max(1),
            accumulated: 0.0,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.mode == PlaybackMode::Playing
    }

    pub fn accumulated_ms(&self) -> Millis {
        self.accumulated
    }

    pub fn start(&mut self) {
        self.mode = PlaybackMode::Playing;
        self.accumulated = 0.0;
    }

    pub fn stop(&mut self) {
        self.mode = PlaybackMode::Stopped;
        self.accumulated = 0.0;
    }

    /// Change the interval. A running clock restarts its cycle.
    pub fn set_speed(&mut self, speed_ms: u64) {
        self.speed_ms = speed_ms;
        if self.is_playing() {
            self.accumulated = 0.0;
        }
    }

    /// Accumulate `delta` while playing. Returns true when a full
    /// interval has elapsed; the accumulator then restarts from zero.
    pub fn tick(&mut self, delta: Millis) -> bool {
        if !self.is_playing() {
            return false;
        }
        self.accumulated += delta.max(0.0);
        if self.accumulated >= self.speed_ms as Millis {
            self.accumulated = 0.0;
            return true;
        }
        false
    }
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self::new(DEFAULT_PLAYBACK_SPEED_MS)
    }
}
