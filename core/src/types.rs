//! Shared primitive types used across the entire observer.

use serde::{Deserialize, Serialize};

/// Position of a snapshot within the loaded frame sequence.
pub type FrameIndex = usize;

/// Stable entity identifier, unique per kind within one snapshot.
pub type EntityId = i64;

/// Player identifier as recorded by the game server.
pub type PlayerId = i64;

/// Wall-clock milliseconds. Hosts hand deltas in this unit.
pub type Millis = f64;

/// A 2D world-space point or vector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Vec2) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// Componentwise `self + (other - self) * t`.
    pub fn lerp(&self, other: Vec2, t: f64) -> Vec2 {
        Vec2 {
            x: lerp(self.x, other.x, t),
            y: lerp(self.y, other.y, t),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}
