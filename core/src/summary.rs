//! Read models for status and info collaborators: the timeline label,
//! per-player summaries and the selected-entity detail line.
//! Everything here is a pure read of engine state.

use crate::{
    entity::{Entity, EntityRef},
    snapshot::Snapshot,
    types::{FrameIndex, PlayerId},
};
use serde::Serialize;

pub const DEFAULT_PLAYER_COLOR: &str = "#ffffff";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineStatus {
    pub current_index:         FrameIndex,
    pub total_frames:          usize,
    pub label:                 String,
    pub is_playing:            bool,
    /// Play is only offered with more than one frame loaded.
    pub can_play:              bool,
    pub is_transitioning:      bool,
    pub transition_progress:   f64,
    pub speed_ms:              u64,
    pub interpolation_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSummary {
    pub id:     PlayerId,
    pub header: String,
    pub color:  String,
    pub rock:   f64,
    pub fuel:   f64,
    pub ships:  usize,
}

/// What the info panel shows for the current selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SelectionStatus {
    NoSelection,
    NotFound { reference: EntityRef },
    Found { entity: Entity },
}

impl SelectionStatus {
    pub fn detail_text(&self) -> String {
        match self {
            Self::NoSelection         => "Click on an entity to see details".to_string(),
            Self::NotFound { .. }     => "Selected entity not found in current frame".to_string(),
            Self::Found { entity }    => describe_entity(entity),
        }
    }
}

/// Frame counter, 1-based for display.
pub fn frame_label(index: FrameIndex, total: usize) -> String {
    if total == 0 {
        return "0 / 0".to_string();
    }
    format!("{} / {total}", index + 1)
}

pub fn player_color(snapshot: &Snapshot, id: PlayerId) -> &str {
    snapshot
        .player(id)
        .map(|p| p.color.as_str())
        .filter(|c| !c.trim().is_empty())
        .unwrap_or(DEFAULT_PLAYER_COLOR)
}

pub fn player_summaries(snapshot: &Snapshot) -> Vec<PlayerSummary> {
    snapshot
        .players
        .iter()
        .map(|player| PlayerSummary {
            id:     player.id,
            header: format!("{} ({})", player.name, player.id),
            color:  player_color(snapshot, player.id).to_string(),
            rock:   player.rock,
            fuel:   player.fuel,
            ships:  snapshot.ships.iter().filter(|s| s.player == player.id).count(),
        })
        .collect()
}

/// One-line description for the entity info panel.
pub fn describe_entity(entity: &Entity) -> String {
    let pos = entity.position();
    let mut parts = vec![
        format!("{} ID: {}", capitalize(entity.kind().label()), entity.id()),
    ];

    match entity {
        Entity::Ship(ship) => {
            parts.push(format!("P{}", ship.player.saturating_add(1)));
            parts.push(format!("Pos: ({}, {})", pos.x.round() as i64, pos.y.round() as i64));
            parts.push(format!("HP: {}", ship.health));
            parts.push(format!("Fuel: {}", ship.fuel));
            parts.push(format!("Type: {}", ship.class.label()));
            parts.push(format!("Cargo: {}", ship.cargo));
        }
        Entity::Asteroid(asteroid) => {
            parts.push(format!("Pos: ({}, {})", pos.x.round() as i64, pos.y.round() as i64));
            parts.push(format!("Size: {:.2}", asteroid.size));
            parts.push(format!("Type: {}", asteroid.kind));
            if let Some(owner) = asteroid.owner() {
                parts.push(format!("Owner: P{}", owner.saturating_add(1)));
            }
            if let Some(surface) = asteroid.surface {
                parts.push(format!("Surface: {surface}"));
            }
        }
        Entity::Wormhole(wormhole) => {
            parts.push(format!("Pos: ({}, {})", pos.x.round() as i64, pos.y.round() as i64));
            parts.push(format!("Target: {}", wormhole.target_id));
        }
    }

    parts.join(" | ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
