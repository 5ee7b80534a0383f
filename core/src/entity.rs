//! Entity resolver: picking and re-finding entities by identity.
//!
//! A selection is held as an `EntityRef` (kind + id), never as a borrowed
//! entity, so it survives frame changes and blended snapshots. Resolving
//! a reference that is absent from a snapshot yields `None`; that is a
//! normal state (the entity was destroyed, or not yet built).

use crate::{
    snapshot::{Asteroid, Ship, Snapshot, Wormhole},
    types::{EntityId, Vec2},
};
use serde::{Deserialize, Serialize};

/// Ships are hit within a fixed radius of their centre.
pub const SHIP_PICK_RADIUS: f64 = 50.0;
/// Asteroids are hit within their own size plus this margin.
pub const ASTEROID_PICK_MARGIN: f64 = 10.0;
pub const WORMHOLE_PICK_RADIUS: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Ship,
    Asteroid,
    Wormhole,
}

impl EntityKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ship     => "ship",
            Self::Asteroid => "asteroid",
            Self::Wormhole => "wormhole",
        }
    }
}

/// Identity of a logical entity, independent of the displayed snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id:   EntityId,
}

impl EntityRef {
    pub fn new(kind: EntityKind, id: EntityId) -> Self {
        Self { kind, id }
    }
}

/// A resolved entity with its kind-specific payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Entity {
    Ship(Ship),
    Asteroid(Asteroid),
    Wormhole(Wormhole),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Ship(_)     => EntityKind::Ship,
            Self::Asteroid(_) => EntityKind::Asteroid,
            Self::Wormhole(_) => EntityKind::Wormhole,
        }
    }

    pub fn id(&self) -> EntityId {
        match self {
            Self::Ship(s)     => s.id,
            Self::Asteroid(a) => a.id,
            Self::Wormhole(w) => w.id,
        }
    }

    pub fn position(&self) -> Vec2 {
        match self {
            Self::Ship(s)     => s.position,
            Self::Asteroid(a) => a.position,
            Self::Wormhole(w) => w.position,
        }
    }

    pub fn reference(&self) -> EntityRef {
        EntityRef::new(self.kind(), self.id())
    }
}

/// Find the entity under a world-space point.
///
/// Kinds are tested in fixed priority order: ships, then asteroids, then
/// wormholes. Within a kind the first entity in list order wins, even if
/// a later one is closer.
pub fn pick(snapshot: &Snapshot, point: Vec2) -> Option<EntityRef> {
    let ship = snapshot
        .ships
        .iter()
        .find(|s| s.position.distance(point) < SHIP_PICK_RADIUS)
        .map(|s| EntityRef::new(EntityKind::Ship, s.id));

    ship.or_else(|| {
        snapshot
            .asteroids
            .iter()
            .find(|a| a.position.distance(point) < a.size + ASTEROID_PICK_MARGIN)
            .map(|a| EntityRef::new(EntityKind::Asteroid, a.id))
    })
    .or_else(|| {
        snapshot
            .wormholes
            .iter()
            .find(|w| w.position.distance(point) < WORMHOLE_PICK_RADIUS)
            .map(|w| EntityRef::new(EntityKind::Wormhole, w.id))
    })
}

/// Look up `reference` in the snapshot's list for its kind.
pub fn resolve(snapshot: &Snapshot, reference: EntityRef) -> Option<Entity> {
    let id = reference.id;
    match reference.kind {
        EntityKind::Ship => snapshot
            .ships
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .map(Entity::Ship),
        EntityKind::Asteroid => snapshot
            .asteroids
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .map(Entity::Asteroid),
        EntityKind::Wormhole => snapshot
            .wormholes
            .iter()
            .find(|w| w.id == id)
            .cloned()
            .map(Entity::Wormhole),
    }
}

/// The partner a wormhole teleports to, if it is present in this snapshot.
pub fn wormhole_partner<'a>(snapshot: &'a Snapshot, wormhole: &Wormhole) -> Option<&'a Wormhole> {
    snapshot
        .wormholes
        .iter()
        .find(|w| w.id == wormhole.target_id && w.position != wormhole.position)
}
