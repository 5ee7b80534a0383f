//! Snapshot data model: one captured instant of the game.
//!
//! Snapshots arrive pre-recorded from the game server and are never
//! mutated once loaded. The only synthetic snapshots are the blended
//! ones built by the interpolation engine, which mark partially visible
//! entities with a `Fade`.
//!
//! Replay arrays may contain `null` where an entity slot was vacated;
//! those placeholders are discarded while parsing, so every list held
//! here contains real entities only.

use crate::{
    entity::EntityKind,
    error::{ObserverError, ObserverResult},
    types::{EntityId, FrameIndex, PlayerId, Vec2},
};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub players: Vec<Player>,
    #[serde(deserialize_with = "without_nulls")]
    pub ships: Vec<Ship>,
    #[serde(deserialize_with = "without_nulls")]
    pub asteroids: Vec<Asteroid>,
    #[serde(deserialize_with = "without_nulls")]
    pub wormholes: Vec<Wormhole>,
    /// Half-width of the square play area, centred on the origin.
    pub radius: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id:    PlayerId,
    pub name:  String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub rock:  f64,
    #[serde(default)]
    pub fuel:  f64,
    #[serde(default = "alive_by_default")]
    pub alive: bool,
    #[serde(default)]
    pub score: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ship {
    pub id:       EntityId,
    pub player:   PlayerId,
    pub position: Vec2,
    /// Velocity applied each game turn.
    pub vector:   Vec2,
    pub health:   i64,
    pub fuel:     f64,
    #[serde(alias = "rock")]
    pub cargo:    i64,
    #[serde(rename = "type")]
    pub class:    ShipClass,
    #[serde(default)]
    pub is_destroyed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fade:     Option<Fade>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asteroid {
    pub id:       EntityId,
    pub position: Vec2,
    pub size:     f64,
    #[serde(rename = "type")]
    pub kind:     i64,
    /// Owning player; the server writes `-1` for unowned rocks.
    #[serde(default)]
    pub owner_id: Option<PlayerId>,
    #[serde(default)]
    pub surface:  Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fade:     Option<Fade>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wormhole {
    pub id:        EntityId,
    pub target_id: EntityId,
    pub position:  Vec2,
}

/// Ship classes in server wire order. Append only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ShipClass {
    Mothership = 0,
    Sucker     = 1,
    Drill      = 2,
    Tanker     = 3,
    Truck      = 4,
    Battleship = 5,
}

impl ShipClass {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Mothership => "mothership",
            Self::Sucker     => "sucker",
            Self::Drill      => "drill",
            Self::Tanker     => "tanker",
            Self::Truck      => "truck",
            Self::Battleship => "battleship",
        }
    }
}

impl TryFrom<u8> for ShipClass {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Mothership),
            1 => Ok(Self::Sucker),
            2 => Ok(Self::Drill),
            3 => Ok(Self::Tanker),
            4 => Ok(Self::Truck),
            5 => Ok(Self::Battleship),
            other => Err(format!("unknown ship class {other}")),
        }
    }
}

impl From<ShipClass> for u8 {
    fn from(class: ShipClass) -> u8 {
        class as u8
    }
}

/// Partial visibility of an entity that exists on one side of a
/// transition only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fade {
    pub direction: FadeDirection,
    /// 1.0 fully opaque, 0.0 invisible.
    pub alpha:     f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FadeDirection {
    In,
    Out,
}

fn alive_by_default() -> bool {
    true
}

fn without_nulls<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let entries: Option<Vec<Option<T>>> = Option::deserialize(deserializer)?;
    Ok(entries.unwrap_or_default().into_iter().flatten().collect())
}

impl Snapshot {
    pub fn new(radius: f64) -> Self {
        Self {
            players:   Vec::new(),
            ships:     Vec::new(),
            asteroids: Vec::new(),
            wormholes: Vec::new(),
            radius,
        }
    }

    pub fn with_player(mut self, player: Player) -> Self {
        self.players.push(player);
        self
    }

    pub fn with_ship(mut self, ship: Ship) -> Self {
        self.ships.push(ship);
        self
    }

    pub fn with_asteroid(mut self, asteroid: Asteroid) -> Self {
        self.asteroids.push(asteroid);
        self
    }

    pub fn with_wormhole(mut self, wormhole: Wormhole) -> Self {
        self.wormholes.push(wormhole);
        self
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    /// Structural checks for a single frame. Cross-frame checks live in
    /// `validate_sequence`.
    pub fn validate(&self, frame: FrameIndex) -> ObserverResult<()> {
        if !self.radius.is_finite() || self.radius < 0.0 {
            return Err(ObserverError::malformed(
                frame,
                format!("play-area radius {} is not a finite non-negative number", self.radius),
            ));
        }

        ensure_unique_ids(frame, EntityKind::Ship, self.ships.iter().map(|s| s.id))?;
        ensure_unique_ids(frame, EntityKind::Asteroid, self.asteroids.iter().map(|a| a.id))?;
        ensure_unique_ids(frame, EntityKind::Wormhole, self.wormholes.iter().map(|w| w.id))?;

        for ship in &self.ships {
            if !ship.position.is_finite() || !ship.vector.is_finite() || !ship.fuel.is_finite() {
                return Err(ObserverError::malformed(
                    frame,
                    format!("ship {} has non-finite position, vector or fuel", ship.id),
                ));
            }
        }
        for asteroid in &self.asteroids {
            if !asteroid.position.is_finite() || !asteroid.size.is_finite() || asteroid.size < 0.0 {
                return Err(ObserverError::malformed(
                    frame,
                    format!("asteroid {} has non-finite position or invalid size", asteroid.id),
                ));
            }
        }
        for wormhole in &self.wormholes {
            if !wormhole.position.is_finite() {
                return Err(ObserverError::malformed(
                    frame,
                    format!("wormhole {} has a non-finite position", wormhole.id),
                ));
            }
        }
        Ok(())
    }
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id,
            name:  name.into(),
            color: color.into(),
            rock:  0.0,
            fuel:  0.0,
            alive: true,
            score: 0,
        }
    }
}

impl Ship {
    pub fn new(id: EntityId, player: PlayerId, class: ShipClass, position: Vec2) -> Self {
        Self {
            id,
            player,
            position,
            vector:       Vec2::ZERO,
            health:       100,
            fuel:         0.0,
            cargo:        0,
            class,
            is_destroyed: false,
            fade:         None,
        }
    }
}

impl Asteroid {
    pub fn new(id: EntityId, position: Vec2, size: f64) -> Self {
        Self {
            id,
            position,
            size,
            kind:     0,
            owner_id: None,
            surface:  None,
            fade:     None,
        }
    }

    /// The owning player, treating the server's `-1` sentinel as unowned.
    pub fn owner(&self) -> Option<PlayerId> {
        self.owner_id.filter(|id| *id >= 0)
    }
}

impl Wormhole {
    pub fn new(id: EntityId, target_id: EntityId, position: Vec2) -> Self {
        Self { id, target_id, position }
    }
}

fn ensure_unique_ids(
    frame: FrameIndex,
    kind: EntityKind,
    ids: impl Iterator<Item = EntityId>,
) -> ObserverResult<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(ObserverError::malformed(
                frame,
                format!("duplicate {} id {id}", kind.label()),
            ));
        }
    }
    Ok(())
}

/// Validate every frame, then check that each wormhole pairs with a
/// wormhole id that exists somewhere in the sequence.
pub fn validate_sequence(frames: &[Snapshot]) -> ObserverResult<()> {
    for (frame, snapshot) in frames.iter().enumerate() {
        snapshot.validate(frame)?;
    }

    let known: HashSet<EntityId> = frames
        .iter()
        .flat_map(|s| s.wormholes.iter().map(|w| w.id))
        .collect();

    for (frame, snapshot) in frames.iter().enumerate() {
        if let Some(orphan) = snapshot.wormholes.iter().find(|w| !known.contains(&w.target_id)) {
            return Err(ObserverError::malformed(
                frame,
                format!(
                    "wormhole {} targets wormhole {} which never appears in the replay",
                    orphan.id, orphan.target_id
                ),
            ));
        }
    }
    Ok(())
}

/// Parse a replay: a JSON array with one snapshot object per frame.
/// Shape errors inside a frame are reported against that frame's index.
pub fn frames_from_json(json: &str) -> ObserverResult<Vec<Snapshot>> {
    let raw: Vec<serde_json::Value> = serde_json::from_str(json)?;
    raw.into_iter()
        .enumerate()
        .map(|(frame, value)| {
            serde_json::from_value(value)
                .map_err(|e| ObserverError::malformed(frame, e.to_string()))
        })
        .collect()
}
