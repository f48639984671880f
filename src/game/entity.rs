//! Entity Table
//!
//! Live entities keyed by id. Capabilities are expressed as small traits;
//! an entity opts into position reads and writes by returning itself from
//! the matching accessor. Uses BTreeMap so iteration order is stable.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::time::Duration;
use serde::{Serialize, Deserialize};
use uuid::Uuid;

use crate::core::coord::{Coordinate, Direction};

// =============================================================================
// ENTITY ID
// =============================================================================

/// Stable unique entity identifier.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub Uuid);

impl EntityId {
    /// Fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Id from a fixed integer, for reproducible setups.
    pub const fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }

    /// Parse from the canonical UUID string.
    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // First group is enough to tell entities apart in logs
        let s = self.0.simple().to_string();
        write!(f, "EntityId({})", &s[..8])
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

// =============================================================================
// CAPABILITIES
// =============================================================================

/// Entity kind tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Controlled by a client or bot
    Player,
    /// Projectile in flight
    Laser,
    /// Anything registered from outside the crate
    Other,
}

/// Has a stable id.
pub trait Identifier {
    /// The entity's id.
    fn id(&self) -> EntityId;
}

/// Can report a position.
pub trait Positioner {
    /// Current position.
    fn position(&self) -> Coordinate;
}

/// Can be moved.
pub trait Mover {
    /// Overwrite the position.
    fn set_position(&mut self, position: Coordinate);
}

/// A table-owned entity.
pub trait Entity: Identifier + fmt::Debug + Send + Sync {
    /// Kind tag.
    fn kind(&self) -> EntityKind {
        EntityKind::Other
    }

    /// Position read capability, if any.
    fn as_positioner(&self) -> Option<&dyn Positioner> {
        None
    }

    /// Position write capability, if any.
    fn as_mover(&mut self) -> Option<&mut dyn Mover> {
        None
    }

    /// Downcast to a player.
    fn as_player(&self) -> Option<&Player> {
        None
    }

    /// Downcast to a laser.
    fn as_laser(&self) -> Option<&Laser> {
        None
    }

    /// Mutable downcast to a laser.
    fn as_laser_mut(&mut self) -> Option<&mut Laser> {
        None
    }

    /// Serializable copy for change payloads.
    fn snapshot(&self) -> EntitySnapshot {
        EntitySnapshot::Other {
            id: self.id(),
            position: self.as_positioner().map(Positioner::position),
        }
    }
}

impl<'a> dyn Entity + 'a {
    /// Position, when the entity has one.
    pub fn position(&self) -> Option<Coordinate> {
        self.as_positioner().map(Positioner::position)
    }

    /// Whether this is a player.
    pub fn is_player(&self) -> bool {
        self.kind() == EntityKind::Player
    }
}

// =============================================================================
// PLAYER
// =============================================================================

/// A player avatar.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Id
    pub id: EntityId,
    /// Position
    pub position: Coordinate,
    /// Display name
    pub name: String,
    /// Display glyph
    pub icon: char,
}

impl Player {
    /// New player with a random id.
    pub fn new(name: impl Into<String>, icon: char, position: Coordinate) -> Self {
        Self::with_id(EntityId::new(), name, icon, position)
    }

    /// New player with a given id.
    pub fn with_id(id: EntityId, name: impl Into<String>, icon: char, position: Coordinate) -> Self {
        Self {
            id,
            position,
            name: name.into(),
            icon,
        }
    }
}

impl Identifier for Player {
    fn id(&self) -> EntityId {
        self.id
    }
}

impl Positioner for Player {
    fn position(&self) -> Coordinate {
        self.position
    }
}

impl Mover for Player {
    fn set_position(&mut self, position: Coordinate) {
        self.position = position;
    }
}

impl Entity for Player {
    fn kind(&self) -> EntityKind {
        EntityKind::Player
    }

    fn as_positioner(&self) -> Option<&dyn Positioner> {
        Some(self)
    }

    fn as_mover(&mut self) -> Option<&mut dyn Mover> {
        Some(self)
    }

    fn as_player(&self) -> Option<&Player> {
        Some(self)
    }

    fn snapshot(&self) -> EntitySnapshot {
        EntitySnapshot::Player(self.clone())
    }
}

// =============================================================================
// LASER
// =============================================================================

/// A projectile travelling in a straight line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Laser {
    /// Id
    pub id: EntityId,
    /// Player that fired it
    pub owner: EntityId,
    /// Position
    pub position: Coordinate,
    /// Travel direction (never `Stop`)
    pub direction: Direction,
    /// Time in flight
    pub age: Duration,
    /// Cells travelled so far
    pub steps: u32,
}

impl Laser {
    /// New laser at its spawn cell.
    pub fn new(owner: EntityId, position: Coordinate, direction: Direction) -> Self {
        Self {
            id: EntityId::new(),
            owner,
            position,
            direction,
            age: Duration::ZERO,
            steps: 0,
        }
    }

    /// Steps the laser should have taken by now at `speed` cells per second.
    pub fn due_steps(&self, speed: u32) -> u32 {
        let due = self.age.as_millis() * u128::from(speed) / 1000;
        u32::try_from(due).unwrap_or(u32::MAX)
    }
}

impl Identifier for Laser {
    fn id(&self) -> EntityId {
        self.id
    }
}

impl Positioner for Laser {
    fn position(&self) -> Coordinate {
        self.position
    }
}

impl Mover for Laser {
    fn set_position(&mut self, position: Coordinate) {
        self.position = position;
    }
}

impl Entity for Laser {
    fn kind(&self) -> EntityKind {
        EntityKind::Laser
    }

    fn as_positioner(&self) -> Option<&dyn Positioner> {
        Some(self)
    }

    fn as_mover(&mut self) -> Option<&mut dyn Mover> {
        Some(self)
    }

    fn as_laser(&self) -> Option<&Laser> {
        Some(self)
    }

    fn as_laser_mut(&mut self) -> Option<&mut Laser> {
        Some(self)
    }

    fn snapshot(&self) -> EntitySnapshot {
        EntitySnapshot::Laser(self.clone())
    }
}

// =============================================================================
// SNAPSHOT
// =============================================================================

/// Owned copy of an entity, carried by changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntitySnapshot {
    /// A player
    Player(Player),
    /// A laser
    Laser(Laser),
    /// Foreign entity
    Other {
        /// Id
        id: EntityId,
        /// Position, if it has one
        position: Option<Coordinate>,
    },
}

impl EntitySnapshot {
    /// Id of the captured entity.
    pub fn id(&self) -> EntityId {
        match self {
            EntitySnapshot::Player(p) => p.id,
            EntitySnapshot::Laser(l) => l.id,
            EntitySnapshot::Other { id, .. } => *id,
        }
    }
}

// =============================================================================
// TABLE
// =============================================================================

/// All live entities, keyed by id.
#[derive(Debug, Default)]
pub struct EntityTable {
    entities: BTreeMap<EntityId, Box<dyn Entity>>,
}

impl EntityTable {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace. Returns the replaced entity.
    pub fn insert(&mut self, entity: Box<dyn Entity>) -> Option<Box<dyn Entity>> {
        self.entities.insert(entity.id(), entity)
    }

    /// Lookup by id.
    pub fn get(&self, id: EntityId) -> Option<&dyn Entity> {
        self.entities.get(&id).map(|e| e.as_ref())
    }

    /// Mutable lookup by id.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut (dyn Entity + 'static)> {
        self.entities.get_mut(&id).map(|e| e.as_mut())
    }

    /// Remove by id. Absent ids are a no-op.
    pub fn remove(&mut self, id: EntityId) -> Option<Box<dyn Entity>> {
        self.entities.remove(&id)
    }

    /// Is this id present?
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Number of entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Is the table empty?
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// All entities in id order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Entity> {
        self.entities.values().map(|e| e.as_ref())
    }

    /// Players in id order.
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.entities.values().filter_map(|e| e.as_player())
    }

    /// Lasers in id order.
    pub fn lasers(&self) -> impl Iterator<Item = &Laser> {
        self.entities.values().filter_map(|e| e.as_laser())
    }

    /// Player ids in id order.
    pub fn player_ids(&self) -> Vec<EntityId> {
        self.players().map(|p| p.id).collect()
    }

    /// Coordinate to occupants, rebuilt from a full scan.
    pub fn collision_map(&self) -> HashMap<Coordinate, Vec<&dyn Entity>> {
        let mut map: HashMap<Coordinate, Vec<&dyn Entity>> = HashMap::new();
        for entity in self.iter() {
            if let Some(position) = entity.position() {
                map.entry(position).or_default().push(entity);
            }
        }
        map
    }
}
