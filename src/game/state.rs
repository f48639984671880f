//! Game State
//!
//! The aggregate root: entity table, arena map, scores, round bookkeeping
//! and throttle ledger. Every mutation goes through `&mut GameState`, and
//! mutations queue the changes they produce until the caller drains them.
//! Uses BTreeMap for deterministic iteration order.

use std::collections::BTreeMap;
use std::time::Duration;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::core::coord::Coordinate;
use crate::game::entity::{Entity, EntityId, EntityTable, Player};
use crate::game::events::Change;
use crate::game::map::ArenaMap;
use crate::game::throttle::ThrottleLedger;
use crate::{
    LASER_SPEED, LASER_THROTTLE, MOVE_THROTTLE, NEW_ROUND_WAIT, ROUND_OVER_SCORE,
};

// =============================================================================
// RULES CONFIG
// =============================================================================

/// Rule parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameConfig {
    /// Score that ends a round.
    pub round_over_score: u32,
    /// Wait between round over and round start.
    pub new_round_wait: Duration,
    /// Minimum gap between accepted moves per actor.
    pub move_throttle: Duration,
    /// Minimum gap between accepted shots per actor.
    pub laser_throttle: Duration,
    /// Laser speed in cells per second.
    pub laser_speed: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            round_over_score: ROUND_OVER_SCORE,
            new_round_wait: NEW_ROUND_WAIT,
            move_throttle: MOVE_THROTTLE,
            laser_throttle: LASER_THROTTLE,
            laser_speed: LASER_SPEED,
        }
    }
}

// =============================================================================
// GAME STATE
// =============================================================================

/// Authoritative arena state.
#[derive(Debug)]
pub struct GameState {
    /// Live entities
    pub entities: EntityTable,
    /// Points per entity in the current round
    pub score: BTreeMap<EntityId, u32>,
    /// Set between round over and round start
    pub wait_for_round: bool,
    /// Wall-clock time the next round is scheduled for
    pub new_round_at: Option<DateTime<Utc>>,
    /// Winner of the last finished round
    pub round_winner: Option<EntityId>,
    /// Rounds started so far (first round is 0)
    pub round: u64,

    pub(crate) map: ArenaMap,
    pub(crate) throttle: ThrottleLedger,
    pub(crate) spawn_cursor: usize,
    pub(crate) pending: Vec<Change>,
    pub(crate) config: GameConfig,
}

impl GameState {
    /// Fresh state over a map.
    pub fn new(map: ArenaMap, config: GameConfig) -> Self {
        Self {
            entities: EntityTable::new(),
            score: BTreeMap::new(),
            wait_for_round: false,
            new_round_at: None,
            round_winner: None,
            round: 0,
            map,
            throttle: ThrottleLedger::new(),
            spawn_cursor: 0,
            pending: Vec::new(),
            config,
        }
    }

    /// Arena map.
    pub fn map(&self) -> &ArenaMap {
        &self.map
    }

    /// Rule parameters.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Throttle ledger.
    pub fn throttle(&self) -> &ThrottleLedger {
        &self.throttle
    }

    /// Score for an entity (0 when it has none).
    pub fn score_of(&self, id: EntityId) -> u32 {
        self.score.get(&id).copied().unwrap_or(0)
    }

    /// Next spawn point, round-robin over the map's spawns.
    pub fn next_spawn_point(&mut self) -> Coordinate {
        let spawns = self.map.spawn_points();
        // Maps without spawns are refused at construction
        if spawns.is_empty() {
            return Coordinate::ORIGIN;
        }
        let spawn = spawns[self.spawn_cursor % spawns.len()];
        self.spawn_cursor = (self.spawn_cursor + 1) % spawns.len();
        spawn
    }

    /// Insert or replace an entity. Queues `AddEntity`.
    pub fn add_entity(&mut self, entity: Box<dyn Entity>) -> Option<Box<dyn Entity>> {
        let snapshot = entity.snapshot();
        debug!(id = ?snapshot.id(), kind = ?entity.kind(), "Entity added");
        let replaced = self.entities.insert(entity);
        self.pending.push(Change::AddEntity { entity: snapshot });
        replaced
    }

    /// Create a player on the next spawn point.
    pub fn spawn_player(&mut self, name: impl Into<String>, icon: char) -> EntityId {
        let position = self.next_spawn_point();
        let player = Player::new(name, icon, position);
        let id = player.id;
        self.add_entity(Box::new(player));
        id
    }

    /// Remove an entity. Queues `RemoveEntity` when it was present.
    ///
    /// Lasers owned by the removed entity leave with it.
    pub fn remove_entity(&mut self, id: EntityId) -> Option<Box<dyn Entity>> {
        let removed = self.entities.remove(id)?;
        self.throttle.forget(id);
        self.score.remove(&id);
        debug!(id = ?id, kind = ?removed.kind(), "Entity removed");
        self.pending.push(Change::RemoveEntity { entity: removed.snapshot() });

        let orphans: Vec<EntityId> = self
            .entities
            .lasers()
            .filter(|l| l.owner == id)
            .map(|l| l.id)
            .collect();
        for laser in orphans {
            self.remove_entity(laser);
        }

        Some(removed)
    }

    /// Drain queued changes in the order they happened.
    pub fn take_changes(&mut self) -> Vec<Change> {
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::coord::Direction;
    use crate::game::entity::{EntitySnapshot, Laser};

    fn arena() -> ArenaMap {
        ArenaMap::parse("#####\n#S S#\n#   #\n#S  #\n#####").unwrap()
    }

    #[test]
    fn test_spawn_cursor_wraps() {
        let mut state = GameState::new(arena(), GameConfig::default());
        let spawns = state.map().spawn_points().to_vec();
        assert_eq!(spawns.len(), 3);

        let picked: Vec<_> = (0..7).map(|_| state.next_spawn_point()).collect();
        for (i, point) in picked.iter().enumerate() {
            assert_eq!(*point, spawns[i % 3]);
        }
    }

    #[test]
    fn test_add_and_remove_queue_changes() {
        let mut state = GameState::new(arena(), GameConfig::default());
        let id = state.spawn_player("ann", 'A');
        assert_eq!(state.entities.get(id).and_then(|e| e.position()), Some(Coordinate::new(-1, -1)));

        state.score.insert(id, 3);
        assert!(state.remove_entity(id).is_some());
        assert!(state.remove_entity(id).is_none());
        assert_eq!(state.score_of(id), 0);

        let changes = state.take_changes();
        assert_eq!(changes.len(), 2);
        assert!(matches!(changes[0], Change::AddEntity { .. }));
        assert!(matches!(changes[1], Change::RemoveEntity { ref entity } if entity.id() == id));
        assert!(state.take_changes().is_empty());
    }

    #[test]
    fn test_remove_player_takes_its_lasers() {
        let mut state = GameState::new(arena(), GameConfig::default());
        let owner = state.spawn_player("ann", 'A');
        let other = state.spawn_player("bob", 'B');
        state.add_entity(Box::new(Laser::new(owner, Coordinate::ORIGIN, Direction::Up)));
        state.add_entity(Box::new(Laser::new(other, Coordinate::ORIGIN, Direction::Down)));
        state.take_changes();

        assert!(state.remove_entity(owner).is_some());
        let lasers: Vec<_> = state.entities.lasers().map(|l| l.owner).collect();
        assert_eq!(lasers, vec![other]);

        let changes = state.take_changes();
        assert_eq!(changes.len(), 2);
        assert!(matches!(&changes[1], Change::RemoveEntity { entity: EntitySnapshot::Laser(l) } if l.owner == owner));
    }
}
