//! Change Events
//!
//! Transient records of state mutations, published to observers after the
//! mutation has been applied.

use serde::{Serialize, Deserialize};

use crate::core::coord::{Coordinate, Direction};
use crate::game::entity::{EntityId, EntitySnapshot, Player};

/// A state change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Change {
    /// An entity moved one cell.
    Move {
        /// Moved entity
        entity: EntityId,
        /// Step direction
        direction: Direction,
        /// New position
        position: Coordinate,
    },

    /// A score reached the threshold; the arena is now waiting.
    RoundOver {
        /// Entity that reached the threshold
        winner: EntityId,
        /// Round that ended
        round: u64,
    },

    /// A new round began; scores are reset.
    RoundStart {
        /// Round that started
        round: u64,
    },

    /// An entity joined the table.
    AddEntity {
        /// Copy at insertion time
        entity: EntitySnapshot,
    },

    /// An entity left the table.
    RemoveEntity {
        /// Copy at removal time
        entity: EntitySnapshot,
    },

    /// A player was hit and placed on a spawn point.
    PlayerRespawn {
        /// Player after respawn
        player: Player,
        /// Owner of the laser that hit
        killed_by: EntityId,
    },
}

impl Change {
    /// Round number if this change ends a round.
    pub fn ended_round(&self) -> Option<u64> {
        match self {
            Change::RoundOver { round, .. } => Some(*round),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_json_tags() {
        let id = EntityId::from_u128(3);
        let change = Change::Move {
            entity: id,
            direction: Direction::Left,
            position: Coordinate::new(-1, 0),
        };
        let json = serde_json::to_value(&change).unwrap();
        assert_eq!(json["type"], "move");
        assert_eq!(json["direction"], "left");
        assert_eq!(json["entity"], id.to_string());

        let back: Change = serde_json::from_value(json).unwrap();
        assert_eq!(back, change);
    }

    #[test]
    fn test_ended_round() {
        let winner = EntityId::from_u128(1);
        assert_eq!(Change::RoundOver { winner, round: 4 }.ended_round(), Some(4));
        assert_eq!(Change::RoundStart { round: 5 }.ended_round(), None);
    }
}
