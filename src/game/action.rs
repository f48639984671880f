//! Client Actions
//!
//! Intents submitted by clients. The creation timestamp is supplied by the
//! submitter and is what the throttle ledger compares against.

use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};

use crate::core::coord::Direction;
use crate::game::entity::EntityId;

/// Action kind, used as half of a throttle key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Step one cell
    Move,
    /// Spawn a laser
    Fire,
}

/// A client intent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    /// Move the actor one cell.
    Move {
        /// Acting entity
        actor: EntityId,
        /// Step direction
        direction: Direction,
        /// Client-side creation time
        created_at: DateTime<Utc>,
    },

    /// Fire a laser from the cell next to the actor.
    Fire {
        /// Acting entity
        actor: EntityId,
        /// Travel direction
        direction: Direction,
        /// Client-side creation time
        created_at: DateTime<Utc>,
    },
}

impl Action {
    /// Build a move.
    pub fn movement(actor: EntityId, direction: Direction, created_at: DateTime<Utc>) -> Self {
        Action::Move { actor, direction, created_at }
    }

    /// Build a fire.
    pub fn fire(actor: EntityId, direction: Direction, created_at: DateTime<Utc>) -> Self {
        Action::Fire { actor, direction, created_at }
    }

    /// Kind tag.
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Move { .. } => ActionKind::Move,
            Action::Fire { .. } => ActionKind::Fire,
        }
    }

    /// Acting entity.
    pub fn actor(&self) -> EntityId {
        match self {
            Action::Move { actor, .. } | Action::Fire { actor, .. } => *actor,
        }
    }

    /// Direction.
    pub fn direction(&self) -> Direction {
        match self {
            Action::Move { direction, .. } | Action::Fire { direction, .. } => *direction,
        }
    }

    /// Client-side creation time.
    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            Action::Move { created_at, .. } | Action::Fire { created_at, .. } => *created_at,
        }
    }
}
