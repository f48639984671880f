//! Protocol Messages
//!
//! Wire format at the edge of the core. Messages are JSON; transports are
//! left to the embedding application.

use std::collections::BTreeMap;
use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};

use crate::core::coord::Direction;
use crate::game::action::Action;
use crate::game::entity::EntityId;
use crate::game::events::Change;
use crate::game::state::GameState;

/// Protocol errors.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Encoding or decoding failed.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// CLIENT -> SERVER MESSAGES
// =============================================================================

/// Messages sent from client to server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Step one cell.
    Move {
        /// Step direction
        direction: Direction,
        /// Client-side creation time
        sent_at: DateTime<Utc>,
    },

    /// Fire a laser.
    Fire {
        /// Travel direction
        direction: Direction,
        /// Client-side creation time
        sent_at: DateTime<Utc>,
    },

    /// Request a round status snapshot.
    SyncRequest,
}

impl ClientMessage {
    /// Action for a known actor. `None` for messages that are not actions.
    pub fn into_action(self, actor: EntityId) -> Option<Action> {
        match self {
            ClientMessage::Move { direction, sent_at } => Some(Action::movement(actor, direction, sent_at)),
            ClientMessage::Fire { direction, sent_at } => Some(Action::fire(actor, direction, sent_at)),
            ClientMessage::SyncRequest => None,
        }
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize from JSON.
    pub fn from_json(s: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(s)?)
    }
}

// =============================================================================
// SERVER -> CLIENT MESSAGES
// =============================================================================

/// Messages sent from server to client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// A state change.
    Change {
        /// The change
        change: Change,
    },

    /// Scores and round bookkeeping.
    RoundStatus(RoundStatus),

    /// The last client message could not be used.
    Error(ServerError),
}

impl From<Change> for ServerMessage {
    fn from(change: Change) -> Self {
        ServerMessage::Change { change }
    }
}

impl ServerMessage {
    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize from JSON.
    pub fn from_json(s: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(s)?)
    }
}

/// Round status snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundStatus {
    /// Current round number.
    pub round: u64,
    /// Between rounds.
    pub waiting: bool,
    /// Scheduled start of the next round.
    pub new_round_at: Option<DateTime<Utc>>,
    /// Winner of the last finished round.
    pub winner: Option<EntityId>,
    /// Scores in the current round.
    pub scores: BTreeMap<EntityId, u32>,
}

impl RoundStatus {
    /// Capture from the game state.
    pub fn from_state(state: &GameState) -> Self {
        Self {
            round: state.round,
            waiting: state.wait_for_round,
            new_round_at: state.new_round_at,
            winner: state.round_winner,
            scores: state.score.clone(),
        }
    }
}

/// Error payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerError {
    /// Error code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
}

/// Error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Message could not be parsed.
    InvalidMessage,
}

impl From<&ProtocolError> for ServerError {
    fn from(err: &ProtocolError) -> Self {
        Self {
            code: ErrorCode::InvalidMessage,
            message: err.to_string(),
        }
    }
}
