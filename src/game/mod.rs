//! Game Rules Module
//!
//! Synchronous, lock-free rules over `&mut GameState`. Callers are
//! responsible for serializing access; the engine does it with one lock.
//!
//! ## Module Structure
//!
//! - `map`: Arena grid classification
//! - `entity`: Entity capabilities, players, lasers, the entity table
//! - `action`: Client intents
//! - `throttle`: Per-actor rate limiting
//! - `state`: The aggregate root and rule config
//! - `round`: Round state machine
//! - `tick`: Action resolution and laser sweep
//! - `events`: Change events for observers

pub mod map;
pub mod entity;
pub mod action;
pub mod throttle;
pub mod state;
pub mod round;
pub mod tick;
pub mod events;

// Re-export key types
pub use map::{ArenaMap, MapError, MapType};
pub use entity::{Entity, EntityId, EntityKind, EntitySnapshot, EntityTable, Identifier, Laser, Mover, Player, Positioner};
pub use action::{Action, ActionKind};
pub use throttle::{ThrottleKey, ThrottleLedger};
pub use state::{GameConfig, GameState};
pub use tick::{apply_action, sweep, ActionOutcome, ActionResult, Rejection};
pub use events::Change;
