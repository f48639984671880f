//! # Laser Arena
//!
//! Authoritative state core for a small multiplayer laser arena.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        LASER ARENA                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Plain value types                         │
//! │  ├── coord.rs    - Coordinates and directions                │
//! │  └── rng.rs      - Seeded Xorshift128+ for bots              │
//! │                                                              │
//! │  game/           - Synchronous rules over GameState          │
//! │  ├── map.rs      - Arena grid classification                 │
//! │  ├── entity.rs   - Capabilities, players, lasers, table      │
//! │  ├── throttle.rs - Per-actor rate limiting                   │
//! │  ├── state.rs    - Aggregate root                            │
//! │  ├── round.rs    - Round state machine                       │
//! │  └── tick.rs     - Action resolution, laser sweep            │
//! │                                                              │
//! │  engine/         - Async serialization (tokio)               │
//! │  ├── game.rs     - Worker, sweep, round timers               │
//! │  └── notifier.rs - Lossy change stream                       │
//! │                                                              │
//! │  network/        - Wire messages (no transport)              │
//! │  └── protocol.rs - Client and server JSON messages           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//!
//! Every mutation of [`GameState`] happens under one write lock, taken by
//! the action worker, the laser sweep, round timers and entity
//! registration. Actions are applied in the order they were queued.
//! Observers receive changes through a single-slot channel that drops
//! changes nobody has picked up yet.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

use std::time::Duration;

pub mod core;
pub mod game;
pub mod engine;
pub mod network;

// Re-export commonly used types
pub use crate::core::coord::{Coordinate, Direction};
pub use crate::core::rng::SeededRng;
pub use game::action::{Action, ActionKind};
pub use game::entity::{Entity, EntityId, Laser, Player};
pub use game::events::Change;
pub use game::map::{ArenaMap, MapError};
pub use game::state::{GameConfig, GameState};
pub use engine::{ChangeStream, EngineConfig, EngineError, Game};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Score that ends a round
pub const ROUND_OVER_SCORE: u32 = 10;

/// Wait between round over and the next round
pub const NEW_ROUND_WAIT: Duration = Duration::from_secs(10);

/// Laser sweep period
pub const COLLISION_CHECK_FREQUENCY: Duration = Duration::from_millis(10);

/// Minimum gap between accepted moves of one actor
pub const MOVE_THROTTLE: Duration = Duration::from_millis(100);

/// Minimum gap between accepted shots of one actor
pub const LASER_THROTTLE: Duration = Duration::from_millis(500);

/// Laser speed (cells per second)
pub const LASER_SPEED: u32 = 50;
