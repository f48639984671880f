//! Engine Module
//!
//! Async layer that serializes every mutation of the game state.
//!
//! - `game`: Worker, sweep, round timers and the `Game` handle
//! - `notifier`: Lossy single-slot change stream

pub mod game;
pub mod notifier;

pub use game::{EngineConfig, EngineError, Game};
pub use notifier::{ChangeNotifier, ChangeStream};
