//! Core value types.
//!
//! Plain data with no locking and no async: coordinates, directions and
//! the seeded generator used by bots.

pub mod coord;
pub mod rng;

// Re-export core types
pub use coord::{Coordinate, Direction};
pub use rng::SeededRng;
