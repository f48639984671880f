//! Network Layer
//!
//! Wire messages for clients. No transport lives here; all game logic
//! runs through `game/` and `engine/`.

pub mod protocol;

pub use protocol::{
    ClientMessage, ServerMessage, RoundStatus, ServerError, ErrorCode, ProtocolError,
};
