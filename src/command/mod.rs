//! Matchmaking command processing: wire payloads, handlers, and dispatch

pub mod dispatcher;
pub mod handlers;
pub mod payload;

pub use dispatcher::{CommandOutcome, MatchCommandDispatcher};
pub use handlers::CommandContext;
pub use payload::SerializedRoomData;
