//! Error types for the room coordination service
//!
//! This module defines all error types using anyhow for consistent error handling
//! throughout the application.

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific coordination scenarios
#[derive(Debug, thiserror::Error)]
pub enum CoordinatorError {
    #[error("Invalid payload: {reason}")]
    InvalidPayload { reason: String },

    #[error("Caller has no active room")]
    NoActiveRoom,

    #[error("Caller is not the host of room {room_id}")]
    NotRoomHost { room_id: String },

    #[error("Unknown command: {name}")]
    UnknownCommand { name: String },

    #[error("No candidate rooms available")]
    NoCandidateRooms,

    #[error("Internal service error: {message}")]
    InternalError { message: String },
}
