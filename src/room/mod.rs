//! Room entity, directory, reaper, and statistics
//!
//! This module holds the in-memory session state: the room entity itself,
//! the shared directory everything reads and writes, the background reaper
//! that enforces the liveness invariant, and the on-demand aggregator.

pub mod directory;
pub mod instance;
pub mod reaper;
pub mod statistics;

// Re-export commonly used types
pub use directory::RoomDirectory;
pub use instance::{Room, RoomMember};
pub use reaper::RoomReaper;
pub use statistics::RoomStatisticsAggregator;
