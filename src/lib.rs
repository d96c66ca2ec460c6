//! Room Coordinator - Matchmaking and session coordination service
//!
//! This crate tracks multiplayer game rooms in memory, processes the match
//! commands game clients send while hosting or searching for sessions, and
//! exposes population statistics and Prometheus metrics over HTTP.

pub mod command;
pub mod config;
pub mod error;
pub mod metrics;
pub mod room;
pub mod service;
pub mod types;
pub mod user;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{CoordinatorError, Result};
pub use types::*;

// Re-export key components
pub use command::{CommandContext, MatchCommandDispatcher};
pub use room::{Room, RoomDirectory, RoomReaper, RoomStatisticsAggregator};
pub use user::{InMemoryUserLookup, UserLookup};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
