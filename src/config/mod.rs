//! Configuration management for the room coordinator
//!
//! Defaults, optional TOML file, then environment variable overrides.

pub mod app;

pub use app::{validate_config, AppConfig, RoomSettings, ServiceSettings};
