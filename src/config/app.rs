//! Main application configuration
//!
//! Configuration is layered: built-in defaults, then an optional TOML file,
//! then environment variable overrides. Validation runs after every load.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub rooms: RoomSettings,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging and metrics
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Port for the HTTP listener
    pub http_port: u16,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_seconds: u64,
}

/// Room lifecycle settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomSettings {
    /// Seconds of silence after which a room is considered dead
    pub ttl_seconds: u64,
    /// How often the reaper sweeps the directory, in seconds
    pub reap_interval_seconds: u64,
    /// How often population gauges are refreshed, in seconds
    pub stats_refresh_seconds: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service: ServiceSettings::default(),
            rooms: RoomSettings::default(),
        }
    }
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "room-coordinator".to_string(),
            log_level: "info".to_string(),
            http_port: 8080,
            shutdown_timeout_seconds: 30,
        }
    }
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self {
            ttl_seconds: 180, // 3 minutes
            reap_interval_seconds: 5,
            stats_refresh_seconds: 30,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file, then apply environment overrides
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: Self = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(name) = env::var("SERVICE_NAME") {
            self.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            self.service.log_level = log_level;
        }
        if let Ok(port) = env::var("HTTP_PORT") {
            self.service.http_port = port
                .parse()
                .map_err(|_| anyhow!("Invalid HTTP_PORT value: {}", port))?;
        }
        if let Ok(timeout) = env::var("SHUTDOWN_TIMEOUT_SECONDS") {
            self.service.shutdown_timeout_seconds = timeout
                .parse()
                .map_err(|_| anyhow!("Invalid SHUTDOWN_TIMEOUT_SECONDS value: {}", timeout))?;
        }

        if let Ok(ttl) = env::var("ROOM_TTL_SECONDS") {
            self.rooms.ttl_seconds = ttl
                .parse()
                .map_err(|_| anyhow!("Invalid ROOM_TTL_SECONDS value: {}", ttl))?;
        }
        if let Ok(interval) = env::var("ROOM_REAP_INTERVAL_SECONDS") {
            self.rooms.reap_interval_seconds = interval
                .parse()
                .map_err(|_| anyhow!("Invalid ROOM_REAP_INTERVAL_SECONDS value: {}", interval))?;
        }
        if let Ok(refresh) = env::var("STATS_REFRESH_SECONDS") {
            self.rooms.stats_refresh_seconds = refresh
                .parse()
                .map_err(|_| anyhow!("Invalid STATS_REFRESH_SECONDS value: {}", refresh))?;
        }

        Ok(())
    }

    /// Get shutdown timeout as Duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.service.shutdown_timeout_seconds)
    }

    /// Get the room TTL as a chrono Duration for timestamp arithmetic
    pub fn room_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.rooms.ttl_seconds as i64)
    }

    /// Get reap interval as Duration
    pub fn reap_interval(&self) -> Duration {
        Duration::from_secs(self.rooms.reap_interval_seconds)
    }

    /// Get statistics refresh interval as Duration
    pub fn stats_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.rooms.stats_refresh_seconds)
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    if config.service.http_port == 0 {
        return Err(anyhow!("HTTP port cannot be 0"));
    }
    if config.service.shutdown_timeout_seconds == 0 {
        return Err(anyhow!("Shutdown timeout must be greater than 0"));
    }

    if config.rooms.ttl_seconds == 0 {
        return Err(anyhow!("Room TTL must be greater than 0"));
    }
    if config.rooms.reap_interval_seconds == 0 {
        return Err(anyhow!("Reap interval must be greater than 0"));
    }
    if config.rooms.reap_interval_seconds > config.rooms.ttl_seconds {
        return Err(anyhow!(
            "Reap interval ({}s) must not exceed room TTL ({}s)",
            config.rooms.reap_interval_seconds,
            config.rooms.ttl_seconds
        ));
    }
    if config.rooms.stats_refresh_seconds == 0 {
        return Err(anyhow!("Stats refresh interval must be greater than 0"));
    }

    Ok(())
}
