//! Metrics collection using Prometheus
//!
//! One registry per collector; every metric group registers itself at
//! construction so a duplicate registration surfaces immediately at startup.

use crate::types::RoomStatistics;
use anyhow::Result;
use prometheus::{
    HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Main metrics collector for the room coordinator
#[derive(Clone)]
pub struct MetricsCollector {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Service-level metrics
    service_metrics: ServiceMetrics,

    /// Command processing metrics
    command_metrics: CommandMetrics,

    /// Room population metrics
    room_metrics: RoomMetrics,
}

/// Service-level metrics
#[derive(Clone)]
pub struct ServiceMetrics {
    /// Service uptime in seconds
    pub uptime_seconds: IntGauge,
}

/// Command processing metrics
#[derive(Clone)]
pub struct CommandMetrics {
    /// Total commands processed, by command name and outcome
    pub commands_total: IntCounterVec,

    /// Command handling duration
    pub command_duration_seconds: HistogramVec,
}

/// Room population metrics
#[derive(Clone)]
pub struct RoomMetrics {
    /// Number of rooms currently tracked
    pub active_rooms: IntGauge,

    /// Distinct players currently in rooms
    pub active_players: IntGauge,

    /// Players currently in pod-slot rooms
    pub players_in_pod: IntGauge,

    /// Players per game
    pub players_per_game: IntGaugeVec,

    /// Players per platform
    pub players_per_platform: IntGaugeVec,

    /// Total rooms removed by the reaper
    pub rooms_reaped_total: IntCounter,
}

impl MetricsCollector {
    /// Create a new metrics collector with its own registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());
        Self::with_registry(registry)
    }

    /// Create a new metrics collector with a custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let service_metrics = ServiceMetrics::new(&registry)?;
        let command_metrics = CommandMetrics::new(&registry)?;
        let room_metrics = RoomMetrics::new(&registry)?;

        Ok(Self {
            registry,
            service_metrics,
            command_metrics,
            room_metrics,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    /// Get service metrics
    pub fn service(&self) -> &ServiceMetrics {
        &self.service_metrics
    }

    /// Get command metrics
    pub fn command(&self) -> &CommandMetrics {
        &self.command_metrics
    }

    /// Get room metrics
    pub fn room(&self) -> &RoomMetrics {
        &self.room_metrics
    }

    /// Record one processed command with its outcome and duration
    pub fn record_command(&self, command: &str, outcome: &str, duration: Duration) {
        self.command_metrics
            .commands_total
            .with_label_values(&[command, outcome])
            .inc();

        self.command_metrics
            .command_duration_seconds
            .with_label_values(&[command])
            .observe(duration.as_secs_f64());
    }

    /// Record rooms removed during a reaper sweep
    pub fn record_rooms_reaped(&self, count: u64) {
        self.room_metrics.rooms_reaped_total.inc_by(count);
    }

    /// Refresh population gauges from a statistics snapshot
    pub fn update_from_statistics(&self, statistics: &RoomStatistics) {
        self.room_metrics
            .active_rooms
            .set(statistics.room_count as i64);
        self.room_metrics
            .active_players
            .set(statistics.player_count as i64);
        self.room_metrics
            .players_in_pod
            .set(statistics.players_in_pod_count as i64);

        for (game, count) in &statistics.per_game {
            self.room_metrics
                .players_per_game
                .with_label_values(&[game])
                .set(*count as i64);
        }

        for (platform, count) in &statistics.per_platform {
            self.room_metrics
                .players_per_platform
                .with_label_values(&[&platform.to_string()])
                .set(*count as i64);
        }
    }

    /// Update the service uptime gauge
    pub fn update_uptime(&self, uptime: Duration) {
        self.service_metrics
            .uptime_seconds
            .set(uptime.as_secs() as i64);
    }

    /// Create a timer for measuring operation duration
    pub fn start_timer(&self) -> MetricsTimer {
        MetricsTimer::new()
    }
}

/// Timer for measuring operation durations
pub struct MetricsTimer {
    start: Instant,
}

impl MetricsTimer {
    fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get the elapsed duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop the timer and return the duration
    pub fn stop(self) -> Duration {
        self.elapsed()
    }
}

impl ServiceMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let uptime_seconds = IntGauge::new(
            "room_coordinator_uptime_seconds",
            "Service uptime in seconds",
        )?;
        registry.register(Box::new(uptime_seconds.clone()))?;

        Ok(Self { uptime_seconds })
    }
}

impl CommandMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let commands_total = IntCounterVec::new(
            Opts::new(
                "room_coordinator_commands_total",
                "Total matchmaking commands processed",
            ),
            &["command", "outcome"],
        )?;
        registry.register(Box::new(commands_total.clone()))?;

        let command_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "room_coordinator_command_duration_seconds",
                "Command handling duration in seconds",
            ),
            &["command"],
        )?;
        registry.register(Box::new(command_duration_seconds.clone()))?;

        Ok(Self {
            commands_total,
            command_duration_seconds,
        })
    }
}

impl RoomMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let active_rooms = IntGauge::new(
            "room_coordinator_active_rooms",
            "Number of rooms currently tracked",
        )?;
        registry.register(Box::new(active_rooms.clone()))?;

        let active_players = IntGauge::new(
            "room_coordinator_active_players",
            "Distinct players currently in rooms",
        )?;
        registry.register(Box::new(active_players.clone()))?;

        let players_in_pod = IntGauge::new(
            "room_coordinator_players_in_pod",
            "Players currently in pod-slot rooms",
        )?;
        registry.register(Box::new(players_in_pod.clone()))?;

        let players_per_game = IntGaugeVec::new(
            Opts::new("room_coordinator_players_per_game", "Players per game"),
            &["game"],
        )?;
        registry.register(Box::new(players_per_game.clone()))?;

        let players_per_platform = IntGaugeVec::new(
            Opts::new(
                "room_coordinator_players_per_platform",
                "Players per platform",
            ),
            &["platform"],
        )?;
        registry.register(Box::new(players_per_platform.clone()))?;

        let rooms_reaped_total = IntCounter::new(
            "room_coordinator_rooms_reaped_total",
            "Total rooms removed by the reaper",
        )?;
        registry.register(Box::new(rooms_reaped_total.clone()))?;

        Ok(Self {
            active_rooms,
            active_players,
            players_in_pod,
            players_per_game,
            players_per_platform,
            rooms_reaped_total,
        })
    }
}
