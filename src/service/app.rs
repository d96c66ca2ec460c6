//! Main application state and service coordination
//!
//! `AppState` owns every long-lived component and the background tasks that
//! keep the directory healthy: the reaper sweep, the statistics refresh, and
//! the HTTP listener.

use crate::command::{CommandContext, MatchCommandDispatcher};
use crate::config::AppConfig;
use crate::metrics::MetricsCollector;
use crate::room::{RoomDirectory, RoomReaper, RoomStatisticsAggregator};
use crate::service::http::{HttpServer, HttpServerState};
use crate::user::UserLookup;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{error, info, warn};

/// Service-level errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Service initialization error: {message}")]
    Initialization { message: String },

    #[error("Background task error: {message}")]
    BackgroundTask { message: String },
}

/// Main application state containing all service components
pub struct AppState {
    /// Application configuration
    config: AppConfig,

    /// Shared room directory
    directory: Arc<RoomDirectory>,

    /// Command dispatcher backing the HTTP match endpoint
    dispatcher: Arc<MatchCommandDispatcher>,

    /// On-demand population statistics
    aggregator: Arc<RoomStatisticsAggregator>,

    /// Prometheus metrics
    metrics: Arc<MetricsCollector>,

    /// Periodic dead-room eviction
    reaper: Arc<RoomReaper>,

    /// HTTP listener for commands and monitoring
    http_server: Arc<HttpServer>,

    /// Background task handles
    background_tasks: Vec<JoinHandle<()>>,

    /// Service status
    is_running: Arc<RwLock<bool>>,

    /// Startup instant for the uptime gauge
    started_at: Instant,
}

impl AppState {
    /// Initialize the application with all dependencies
    pub fn new(config: AppConfig, users: Arc<dyn UserLookup>) -> Result<Self, ServiceError> {
        info!("Initializing room coordinator service");
        info!(
            "Configuration: service={}, http_port={}, room_ttl={}s",
            config.service.name, config.service.http_port, config.rooms.ttl_seconds
        );

        let metrics =
            Arc::new(
                MetricsCollector::new().map_err(|e| ServiceError::Initialization {
                    message: format!("Failed to create metrics collector: {}", e),
                })?,
            );

        let directory = Arc::new(RoomDirectory::new());
        let aggregator = Arc::new(RoomStatisticsAggregator::new(directory.clone()));

        let ctx = CommandContext::new(directory.clone(), users, config.room_ttl());
        let dispatcher = Arc::new(MatchCommandDispatcher::new(ctx));

        let reaper = Arc::new(RoomReaper::new(
            directory.clone(),
            config.room_ttl(),
            config.reap_interval(),
            metrics.clone(),
        ));

        let http_state = HttpServerState {
            dispatcher: dispatcher.clone(),
            aggregator: aggregator.clone(),
            metrics: metrics.clone(),
        };
        let http_server = Arc::new(HttpServer::new(config.service.http_port, http_state));

        Ok(Self {
            config,
            directory,
            dispatcher,
            aggregator,
            metrics,
            reaper,
            http_server,
            background_tasks: Vec::new(),
            is_running: Arc::new(RwLock::new(false)),
            started_at: Instant::now(),
        })
    }

    /// Start the HTTP listener and all background tasks
    pub async fn start(&mut self) -> Result<(), ServiceError> {
        info!("Starting room coordinator service");

        *self.is_running.write().await = true;
        self.started_at = Instant::now();

        info!(
            "Registered match commands: {:?}",
            self.dispatcher.command_names()
        );

        let http_server = self.http_server.clone();
        let http_handle = tokio::spawn(async move {
            if let Err(e) = http_server.start().await {
                error!("HTTP server failed: {}", e);
            }
        });
        self.background_tasks.push(http_handle);

        self.background_tasks.push(self.reaper.clone().start_task());
        self.background_tasks.push(self.start_stats_refresh_task());

        info!("Room coordinator service started");
        Ok(())
    }

    /// Perform graceful shutdown
    pub async fn shutdown(&mut self) -> Result<(), ServiceError> {
        info!("Starting graceful shutdown of room coordinator");

        *self.is_running.write().await = false;

        self.http_server.stop();
        self.stop_background_tasks().await;

        let final_stats =
            self.aggregator
                .collect()
                .map_err(|e| ServiceError::BackgroundTask {
                    message: format!("Failed to collect final statistics: {}", e),
                })?;
        info!(
            "Final population: {} rooms, {} players",
            final_stats.room_count, final_stats.player_count
        );
        info!("Room coordinator shutdown completed");

        Ok(())
    }

    /// Get service configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Check if service is running
    pub async fn is_running(&self) -> bool {
        *self.is_running.read().await
    }

    /// Get the shared room directory
    pub fn directory(&self) -> Arc<RoomDirectory> {
        self.directory.clone()
    }

    /// Get the metrics collector
    pub fn metrics(&self) -> Arc<MetricsCollector> {
        self.metrics.clone()
    }

    /// Spawn the recurring gauge refresh from directory statistics
    fn start_stats_refresh_task(&self) -> JoinHandle<()> {
        let aggregator = self.aggregator.clone();
        let metrics = self.metrics.clone();
        let refresh_interval = self.config.stats_refresh_interval();
        let started_at = self.started_at;

        tokio::spawn(async move {
            let mut refresh = interval(refresh_interval);
            loop {
                refresh.tick().await;

                metrics.update_uptime(started_at.elapsed());
                match aggregator.collect() {
                    Ok(statistics) => metrics.update_from_statistics(&statistics),
                    Err(e) => warn!("Failed to refresh room statistics: {}", e),
                }
            }
        })
    }

    async fn stop_background_tasks(&mut self) {
        info!("Stopping {} background tasks", self.background_tasks.len());

        for handle in self.background_tasks.drain(..) {
            handle.abort();
            // Await so panics surface instead of vanishing with the abort.
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    warn!("Background task ended abnormally: {}", e);
                }
            }
        }
    }
}
