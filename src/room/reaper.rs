//! Periodic eviction of expired and empty rooms
//!
//! The reaper snapshots the directory, then removes each dead room under its
//! own short write lock so concurrent command execution is never blocked for
//! longer than a single removal.

use crate::error::Result;
use crate::metrics::MetricsCollector;
use crate::room::directory::RoomDirectory;
use chrono::Duration;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, error, info};

/// Background sweep that enforces the room liveness invariant
pub struct RoomReaper {
    directory: Arc<RoomDirectory>,
    ttl: Duration,
    sweep_interval: std::time::Duration,
    metrics: Arc<MetricsCollector>,
}

impl RoomReaper {
    pub fn new(
        directory: Arc<RoomDirectory>,
        ttl: Duration,
        sweep_interval: std::time::Duration,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        Self {
            directory,
            ttl,
            sweep_interval,
            metrics,
        }
    }

    /// Run a single sweep, returning how many rooms were removed
    pub fn sweep(&self) -> Result<usize> {
        let snapshot = self.directory.get_all_rooms()?;
        let mut reaped = 0usize;

        for room in snapshot {
            if room.is_alive(self.ttl) {
                continue;
            }
            // Liveness is re-checked under the write lock; a room touched
            // since the snapshot survives.
            if self.directory.remove_room_if_dead(room.id, self.ttl)? {
                debug!(
                    "Reaped room {} (members: {}, last contact: {})",
                    room.id,
                    room.members.len(),
                    room.last_contact
                );
                reaped += 1;
            }
        }

        if reaped > 0 {
            self.metrics.record_rooms_reaped(reaped as u64);
            info!("Reaped {} dead rooms", reaped);
        }

        Ok(reaped)
    }

    /// Spawn the recurring sweep task
    pub fn start_task(self: Arc<Self>) -> JoinHandle<()> {
        let reaper = Arc::clone(&self);

        tokio::spawn(async move {
            let mut sweep_interval = interval(reaper.sweep_interval);
            info!(
                "Room reaper started (interval: {:?}, ttl: {}s)",
                reaper.sweep_interval,
                reaper.ttl.num_seconds()
            );

            loop {
                sweep_interval.tick().await;

                if let Err(e) = reaper.sweep() {
                    error!("Error during room sweep: {}", e);
                }
            }
        })
    }
}
