//! Metrics and monitoring for the room coordinator
//!
//! Prometheus metrics for command throughput, room population, and reaper
//! activity; the HTTP layer exposes them on `/metrics`.

pub mod collector;

pub use collector::{
    CommandMetrics, MetricsCollector, MetricsTimer, RoomMetrics, ServiceMetrics,
};
