//! Service layer for the room coordinator
//!
//! Application state, HTTP surface, and background task management.

pub mod app;
pub mod http;

pub use app::{AppState, ServiceError};
pub use http::{create_router, CallerIdentity, HttpServer, HttpServerState};
