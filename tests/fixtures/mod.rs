//! Shared helpers for integration tests

use axum::body::Body;
use axum::http::Request;
use axum::Router;
use chrono::Duration;
use room_coordinator::command::{CommandContext, MatchCommandDispatcher};
use room_coordinator::metrics::MetricsCollector;
use room_coordinator::room::{RoomDirectory, RoomStatisticsAggregator};
use room_coordinator::service::{create_router, HttpServerState};
use room_coordinator::user::InMemoryUserLookup;
use std::sync::Arc;

/// A fully wired router plus direct handles to its shared components
pub struct TestSystem {
    pub router: Router,
    pub directory: Arc<RoomDirectory>,
    pub users: Arc<InMemoryUserLookup>,
    pub metrics: Arc<MetricsCollector>,
}

/// Build a complete system with the given room TTL
pub fn create_test_system(ttl: Duration) -> TestSystem {
    let directory = Arc::new(RoomDirectory::new());
    let users = Arc::new(InMemoryUserLookup::new());
    let metrics = Arc::new(MetricsCollector::new().unwrap());

    let ctx = CommandContext::new(directory.clone(), users.clone(), ttl);
    let state = HttpServerState {
        dispatcher: Arc::new(MatchCommandDispatcher::new(ctx)),
        aggregator: Arc::new(RoomStatisticsAggregator::new(directory.clone())),
        metrics: metrics.clone(),
    };

    TestSystem {
        router: create_router(state),
        directory,
        users,
        metrics,
    }
}

/// Identity of a simulated game client
pub struct TestClient {
    pub user_id: i64,
    pub username: &'static str,
    pub platform: &'static str,
    pub game: &'static str,
}

impl TestClient {
    pub fn new(user_id: i64, username: &'static str) -> Self {
        Self {
            user_id,
            username,
            platform: "Console",
            game: "mainline",
        }
    }

    pub fn on_platform(mut self, platform: &'static str) -> Self {
        self.platform = platform;
        self
    }

    pub fn in_game(mut self, game: &'static str) -> Self {
        self.game = game;
        self
    }

    /// Build a match command request carrying this client's identity headers
    pub fn command(&self, command: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(format!("/match/{}", command))
            .header("X-User-Id", self.user_id.to_string())
            .header("X-Username", self.username)
            .header("X-Platform", self.platform)
            .header("X-Game", self.game)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }
}

/// Plain GET request for the monitoring endpoints
pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}
