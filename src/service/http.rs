//! HTTP surface for match commands, statistics, and monitoring
//!
//! Commands arrive as `POST /match/{command}` with the caller's identity in
//! headers set by the upstream authentication proxy. Responses are bare
//! status codes; room state is never echoed back to clients.

use crate::command::{CommandOutcome, MatchCommandDispatcher, SerializedRoomData};
use crate::metrics::MetricsCollector;
use crate::room::RoomStatisticsAggregator;
use crate::types::{Identity, Platform};
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::{FromRequestParts, Path, State},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// Shared state for the HTTP router
#[derive(Clone)]
pub struct HttpServerState {
    pub dispatcher: Arc<MatchCommandDispatcher>,
    pub aggregator: Arc<RoomStatisticsAggregator>,
    pub metrics: Arc<MetricsCollector>,
}

/// Caller identity extracted from the upstream auth proxy headers
#[derive(Debug, Clone)]
pub struct CallerIdentity(pub Identity);

const USER_ID_HEADER: &str = "x-user-id";
const USERNAME_HEADER: &str = "x-username";
const PLATFORM_HEADER: &str = "x-platform";
const GAME_HEADER: &str = "x-game";

fn header_str<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts.headers.get(name)?.to_str().ok()
}

impl<S> FromRequestParts<S> for CallerIdentity
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        const REJECTION: (StatusCode, &'static str) =
            (StatusCode::UNAUTHORIZED, "Missing or invalid identity headers");

        let user_id = header_str(parts, USER_ID_HEADER)
            .and_then(|raw| raw.parse().ok())
            .ok_or(REJECTION)?;
        let username = header_str(parts, USERNAME_HEADER)
            .filter(|name| !name.is_empty())
            .ok_or(REJECTION)?
            .to_string();
        let platform: Platform = header_str(parts, PLATFORM_HEADER)
            .and_then(|raw| raw.parse().ok())
            .ok_or(REJECTION)?;
        let game = header_str(parts, GAME_HEADER)
            .filter(|game| !game.is_empty())
            .ok_or(REJECTION)?
            .to_string();

        Ok(CallerIdentity(Identity {
            user_id,
            username,
            platform,
            game,
        }))
    }
}

/// Create the Axum router with all endpoints
pub fn create_router(state: HttpServerState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/match/{command}", post(match_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

/// HTTP server owning the listener and graceful shutdown channel
pub struct HttpServer {
    port: u16,
    state: HttpServerState,
    shutdown_tx: broadcast::Sender<()>,
}

impl HttpServer {
    pub fn new(port: u16, state: HttpServerState) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            port,
            state,
            shutdown_tx,
        }
    }

    /// Bind the listener and serve until a shutdown signal arrives
    pub async fn start(&self) -> Result<()> {
        let addr: SocketAddr = format!("0.0.0.0:{}", self.port)
            .parse()
            .context("Invalid HTTP listen address")?;

        let app = create_router(self.state.clone());
        let listener = TcpListener::bind(addr).await?;

        info!("HTTP server listening on http://{}", addr);

        let mut shutdown_rx = self.shutdown_tx.subscribe();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
                info!("HTTP server shutdown signal received");
            })
            .await?;

        info!("HTTP server stopped");
        Ok(())
    }

    /// Signal the serve loop to drain and stop
    pub fn stop(&self) {
        if self.shutdown_tx.send(()).is_err() {
            warn!("HTTP server was not running when stop was requested");
        }
    }
}

/// Root endpoint handler - shows service information
async fn root_handler() -> impl IntoResponse {
    Json(json!({
        "service": "room-coordinator",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "/match/{command}",
            "/status",
            "/health",
            "/metrics"
        ]
    }))
}

/// Match command endpoint handler
async fn match_handler(
    State(state): State<HttpServerState>,
    Path(command): Path<String>,
    CallerIdentity(identity): CallerIdentity,
    body: Bytes,
) -> StatusCode {
    let payload: SerializedRoomData = if body.is_empty() {
        SerializedRoomData::default()
    } else {
        match serde_json::from_slice(&body) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("{} from '{}': malformed body: {}", command, identity.username, e);
                return StatusCode::BAD_REQUEST;
            }
        }
    };

    let timer = state.metrics.start_timer();
    let outcome = state.dispatcher.dispatch(&command, &identity, &payload).await;
    state
        .metrics
        .record_command(&command, outcome.label(), timer.stop());

    debug!(
        "{} from '{}' ({}, {}): {}",
        command,
        identity.username,
        identity.game,
        identity.platform,
        outcome.label()
    );

    match outcome {
        CommandOutcome::Success => StatusCode::OK,
        CommandOutcome::BadRequest => StatusCode::BAD_REQUEST,
        CommandOutcome::Unauthorized => StatusCode::UNAUTHORIZED,
        CommandOutcome::NotFound => StatusCode::NOT_FOUND,
    }
}

/// Room population snapshot endpoint handler
async fn status_handler(State(state): State<HttpServerState>) -> Response {
    match state.aggregator.collect() {
        Ok(statistics) => (StatusCode::OK, Json(statistics)).into_response(),
        Err(e) => {
            error!("Failed to collect room statistics: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Lightweight health check endpoint handler
async fn health_handler() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "room-coordinator",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Prometheus metrics endpoint handler
async fn metrics_handler(State(state): State<HttpServerState>) -> Response {
    let registry = state.metrics.registry();
    let metric_families = registry.gather();
    let encoder = TextEncoder::new();

    match encoder.encode_to_string(&metric_families) {
        Ok(output) => (
            StatusCode::OK,
            [("content-type", encoder.format_type().to_string())],
            output,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandContext;
    use crate::room::RoomDirectory;
    use crate::user::InMemoryUserLookup;
    use axum::body::Body;
    use axum::http::Request;
    use chrono::Duration;
    use tower::ServiceExt;

    fn test_router() -> Router {
        let directory = Arc::new(RoomDirectory::new());
        let ctx = CommandContext::new(
            directory.clone(),
            Arc::new(InMemoryUserLookup::new()),
            Duration::minutes(3),
        );

        let state = HttpServerState {
            dispatcher: Arc::new(MatchCommandDispatcher::new(ctx)),
            aggregator: Arc::new(RoomStatisticsAggregator::new(directory)),
            metrics: Arc::new(MetricsCollector::new().unwrap()),
        };
        create_router(state)
    }

    fn match_request(command: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(format!("/match/{}", command))
            .header("X-User-Id", "1")
            .header("X-Username", "alice")
            .header("X-Platform", "Console")
            .header("X-Game", "mainline")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_missing_identity_headers_is_unauthorized() {
        let router = test_router();
        let request = Request::builder()
            .method("POST")
            .uri("/match/CreateRoom")
            .body(Body::empty())
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_invalid_platform_header_is_unauthorized() {
        let router = test_router();
        let request = Request::builder()
            .method("POST")
            .uri("/match/CreateRoom")
            .header("X-User-Id", "1")
            .header("X-Username", "alice")
            .header("X-Platform", "Mainframe")
            .header("X-Game", "mainline")
            .body(Body::empty())
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_create_room_with_empty_body_succeeds() {
        let router = test_router();
        let response = router
            .oneshot(match_request("CreateRoom", ""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_command_is_not_found() {
        let router = test_router();
        let response = router
            .oneshot(match_request("TeleportRoom", "{}"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let router = test_router();
        let response = router
            .oneshot(match_request("CreateRoom", "{not json"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_status_reports_room_population() {
        let router = test_router();

        let response = router
            .clone()
            .oneshot(match_request("CreateRoom", "{}"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/status")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let statistics: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(statistics["RoomCount"], 1);
        assert_eq!(statistics["PlayerCount"], 1);
    }

    #[tokio::test]
    async fn test_health_endpoint_is_ok() {
        let router = test_router();
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_metrics_endpoint_exposes_counters() {
        let router = test_router();

        router
            .clone()
            .oneshot(match_request("CreateRoom", "{}"))
            .await
            .unwrap();

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/metrics")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("room_coordinator_commands_total"));
    }
}
