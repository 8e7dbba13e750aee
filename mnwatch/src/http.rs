//! HTTP surface: snapshot, single node, live stream and fleet health.

use std::convert::Infallible;
use std::sync::LazyLock;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use futures::Stream;
use mnwatch_core::{BroadcastError, Broadcaster, FleetSummary, Frame, NodeRecord, NodeStore};
use regex::Regex;
use serde_json::json;

static NODE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(hp-)?masternode-\d+$").expect("NODE_NAME is a valid regex pattern")
});

/// Shared handles used by the handlers
#[derive(Clone)]
pub struct AppState {
    pub store: NodeStore,
    pub broadcaster: Broadcaster,
}

/// Builds the API router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/nodes", get(list_nodes))
        .route("/api/nodes/{name}", get(get_node))
        .route("/api/events", get(events))
        .route("/api/health", get(health))
        .with_state(state)
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

// GET /api/nodes
async fn list_nodes(State(app): State<AppState>) -> Json<Vec<NodeRecord>> {
    Json(app.store.list())
}

// GET /api/nodes/{name}
async fn get_node(State(app): State<AppState>, Path(name): Path<String>) -> Response {
    if !NODE_NAME.is_match(&name) {
        return error_response(StatusCode::BAD_REQUEST, "Invalid node name");
    }
    match app.store.get(&name) {
        Some(record) => Json(record).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "Node not found"),
    }
}

// GET /api/events
async fn events(State(app): State<AppState>) -> Response {
    match app.broadcaster.subscribe() {
        Ok(subscription) => (
            [("x-accel-buffering", "no")],
            Sse::new(frame_stream(subscription.frames)),
        )
            .into_response(),
        Err(BroadcastError::CapacityReached { .. }) => {
            error_response(StatusCode::SERVICE_UNAVAILABLE, "Too many SSE clients")
        }
        Err(BroadcastError::Closed) => {
            error_response(StatusCode::SERVICE_UNAVAILABLE, "Server is shutting down")
        }
    }
}

/// Turns the subscriber channel into SSE events; ends when the channel closes
fn frame_stream(
    frames: tokio::sync::mpsc::Receiver<Frame>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    futures::stream::unfold(frames, |mut frames| async move {
        let frame = frames.recv().await?;
        let event = match frame {
            Frame::Comment(text) => Event::default().comment(text),
            Frame::Event { name, data } => Event::default().event(name).data(data),
        };
        Some((Ok(event), frames))
    })
}

// GET /api/health
async fn health(State(app): State<AppState>) -> Json<FleetSummary> {
    Json(FleetSummary::collect(&app.store, &app.broadcaster))
}
