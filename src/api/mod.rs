//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/rooms", post(create_room_handler))
        .route(
            "/rooms/:room",
            get(admin_status_handler).delete(release_room_handler),
        )
        .route("/rooms/:room/start", post(start_handler))
        .route("/rooms/:room/pause", post(pause_handler))
        .route("/rooms/:room/resume", post(resume_handler))
        .route("/rooms/:room/stop", post(stop_handler))
        .route("/rooms/:room/adjust", post(adjust_handler))
        .route("/rooms/:room/view", get(participant_view_handler))
        .route("/rooms/:room/events", get(participant_events_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
