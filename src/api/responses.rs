//! API request and response structures

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::{
    error::TimerError,
    services::RoomId,
    session::{AdminSnapshot, TimerDisplay},
};

/// Body of POST /rooms/:room/start
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
    pub title: Option<String>,
    pub minutes: Option<u32>,
}

/// Body of POST /rooms/:room/adjust
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustRequest {
    pub delta_seconds: i64,
}

/// Query string of the root entry point
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoomQuery {
    pub room: Option<String>,
}

/// Admin response for every facilitator endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub snapshot: AdminSnapshot,
}

impl AdminResponse {
    pub fn ok(message: impl Into<String>, snapshot: AdminSnapshot) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
            timestamp: Utc::now(),
            snapshot,
        }
    }
}

/// What a participant's screen shows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantResponse {
    pub mode: String,
    pub room: RoomId,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub display: TimerDisplay,
}

impl ParticipantResponse {
    pub fn new(room: RoomId, display: TimerDisplay) -> Self {
        Self {
            mode: "participant".to_string(),
            room,
            timestamp: Utc::now(),
            display,
        }
    }
}

/// Entry point without a room
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandingResponse {
    pub mode: String,
    pub message: String,
    pub create_room: String,
}

impl LandingResponse {
    pub fn new() -> Self {
        Self {
            mode: "landing".to_string(),
            message: "Synchronized timer for facilitators and participants".to_string(),
            create_room: "POST /rooms".to_string(),
        }
    }
}

impl Default for LandingResponse {
    fn default() -> Self {
        Self::new()
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub uptime: String,
    pub admin_sessions: usize,
    pub participant_sessions: usize,
}

impl HealthResponse {
    pub fn ok(uptime: String, (admin_sessions, participant_sessions): (usize, usize)) -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime,
            admin_sessions,
            participant_sessions,
        }
    }
}

/// Error body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Handler error mapped onto an HTTP status
#[derive(Debug)]
pub struct ApiError(pub TimerError);

impl From<TimerError> for ApiError {
    fn from(e: TimerError) -> Self {
        Self(e)
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match &self.0 {
            TimerError::InvalidRoom(_) => StatusCode::BAD_REQUEST,
            TimerError::NoTimer => StatusCode::NOT_FOUND,
            TimerError::InvalidTransition { .. } => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        } else {
            warn!("Request rejected: {}", self.0);
        }

        let body = ErrorResponse {
            status: "error".to_string(),
            message: self.0.to_string(),
            timestamp: Utc::now(),
        };
        (status, Json(body)).into_response()
    }
}
