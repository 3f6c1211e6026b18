//! HTTP endpoint handlers

use std::{convert::Infallible, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Json, Response,
    },
};
use futures::stream::{Stream, StreamExt};
use tokio_stream::wrappers::WatchStream;
use tracing::{info, warn};

use super::responses::{
    AdjustRequest, AdminResponse, ApiError, HealthResponse, LandingResponse, ParticipantResponse,
    RoomQuery, StartRequest,
};
use crate::{services::RoomId, state::AppState};

/// Minutes used when a start request names none
const DEFAULT_MINUTES: u32 = 5;

type ApiResult<T> = Result<T, ApiError>;

/// Handle GET / - Landing info, or the participant view when `?room=` is present
pub async fn root_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RoomQuery>,
) -> ApiResult<Response> {
    match query.room {
        Some(room) => Ok(participant_view(&state, &room)?.into_response()),
        None => Ok(Json(LandingResponse::new()).into_response()),
    }
}

/// Handle POST /rooms - Create a room and mount its admin session
pub async fn create_room_handler(
    State(state): State<Arc<AppState>>,
) -> ApiResult<(StatusCode, Json<AdminResponse>)> {
    let room = RoomId::generate();
    let admin = state.admin_session(&room)?;
    info!(room = %room, "Room created");
    Ok((
        StatusCode::CREATED,
        Json(AdminResponse::ok("Room created", admin.snapshot())),
    ))
}

/// Handle GET /rooms/:room - Admin view of a room
pub async fn admin_status_handler(
    State(state): State<Arc<AppState>>,
    Path(room): Path<String>,
) -> ApiResult<Json<AdminResponse>> {
    let admin = state.admin_session(&RoomId::parse(&room)?)?;
    Ok(Json(AdminResponse::ok("Room status", admin.snapshot())))
}

/// Handle POST /rooms/:room/start - Start a fresh timer
pub async fn start_handler(
    State(state): State<Arc<AppState>>,
    Path(room): Path<String>,
    body: Option<Json<StartRequest>>,
) -> ApiResult<Json<AdminResponse>> {
    let request = body.map(|Json(b)| b).unwrap_or_default();
    let admin = state.admin_session(&RoomId::parse(&room)?)?;
    admin
        .start(
            request.title.as_deref(),
            request.minutes.unwrap_or(DEFAULT_MINUTES),
        )
        .await?;
    Ok(Json(AdminResponse::ok("Timer started", admin.snapshot())))
}

/// Handle POST /rooms/:room/pause - Pause the running timer
pub async fn pause_handler(
    State(state): State<Arc<AppState>>,
    Path(room): Path<String>,
) -> ApiResult<Json<AdminResponse>> {
    let admin = state.admin_session(&RoomId::parse(&room)?)?;
    admin.pause().await?;
    Ok(Json(AdminResponse::ok("Timer paused", admin.snapshot())))
}

/// Handle POST /rooms/:room/resume - Resume the paused timer
pub async fn resume_handler(
    State(state): State<Arc<AppState>>,
    Path(room): Path<String>,
) -> ApiResult<Json<AdminResponse>> {
    let admin = state.admin_session(&RoomId::parse(&room)?)?;
    admin.resume().await?;
    Ok(Json(AdminResponse::ok("Timer resumed", admin.snapshot())))
}

/// Handle POST /rooms/:room/stop - Stop the timer
pub async fn stop_handler(
    State(state): State<Arc<AppState>>,
    Path(room): Path<String>,
) -> ApiResult<Json<AdminResponse>> {
    let admin = state.admin_session(&RoomId::parse(&room)?)?;
    admin.stop().await?;
    Ok(Json(AdminResponse::ok("Timer stopped", admin.snapshot())))
}

/// Handle POST /rooms/:room/adjust - Add or remove seconds
pub async fn adjust_handler(
    State(state): State<Arc<AppState>>,
    Path(room): Path<String>,
    Json(request): Json<AdjustRequest>,
) -> ApiResult<Json<AdminResponse>> {
    let admin = state.admin_session(&RoomId::parse(&room)?)?;
    admin.adjust(request.delta_seconds).await?;
    Ok(Json(AdminResponse::ok(
        format!("Timer adjusted by {}s", request.delta_seconds),
        admin.snapshot(),
    )))
}

/// Handle DELETE /rooms/:room - Tear down the room's sessions
///
/// The stored record is left as is.
pub async fn release_room_handler(
    State(state): State<Arc<AppState>>,
    Path(room): Path<String>,
) -> ApiResult<StatusCode> {
    if state.release_room(&RoomId::parse(&room)?)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Ok(StatusCode::NOT_FOUND)
    }
}

/// Handle GET /rooms/:room/view - Participant display
pub async fn participant_view_handler(
    State(state): State<Arc<AppState>>,
    Path(room): Path<String>,
) -> ApiResult<Json<ParticipantResponse>> {
    participant_view(&state, &room)
}

/// Handle GET /rooms/:room/events - Participant display as server-sent events
pub async fn participant_events_handler(
    State(state): State<Arc<AppState>>,
    Path(room): Path<String>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let room = RoomId::parse(&room)?;
    let viewer = state.participant_session(&room)?;

    let stream = WatchStream::new(viewer.subscribe()).map(move |display| {
        let event = Event::default()
            .event("display")
            .json_data(&display)
            .unwrap_or_else(|e| {
                warn!(room = %room, "Failed to encode display: {}", e);
                Event::default().event("error").data(e.to_string())
            });
        Ok(event)
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse::ok(state.get_uptime(), state.session_counts()))
}

fn participant_view(state: &AppState, room: &str) -> ApiResult<Json<ParticipantResponse>> {
    let room = RoomId::parse(room)?;
    let viewer = state.participant_session(&room)?;
    Ok(Json(ParticipantResponse::new(room, viewer.display())))
}
