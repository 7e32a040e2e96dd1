//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use tracing::{debug, error};

use crate::state::{AppState, IndicatorColor, TimerSnapshot};
use super::responses::{
    ApiResponse, DisplayResponse, HealthResponse, PresenceRequest, StatusResponse, TouchResponse,
};

/// Shape a control call result into a response, mapping lock failures to 500
fn control_response(
    action: &str,
    message: &str,
    result: Result<TimerSnapshot, String>,
) -> Result<Json<ApiResponse>, StatusCode> {
    match result {
        Ok(timer) => {
            debug!("{} endpoint called - {} ({} {})", action, message, timer.phase_name, timer.remaining_label);
            Ok(Json(ApiResponse::from_timer(message.to_string(), timer)))
        }
        Err(e) => {
            error!("Failed to {}: {}", action, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /start - Start a work session
pub async fn start_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    control_response("start", "Work session started", state.start_work())
}

/// Handle POST /break - Start a short break
pub async fn break_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    control_response("break", "Short break started", state.start_break())
}

/// Handle POST /pause - Pause the running session
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    control_response("pause", "Pause requested", state.pause())
}

/// Handle POST /resume - Resume a paused session
pub async fn resume_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    control_response("resume", "Resume requested", state.resume())
}

/// Handle POST /reset - Return to idle
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    control_response("reset", "Timer reset", state.reset())
}

/// Handle POST /touch - Single-input start/pause/resume gesture
pub async fn touch_handler(State(state): State<Arc<AppState>>) -> Result<Json<TouchResponse>, StatusCode> {
    match state.touch() {
        Ok((outcome, timer)) => Ok(Json(TouchResponse {
            outcome,
            timestamp: Utc::now(),
            timer,
        })),
        Err(e) => {
            error!("Failed to handle touch: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /presence - Report whether the user is at the desk
pub async fn presence_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PresenceRequest>,
) -> Result<Json<ApiResponse>, StatusCode> {
    let message = if request.present { "Presence detected" } else { "Presence lost" };
    control_response("presence", message, state.set_presence(request.present))
}

/// Handle GET /status - Return current timer and controller status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, StatusCode> {
    let timer = match state.get_snapshot() {
        Ok(t) => t,
        Err(e) => {
            error!("Failed to get timer snapshot: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let session_count = state.get_session_count().map_err(|e| {
        error!("Failed to get session count: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    let present = state.is_present().map_err(|e| {
        error!("Failed to get presence: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timer,
        session_count,
        present,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /display - Values for display and indicator collaborators
pub async fn display_handler(State(state): State<Arc<AppState>>) -> Result<Json<DisplayResponse>, StatusCode> {
    let (timer, session_count) = match (state.get_snapshot(), state.get_session_count()) {
        (Ok(timer), Ok(count)) => (timer, count),
        (Err(e), _) | (_, Err(e)) => {
            error!("Failed to read display state: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let indicator = IndicatorColor::for_phase(timer.phase, timer.paused);

    Ok(Json(DisplayResponse {
        phase_name: timer.phase_name,
        remaining_seconds: timer.remaining_seconds,
        remaining_label: timer.remaining_label,
        progress_percent: timer.progress_percent,
        session_count,
        paused: timer.paused,
        indicator,
        indicator_rgb: indicator.rgb(),
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
