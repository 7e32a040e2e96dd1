//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::{IndicatorColor, TimerSnapshot, TouchOutcome};

/// API response structure for control endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerSnapshot,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: String, message: String, timer: TimerSnapshot) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            timer,
        }
    }

    /// Create a response whose status mirrors the timer: idle, paused or running
    pub fn from_timer(message: String, timer: TimerSnapshot) -> Self {
        let status = if !timer.phase.is_active() {
            "idle"
        } else if timer.paused {
            "paused"
        } else {
            "running"
        };
        Self::new(status.to_string(), message, timer)
    }
}

/// Response for the touch gesture endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TouchResponse {
    pub outcome: TouchOutcome,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerSnapshot,
}

/// Request body for the presence endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceRequest {
    pub present: bool,
}

/// Values a display collaborator renders
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayResponse {
    pub phase_name: String,
    pub remaining_seconds: u64,
    pub remaining_label: String,
    pub progress_percent: f64,
    pub session_count: u32,
    pub paused: bool,
    pub indicator: IndicatorColor,
    pub indicator_rgb: [u8; 3],
}

/// Full status response with timer and controller information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub timer: TimerSnapshot,
    pub session_count: u32,
    pub present: bool,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
