//! Study Streak - A poll-driven Pomodoro session timer
//!
//! This library provides the work/break timer engine, the controller state
//! around it (session counting, touch and presence inputs) and an HTTP
//! surface for driving and observing it.

pub mod config;
pub mod state;
pub mod api;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use state::{AppState, Phase, TimerEngine};
pub use api::create_router;
pub use utils::signals::shutdown_signal;
