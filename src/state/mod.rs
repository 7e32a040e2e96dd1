//! State management module
//!
//! This module contains the timer engine, its time sources, and the shared
//! application state wrapped around it.

pub mod app_state;
pub mod clock;
pub mod phase;
pub mod timer_state;

// Re-export main types
pub use app_state::{AppState, TouchOutcome};
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use phase::{phase_name_for_code, IndicatorColor, Phase, UNKNOWN_PHASE};
pub use timer_state::{PhaseChange, TimerEngine, TimerSnapshot};
