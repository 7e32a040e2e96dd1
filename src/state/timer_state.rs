//! Work/break timer engine
//!
//! The engine is a poll-driven state machine. It owns no threads or timers:
//! time only advances inside [`TimerEngine::update`], which the driver calls on
//! a sub-second cadence.
//!
//! ```text
//! Idle --start_work--> Work --elapsed--> Break --elapsed--> Work ...
//!  ^                                                          |
//!  +------------------------- reset --------------------------+
//! ```
//!
//! Pausing is a flag layered over `Work`/`Break` and does not change the
//! pending transition target.

use std::{fmt, sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{Clock, Phase};

/// Default work session length in minutes
pub const DEFAULT_WORK_MINUTES: u64 = 45;
/// Default short break length in minutes
pub const DEFAULT_BREAK_MINUTES: u64 = 5;

/// A phase transition applied by [`TimerEngine::update`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseChange {
    pub from: Phase,
    pub to: Phase,
}

/// Point-in-time view of the engine's derived values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub phase: Phase,
    pub phase_name: String,
    pub paused: bool,
    pub remaining_seconds: u64,
    pub remaining_label: String,
    pub progress_percent: f64,
    pub work_duration_seconds: u64,
    pub break_duration_seconds: u64,
}

/// Pomodoro timer state machine
pub struct TimerEngine {
    clock: Arc<dyn Clock>,
    phase: Phase,
    paused: bool,
    work_duration: u64,
    break_duration: u64,
    /// Seconds left in the current phase. Dips to zero or below only
    /// between the subtraction and the transition inside `update`.
    remaining: i64,
    /// Clock reading at which `remaining` was last exact
    anchor: Option<Duration>,
}

impl TimerEngine {
    /// Create an idle engine. Sub-second parts of the durations are dropped
    /// and lengths are capped at `i64::MAX` seconds.
    pub fn new(work_duration: Duration, break_duration: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            phase: Phase::Idle,
            paused: false,
            work_duration: capped_secs(work_duration),
            break_duration: capped_secs(break_duration),
            remaining: 0,
            anchor: None,
        }
    }

    /// Create an idle engine from durations given in minutes.
    ///
    /// Minute counts too large to express in seconds saturate.
    pub fn with_minutes(work_mins: u64, break_mins: u64, clock: Arc<dyn Clock>) -> Self {
        Self::new(
            Duration::from_secs(work_mins.saturating_mul(60)),
            Duration::from_secs(break_mins.saturating_mul(60)),
            clock,
        )
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn work_duration(&self) -> Duration {
        Duration::from_secs(self.work_duration)
    }

    pub fn break_duration(&self) -> Duration {
        Duration::from_secs(self.break_duration)
    }

    // ── Controls ─────────────────────────────────────────────────────

    /// Begin a work session, discarding whatever was running
    pub fn start_work(&mut self) {
        self.begin(Phase::Work, self.work_duration);
    }

    /// Begin a short break, discarding whatever was running
    pub fn start_break(&mut self) {
        self.begin(Phase::Break, self.break_duration);
    }

    /// Suspend counting. No-op while idle or already paused.
    pub fn pause(&mut self) {
        if self.phase.is_active() && !self.paused {
            self.paused = true;
            debug!("Paused {} with {}s remaining", self.phase, self.remaining);
        }
    }

    /// Continue counting without charging the paused interval. No-op unless paused.
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            self.anchor = Some(self.clock.now());
            debug!("Resumed {} with {}s remaining", self.phase, self.remaining);
        }
    }

    /// Return to idle
    pub fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.paused = false;
        self.remaining = 0;
        self.anchor = None;
        debug!("Timer reset to idle");
    }

    /// Credit elapsed whole seconds against the running session.
    ///
    /// Fractions of a second stay on the anchor and are credited by a later
    /// call. At most one transition is applied per call, even if several
    /// sessions' worth of time has passed.
    pub fn update(&mut self) -> Option<PhaseChange> {
        if !self.phase.is_active() || self.paused {
            return None;
        }

        let anchor = self.anchor?;
        let now = self.clock.now();
        let Some(elapsed) = now.checked_sub(anchor) else {
            warn!(
                "Clock moved backwards ({:?} < {:?}), skipping update",
                now, anchor
            );
            return None;
        };

        let whole_secs = elapsed.as_secs();
        if whole_secs == 0 {
            return None;
        }

        self.remaining = self
            .remaining
            .saturating_sub(i64::try_from(whole_secs).unwrap_or(i64::MAX));
        self.anchor = Some(anchor + Duration::from_secs(whole_secs));

        if self.remaining > 0 {
            return None;
        }

        let from = self.phase;
        match from {
            Phase::Work => self.start_break(),
            Phase::Break => self.start_work(),
            Phase::Idle => return None,
        }
        Some(PhaseChange {
            from,
            to: self.phase,
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn get_phase(&self) -> Phase {
        self.phase
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Seconds left, never negative
    pub fn get_remaining_seconds(&self) -> u64 {
        self.remaining.max(0) as u64
    }

    /// Remaining time as `MM:SS`
    pub fn get_remaining_label(&self) -> String {
        format_mm_ss(self.get_remaining_seconds())
    }

    pub fn get_phase_name(&self) -> &'static str {
        self.phase.as_str()
    }

    /// Share of the active session already elapsed, in `[0, 100]`.
    ///
    /// Zero while idle; a zero-length session counts as complete.
    pub fn get_progress_percent(&self) -> f64 {
        let total = match self.phase {
            Phase::Idle => return 0.0,
            Phase::Work => self.work_duration,
            Phase::Break => self.break_duration,
        };
        if total == 0 {
            return 100.0;
        }

        let elapsed = total as f64 - self.get_remaining_seconds() as f64;
        (elapsed / total as f64 * 100.0).clamp(0.0, 100.0)
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            phase: self.phase,
            phase_name: self.get_phase_name().to_string(),
            paused: self.paused,
            remaining_seconds: self.get_remaining_seconds(),
            remaining_label: self.get_remaining_label(),
            progress_percent: self.get_progress_percent(),
            work_duration_seconds: self.work_duration,
            break_duration_seconds: self.break_duration,
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn begin(&mut self, phase: Phase, duration_secs: u64) {
        self.phase = phase;
        self.remaining = i64::try_from(duration_secs).unwrap_or(i64::MAX);
        self.anchor = Some(self.clock.now());
        self.paused = false;
        debug!("Started {} session of {}s", phase, duration_secs);
    }
}

impl fmt::Debug for TimerEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerEngine")
            .field("phase", &self.phase)
            .field("paused", &self.paused)
            .field("work_duration", &self.work_duration)
            .field("break_duration", &self.break_duration)
            .field("remaining", &self.remaining)
            .field("anchor", &self.anchor)
            .finish()
    }
}

fn capped_secs(duration: Duration) -> u64 {
    duration.as_secs().min(i64::MAX as u64)
}

/// Format seconds as zero-padded `MM:SS`; minutes widen past 99
pub fn format_mm_ss(total_secs: u64) -> String {
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}
