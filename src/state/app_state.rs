//! Main application state management

use std::{
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch};
use tracing::{debug, error, info, warn};

use super::{Phase, PhaseChange, TimerEngine, TimerSnapshot};

/// What a touch gesture did to the timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TouchOutcome {
    /// Arrived inside the debounce window
    Ignored,
    Started,
    Paused,
    Resumed,
}

impl TouchOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            TouchOutcome::Ignored => "ignored",
            TouchOutcome::Started => "started",
            TouchOutcome::Paused => "paused",
            TouchOutcome::Resumed => "resumed",
        }
    }
}

/// Shared application state: the timer engine plus everything the
/// controller tracks around it
#[derive(Debug)]
pub struct AppState {
    /// The timer engine, mutated only through the methods below
    pub engine: Arc<Mutex<TimerEngine>>,
    /// Completed work sessions since start or the last reset
    pub session_count: Arc<Mutex<u32>>,
    /// Last reported presence; a user is assumed present at boot
    pub presence: Arc<Mutex<bool>>,
    /// Engine clock reading of the last accepted touch
    last_touch: Arc<Mutex<Option<Duration>>>,
    pub touch_debounce: Duration,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    /// Channel for phase transition notifications
    pub phase_change_tx: broadcast::Sender<PhaseChange>,
    /// Channel for timer snapshot updates
    pub snapshot_tx: watch::Sender<TimerSnapshot>,
    /// Keep the receiver alive to prevent channel closure
    pub _snapshot_rx: watch::Receiver<TimerSnapshot>,
}

impl AppState {
    /// Wrap an engine in a new AppState
    pub fn new(engine: TimerEngine, port: u16, host: String, touch_debounce: Duration) -> Self {
        let (phase_change_tx, _) = broadcast::channel(16);
        let (snapshot_tx, snapshot_rx) = watch::channel(engine.snapshot());

        Self {
            engine: Arc::new(Mutex::new(engine)),
            session_count: Arc::new(Mutex::new(0)),
            presence: Arc::new(Mutex::new(true)),
            last_touch: Arc::new(Mutex::new(None)),
            touch_debounce,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
            phase_change_tx,
            snapshot_tx,
            _snapshot_rx: snapshot_rx,
        }
    }

    /// Apply a control call to the engine and publish the resulting snapshot
    pub fn control<F>(&self, action: &str, apply: F) -> Result<TimerSnapshot, String>
    where
        F: FnOnce(&mut TimerEngine),
    {
        let mut engine = self.lock_engine()?;
        apply(&mut *engine);
        let snapshot = engine.snapshot();
        drop(engine); // Release the lock early

        self.record_action(action);
        self.publish(&snapshot);
        Ok(snapshot)
    }

    /// Start a work session
    pub fn start_work(&self) -> Result<TimerSnapshot, String> {
        info!("Starting work session");
        self.control("start", TimerEngine::start_work)
    }

    /// Start a short break
    pub fn start_break(&self) -> Result<TimerSnapshot, String> {
        info!("Starting short break");
        self.control("break", TimerEngine::start_break)
    }

    /// Pause the running session
    pub fn pause(&self) -> Result<TimerSnapshot, String> {
        info!("Pausing timer");
        self.control("pause", TimerEngine::pause)
    }

    /// Resume a paused session
    pub fn resume(&self) -> Result<TimerSnapshot, String> {
        info!("Resuming timer");
        self.control("resume", TimerEngine::resume)
    }

    /// Return to idle and clear the session count
    pub fn reset(&self) -> Result<TimerSnapshot, String> {
        info!("Resetting timer");
        let snapshot = self.control("reset", TimerEngine::reset)?;
        *self.lock_session_count()? = 0;
        Ok(snapshot)
    }

    /// Advance the engine by one poll and react to a completed session
    pub fn tick(&self) -> Result<Option<PhaseChange>, String> {
        let mut engine = self.lock_engine()?;
        let change = engine.update();
        let snapshot = engine.snapshot();
        drop(engine);

        self.publish(&snapshot);
        if let Some(change) = change {
            self.on_phase_change(change);
        }

        Ok(change)
    }

    /// Single-input gesture: start when idle, resume when paused, pause otherwise
    pub fn touch(&self) -> Result<(TouchOutcome, TimerSnapshot), String> {
        let mut engine = self.lock_engine()?;
        let now = engine.clock().now();

        {
            let mut last_touch = self.last_touch.lock()
                .map_err(|e| format!("Failed to lock touch state: {}", e))?;
            if let Some(last) = *last_touch {
                if now.saturating_sub(last) < self.touch_debounce {
                    debug!("Touch ignored inside debounce window");
                    return Ok((TouchOutcome::Ignored, engine.snapshot()));
                }
            }
            *last_touch = Some(now);
        }

        let outcome = if engine.get_phase() == Phase::Idle {
            engine.start_work();
            TouchOutcome::Started
        } else if engine.is_paused() {
            engine.resume();
            TouchOutcome::Resumed
        } else {
            engine.pause();
            TouchOutcome::Paused
        };
        let snapshot = engine.snapshot();
        drop(engine);

        info!("Touch detected: timer {}", outcome.as_str());
        self.record_action("touch");
        self.publish(&snapshot);
        Ok((outcome, snapshot))
    }

    /// Record a presence reading; pauses on loss and resumes on return
    pub fn set_presence(&self, present: bool) -> Result<TimerSnapshot, String> {
        let mut presence = self.presence.lock()
            .map_err(|e| format!("Failed to lock presence state: {}", e))?;
        let changed = *presence != present;
        *presence = present;
        drop(presence);

        if !changed {
            return self.get_snapshot();
        }

        let mut engine = self.lock_engine()?;
        let mut acted = false;
        if engine.get_phase().is_active() {
            if !present {
                info!("Presence lost: auto-pausing timer");
                engine.pause();
                acted = true;
            } else if engine.is_paused() {
                info!("Presence detected: auto-resuming timer");
                engine.resume();
                acted = true;
            }
        }
        let snapshot = engine.snapshot();
        drop(engine);

        if acted {
            self.record_action(if present { "presence-on" } else { "presence-off" });
            self.publish(&snapshot);
        } else {
            debug!("Presence changed to {} with no timer action", present);
        }
        Ok(snapshot)
    }

    /// Get current timer snapshot
    pub fn get_snapshot(&self) -> Result<TimerSnapshot, String> {
        self.lock_engine().map(|engine| engine.snapshot())
    }

    /// Get the number of completed work sessions
    pub fn get_session_count(&self) -> Result<u32, String> {
        self.lock_session_count().map(|count| *count)
    }

    /// Get the last reported presence
    pub fn is_present(&self) -> Result<bool, String> {
        self.presence.lock()
            .map(|presence| *presence)
            .map_err(|e| format!("Failed to lock presence state: {}", e))
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let secs = self.start_time.elapsed().as_secs();
        let hours = secs / 3600;
        let minutes = (secs % 3600) / 60;
        let seconds = secs % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }

    fn on_phase_change(&self, change: PhaseChange) {
        match (change.from, change.to) {
            (Phase::Work, Phase::Break) => match self.lock_session_count() {
                Ok(mut count) => {
                    *count += 1;
                    info!("Work session completed! Break time! (sessions: {})", *count);
                }
                Err(e) => {
                    error!("Work session completed but not counted: {}", e);
                }
            },
            (Phase::Break, Phase::Work) => {
                info!("Break completed! Back to work!");
            }
            (from, to) => {
                info!("State transition: {} -> {}", from, to);
            }
        }

        if self.phase_change_tx.send(change).is_err() {
            debug!("No subscribers for phase change notification");
        }
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    fn publish(&self, snapshot: &TimerSnapshot) {
        if let Err(e) = self.snapshot_tx.send(snapshot.clone()) {
            warn!("Failed to send timer snapshot: {}", e);
        }
    }

    fn lock_engine(&self) -> Result<std::sync::MutexGuard<'_, TimerEngine>, String> {
        self.engine.lock()
            .map_err(|e| format!("Failed to lock timer engine: {}", e))
    }

    fn lock_session_count(&self) -> Result<std::sync::MutexGuard<'_, u32>, String> {
        self.session_count.lock()
            .map_err(|e| format!("Failed to lock session count: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ManualClock;

    fn app_state(work_secs: u64, break_secs: u64) -> (AppState, ManualClock) {
        let clock = ManualClock::new();
        let engine = TimerEngine::new(
            Duration::from_secs(work_secs),
            Duration::from_secs(break_secs),
            Arc::new(clock.clone()),
        );
        let state = AppState::new(engine, 0, "127.0.0.1".to_string(), Duration::from_millis(300));
        (state, clock)
    }

    #[test]
    fn tick_counts_completed_work_sessions() {
        let (state, clock) = app_state(2, 1);
        let mut changes = state.phase_change_tx.subscribe();
        state.start_work().unwrap();

        clock.advance_secs(2);
        let change = state.tick().unwrap();
        assert_eq!(change.map(|c| c.to), Some(Phase::Break));
        assert_eq!(state.get_session_count().unwrap(), 1);
        assert_eq!(changes.try_recv().unwrap().from, Phase::Work);

        clock.advance_secs(1);
        state.tick().unwrap();
        assert_eq!(state.get_snapshot().unwrap().phase, Phase::Work);
        assert_eq!(state.get_session_count().unwrap(), 1);

        clock.advance_secs(2);
        state.tick().unwrap();
        assert_eq!(state.get_session_count().unwrap(), 2);
    }

    #[test]
    fn transition_is_published_when_counter_lock_is_poisoned() {
        let (state, clock) = app_state(1, 5);
        let mut changes = state.phase_change_tx.subscribe();
        let rx = state.snapshot_tx.subscribe();
        state.start_work().unwrap();

        let count = Arc::clone(&state.session_count);
        let _ = std::thread::spawn(move || {
            let _guard = count.lock().unwrap();
            panic!("poisoning session count");
        })
        .join();
        assert!(state.get_session_count().is_err());

        clock.advance_secs(1);
        let change = state.tick().unwrap();
        assert_eq!(change.map(|c| c.to), Some(Phase::Break));
        assert_eq!(changes.try_recv().unwrap().to, Phase::Break);
        assert_eq!(rx.borrow().phase, Phase::Break);
        assert_eq!(rx.borrow().remaining_seconds, 5);
    }

    #[test]
    fn tick_publishes_latest_snapshot() {
        let (state, clock) = app_state(10, 5);
        let rx = state.snapshot_tx.subscribe();
        state.start_work().unwrap();

        clock.advance_secs(3);
        state.tick().unwrap();
        assert_eq!(rx.borrow().remaining_seconds, 7);
        assert_eq!(rx.borrow().remaining_label, "00:07");
    }

    #[test]
    fn reset_clears_session_count() {
        let (state, clock) = app_state(1, 1);
        state.start_work().unwrap();
        clock.advance_secs(1);
        state.tick().unwrap();
        assert_eq!(state.get_session_count().unwrap(), 1);

        let snapshot = state.reset().unwrap();
        assert_eq!(snapshot.phase, Phase::Idle);
        assert_eq!(state.get_session_count().unwrap(), 0);
        assert_eq!(state.get_last_action().0.as_deref(), Some("reset"));
    }

    #[test]
    fn touch_cycles_start_pause_resume() {
        let (state, clock) = app_state(100, 10);

        let (outcome, snapshot) = state.touch().unwrap();
        assert_eq!(outcome, TouchOutcome::Started);
        assert_eq!(snapshot.phase, Phase::Work);

        clock.advance_millis(400);
        let (outcome, snapshot) = state.touch().unwrap();
        assert_eq!(outcome, TouchOutcome::Paused);
        assert!(snapshot.paused);

        clock.advance_millis(400);
        let (outcome, snapshot) = state.touch().unwrap();
        assert_eq!(outcome, TouchOutcome::Resumed);
        assert!(!snapshot.paused);
    }

    #[test]
    fn touch_inside_debounce_window_is_ignored() {
        let (state, clock) = app_state(100, 10);
        state.touch().unwrap();

        clock.advance_millis(100);
        let (outcome, snapshot) = state.touch().unwrap();
        assert_eq!(outcome, TouchOutcome::Ignored);
        assert!(!snapshot.paused);

        clock.advance_millis(300);
        let (outcome, _) = state.touch().unwrap();
        assert_eq!(outcome, TouchOutcome::Paused);
    }

    #[test]
    fn presence_loss_pauses_and_return_resumes() {
        let (state, clock) = app_state(100, 10);
        state.start_work().unwrap();

        let snapshot = state.set_presence(false).unwrap();
        assert!(snapshot.paused);
        assert!(!state.is_present().unwrap());

        clock.advance_secs(30);
        state.tick().unwrap();
        assert_eq!(state.get_snapshot().unwrap().remaining_seconds, 100);

        let snapshot = state.set_presence(true).unwrap();
        assert!(!snapshot.paused);
        clock.advance_secs(1);
        state.tick().unwrap();
        assert_eq!(state.get_snapshot().unwrap().remaining_seconds, 99);
    }

    #[test]
    fn presence_is_ignored_while_idle_or_unchanged() {
        let (state, _) = app_state(100, 10);
        let snapshot = state.set_presence(false).unwrap();
        assert_eq!(snapshot.phase, Phase::Idle);
        assert!(!snapshot.paused);
        assert_eq!(state.get_last_action().0, None);

        state.start_work().unwrap();
        // Already absent: no change, so no pause
        let snapshot = state.set_presence(false).unwrap();
        assert!(!snapshot.paused);
    }

    #[test]
    fn uptime_formats_seconds() {
        let (state, _) = app_state(1, 1);
        assert!(state.get_uptime().ends_with('s'));
    }
}
