//! Timer polling background task

use std::{sync::Arc, time::Duration};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::state::AppState;

/// Background task that drives the timer engine on a fixed cadence
pub async fn ticker_task(state: Arc<AppState>, period: Duration) {
    info!("Starting timer ticker task ({}ms cadence)", period.as_millis());

    let mut interval = interval(period);
    // A late poll just credits more time; bursts of catch-up ticks gain nothing
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        match state.tick() {
            Ok(Some(change)) => {
                debug!("Ticker applied transition {} -> {}", change.from, change.to);
            }
            Ok(None) => {}
            Err(e) => {
                error!("Failed to update timer: {}", e);
            }
        }
    }
}
