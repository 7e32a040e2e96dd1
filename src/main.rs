//! Study Streak - A poll-driven Pomodoro session timer served over HTTP
//!
//! This is the main entry point for the study-streak application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use study_streak::{
    config::Config,
    state::{AppState, MonotonicClock, TimerEngine},
    api::create_router,
    tasks::ticker_task,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("study_streak={},tower_http=info", config.log_level()))
        .init();

    if let Err(e) = config.validate() {
        anyhow::bail!("Invalid configuration: {}", e);
    }

    info!("Starting study-streak server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, work={}min, break={}min, tick={}ms",
          config.host, config.port, config.work, config.break_mins, config.tick_ms);

    // Create the engine and application state
    let engine = TimerEngine::with_minutes(
        config.work,
        config.break_mins,
        Arc::new(MonotonicClock::new()),
    );
    let state = Arc::new(AppState::new(
        engine,
        config.port,
        config.host.clone(),
        config.touch_debounce(),
    ));

    if config.autostart {
        state.start_work().map_err(anyhow::Error::msg)?;
    }

    // Start the timer polling background task
    let ticker_state = Arc::clone(&state);
    let tick_interval = config.tick_interval();
    tokio::spawn(async move {
        ticker_task(ticker_state, tick_interval).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /start      - Start a work session");
    info!("  POST /break      - Start a short break");
    info!("  POST /pause      - Pause the running session");
    info!("  POST /resume     - Resume a paused session");
    info!("  POST /reset      - Return to idle");
    info!("  POST /touch      - Start/pause/resume gesture");
    info!("  POST /presence   - Report presence {{\"present\": bool}}");
    info!("  GET  /status     - Timer and controller status");
    info!("  GET  /display    - Display values");
    info!("  GET  /health     - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
