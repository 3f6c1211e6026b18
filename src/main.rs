//! Workshop Timer - synchronized countdown for facilitators and participants
//!
//! This is the main entry point for the workshop-timer server.

use std::{sync::Arc, time::Duration};

use tokio::net::TcpListener;
use tracing::info;

use workshop_timer::{
    api::create_router,
    clock::SystemClock,
    config::Config,
    services::{HttpStore, MemoryStore, StateStore},
    session::SessionContext,
    state::AppState,
    tasks::session_reaper_task,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "workshop_timer={},tower_http=info",
            config.log_level()
        ))
        .init();

    info!("Starting workshop-timer v{}", env!("CARGO_PKG_VERSION"));

    let store: Arc<dyn StateStore> = if config.in_memory {
        info!("Using in-memory store; timers will not outlive this process");
        Arc::new(MemoryStore::new())
    } else {
        info!("Using remote store at {}", config.store_url);
        Arc::new(HttpStore::new(&config.store_url, config.store_timeout())?)
    };

    let settings = config.session_settings()?;
    info!(
        "Configuration: host={}, port={}, poll={:?}, tick={:?}, public_url={}",
        config.host, config.port, settings.poll_interval, settings.tick_interval, settings.public_url
    );

    let ctx = SessionContext::new(store, Arc::new(SystemClock), settings);
    let state = Arc::new(AppState::new(ctx));
    let app = create_router(Arc::clone(&state));

    // Release sessions for rooms nobody is looking at
    let reap_period = (state.ctx.settings.idle_timeout / 4).max(Duration::from_secs(1));
    tokio::spawn(session_reaper_task(Arc::clone(&state), reap_period));

    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET    /                    - Landing, or participant view with ?room=ID");
    info!("  POST   /rooms               - Create a room");
    info!("  GET    /rooms/:room         - Admin view");
    info!("  POST   /rooms/:room/start   - Start a timer");
    info!("  POST   /rooms/:room/pause   - Pause");
    info!("  POST   /rooms/:room/resume  - Resume");
    info!("  POST   /rooms/:room/stop    - Stop");
    info!("  POST   /rooms/:room/adjust  - Add or remove seconds");
    info!("  DELETE /rooms/:room         - Release the room's sessions");
    info!("  GET    /rooms/:room/view    - Participant view");
    info!("  GET    /rooms/:room/events  - Participant view as server-sent events");
    info!("  GET    /health              - Health check");

    // Setup graceful shutdown; open event streams are not waited for
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

    info!("Releasing room sessions");
    state.release_all();

    info!("Server shutdown complete");
    Ok(())
}
