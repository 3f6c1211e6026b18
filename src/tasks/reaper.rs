//! Idle session reaper

use std::{sync::Arc, time::Duration};

use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::state::AppState;

/// Release idle room sessions every `period`, forever
pub async fn session_reaper_task(state: Arc<AppState>, period: Duration) {
    info!("Starting session reaper every {:?}", period);

    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        match state.reap_idle() {
            Ok(0) => {}
            Ok(reaped) => {
                let (admins, participants) = state.session_counts();
                debug!(
                    "Reaped {} idle sessions, {} admin and {} participant remain",
                    reaped, admins, participants
                );
            }
            Err(e) => warn!("Failed to reap idle sessions: {}", e),
        }
    }
}
