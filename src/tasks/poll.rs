//! Periodic store poll

use std::{future::Future, time::Duration};

use tokio::{sync::watch, time::MissedTickBehavior};
use tracing::{debug, info};

use crate::services::RoomId;

/// Run `poll` immediately and then every `period` until shutdown is signalled
///
/// Each poll is awaited before the next tick, so slow reads never overlap.
pub async fn room_poll_task<F, Fut>(
    room: RoomId,
    period: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
    mut poll: F,
) where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    info!(room = %room, "Starting poll task every {:?}", period);

    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = interval.tick() => poll().await,
            _ = shutdown_rx.changed() => break,
        }
    }

    debug!(room = %room, "Poll task stopped");
}
