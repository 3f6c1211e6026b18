//! Fast local display tick

use std::time::Duration;

use tokio::{sync::watch, time::MissedTickBehavior};
use tracing::{debug, info};

use crate::{services::RoomId, state::TimerRecord};

/// Run `tick` every `period`, and right away whenever a new record arrives
///
/// Pure computation only; no store access happens here.
pub async fn display_tick_task<F>(
    room: RoomId,
    period: Duration,
    mut record_rx: watch::Receiver<Option<TimerRecord>>,
    mut shutdown_rx: watch::Receiver<bool>,
    mut tick: F,
) where
    F: FnMut(),
{
    info!(room = %room, "Starting display tick every {:?}", period);

    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut records_open = true;

    loop {
        tokio::select! {
            _ = interval.tick() => tick(),
            changed = record_rx.changed(), if records_open => {
                match changed {
                    Ok(()) => tick(),
                    Err(_) => records_open = false,
                }
            }
            _ = shutdown_rx.changed() => break,
        }
    }

    debug!(room = %room, "Display tick stopped");
}
