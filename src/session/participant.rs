//! Read-only viewer of a room
//!
//! The slow poll replaces the last-seen record; the fast tick re-derives
//! the display from that record and the local clock so the countdown moves
//! smoothly between polls.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info};

use super::{Lifecycle, SessionContext, TimerDisplay};
use crate::{
    services::{load_timer, RoomId},
    state::TimerRecord,
    tasks::{display_tick_task, room_poll_task},
};

pub struct ParticipantSession {
    room: RoomId,
    ctx: SessionContext,
    record_tx: watch::Sender<Option<TimerRecord>>,
    display_tx: watch::Sender<TimerDisplay>,
    lifecycle: Lifecycle,
}

impl ParticipantSession {
    /// Session without background tasks
    pub fn new(room: RoomId, ctx: SessionContext) -> Arc<Self> {
        let (record_tx, _) = watch::channel(None);
        let (display_tx, _) = watch::channel(TimerDisplay::waiting());
        Arc::new(Self {
            room,
            ctx,
            record_tx,
            display_tx,
            lifecycle: Lifecycle::new(),
        })
    }

    /// Session with both the store poll and the display tick running
    pub fn mount(room: RoomId, ctx: SessionContext) -> Arc<Self> {
        let session = Self::new(room, ctx);
        let settings = Arc::clone(&session.ctx.settings);

        let poller = Arc::clone(&session);
        session.lifecycle.track(tokio::spawn(room_poll_task(
            session.room.clone(),
            settings.poll_interval,
            session.lifecycle.shutdown_rx(),
            move || {
                let poller = Arc::clone(&poller);
                async move { poller.refresh().await }
            },
        )));

        let ticker = Arc::clone(&session);
        session.lifecycle.track(tokio::spawn(display_tick_task(
            session.room.clone(),
            settings.tick_interval,
            session.record_tx.subscribe(),
            session.lifecycle.shutdown_rx(),
            move || ticker.tick(),
        )));

        info!(room = %session.room, "Participant session mounted");
        session
    }

    pub fn release(&self) {
        self.lifecycle.release();
        info!(room = %self.room, "Participant session released");
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    pub fn room(&self) -> &RoomId {
        &self.room
    }

    /// Last record read from the store
    pub fn record(&self) -> Option<TimerRecord> {
        self.record_tx.borrow().clone()
    }

    /// Latest computed display
    pub fn display(&self) -> TimerDisplay {
        self.display_tx.borrow().clone()
    }

    /// Watch the display; notified only when it actually changes
    pub fn subscribe(&self) -> watch::Receiver<TimerDisplay> {
        self.display_tx.subscribe()
    }

    /// Open display subscriptions, e.g. live event streams
    pub fn subscriber_count(&self) -> usize {
        self.display_tx.receiver_count()
    }

    /// One poll: whatever was read replaces the last record
    ///
    /// An absent document puts the viewer back to waiting; a failed read
    /// keeps showing the previous record.
    pub async fn refresh(&self) {
        match load_timer(self.ctx.store.as_ref(), &self.room).await {
            Ok(record) => {
                self.record_tx.send_if_modified(|cached| {
                    if *cached == record {
                        false
                    } else {
                        *cached = record;
                        true
                    }
                });
            }
            Err(e) => debug!(room = %self.room, "Poll failed, keeping last timer: {}", e),
        }
    }

    /// Re-derive the display against the current clock
    pub fn tick(&self) {
        let display = {
            let record = self.record_tx.borrow();
            TimerDisplay::derive(record.as_ref(), self.ctx.clock.now_ms())
        };
        self.display_tx.send_if_modified(|current| {
            if *current == display {
                false
            } else {
                *current = display;
                true
            }
        });
    }
}
