//! Facilitator side of a room
//!
//! Commands are computed against the locally cached record and the local
//! clock, written to the store, and applied to the cache without waiting
//! for a confirming read. A background poll keeps the cache converging on
//! whatever was written last, by this session or any other.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::{Lifecycle, SessionContext, TimerDisplay};
use crate::{
    error::{Result, TimerError},
    services::{load_timer, participant_url, qr_image_url, save_timer, RoomId},
    state::TimerRecord,
    tasks::room_poll_task,
};

/// Everything the admin screen needs for one room
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSnapshot {
    pub room: RoomId,
    pub participant_url: String,
    pub qr_url: String,
    pub display: TimerDisplay,
    pub record: Option<TimerRecord>,
}

/// Authoritative write path for a room
pub struct AdminSession {
    room: RoomId,
    ctx: SessionContext,
    record_tx: watch::Sender<Option<TimerRecord>>,
    lifecycle: Lifecycle,
}

impl AdminSession {
    /// Session without background tasks
    pub fn new(room: RoomId, ctx: SessionContext) -> Arc<Self> {
        let (record_tx, _) = watch::channel(None);
        Arc::new(Self {
            room,
            ctx,
            record_tx,
            lifecycle: Lifecycle::new(),
        })
    }

    /// Session with its store poll running
    pub fn mount(room: RoomId, ctx: SessionContext) -> Arc<Self> {
        let session = Self::new(room, ctx);

        let poller = Arc::clone(&session);
        let handle = tokio::spawn(room_poll_task(
            session.room.clone(),
            session.ctx.settings.poll_interval,
            session.lifecycle.shutdown_rx(),
            move || {
                let poller = Arc::clone(&poller);
                async move { poller.refresh().await }
            },
        ));
        session.lifecycle.track(handle);

        info!(room = %session.room, "Admin session mounted");
        session
    }

    pub fn release(&self) {
        self.lifecycle.release();
        info!(room = %self.room, "Admin session released");
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    pub fn room(&self) -> &RoomId {
        &self.room
    }

    /// Locally cached record
    pub fn record(&self) -> Option<TimerRecord> {
        self.record_tx.borrow().clone()
    }

    /// Watch the cached record
    pub fn subscribe(&self) -> watch::Receiver<Option<TimerRecord>> {
        self.record_tx.subscribe()
    }

    /// One poll: a present record overwrites the cache
    ///
    /// Absent documents and failed reads leave the cache alone.
    pub async fn refresh(&self) {
        match load_timer(self.ctx.store.as_ref(), &self.room).await {
            Ok(Some(record)) => {
                self.record_tx.send_if_modified(|cached| {
                    if cached.as_ref() == Some(&record) {
                        false
                    } else {
                        *cached = Some(record);
                        true
                    }
                });
            }
            Ok(None) => {}
            Err(e) => debug!(room = %self.room, "Poll failed, keeping cached timer: {}", e),
        }
    }

    /// Start a fresh timer; allowed when nothing runs or the last one stopped
    ///
    /// `minutes` is clamped to at least one and an empty title falls back
    /// to the configured default.
    pub async fn start(&self, title: Option<&str>, minutes: u32) -> Result<TimerRecord> {
        let title = title
            .filter(|t| !t.is_empty())
            .unwrap_or(self.ctx.settings.default_title.as_str())
            .to_string();
        let minutes = minutes.max(1);

        self.apply("start", move |current, now| match current {
            Some(record) if record.status.is_active() => Err(TimerError::InvalidTransition {
                action: "start",
                status: record.status,
            }),
            _ => Ok(TimerRecord::start(title, minutes, now)),
        })
        .await
    }

    pub async fn pause(&self) -> Result<TimerRecord> {
        self.apply("pause", |current, now| {
            current.ok_or(TimerError::NoTimer)?.pause(now)
        })
        .await
    }

    pub async fn resume(&self) -> Result<TimerRecord> {
        self.apply("resume", |current, now| {
            current.ok_or(TimerError::NoTimer)?.resume(now)
        })
        .await
    }

    pub async fn stop(&self) -> Result<TimerRecord> {
        self.apply("stop", |current, _| Ok(current.ok_or(TimerError::NoTimer)?.stop()))
            .await
    }

    /// Add or remove `delta_seconds` from a running or paused timer
    pub async fn adjust(&self, delta_seconds: i64) -> Result<TimerRecord> {
        self.apply("adjust", move |current, now| {
            current.ok_or(TimerError::NoTimer)?.adjust(delta_seconds, now)
        })
        .await
    }

    /// Current view with shareable links
    pub fn snapshot(&self) -> AdminSnapshot {
        let settings = &self.ctx.settings;
        let link = participant_url(&settings.public_url, &self.room);
        let qr = qr_image_url(&settings.qr_endpoint, &link, settings.qr_size);
        let record = self.record();

        AdminSnapshot {
            room: self.room.clone(),
            participant_url: link.to_string(),
            qr_url: qr.to_string(),
            display: TimerDisplay::derive(record.as_ref(), self.ctx.clock.now_ms()),
            record,
        }
    }

    async fn apply<F>(&self, action: &'static str, transition: F) -> Result<TimerRecord>
    where
        F: FnOnce(Option<&TimerRecord>, i64) -> Result<TimerRecord>,
    {
        let now = self.ctx.clock.now_ms();
        let next = {
            let current = self.record_tx.borrow();
            transition(current.as_ref(), now)?
        };

        // optimistic: the cache is updated whether or not the write lands
        if let Err(e) = save_timer(self.ctx.store.as_ref(), &self.room, &next).await {
            warn!(room = %self.room, "Failed to persist {}: {}", action, e);
        }
        self.record_tx.send_replace(Some(next.clone()));

        info!(
            room = %self.room,
            status = %next.status,
            remaining = next.derive_remaining(now),
            "Timer {}",
            action
        );
        Ok(next)
    }
}
