//! Room sessions
//!
//! Each viewed room gets a session object that owns its cached record and
//! its periodic tasks. Sessions are mounted when a room is first viewed
//! and released when the view goes away; nothing lives in globals.

pub mod admin;
pub mod display;
pub mod participant;

use std::sync::{Arc, Mutex};

use tokio::{sync::watch, task::JoinHandle};

use crate::{clock::Clock, config::SessionSettings, services::StateStore};

pub use admin::{AdminSession, AdminSnapshot};
pub use display::TimerDisplay;
pub use participant::ParticipantSession;

/// Collaborators every session needs
#[derive(Clone)]
pub struct SessionContext {
    pub store: Arc<dyn StateStore>,
    pub clock: Arc<dyn Clock>,
    pub settings: Arc<SessionSettings>,
}

impl SessionContext {
    pub fn new(
        store: Arc<dyn StateStore>,
        clock: Arc<dyn Clock>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            store,
            clock,
            settings: Arc::new(settings),
        }
    }
}

/// Shutdown signal and task handles scoped to one session
#[derive(Debug)]
pub struct Lifecycle {
    shutdown_tx: watch::Sender<bool>,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Lifecycle {
    pub fn new() -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            shutdown_tx,
            handles: Mutex::new(Vec::new()),
        }
    }

    pub fn shutdown_rx(&self) -> watch::Receiver<bool> {
        self.shutdown_tx.subscribe()
    }

    /// Keep a spawned task so release can stop it
    pub fn track(&self, handle: JoinHandle<()>) {
        match self.handles.lock() {
            Ok(mut handles) => handles.push(handle),
            Err(_) => handle.abort(),
        }
    }

    /// Signal shutdown and abort anything still mid-await
    pub fn release(&self) {
        self.shutdown_tx.send_replace(true);
        if let Ok(handles) = self.handles.lock() {
            for handle in handles.iter() {
                handle.abort();
            }
        }
    }

    pub fn is_released(&self) -> bool {
        *self.shutdown_tx.borrow()
    }

    /// Number of tasks still running
    pub fn running_tasks(&self) -> usize {
        self.handles
            .lock()
            .map(|handles| handles.iter().filter(|h| !h.is_finished()).count())
            .unwrap_or(0)
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::{sync::Arc, time::Duration};

    use super::{Lifecycle, SessionContext};
    use crate::{clock::ManualClock, config::SessionSettings, services::MemoryStore};

    /// Wait for every aborted task of `lifecycle` to actually finish
    pub async fn wait_stopped(lifecycle: &Lifecycle) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while lifecycle.running_tasks() > 0 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("tasks kept running after release");
    }

    pub fn context() -> (SessionContext, Arc<MemoryStore>, Arc<ManualClock>) {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(0));
        let settings = SessionSettings {
            poll_interval: Duration::from_millis(10),
            tick_interval: Duration::from_millis(5),
            ..SessionSettings::default()
        };
        let ctx = SessionContext::new(store.clone(), clock.clone(), settings);
        (ctx, store, clock)
    }
}
