//! Main application state: the room session registry

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use tracing::info;

use crate::{
    error::{Result, TimerError},
    services::RoomId,
    session::{AdminSession, ParticipantSession, SessionContext},
};

/// A mounted session and when a request last used it
struct Mounted<T> {
    session: Arc<T>,
    last_access: Instant,
}

impl<T> Mounted<T> {
    fn new(session: Arc<T>) -> Self {
        Self {
            session,
            last_access: Instant::now(),
        }
    }

    fn touch(&mut self) -> Arc<T> {
        self.last_access = Instant::now();
        Arc::clone(&self.session)
    }

    fn idle_at(&self, now: Instant, idle_timeout: Duration) -> bool {
        now.saturating_duration_since(self.last_access) >= idle_timeout
    }
}

/// Shared state behind the HTTP handlers
///
/// Sessions are mounted on first use and live until their room is
/// released, they sit idle past the configured timeout, or the server
/// shuts down.
pub struct AppState {
    pub ctx: SessionContext,
    pub start_time: Instant,
    admins: Mutex<HashMap<RoomId, Mounted<AdminSession>>>,
    participants: Mutex<HashMap<RoomId, Mounted<ParticipantSession>>>,
}

impl AppState {
    pub fn new(ctx: SessionContext) -> Self {
        Self {
            ctx,
            start_time: Instant::now(),
            admins: Mutex::new(HashMap::new()),
            participants: Mutex::new(HashMap::new()),
        }
    }

    /// Admin session for `room`, mounting it if needed
    pub fn admin_session(&self, room: &RoomId) -> Result<Arc<AdminSession>> {
        let mut admins = self
            .admins
            .lock()
            .map_err(|_| TimerError::LockPoisoned("admin sessions"))?;
        let entry = admins.entry(room.clone()).or_insert_with(|| {
            Mounted::new(AdminSession::mount(room.clone(), self.ctx.clone()))
        });
        Ok(entry.touch())
    }

    /// Participant session for `room`, mounting it if needed
    pub fn participant_session(&self, room: &RoomId) -> Result<Arc<ParticipantSession>> {
        let mut participants = self
            .participants
            .lock()
            .map_err(|_| TimerError::LockPoisoned("participant sessions"))?;
        let entry = participants.entry(room.clone()).or_insert_with(|| {
            Mounted::new(ParticipantSession::mount(room.clone(), self.ctx.clone()))
        });
        Ok(entry.touch())
    }

    /// Release both sessions of a room; true if anything was mounted
    pub fn release_room(&self, room: &RoomId) -> Result<bool> {
        let admin = self
            .admins
            .lock()
            .map_err(|_| TimerError::LockPoisoned("admin sessions"))?
            .remove(room);
        let participant = self
            .participants
            .lock()
            .map_err(|_| TimerError::LockPoisoned("participant sessions"))?
            .remove(room);

        let released = admin.is_some() || participant.is_some();
        if let Some(admin) = admin {
            admin.session.release();
        }
        if let Some(participant) = participant {
            participant.session.release();
        }
        Ok(released)
    }

    /// Release sessions idle for at least the configured timeout
    pub fn reap_idle(&self) -> Result<usize> {
        self.reap_idle_at(Instant::now())
    }

    /// Release sessions not requested since `now - idle_timeout`
    ///
    /// Participant sessions with an open display subscription are kept.
    pub fn reap_idle_at(&self, now: Instant) -> Result<usize> {
        let idle_timeout = self.ctx.settings.idle_timeout;

        let admins: Vec<_> = {
            let mut admins = self
                .admins
                .lock()
                .map_err(|_| TimerError::LockPoisoned("admin sessions"))?;
            let idle: Vec<RoomId> = admins
                .iter()
                .filter(|(_, m)| m.idle_at(now, idle_timeout))
                .map(|(room, _)| room.clone())
                .collect();
            idle.iter().filter_map(|room| admins.remove(room)).collect()
        };
        let participants: Vec<_> = {
            let mut participants = self
                .participants
                .lock()
                .map_err(|_| TimerError::LockPoisoned("participant sessions"))?;
            let idle: Vec<RoomId> = participants
                .iter()
                .filter(|(_, m)| {
                    m.idle_at(now, idle_timeout) && m.session.subscriber_count() == 0
                })
                .map(|(room, _)| room.clone())
                .collect();
            idle.iter().filter_map(|room| participants.remove(room)).collect()
        };

        for admin in &admins {
            info!(room = %admin.session.room(), "Reaping idle admin session");
            admin.session.release();
        }
        for participant in &participants {
            info!(room = %participant.session.room(), "Reaping idle participant session");
            participant.session.release();
        }
        Ok(admins.len() + participants.len())
    }

    /// Release every mounted session
    pub fn release_all(&self) {
        let admins: Vec<_> = self
            .admins
            .lock()
            .map(|mut admins| admins.drain().map(|(_, m)| m.session).collect())
            .unwrap_or_default();
        let participants: Vec<_> = self
            .participants
            .lock()
            .map(|mut participants| participants.drain().map(|(_, m)| m.session).collect())
            .unwrap_or_default();

        info!(
            "Releasing {} admin and {} participant sessions",
            admins.len(),
            participants.len()
        );
        for admin in admins {
            admin.release();
        }
        for participant in participants {
            participant.release();
        }
    }

    /// Number of mounted (admin, participant) sessions
    pub fn session_counts(&self) -> (usize, usize) {
        let admins = self.admins.lock().map(|a| a.len()).unwrap_or(0);
        let participants = self.participants.lock().map(|p| p.len()).unwrap_or(0);
        (admins, participants)
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::test_support::{context, wait_stopped};

    #[tokio::test]
    async fn sessions_are_mounted_once_per_room() {
        let (ctx, _, _) = context();
        let state = AppState::new(ctx);
        let room = RoomId::parse("abc").unwrap();

        let first = state.admin_session(&room).unwrap();
        let second = state.admin_session(&room).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        state.participant_session(&room).unwrap();
        assert_eq!(state.session_counts(), (1, 1));
    }

    #[tokio::test]
    async fn releasing_a_room_stops_its_sessions() {
        let (ctx, _, _) = context();
        let state = AppState::new(ctx);
        let room = RoomId::parse("abc").unwrap();
        let admin = state.admin_session(&room).unwrap();
        let viewer = state.participant_session(&room).unwrap();

        assert!(state.release_room(&room).unwrap());
        assert!(admin.lifecycle().is_released());
        assert!(viewer.lifecycle().is_released());
        assert_eq!(state.session_counts(), (0, 0));
        assert!(!state.release_room(&room).unwrap());
    }

    #[tokio::test]
    async fn release_all_empties_the_registry() {
        let (ctx, _, _) = context();
        let state = AppState::new(ctx);
        for id in ["a", "b", "c"] {
            state.admin_session(&RoomId::parse(id).unwrap()).unwrap();
        }
        state.release_all();
        assert_eq!(state.session_counts(), (0, 0));
    }

    #[tokio::test]
    async fn unvisited_sessions_are_reaped() {
        let (ctx, _, _) = context();
        let idle_timeout = ctx.settings.idle_timeout;
        let state = AppState::new(ctx);
        let room = RoomId::parse("ghost").unwrap();
        let admin = state.admin_session(&room).unwrap();
        let viewer = state.participant_session(&room).unwrap();

        assert_eq!(state.reap_idle().unwrap(), 0);
        assert_eq!(state.session_counts(), (1, 1));

        let later = Instant::now() + idle_timeout;
        assert_eq!(state.reap_idle_at(later).unwrap(), 2);
        assert_eq!(state.session_counts(), (0, 0));
        assert!(admin.lifecycle().is_released());
        assert!(viewer.lifecycle().is_released());
        wait_stopped(admin.lifecycle()).await;
        wait_stopped(viewer.lifecycle()).await;
    }

    #[tokio::test]
    async fn visits_and_open_streams_keep_sessions_alive() {
        let (ctx, _, _) = context();
        let idle_timeout = ctx.settings.idle_timeout;
        let state = AppState::new(ctx);
        let watched = RoomId::parse("watched").unwrap();
        let visited = RoomId::parse("visited").unwrap();

        let stream = state.participant_session(&watched).unwrap().subscribe();
        let start = Instant::now();
        state.admin_session(&visited).unwrap();

        // a visit just before the deadline restarts the idle clock
        tokio::time::sleep(Duration::from_millis(5)).await;
        state.admin_session(&visited).unwrap();
        let deadline = start + idle_timeout;
        assert_eq!(state.reap_idle_at(deadline).unwrap(), 0);
        assert_eq!(state.session_counts(), (1, 1));

        drop(stream);
        assert_eq!(state.reap_idle_at(deadline + idle_timeout).unwrap(), 2);
        assert_eq!(state.session_counts(), (0, 0));
    }
}
