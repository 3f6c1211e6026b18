//! What a screen shows for a room at a given instant

use serde::{Deserialize, Serialize};

use crate::{
    state::{TimerRecord, TimerStatus},
    utils::format_time,
};

/// Derived view of a room's timer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerDisplay {
    /// No record has been observed for the room yet
    pub waiting: bool,
    pub title: Option<String>,
    pub status: Option<TimerStatus>,
    pub remaining_seconds: i64,
    /// `MM:SS`
    pub formatted: String,
    /// Stopped, or counted down to zero
    pub time_up: bool,
}

impl TimerDisplay {
    pub fn waiting() -> Self {
        Self {
            waiting: true,
            title: None,
            status: None,
            remaining_seconds: 0,
            formatted: format_time(0),
            time_up: false,
        }
    }

    /// Derive the display from a record and the local clock
    pub fn derive(record: Option<&TimerRecord>, now: i64) -> Self {
        let Some(record) = record else {
            return Self::waiting();
        };
        let remaining = record.derive_remaining(now);
        Self {
            waiting: false,
            title: Some(record.title.clone()),
            status: Some(record.status),
            remaining_seconds: remaining,
            formatted: format_time(remaining),
            time_up: record.status == TimerStatus::Stopped || remaining == 0,
        }
    }
}
