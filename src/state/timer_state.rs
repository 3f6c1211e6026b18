//! Timer record and its state transitions
//!
//! A room's timer is persisted as a single [`TimerRecord`]. Nothing ticks
//! on the store side: while running, remaining time is always derived from
//! the anchor fields (`started_at`, `duration`) and the caller's clock.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TimerError};

/// Lifecycle status of a room's timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    Running,
    Paused,
    /// Also the fallback for records that carry no status at all
    #[default]
    Stopped,
}

impl TimerStatus {
    /// Running or paused, i.e. the timer can still be controlled
    pub fn is_active(self) -> bool {
        matches!(self, Self::Running | Self::Paused)
    }
}

impl fmt::Display for TimerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Stopped => "stopped",
        };
        f.write_str(label)
    }
}

/// The persisted timer document, one per room
///
/// Missing fields decode to their defaults so partially written documents
/// still load.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimerRecord {
    pub title: String,
    /// Seconds remaining as of `started_at` while running
    pub duration: i64,
    /// Frozen remaining seconds, authoritative only when not running
    pub remaining: i64,
    pub status: TimerStatus,
    /// Milliseconds since epoch when the current running interval began
    pub started_at: Option<i64>,
    /// Informational only
    pub paused_at: Option<i64>,
}

impl TimerRecord {
    /// Fresh running timer of `minutes` anchored at `now`
    ///
    /// Callers clamp `minutes` to at least one.
    pub fn start(title: impl Into<String>, minutes: u32, now: i64) -> Self {
        let seconds = i64::from(minutes) * 60;
        Self {
            title: title.into(),
            duration: seconds,
            remaining: seconds,
            status: TimerStatus::Running,
            started_at: Some(now),
            paused_at: None,
        }
    }

    /// Whole seconds elapsed since `started_at`, floored
    ///
    /// A record without an anchor counts as zero elapsed.
    pub fn elapsed_seconds(&self, now: i64) -> i64 {
        self.started_at
            .map(|started_at| now.saturating_sub(started_at).div_euclid(1000))
            .unwrap_or(0)
    }

    /// True remaining seconds at `now`, never negative
    pub fn derive_remaining(&self, now: i64) -> i64 {
        match self.status {
            TimerStatus::Stopped => 0,
            TimerStatus::Paused => self.remaining.max(0),
            TimerStatus::Running => self.duration.saturating_sub(self.elapsed_seconds(now)).max(0),
        }
    }

    /// Stopped, or run down to zero
    pub fn is_time_up(&self, now: i64) -> bool {
        self.status == TimerStatus::Stopped || self.derive_remaining(now) == 0
    }

    /// Freeze the derived remaining time
    pub fn pause(&self, now: i64) -> Result<Self> {
        self.require(TimerStatus::Running, "pause")?;
        Ok(Self {
            remaining: self.derive_remaining(now),
            status: TimerStatus::Paused,
            paused_at: Some(now),
            ..self.clone()
        })
    }

    /// Re-anchor a paused timer so it counts down from its frozen remaining
    pub fn resume(&self, now: i64) -> Result<Self> {
        self.require(TimerStatus::Paused, "resume")?;
        Ok(Self {
            duration: self.remaining,
            started_at: Some(now),
            status: TimerStatus::Running,
            paused_at: None,
            ..self.clone()
        })
    }

    /// Stop from any state; `duration` and `started_at` become dead fields
    pub fn stop(&self) -> Self {
        Self {
            status: TimerStatus::Stopped,
            remaining: 0,
            ..self.clone()
        }
    }

    /// Add `delta` seconds (negative to subtract), clamped at zero
    ///
    /// Arithmetic saturates, so extreme deltas pin the timer instead of wrapping.
    pub fn adjust(&self, delta: i64, now: i64) -> Result<Self> {
        match self.status {
            TimerStatus::Running => {
                let new_remaining = self.derive_remaining(now).saturating_add(delta).max(0);
                // keep started_at; stretch duration so deriving at `now` yields new_remaining
                Ok(Self {
                    duration: self.elapsed_seconds(now).saturating_add(new_remaining),
                    remaining: new_remaining,
                    ..self.clone()
                })
            }
            TimerStatus::Paused => {
                let new_remaining = self.remaining.saturating_add(delta).max(0);
                Ok(Self {
                    duration: new_remaining,
                    remaining: new_remaining,
                    ..self.clone()
                })
            }
            TimerStatus::Stopped => Err(TimerError::InvalidTransition {
                action: "adjust",
                status: self.status,
            }),
        }
    }

    fn require(&self, expected: TimerStatus, action: &'static str) -> Result<()> {
        if self.status == expected {
            Ok(())
        } else {
            Err(TimerError::InvalidTransition {
                action,
                status: self.status,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_is_non_increasing_and_floored_at_zero() {
        let record = TimerRecord::start("A", 2, 10_000);
        let mut previous = record.derive_remaining(10_000);
        for now in (10_000..200_000).step_by(333) {
            let current = record.derive_remaining(now);
            assert!(current <= previous, "went up at {}", now);
            assert!(current >= 0);
            previous = current;
        }
        assert_eq!(previous, 0);
    }

    #[test]
    fn five_minutes_runs_down_to_zero_and_stays_there() {
        let t = 1_700_000_000_000;
        let record = TimerRecord::start("Break", 5, t);
        assert_eq!(record.derive_remaining(t), 300);
        assert_eq!(record.derive_remaining(t + 300_000), 0);
        assert_eq!(record.derive_remaining(t + 301_000), 0);
        assert!(record.is_time_up(t + 300_000));
        assert!(!record.is_time_up(t + 299_999));
    }

    #[test]
    fn partial_seconds_are_floored() {
        let record = TimerRecord::start("A", 1, 0);
        assert_eq!(record.derive_remaining(999), 60);
        assert_eq!(record.derive_remaining(1_000), 59);
        assert_eq!(record.derive_remaining(1_999), 59);
    }

    #[test]
    fn pause_then_resume_at_same_instant_keeps_remaining() {
        let record = TimerRecord::start("A", 3, 0);
        let now = 42_500;
        let before = record.derive_remaining(now);
        let resumed = record.pause(now).unwrap().resume(now).unwrap();
        assert_eq!(resumed.derive_remaining(now), before);
    }

    #[test]
    fn adjust_up_then_down_restores_remaining() {
        let now = 20_000;
        let running = TimerRecord::start("A", 1, 0);
        let restored = running.adjust(60, now).unwrap().adjust(-60, now).unwrap();
        assert_eq!(restored.derive_remaining(now), running.derive_remaining(now));
        assert_eq!(restored.started_at, Some(0));

        let paused = running.pause(now).unwrap();
        let restored = paused.adjust(60, now).unwrap().adjust(-60, now).unwrap();
        assert_eq!(restored.derive_remaining(now), 40);
    }

    #[test]
    fn adjust_clamps_at_zero() {
        let running = TimerRecord::start("A", 1, 0);
        let drained = running.adjust(-600, 10_000).unwrap();
        assert_eq!(drained.derive_remaining(10_000), 0);
        assert_eq!(drained.duration, 10);
        assert_eq!(drained.derive_remaining(60_000), 0);

        let paused = running.pause(10_000).unwrap().adjust(-600, 10_000).unwrap();
        assert_eq!(paused.remaining, 0);
        assert_eq!(paused.duration, 0);
    }

    #[test]
    fn adjust_on_stopped_is_rejected() {
        let stopped = TimerRecord::start("A", 1, 0).stop();
        assert!(matches!(
            stopped.adjust(60, 0),
            Err(TimerError::InvalidTransition { action: "adjust", status: TimerStatus::Stopped })
        ));
    }

    #[test]
    fn stop_always_derives_zero() {
        let running = TimerRecord::start("A", 10, 0);
        let paused = running.pause(5_000).unwrap();
        for record in [&running, &paused, &running.stop()] {
            let stopped = record.stop();
            assert_eq!(stopped.status, TimerStatus::Stopped);
            assert_eq!(stopped.derive_remaining(0), 0);
            assert_eq!(stopped.derive_remaining(1_000_000), 0);
        }
    }

    #[test]
    fn pause_and_resume_require_matching_status() {
        let running = TimerRecord::start("A", 1, 0);
        assert!(running.resume(0).is_err());
        let paused = running.pause(0).unwrap();
        assert!(paused.pause(0).is_err());
        assert!(running.stop().pause(0).is_err());
        assert!(running.stop().resume(0).is_err());
    }

    #[test]
    fn start_pause_resume_scenario() {
        let record = TimerRecord::start("A", 1, 0);
        assert_eq!(record.duration, 60);
        assert_eq!(record.remaining, 60);
        assert_eq!(record.status, TimerStatus::Running);
        assert_eq!(record.started_at, Some(0));
        assert_eq!(record.paused_at, None);
        assert_eq!(record.derive_remaining(30_000), 30);

        let paused = record.pause(30_000).unwrap();
        assert_eq!(paused.remaining, 30);
        assert_eq!(paused.status, TimerStatus::Paused);
        assert_eq!(paused.paused_at, Some(30_000));

        let resumed = paused.resume(40_000).unwrap();
        assert_eq!(resumed.duration, 30);
        assert_eq!(resumed.started_at, Some(40_000));
        assert_eq!(resumed.status, TimerStatus::Running);
        assert_eq!(resumed.paused_at, None);
        assert_eq!(resumed.derive_remaining(50_000), 20);
    }

    #[test]
    fn record_uses_store_field_names() {
        let record = TimerRecord::start("Lavoro", 1, 5);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "title": "Lavoro",
                "duration": 60,
                "remaining": 60,
                "status": "running",
                "startedAt": 5,
                "pausedAt": null
            })
        );
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let record: TimerRecord = serde_json::from_value(serde_json::json!({
            "remaining": 12,
            "status": "paused"
        }))
        .unwrap();
        assert_eq!(record.title, "");
        assert_eq!(record.duration, 0);
        assert_eq!(record.derive_remaining(0), 12);

        let bare: TimerRecord = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(bare.status, TimerStatus::Stopped);
        assert_eq!(bare.derive_remaining(123), 0);
    }

    #[test]
    fn running_without_anchor_counts_no_elapsed_time() {
        let record: TimerRecord = serde_json::from_value(serde_json::json!({
            "duration": 90,
            "status": "running"
        }))
        .unwrap();
        assert_eq!(record.derive_remaining(1_000_000), 90);
    }

    #[test]
    fn clock_behind_anchor_floors_toward_negative() {
        let record = TimerRecord::start("A", 1, 10_000);
        assert_eq!(record.elapsed_seconds(9_500), -1);
        assert_eq!(record.derive_remaining(9_500), 61);
    }

    #[test]
    fn extreme_deltas_saturate_instead_of_wrapping() {
        let running = TimerRecord::start("A", 1, 0);
        let boosted = running.adjust(i64::MAX, 10_000).unwrap();
        assert!(boosted.derive_remaining(10_000) >= i64::MAX - 10);
        assert!(boosted.derive_remaining(20_000) > 0);
        assert_eq!(running.adjust(i64::MIN, 10_000).unwrap().derive_remaining(10_000), 0);

        let paused = running.pause(10_000).unwrap();
        assert_eq!(paused.adjust(i64::MAX, 10_000).unwrap().remaining, i64::MAX);
        assert_eq!(paused.adjust(i64::MIN, 10_000).unwrap().remaining, 0);
        let maxed = paused.adjust(i64::MAX, 10_000).unwrap();
        assert_eq!(maxed.adjust(1, 10_000).unwrap().remaining, i64::MAX);
    }

    #[test]
    fn extreme_anchor_from_store_does_not_overflow() {
        let record: TimerRecord = serde_json::from_value(serde_json::json!({
            "status": "running",
            "duration": 60,
            "startedAt": i64::MIN
        }))
        .unwrap();
        assert_eq!(record.derive_remaining(1_700_000_000_000), 0);
        assert!(record.adjust(60, 1_700_000_000_000).is_ok());

        let future: TimerRecord = serde_json::from_value(serde_json::json!({
            "status": "running",
            "duration": i64::MAX,
            "startedAt": i64::MAX
        }))
        .unwrap();
        assert_eq!(future.derive_remaining(i64::MIN), i64::MAX);
    }
}
