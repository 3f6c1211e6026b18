//! State management module
//!
//! The persisted timer record with its transitions, and the registry of
//! mounted room sessions.

pub mod app_state;
pub mod timer_state;

// Re-export main types
pub use app_state::AppState;
pub use timer_state::{TimerRecord, TimerStatus};
