//! Background tasks module
//!
//! Periodic loops owned by room sessions (the slow store poll and the fast
//! participant display tick) and the reaper that releases idle sessions.

pub mod poll;
pub mod reaper;
pub mod tick;

// Re-export main functions
pub use poll::room_poll_task;
pub use reaper::session_reaper_task;
pub use tick::display_tick_task;
