//! Workshop Timer - a countdown shared between a facilitator and participants
//!
//! The timer lives in a remote JSON store as one record per room. Nothing
//! ticks remotely: admin and participant sessions poll the record and
//! derive the remaining time from its anchor fields and the local clock.

pub mod api;
pub mod clock;
pub mod config;
pub mod error;
pub mod services;
pub mod session;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{Config, SessionSettings};
pub use error::{Result, TimerError};
pub use state::{AppState, TimerRecord, TimerStatus};
pub use utils::signals::shutdown_signal;
