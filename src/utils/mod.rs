//! Utility functions module
//!
//! Shutdown signals and countdown formatting.

pub mod format;
pub mod signals;

// Re-export main functions
pub use format::format_time;
pub use signals::shutdown_signal;
