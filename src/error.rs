//! Error types for the workshop timer
//!
//! Store failures are mostly swallowed by the polling sessions, but every
//! fallible operation still reports a typed error so callers can decide.

use thiserror::Error;

use crate::state::TimerStatus;

/// Main error type for timer, store and room operations
#[derive(Error, Debug)]
pub enum TimerError {
    /// Transport-level failure talking to the remote store
    #[error("Store request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote store answered with a non-success status
    #[error("Store returned {status} for {path}")]
    StoreStatus { status: u16, path: String },

    /// A record could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Room identifier failed validation
    #[error("Invalid room identifier: {0:?}")]
    InvalidRoom(String),

    /// A configured URL could not be parsed
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The command is not allowed from the timer's current status
    #[error("Cannot {action} a timer that is {status}")]
    InvalidTransition {
        action: &'static str,
        status: TimerStatus,
    },

    /// The command needs a timer but none has been started in the room
    #[error("No timer has been started in this room")]
    NoTimer,

    /// A shared lock was poisoned by a panicking holder
    #[error("Failed to lock {0}")]
    LockPoisoned(&'static str),
}

pub type Result<T> = std::result::Result<T, TimerError>;
