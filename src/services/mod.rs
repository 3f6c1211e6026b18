//! External collaborators module
//!
//! The remote JSON state store and room addressing (ids, participant
//! links, QR image links).

pub mod room;
pub mod store;

// Re-export main types and functions
pub use room::{participant_url, qr_image_url, RoomId};
pub use store::{load_timer, save_timer, timer_path, HttpStore, MemoryStore, StateStore};
