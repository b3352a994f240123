//! Coalesced volume notifications
//!
//! Every key-press runs a fresh process. The processes coordinate through a
//! single file: the first one to find it missing (or stale) becomes the owner
//! and renders the popup, later ones only overwrite the file with their value
//! and exit. The owner keeps the popup alive while the content keeps
//! changing and removes the file when the session ends.

pub mod coordinator;
pub mod payload;
pub mod popup;
pub mod record;

pub use coordinator::{Coordinator, Outcome, Role, SessionReport};
pub use payload::NotificationPayload;
pub use popup::{DesktopPopup, Popup};
pub use record::CoordinationRecord;

/// Application name announced to the notification server
pub const APP_NAME: &str = "volumen";
