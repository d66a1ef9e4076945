//! WebSocket interfaces
//!
//! - `notifications`: real-time reservation events for UI clients

pub mod notifications;

pub use notifications::{ws_notifications_handler, NotificationState};
