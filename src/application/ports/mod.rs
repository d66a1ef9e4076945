//! Outbound ports: interfaces the application layer calls out through

pub mod notification;

pub use notification::{NotificationError, NotificationPort, Recipient};
