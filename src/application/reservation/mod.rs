//! Reservation lifecycle
//!
//! `ReservationService` validates, checks for double bookings, persists and
//! then notifies the guest and UI subscribers.

pub mod conflict;
pub mod service;

pub use conflict::ConflictChecker;
pub use service::{CancelOutcome, ReservationPolicy, ReservationService};
