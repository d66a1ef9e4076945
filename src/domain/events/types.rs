//! Notification events
//!
//! Defines all event types that can be broadcasted to subscribers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::reservation::Reservation;

/// Event types for notifications
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Event {
    ReservationCreated(ReservationEvent),
    ReservationUpdated(ReservationEvent),
    ReservationConfirmed(ReservationEvent),
    ReservationCancelled(ReservationEvent),
    ReservationDeleted(ReservationEvent),
}

impl Event {
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::ReservationCreated(_) => "reservation_created",
            Event::ReservationUpdated(_) => "reservation_updated",
            Event::ReservationConfirmed(_) => "reservation_confirmed",
            Event::ReservationCancelled(_) => "reservation_cancelled",
            Event::ReservationDeleted(_) => "reservation_deleted",
        }
    }

    pub fn business_id(&self) -> &str {
        match self {
            Event::ReservationCreated(e)
            | Event::ReservationUpdated(e)
            | Event::ReservationConfirmed(e)
            | Event::ReservationCancelled(e)
            | Event::ReservationDeleted(e) => &e.business_id,
        }
    }
}

/// Snapshot of a reservation at the time of the event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationEvent {
    pub reservation_id: String,
    pub business_id: String,
    pub resource_id: Option<String>,
    pub status: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub number_of_guests: i32,
}

impl From<&Reservation> for ReservationEvent {
    fn from(r: &Reservation) -> Self {
        Self {
            reservation_id: r.id.clone(),
            business_id: r.business_id.clone(),
            resource_id: r.resource_id.clone(),
            status: r.status.as_str().to_string(),
            start_at: r.start_at(),
            end_at: r.end_at(),
            number_of_guests: r.number_of_guests,
        }
    }
}

/// Wrapper for sending events with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub event: Event,
}

impl EventMessage {
    pub fn new(event: Event) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event,
        }
    }
}
