use chrono::{DateTime, Utc};

use super::model::{ContactInfo, ReservationStatus};

/// Raw booking request, validated by the reservation service.
/// Used for both create and update.
#[derive(Debug, Clone)]
pub struct ReservationInput {
    pub resource_id: Option<String>,
    pub client_id: Option<String>,
    pub contact: ContactInfo,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub number_of_guests: i32,
    pub notes: Option<String>,
}

/// List filters. Soft-deleted rows are never returned.
#[derive(Debug, Clone, Default)]
pub struct ReservationFilter {
    pub status: Option<ReservationStatus>,
    pub resource_id: Option<String>,
    pub client_id: Option<String>,
    /// Only reservations overlapping `[from, to)`; either side may be open.
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}
