//! Reservation domain entity

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::time_range::TimeRange;
use crate::domain::DomainError;

/// Reservation status
///
/// Soft deletion is tracked separately in [`Reservation::deleted_at`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReservationStatus {
    /// Waiting for the business to approve
    Pending,
    /// Booked
    Confirmed,
    /// Cancelled by the guest or the business (terminal)
    Cancelled,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Confirmed => "Confirmed",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl FromStr for ReservationStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" | "pending" => Ok(Self::Pending),
            "Confirmed" | "confirmed" => Ok(Self::Confirmed),
            "Cancelled" | "cancelled" => Ok(Self::Cancelled),
            other => Err(DomainError::Validation(format!(
                "Unknown reservation status: {}",
                other
            ))),
        }
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Guest contact details captured on the booking (walk-ins have no client account).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
    /// National ID document number
    pub dni: Option<String>,
}

/// Validated, mutable attributes of a reservation.
#[derive(Debug, Clone, PartialEq)]
pub struct ReservationDetails {
    pub resource_id: Option<String>,
    pub client_id: Option<String>,
    pub contact: ContactInfo,
    pub range: TimeRange,
    pub number_of_guests: i32,
    pub notes: Option<String>,
}

/// A booking owned by exactly one business
#[derive(Debug, Clone, PartialEq)]
pub struct Reservation {
    pub id: String,
    pub business_id: String,
    /// Table or room, `None` for walk-ins
    pub resource_id: Option<String>,
    pub client_id: Option<String>,
    pub contact: ContactInfo,
    pub range: TimeRange,
    pub number_of_guests: i32,
    pub notes: Option<String>,
    pub status: ReservationStatus,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Reservation {
    pub fn new(
        business_id: impl Into<String>,
        details: ReservationDetails,
        status: ReservationStatus,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            business_id: business_id.into(),
            resource_id: details.resource_id,
            client_id: details.client_id,
            contact: details.contact,
            range: details.range,
            number_of_guests: details.number_of_guests,
            notes: details.notes,
            status,
            cancelled_at: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn start_at(&self) -> DateTime<Utc> {
        self.range.start()
    }

    pub fn end_at(&self) -> DateTime<Utc> {
        self.range.end()
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == ReservationStatus::Cancelled
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Whether this reservation occupies its resource for conflict checks.
    pub fn holds_resource(&self) -> bool {
        self.resource_id.is_some() && !self.is_cancelled() && !self.is_deleted()
    }

    /// Whether this reservation blocks `range` on `resource_id` in `business_id`.
    /// `exclude_id` lets an in-place update ignore itself.
    pub fn blocks(
        &self,
        resource_id: &str,
        business_id: &str,
        range: &TimeRange,
        exclude_id: Option<&str>,
    ) -> bool {
        self.holds_resource()
            && self.business_id == business_id
            && self.resource_id.as_deref() == Some(resource_id)
            && exclude_id != Some(self.id.as_str())
            && self.range.overlaps(range)
    }

    /// Replace the bookable attributes, keeping identity and status.
    pub fn apply(&mut self, details: ReservationDetails) {
        self.resource_id = details.resource_id;
        self.client_id = details.client_id;
        self.contact = details.contact;
        self.range = details.range;
        self.number_of_guests = details.number_of_guests;
        self.notes = details.notes;
        self.updated_at = Utc::now();
    }

    /// Pending -> Confirmed. Returns `false` when nothing changed.
    pub fn confirm(&mut self) -> bool {
        if self.status != ReservationStatus::Pending {
            return false;
        }
        self.status = ReservationStatus::Confirmed;
        self.updated_at = Utc::now();
        true
    }

    /// Move to the terminal Cancelled state. Returns `false` if already cancelled.
    pub fn cancel(&mut self) -> bool {
        if self.is_cancelled() {
            return false;
        }
        let now = Utc::now();
        self.status = ReservationStatus::Cancelled;
        self.cancelled_at = Some(now);
        self.updated_at = now;
        true
    }

    pub fn soft_delete(&mut self) {
        let now = Utc::now();
        self.deleted_at = Some(now);
        self.updated_at = now;
    }
}

// ── Tests ──────────────────────────────────────────────────────
