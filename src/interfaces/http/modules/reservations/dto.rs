//! Reservation DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::domain::{ContactInfo, Reservation, ReservationFilter, ReservationInput, ReservationStatus};
use crate::shared::PaginationParams;

/// Guest contact captured on the booking
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ContactDto {
    #[validate(length(min = 1, max = 120, message = "contact name is required"))]
    pub name: String,
    #[validate(email(message = "invalid email format"))]
    pub email: String,
    #[validate(length(max = 32, message = "phone is too long"))]
    #[serde(default)]
    pub phone: String,
    /// National ID document number
    #[validate(length(max = 32, message = "dni is too long"))]
    pub dni: Option<String>,
}

impl From<ContactDto> for ContactInfo {
    fn from(c: ContactDto) -> Self {
        Self {
            name: c.name,
            email: c.email,
            phone: c.phone,
            dni: c.dni,
        }
    }
}

impl From<ContactInfo> for ContactDto {
    fn from(c: ContactInfo) -> Self {
        Self {
            name: c.name,
            email: c.email,
            phone: c.phone,
            dni: c.dni,
        }
    }
}

/// Body of create and update. Range and guest count are checked by the
/// reservation service.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReservationRequest {
    /// Table or room; omit for a walk-in
    pub resource_id: Option<String>,
    /// Registered client, if any
    pub client_id: Option<String>,
    #[validate(nested)]
    pub contact: ContactDto,
    /// Inclusive start (RFC 3339)
    pub start_at: DateTime<Utc>,
    /// Exclusive end (RFC 3339)
    pub end_at: DateTime<Utc>,
    pub number_of_guests: i32,
    #[validate(length(max = 2000, message = "notes are too long"))]
    pub notes: Option<String>,
}

impl From<ReservationRequest> for ReservationInput {
    fn from(r: ReservationRequest) -> Self {
        Self {
            resource_id: r.resource_id,
            client_id: r.client_id,
            contact: r.contact.into(),
            start_at: r.start_at,
            end_at: r.end_at,
            number_of_guests: r.number_of_guests,
            notes: r.notes,
        }
    }
}

/// Reservation details in API responses
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReservationDto {
    pub id: String,
    pub business_id: String,
    pub resource_id: Option<String>,
    pub client_id: Option<String>,
    pub contact: ContactDto,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub number_of_guests: i32,
    pub notes: Option<String>,
    /// Pending, Confirmed or Cancelled
    pub status: String,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Reservation> for ReservationDto {
    fn from(r: Reservation) -> Self {
        Self {
            start_at: r.start_at(),
            end_at: r.end_at(),
            id: r.id,
            business_id: r.business_id,
            resource_id: r.resource_id,
            client_id: r.client_id,
            contact: r.contact.into(),
            number_of_guests: r.number_of_guests,
            notes: r.notes,
            status: r.status.as_str().to_string(),
            cancelled_at: r.cancelled_at,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Result of `POST .../cancel`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CancelReservationResponse {
    pub reservation: ReservationDto,
    /// `true` when the reservation had been cancelled before this call
    pub already_cancelled: bool,
}

/// `GET /reservations` query
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReservationListQuery {
    /// Pending, Confirmed or Cancelled
    pub status: Option<String>,
    pub resource_id: Option<String>,
    pub client_id: Option<String>,
    /// Only reservations ending after this instant
    pub from: Option<DateTime<Utc>>,
    /// Only reservations starting before this instant
    pub to: Option<DateTime<Utc>>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ReservationListQuery {
    pub fn filter(&self) -> Result<ReservationFilter, crate::domain::DomainError> {
        let status = self
            .status
            .as_deref()
            .map(str::parse::<ReservationStatus>)
            .transpose()?;
        Ok(ReservationFilter {
            status,
            resource_id: self.resource_id.clone(),
            client_id: self.client_id.clone(),
            from: self.from,
            to: self.to,
        })
    }

    pub fn pagination(&self) -> PaginationParams {
        PaginationParams::new(self.page, self.limit)
    }
}
