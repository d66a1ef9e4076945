//! Resource DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::application::Availability;
use crate::domain::{DomainError, Resource, ResourceDraft, ResourceKind};
use crate::interfaces::http::modules::reservations::ReservationDto;
use crate::shared::PaginationParams;

fn default_true() -> bool {
    true
}

/// Body of create and update
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ResourceRequest {
    /// "Table" or "Room"
    #[validate(length(min = 1, message = "kind is required"))]
    pub kind: String,
    #[validate(length(min = 1, max = 120, message = "name must be 1-120 characters"))]
    pub name: String,
    #[validate(range(min = 1, message = "min_capacity must be at least 1"))]
    pub min_capacity: Option<i32>,
    #[validate(range(min = 1, message = "max_capacity must be at least 1"))]
    pub max_capacity: Option<i32>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl ResourceRequest {
    pub fn into_draft(self) -> Result<ResourceDraft, DomainError> {
        Ok(ResourceDraft {
            kind: self.kind.parse()?,
            name: self.name,
            min_capacity: self.min_capacity,
            max_capacity: self.max_capacity,
            is_active: self.is_active,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ResourceDto {
    pub id: String,
    pub business_id: String,
    pub kind: String,
    pub name: String,
    pub min_capacity: Option<i32>,
    pub max_capacity: Option<i32>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Resource> for ResourceDto {
    fn from(r: Resource) -> Self {
        Self {
            id: r.id,
            business_id: r.business_id,
            kind: r.kind.as_str().to_string(),
            name: r.name,
            min_capacity: r.min_capacity,
            max_capacity: r.max_capacity,
            is_active: r.is_active,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// `GET /resources` query
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ResourceListQuery {
    /// "Table" or "Room"
    pub kind: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ResourceListQuery {
    pub fn kind(&self) -> Result<Option<ResourceKind>, DomainError> {
        self.kind.as_deref().map(str::parse).transpose()
    }

    pub fn pagination(&self) -> PaginationParams {
        PaginationParams::new(self.page, self.limit)
    }
}

/// `GET /resources/{id}/availability` query
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AvailabilityQuery {
    /// Inclusive start (RFC 3339)
    pub start_at: DateTime<Utc>,
    /// Exclusive end (RFC 3339)
    pub end_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AvailabilityDto {
    pub resource_id: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub available: bool,
    /// Live reservations overlapping the window
    pub conflicts: Vec<ReservationDto>,
}

impl From<Availability> for AvailabilityDto {
    fn from(a: Availability) -> Self {
        Self {
            resource_id: a.resource_id,
            start_at: a.start_at,
            end_at: a.end_at,
            available: a.available,
            conflicts: a.conflicts.into_iter().map(ReservationDto::from).collect(),
        }
    }
}
