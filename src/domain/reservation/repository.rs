//! Reservation repository interface

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::dto::ReservationFilter;
use super::model::Reservation;
use crate::domain::DomainResult;
use crate::shared::{PaginatedResult, PaginationParams};

/// Persistence port for reservations.
///
/// # Atomicity
///
/// `insert` and `update` of a reservation that holds a resource must perform
/// "find overlapping + write" as one atomic step for the
/// `(resource_id, business_id)` pair and fail with `DomainError::Conflict`
/// when another live reservation overlaps. Callers treat this as the
/// authoritative double-booking guard; any check made before the write is
/// advisory.
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Live (not cancelled, not deleted) reservations of `resource_id` in
    /// `business_id` overlapping `[start, end)`, excluding `exclude_id`.
    async fn find_overlapping(
        &self,
        resource_id: &str,
        business_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_id: Option<&str>,
    ) -> DomainResult<Vec<Reservation>>;

    /// Store a new reservation and return its id
    async fn insert(&self, reservation: Reservation) -> DomainResult<String>;

    /// Find by id, including soft-deleted rows
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Reservation>>;

    /// Overwrite an existing reservation. Fails with `NotFound` when the
    /// stored row is already cancelled or soft-deleted.
    async fn update(&self, reservation: Reservation) -> DomainResult<()>;

    /// Set `deleted_at`; the row stays in storage
    async fn soft_delete(&self, id: &str) -> DomainResult<()>;

    /// Non-deleted reservations of a business, ordered by start time
    async fn list_by_business(
        &self,
        business_id: &str,
        filter: ReservationFilter,
        pagination: PaginationParams,
    ) -> DomainResult<PaginatedResult<Reservation>>;
}
