//! Business repository interface

use async_trait::async_trait;

use super::model::Business;
use crate::domain::DomainResult;
use crate::shared::{PaginatedResult, PaginationParams};

#[async_trait]
pub trait BusinessRepository: Send + Sync {
    /// Insert; a duplicate slug fails with `DomainError::Conflict`
    async fn insert(&self, business: Business) -> DomainResult<()>;

    /// Find by id, including soft-deleted rows
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Business>>;

    async fn find_by_slug(&self, slug: &str) -> DomainResult<Option<Business>>;

    async fn update(&self, business: Business) -> DomainResult<()>;

    async fn soft_delete(&self, id: &str) -> DomainResult<()>;

    /// Non-deleted businesses ordered by name
    async fn list(&self, pagination: PaginationParams) -> DomainResult<PaginatedResult<Business>>;
}
