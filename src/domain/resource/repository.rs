//! Resource repository interface

use async_trait::async_trait;

use super::model::{Resource, ResourceKind};
use crate::domain::DomainResult;
use crate::shared::{PaginatedResult, PaginationParams};

#[async_trait]
pub trait ResourceRepository: Send + Sync {
    async fn insert(&self, resource: Resource) -> DomainResult<()>;

    /// Find by id, including soft-deleted rows
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Resource>>;

    async fn update(&self, resource: Resource) -> DomainResult<()>;

    async fn soft_delete(&self, id: &str) -> DomainResult<()>;

    /// Non-deleted resources of a business, optionally narrowed to one kind
    async fn list_by_business(
        &self,
        business_id: &str,
        kind: Option<ResourceKind>,
        pagination: PaginationParams,
    ) -> DomainResult<PaginatedResult<Resource>>;
}
