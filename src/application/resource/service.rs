//! Table and room management, plus the availability query

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::application::reservation::ConflictChecker;
use crate::domain::{
    DomainError, DomainResult, RepositoryProvider, Reservation, Resource, ResourceDraft,
    ResourceKind, TimeRange,
};
use crate::shared::{PaginatedResult, PaginationParams};

/// Answer to "is this resource free in `[start, end)`?"
#[derive(Debug, Clone)]
pub struct Availability {
    pub resource_id: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub available: bool,
    pub conflicts: Vec<Reservation>,
}

pub struct ResourceService {
    repos: Arc<dyn RepositoryProvider>,
}

impl ResourceService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    pub async fn create(&self, business_id: &str, draft: ResourceDraft) -> DomainResult<Resource> {
        draft.validate()?;
        self.repos
            .businesses()
            .find_by_id(business_id)
            .await?
            .filter(|b| b.deleted_at.is_none())
            .ok_or_else(|| DomainError::not_found("Business", business_id))?;

        let resource = Resource::new(business_id, draft);
        self.repos.resources().insert(resource.clone()).await?;

        info!(
            resource_id = %resource.id,
            business_id,
            kind = %resource.kind,
            "Resource created"
        );
        Ok(resource)
    }

    pub async fn get(&self, business_id: &str, id: &str) -> DomainResult<Resource> {
        self.repos
            .resources()
            .find_by_id(id)
            .await?
            .filter(|r| r.business_id == business_id && r.deleted_at.is_none())
            .ok_or_else(|| DomainError::not_found("Resource", id))
    }

    pub async fn list(
        &self,
        business_id: &str,
        kind: Option<ResourceKind>,
        pagination: PaginationParams,
    ) -> DomainResult<PaginatedResult<Resource>> {
        self.repos
            .resources()
            .list_by_business(business_id, kind, pagination)
            .await
    }

    /// Existing reservations are not re-validated against new capacity bounds.
    pub async fn update(
        &self,
        business_id: &str,
        id: &str,
        draft: ResourceDraft,
    ) -> DomainResult<Resource> {
        draft.validate()?;
        let mut resource = self.get(business_id, id).await?;
        resource.apply(draft);
        self.repos.resources().update(resource.clone()).await?;

        info!(resource_id = %id, business_id, "Resource updated");
        Ok(resource)
    }

    pub async fn delete(&self, business_id: &str, id: &str) -> DomainResult<()> {
        self.get(business_id, id).await?;
        self.repos.resources().soft_delete(id).await?;

        info!(resource_id = %id, business_id, "Resource deleted");
        Ok(())
    }

    pub async fn availability(
        &self,
        business_id: &str,
        id: &str,
        start_at: DateTime<Utc>,
        end_at: DateTime<Utc>,
    ) -> DomainResult<Availability> {
        let range = TimeRange::new(start_at, end_at)?;
        let resource = self.get(business_id, id).await?;

        let conflicts = ConflictChecker::new(self.repos.reservations())
            .conflicts(&resource.id, business_id, &range, None)
            .await?;

        Ok(Availability {
            resource_id: resource.id,
            start_at,
            end_at,
            available: resource.is_active && conflicts.is_empty(),
            conflicts,
        })
    }
}
