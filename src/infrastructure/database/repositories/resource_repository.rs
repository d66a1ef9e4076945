//! SeaORM implementation of ResourceRepository

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use super::db_err;
use crate::domain::{
    DomainError, DomainResult, Resource, ResourceKind, ResourceRepository,
};
use crate::infrastructure::database::entities::resource;
use crate::shared::{PaginatedResult, PaginationParams};

pub struct SeaOrmResourceRepository {
    db: DatabaseConnection,
}

impl SeaOrmResourceRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(m: resource::Model) -> DomainResult<Resource> {
    let kind: ResourceKind = m
        .kind
        .parse()
        .map_err(|e| DomainError::Persistence(format!("Corrupt resource {}: {}", m.id, e)))?;

    Ok(Resource {
        id: m.id,
        business_id: m.business_id,
        kind,
        name: m.name,
        min_capacity: m.min_capacity,
        max_capacity: m.max_capacity,
        is_active: m.is_active,
        created_at: m.created_at,
        updated_at: m.updated_at,
        deleted_at: m.deleted_at,
    })
}

fn domain_to_active(r: Resource) -> resource::ActiveModel {
    resource::ActiveModel {
        id: Set(r.id),
        business_id: Set(r.business_id),
        kind: Set(r.kind.as_str().to_string()),
        name: Set(r.name),
        min_capacity: Set(r.min_capacity),
        max_capacity: Set(r.max_capacity),
        is_active: Set(r.is_active),
        created_at: Set(r.created_at),
        updated_at: Set(r.updated_at),
        deleted_at: Set(r.deleted_at),
    }
}

// ── ResourceRepository impl ─────────────────────────────────────

#[async_trait]
impl ResourceRepository for SeaOrmResourceRepository {
    async fn insert(&self, r: Resource) -> DomainResult<()> {
        debug!("Inserting resource: {} ({})", r.name, r.kind);
        domain_to_active(r).insert(&self.db).await.map_err(db_err)?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Resource>> {
        let model = resource::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        model.map(model_to_domain).transpose()
    }

    async fn update(&self, r: Resource) -> DomainResult<()> {
        let existing = resource::Entity::find_by_id(r.id.as_str())
            .one(&self.db)
            .await
            .map_err(db_err)?;
        if existing.is_none() {
            return Err(DomainError::not_found("Resource", r.id));
        }

        domain_to_active(r).update(&self.db).await.map_err(db_err)?;
        Ok(())
    }

    async fn soft_delete(&self, id: &str) -> DomainResult<()> {
        let existing = resource::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        let Some(existing) = existing else {
            return Err(DomainError::not_found("Resource", id));
        };

        let now = Utc::now();
        let mut active: resource::ActiveModel = existing.into();
        active.deleted_at = Set(Some(now));
        active.updated_at = Set(now);
        active.update(&self.db).await.map_err(db_err)?;
        Ok(())
    }

    async fn list_by_business(
        &self,
        business_id: &str,
        kind: Option<ResourceKind>,
        pagination: PaginationParams,
    ) -> DomainResult<PaginatedResult<Resource>> {
        let mut query = resource::Entity::find()
            .filter(resource::Column::BusinessId.eq(business_id))
            .filter(resource::Column::DeletedAt.is_null());
        if let Some(kind) = kind {
            query = query.filter(resource::Column::Kind.eq(kind.as_str()));
        }

        let total = query.clone().count(&self.db).await.map_err(db_err)?;
        let models = query
            .order_by_asc(resource::Column::Name)
            .offset(pagination.offset())
            .limit(u64::from(pagination.limit))
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let items = models
            .into_iter()
            .map(model_to_domain)
            .collect::<DomainResult<Vec<_>>>()?;
        Ok(PaginatedResult::new(
            items,
            total,
            pagination.page,
            pagination.limit,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::test_support::memory_db;

    #[tokio::test]
    async fn list_filters_by_kind() {
        let (db, business_id, table_id) = memory_db().await;
        let repo = SeaOrmResourceRepository::new(db);

        let tables = repo
            .list_by_business(&business_id, Some(ResourceKind::Table), PaginationParams::default())
            .await
            .unwrap();
        assert_eq!(tables.total, 1);
        assert_eq!(tables.items[0].id, table_id);
        assert_eq!(tables.items[0].max_capacity, Some(6));

        let rooms = repo
            .list_by_business(&business_id, Some(ResourceKind::Room), PaginationParams::default())
            .await
            .unwrap();
        assert_eq!(rooms.total, 0);
    }
}
