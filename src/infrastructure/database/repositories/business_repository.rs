//! SeaORM implementation of BusinessRepository

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use super::{db_err, is_unique_violation};
use crate::domain::{Business, BusinessRepository, DomainError, DomainResult};
use crate::infrastructure::database::entities::business;
use crate::shared::{PaginatedResult, PaginationParams};

pub struct SeaOrmBusinessRepository {
    db: DatabaseConnection,
}

impl SeaOrmBusinessRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(m: business::Model) -> Business {
    Business {
        id: m.id,
        name: m.name,
        slug: m.slug,
        email: m.email,
        phone: m.phone,
        address: m.address,
        is_active: m.is_active,
        created_at: m.created_at,
        updated_at: m.updated_at,
        deleted_at: m.deleted_at,
    }
}

fn domain_to_active(b: Business) -> business::ActiveModel {
    business::ActiveModel {
        id: Set(b.id),
        name: Set(b.name),
        slug: Set(b.slug),
        email: Set(b.email),
        phone: Set(b.phone),
        address: Set(b.address),
        is_active: Set(b.is_active),
        created_at: Set(b.created_at),
        updated_at: Set(b.updated_at),
        deleted_at: Set(b.deleted_at),
    }
}

fn write_err(slug: &str) -> impl FnOnce(sea_orm::DbErr) -> DomainError + '_ {
    move |e| {
        if is_unique_violation(&e) {
            DomainError::Conflict(format!("Business slug '{}' already exists", slug))
        } else {
            db_err(e)
        }
    }
}

// ── BusinessRepository impl ─────────────────────────────────────

#[async_trait]
impl BusinessRepository for SeaOrmBusinessRepository {
    async fn insert(&self, b: Business) -> DomainResult<()> {
        debug!("Inserting business: {}", b.slug);
        let slug = b.slug.clone();
        domain_to_active(b)
            .insert(&self.db)
            .await
            .map_err(write_err(&slug))?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Business>> {
        let model = business::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn find_by_slug(&self, slug: &str) -> DomainResult<Option<Business>> {
        let model = business::Entity::find()
            .filter(business::Column::Slug.eq(slug))
            .filter(business::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn update(&self, b: Business) -> DomainResult<()> {
        debug!("Updating business: {}", b.id);

        let existing = business::Entity::find_by_id(b.id.as_str())
            .one(&self.db)
            .await
            .map_err(db_err)?;
        if existing.is_none() {
            return Err(DomainError::not_found("Business", b.id));
        }

        let slug = b.slug.clone();
        domain_to_active(b)
            .update(&self.db)
            .await
            .map_err(write_err(&slug))?;
        Ok(())
    }

    async fn soft_delete(&self, id: &str) -> DomainResult<()> {
        let existing = business::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        let Some(existing) = existing else {
            return Err(DomainError::not_found("Business", id));
        };

        let now = Utc::now();
        let mut active: business::ActiveModel = existing.into();
        active.deleted_at = Set(Some(now));
        active.updated_at = Set(now);
        active.update(&self.db).await.map_err(db_err)?;
        Ok(())
    }

    async fn list(&self, pagination: PaginationParams) -> DomainResult<PaginatedResult<Business>> {
        let query = business::Entity::find().filter(business::Column::DeletedAt.is_null());

        let total = query.clone().count(&self.db).await.map_err(db_err)?;
        let models = query
            .order_by_asc(business::Column::Name)
            .offset(pagination.offset())
            .limit(u64::from(pagination.limit))
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(PaginatedResult::new(
            models.into_iter().map(model_to_domain).collect(),
            total,
            pagination.page,
            pagination.limit,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BusinessDraft;
    use crate::infrastructure::database::test_support::memory_db;

    #[tokio::test]
    async fn slug_is_unique() {
        let (db, business_id, _) = memory_db().await;
        let repo = SeaOrmBusinessRepository::new(db);

        let existing = repo.find_by_id(&business_id).await.unwrap().unwrap();
        let clash = Business::new(BusinessDraft {
            name: "Copy".into(),
            slug: existing.slug.clone(),
            email: None,
            phone: None,
            address: None,
            is_active: true,
        });
        assert!(matches!(
            repo.insert(clash).await,
            Err(DomainError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn soft_deleted_business_leaves_listing() {
        let (db, business_id, _) = memory_db().await;
        let repo = SeaOrmBusinessRepository::new(db);

        repo.soft_delete(&business_id).await.unwrap();
        let page = repo.list(PaginationParams::default()).await.unwrap();
        assert_eq!(page.total, 0);
        assert!(repo
            .find_by_id(&business_id)
            .await
            .unwrap()
            .unwrap()
            .deleted_at
            .is_some());
    }
}
