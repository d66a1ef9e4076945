//! SeaORM implementation of ReservationRepository
//!
//! `insert` and `update` run the overlap query and the write inside one
//! transaction. On Postgres the transaction is `SERIALIZABLE`; SQLite
//! serializes writers through its database lock. Losing the race surfaces as
//! `DomainError::Conflict`. `update` never touches a cancelled or deleted row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbBackend, DbErr, EntityTrait, IsolationLevel, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};

use super::{db_err, is_write_contention};
use crate::domain::reservation::{
    ContactInfo, Reservation, ReservationFilter, ReservationRepository, ReservationStatus,
    TimeRange,
};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::reservation;
use crate::shared::{PaginatedResult, PaginationParams};

pub struct SeaOrmReservationRepository {
    db: DatabaseConnection,
}

impl SeaOrmReservationRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn begin(&self) -> DomainResult<DatabaseTransaction> {
        let isolation = match self.db.get_database_backend() {
            DbBackend::Sqlite => None,
            _ => Some(IsolationLevel::Serializable),
        };
        self.db
            .begin_with_config(isolation, None)
            .await
            .map_err(write_err)
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(m: reservation::Model) -> DomainResult<Reservation> {
    let range = TimeRange::new(m.start_at, m.end_at)
        .map_err(|e| DomainError::Persistence(format!("Corrupt reservation {}: {}", m.id, e)))?;
    let status = m.status.parse().unwrap_or_else(|_| {
        warn!("Reservation {} has unknown status '{}'", m.id, m.status);
        ReservationStatus::Cancelled
    });

    Ok(Reservation {
        id: m.id,
        business_id: m.business_id,
        resource_id: m.resource_id,
        client_id: m.client_id,
        contact: ContactInfo {
            name: m.contact_name,
            email: m.contact_email,
            phone: m.contact_phone,
            dni: m.contact_dni,
        },
        range,
        number_of_guests: m.number_of_guests,
        notes: m.notes,
        status,
        cancelled_at: m.cancelled_at,
        created_at: m.created_at,
        updated_at: m.updated_at,
        deleted_at: m.deleted_at,
    })
}

fn domain_to_active(r: Reservation) -> reservation::ActiveModel {
    reservation::ActiveModel {
        id: Set(r.id.clone()),
        business_id: Set(r.business_id.clone()),
        resource_id: Set(r.resource_id.clone()),
        client_id: Set(r.client_id.clone()),
        contact_name: Set(r.contact.name.clone()),
        contact_email: Set(r.contact.email.clone()),
        contact_phone: Set(r.contact.phone.clone()),
        contact_dni: Set(r.contact.dni.clone()),
        start_at: Set(r.start_at()),
        end_at: Set(r.end_at()),
        number_of_guests: Set(r.number_of_guests),
        notes: Set(r.notes),
        status: Set(r.status.as_str().to_string()),
        cancelled_at: Set(r.cancelled_at),
        created_at: Set(r.created_at),
        updated_at: Set(r.updated_at),
        deleted_at: Set(r.deleted_at),
    }
}

fn models_to_domain(models: Vec<reservation::Model>) -> DomainResult<Vec<Reservation>> {
    models.into_iter().map(model_to_domain).collect()
}

fn write_err(e: DbErr) -> DomainError {
    if is_write_contention(&e) {
        DomainError::Conflict("Concurrent booking for the same slot, please retry".into())
    } else {
        db_err(e)
    }
}

async fn find_overlapping_in<C: ConnectionTrait>(
    conn: &C,
    resource_id: &str,
    business_id: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    exclude_id: Option<&str>,
) -> Result<Vec<reservation::Model>, DbErr> {
    let mut query = reservation::Entity::find()
        .filter(reservation::Column::BusinessId.eq(business_id))
        .filter(reservation::Column::ResourceId.eq(resource_id))
        .filter(reservation::Column::Status.ne(ReservationStatus::Cancelled.as_str()))
        .filter(reservation::Column::DeletedAt.is_null())
        .filter(reservation::Column::StartAt.lt(end))
        .filter(reservation::Column::EndAt.gt(start));

    if let Some(id) = exclude_id {
        query = query.filter(reservation::Column::Id.ne(id));
    }

    query
        .order_by_asc(reservation::Column::StartAt)
        .all(conn)
        .await
}

/// Fails with Conflict when another live reservation holds the slot.
async fn ensure_free(txn: &DatabaseTransaction, r: &Reservation) -> DomainResult<()> {
    let Some(resource_id) = r.resource_id.as_deref() else {
        return Ok(());
    };
    if !r.holds_resource() {
        return Ok(());
    }

    let clashes = find_overlapping_in(
        txn,
        resource_id,
        &r.business_id,
        r.start_at(),
        r.end_at(),
        Some(&r.id),
    )
    .await
    .map_err(write_err)?;

    if let Some(other) = clashes.first() {
        debug!("Reservation {} overlaps {}", r.id, other.id);
        return Err(DomainError::Conflict(format!(
            "Resource '{}' is already booked between {} and {}",
            resource_id,
            other.start_at.to_rfc3339(),
            other.end_at.to_rfc3339()
        )));
    }
    Ok(())
}

// ── ReservationRepository impl ──────────────────────────────────

#[async_trait]
impl ReservationRepository for SeaOrmReservationRepository {
    async fn find_overlapping(
        &self,
        resource_id: &str,
        business_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_id: Option<&str>,
    ) -> DomainResult<Vec<Reservation>> {
        let models =
            find_overlapping_in(&self.db, resource_id, business_id, start, end, exclude_id)
                .await
                .map_err(db_err)?;
        models_to_domain(models)
    }

    async fn insert(&self, r: Reservation) -> DomainResult<String> {
        debug!("Inserting reservation: {}", r.id);

        let txn = self.begin().await?;
        ensure_free(&txn, &r).await?;

        let id = r.id.clone();
        domain_to_active(r).insert(&txn).await.map_err(write_err)?;
        txn.commit().await.map_err(write_err)?;
        Ok(id)
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Reservation>> {
        let model = reservation::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        model.map(model_to_domain).transpose()
    }

    async fn update(&self, r: Reservation) -> DomainResult<()> {
        debug!("Updating reservation: {}", r.id);

        let txn = self.begin().await?;
        ensure_free(&txn, &r).await?;

        // Only a live, not yet cancelled row may be written. A cancel or
        // delete committed after the caller loaded `r` wins.
        let id = r.id.clone();
        let result = reservation::Entity::update_many()
            .set(domain_to_active(r))
            .filter(reservation::Column::Id.eq(id.as_str()))
            .filter(reservation::Column::Status.ne(ReservationStatus::Cancelled.as_str()))
            .filter(reservation::Column::DeletedAt.is_null())
            .exec(&txn)
            .await
            .map_err(write_err)?;

        if result.rows_affected == 0 {
            return Err(DomainError::not_found("Reservation", id));
        }
        txn.commit().await.map_err(write_err)?;
        Ok(())
    }

    async fn soft_delete(&self, id: &str) -> DomainResult<()> {
        let existing = reservation::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        let Some(existing) = existing else {
            return Err(DomainError::not_found("Reservation", id));
        };

        let now = Utc::now();
        let mut active: reservation::ActiveModel = existing.into();
        active.deleted_at = Set(Some(now));
        active.updated_at = Set(now);
        active.update(&self.db).await.map_err(db_err)?;
        Ok(())
    }

    async fn list_by_business(
        &self,
        business_id: &str,
        filter: ReservationFilter,
        pagination: PaginationParams,
    ) -> DomainResult<PaginatedResult<Reservation>> {
        let mut query = reservation::Entity::find()
            .filter(reservation::Column::BusinessId.eq(business_id))
            .filter(reservation::Column::DeletedAt.is_null());

        if let Some(status) = filter.status {
            query = query.filter(reservation::Column::Status.eq(status.as_str()));
        }
        if let Some(resource_id) = filter.resource_id {
            query = query.filter(reservation::Column::ResourceId.eq(resource_id));
        }
        if let Some(client_id) = filter.client_id {
            query = query.filter(reservation::Column::ClientId.eq(client_id));
        }
        if let Some(to) = filter.to {
            query = query.filter(reservation::Column::StartAt.lt(to));
        }
        if let Some(from) = filter.from {
            query = query.filter(reservation::Column::EndAt.gt(from));
        }

        let total = query.clone().count(&self.db).await.map_err(db_err)?;

        let models = query
            .order_by_asc(reservation::Column::StartAt)
            .order_by_asc(reservation::Column::Id)
            .offset(pagination.offset())
            .limit(u64::from(pagination.limit))
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(PaginatedResult::new(
            models_to_domain(models)?,
            total,
            pagination.page,
            pagination.limit,
        ))
    }
}
