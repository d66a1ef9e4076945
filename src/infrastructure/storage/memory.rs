//! In-memory storage implementation
//!
//! Used for development and tests. Reservations sit behind a single mutex so
//! the overlap check and the write in `insert`/`update` are one atomic step.
//! `update` refuses rows that are already cancelled or deleted.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::domain::{
    Business, BusinessRepository, DomainError, DomainResult, RepositoryProvider, Reservation,
    ReservationFilter, ReservationRepository, Resource, ResourceKind, ResourceRepository,
    TimeRange, User, UserRepositoryInterface,
};
use crate::shared::{PaginatedResult, PaginationParams};

fn paginate<T>(items: Vec<T>, pagination: PaginationParams) -> PaginatedResult<T> {
    let total = items.len() as u64;
    let page_items = items
        .into_iter()
        .skip(pagination.offset() as usize)
        .take(pagination.limit as usize)
        .collect();
    PaginatedResult::new(page_items, total, pagination.page, pagination.limit)
}

// ── Businesses ──────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryBusinessRepository {
    businesses: DashMap<String, Business>,
}

#[async_trait]
impl BusinessRepository for InMemoryBusinessRepository {
    async fn insert(&self, business: Business) -> DomainResult<()> {
        if self
            .businesses
            .iter()
            .any(|b| b.slug == business.slug)
        {
            return Err(DomainError::Conflict(format!(
                "Business slug '{}' already exists",
                business.slug
            )));
        }
        self.businesses.insert(business.id.clone(), business);
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Business>> {
        Ok(self.businesses.get(id).map(|b| b.clone()))
    }

    async fn find_by_slug(&self, slug: &str) -> DomainResult<Option<Business>> {
        Ok(self
            .businesses
            .iter()
            .find(|b| b.slug == slug && b.deleted_at.is_none())
            .map(|b| b.clone()))
    }

    async fn update(&self, business: Business) -> DomainResult<()> {
        if self
            .businesses
            .iter()
            .any(|b| b.slug == business.slug && b.id != business.id)
        {
            return Err(DomainError::Conflict(format!(
                "Business slug '{}' already exists",
                business.slug
            )));
        }
        match self.businesses.get_mut(&business.id) {
            Some(mut existing) => {
                *existing = business;
                Ok(())
            }
            None => Err(DomainError::not_found("Business", business.id)),
        }
    }

    async fn soft_delete(&self, id: &str) -> DomainResult<()> {
        let mut business = self
            .businesses
            .get_mut(id)
            .ok_or_else(|| DomainError::not_found("Business", id))?;
        let now = Utc::now();
        business.deleted_at = Some(now);
        business.updated_at = now;
        Ok(())
    }

    async fn list(&self, pagination: PaginationParams) -> DomainResult<PaginatedResult<Business>> {
        let mut items: Vec<Business> = self
            .businesses
            .iter()
            .filter(|b| b.deleted_at.is_none())
            .map(|b| b.clone())
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(paginate(items, pagination))
    }
}

// ── Resources ───────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryResourceRepository {
    resources: DashMap<String, Resource>,
}

#[async_trait]
impl ResourceRepository for InMemoryResourceRepository {
    async fn insert(&self, resource: Resource) -> DomainResult<()> {
        self.resources.insert(resource.id.clone(), resource);
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Resource>> {
        Ok(self.resources.get(id).map(|r| r.clone()))
    }

    async fn update(&self, resource: Resource) -> DomainResult<()> {
        match self.resources.get_mut(&resource.id) {
            Some(mut existing) => {
                *existing = resource;
                Ok(())
            }
            None => Err(DomainError::not_found("Resource", resource.id)),
        }
    }

    async fn soft_delete(&self, id: &str) -> DomainResult<()> {
        let mut resource = self
            .resources
            .get_mut(id)
            .ok_or_else(|| DomainError::not_found("Resource", id))?;
        let now = Utc::now();
        resource.deleted_at = Some(now);
        resource.updated_at = now;
        Ok(())
    }

    async fn list_by_business(
        &self,
        business_id: &str,
        kind: Option<ResourceKind>,
        pagination: PaginationParams,
    ) -> DomainResult<PaginatedResult<Resource>> {
        let mut items: Vec<Resource> = self
            .resources
            .iter()
            .filter(|r| r.business_id == business_id && r.deleted_at.is_none())
            .filter(|r| kind.map_or(true, |k| r.kind == k))
            .map(|r| r.clone())
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(paginate(items, pagination))
    }
}

// ── Reservations ────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryReservationRepository {
    reservations: Mutex<HashMap<String, Reservation>>,
}

impl InMemoryReservationRepository {
    fn lock(&self) -> DomainResult<MutexGuard<'_, HashMap<String, Reservation>>> {
        self.reservations
            .lock()
            .map_err(|_| DomainError::Persistence("reservation store poisoned".into()))
    }

    fn ensure_free(
        store: &HashMap<String, Reservation>,
        reservation: &Reservation,
    ) -> DomainResult<()> {
        let Some(resource_id) = reservation.resource_id.as_deref() else {
            return Ok(());
        };
        if !reservation.holds_resource() {
            return Ok(());
        }
        let clash = store.values().any(|other| {
            other.blocks(
                resource_id,
                &reservation.business_id,
                &reservation.range,
                Some(&reservation.id),
            )
        });
        if clash {
            return Err(DomainError::Conflict(format!(
                "Resource '{}' is already booked between {} and {}",
                resource_id,
                reservation.start_at().to_rfc3339(),
                reservation.end_at().to_rfc3339()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl ReservationRepository for InMemoryReservationRepository {
    async fn find_overlapping(
        &self,
        resource_id: &str,
        business_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_id: Option<&str>,
    ) -> DomainResult<Vec<Reservation>> {
        let range = TimeRange::new(start, end)?;
        let store = self.lock()?;
        let mut found: Vec<Reservation> = store
            .values()
            .filter(|r| r.blocks(resource_id, business_id, &range, exclude_id))
            .cloned()
            .collect();
        found.sort_by_key(|r| r.start_at());
        Ok(found)
    }

    async fn insert(&self, reservation: Reservation) -> DomainResult<String> {
        let mut store = self.lock()?;
        if store.contains_key(&reservation.id) {
            return Err(DomainError::Conflict(format!(
                "Reservation '{}' already exists",
                reservation.id
            )));
        }
        Self::ensure_free(&store, &reservation)?;
        let id = reservation.id.clone();
        store.insert(id.clone(), reservation);
        Ok(id)
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Reservation>> {
        Ok(self.lock()?.get(id).cloned())
    }

    async fn update(&self, reservation: Reservation) -> DomainResult<()> {
        let mut store = self.lock()?;
        let writable = store
            .get(&reservation.id)
            .is_some_and(|stored| !stored.is_cancelled() && !stored.is_deleted());
        if !writable {
            return Err(DomainError::not_found("Reservation", reservation.id));
        }
        Self::ensure_free(&store, &reservation)?;
        store.insert(reservation.id.clone(), reservation);
        Ok(())
    }

    async fn soft_delete(&self, id: &str) -> DomainResult<()> {
        let mut store = self.lock()?;
        let reservation = store
            .get_mut(id)
            .ok_or_else(|| DomainError::not_found("Reservation", id))?;
        reservation.soft_delete();
        Ok(())
    }

    async fn list_by_business(
        &self,
        business_id: &str,
        filter: ReservationFilter,
        pagination: PaginationParams,
    ) -> DomainResult<PaginatedResult<Reservation>> {
        let store = self.lock()?;
        let mut items: Vec<Reservation> = store
            .values()
            .filter(|r| r.business_id == business_id && !r.is_deleted())
            .filter(|r| filter.status.map_or(true, |s| r.status == s))
            .filter(|r| {
                filter
                    .resource_id
                    .as_deref()
                    .map_or(true, |id| r.resource_id.as_deref() == Some(id))
            })
            .filter(|r| {
                filter
                    .client_id
                    .as_deref()
                    .map_or(true, |id| r.client_id.as_deref() == Some(id))
            })
            .filter(|r| filter.to.map_or(true, |to| r.start_at() < to))
            .filter(|r| filter.from.map_or(true, |from| from < r.end_at()))
            .cloned()
            .collect();
        items.sort_by(|a, b| a.start_at().cmp(&b.start_at()).then(a.id.cmp(&b.id)));
        Ok(paginate(items, pagination))
    }
}

// ── Users ───────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: DashMap<String, User>,
}

#[async_trait]
impl UserRepositoryInterface for InMemoryUserRepository {
    async fn create_user(&self, user: User) -> DomainResult<()> {
        if self
            .users
            .iter()
            .any(|u| u.username == user.username || u.email == user.email)
        {
            return Err(DomainError::Conflict(
                "Username or email already exists".to_string(),
            ));
        }
        self.users.insert(user.id.clone(), user);
        Ok(())
    }

    async fn get_user_by_username(&self, username: &str) -> DomainResult<Option<User>> {
        Ok(self
            .users
            .iter()
            .find(|u| u.username == username)
            .map(|u| u.clone()))
    }

    async fn get_user_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        Ok(self
            .users
            .iter()
            .find(|u| u.email == email)
            .map(|u| u.clone()))
    }

    async fn get_user_by_id(&self, id: &str) -> DomainResult<Option<User>> {
        Ok(self.users.get(id).map(|u| u.clone()))
    }

    async fn touch_last_login(&self, id: &str) -> DomainResult<()> {
        let mut user = self
            .users
            .get_mut(id)
            .ok_or_else(|| DomainError::not_found("User", id))?;
        user.last_login_at = Some(Utc::now());
        Ok(())
    }

    async fn count_users(&self) -> DomainResult<u64> {
        Ok(self.users.len() as u64)
    }
}

// ── Provider ────────────────────────────────────────────────────

/// All in-memory repositories behind one [`RepositoryProvider`]
#[derive(Default)]
pub struct InMemoryRepositoryProvider {
    businesses: InMemoryBusinessRepository,
    resources: InMemoryResourceRepository,
    reservations: InMemoryReservationRepository,
    users: InMemoryUserRepository,
}

impl InMemoryRepositoryProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RepositoryProvider for InMemoryRepositoryProvider {
    fn businesses(&self) -> &dyn BusinessRepository {
        &self.businesses
    }

    fn resources(&self) -> &dyn ResourceRepository {
        &self.resources
    }

    fn reservations(&self) -> &dyn ReservationRepository {
        &self.reservations
    }

    fn users(&self) -> &dyn UserRepositoryInterface {
        &self.users
    }
}
