//! SeaORM implementation of RepositoryProvider

use sea_orm::DatabaseConnection;

use crate::domain::repositories::RepositoryProvider;
use crate::domain::{
    BusinessRepository, ReservationRepository, ResourceRepository, UserRepositoryInterface,
};

use super::business_repository::SeaOrmBusinessRepository;
use super::reservation_repository::SeaOrmReservationRepository;
use super::resource_repository::SeaOrmResourceRepository;
use super::user_repository::UserRepository;

/// Unified repository provider backed by SeaORM.
///
/// Holds one connection pool and exposes per-aggregate repository accessors.
///
/// ```ignore
/// let repos = SeaOrmRepositoryProvider::new(db.clone());
/// let table = repos.resources().find_by_id(&table_id).await?;
/// let clashes = repos.reservations().find_overlapping(&table_id, &business_id, start, end, None).await?;
/// ```
pub struct SeaOrmRepositoryProvider {
    businesses: SeaOrmBusinessRepository,
    resources: SeaOrmResourceRepository,
    reservations: SeaOrmReservationRepository,
    users: UserRepository,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            businesses: SeaOrmBusinessRepository::new(db.clone()),
            resources: SeaOrmResourceRepository::new(db.clone()),
            reservations: SeaOrmReservationRepository::new(db.clone()),
            users: UserRepository::new(db),
        }
    }
}

impl RepositoryProvider for SeaOrmRepositoryProvider {
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
