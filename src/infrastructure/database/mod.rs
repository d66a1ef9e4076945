pub mod entities;
pub mod migrator;
pub mod repositories;

pub use repositories::SeaOrmRepositoryProvider;

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::info;

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database URL (e.g., "sqlite://./reserva.db?mode=rwc")
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    /// Opening a new connection
    pub connect_timeout_secs: u64,
    /// Waiting for a free pooled connection
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://./reserva.db?mode=rwc".to_string(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout_secs: 8,
            acquire_timeout_secs: 8,
        }
    }
}

impl DatabaseConfig {
    /// Create config for SQLite
    pub fn sqlite(path: &str) -> Self {
        Self {
            url: format!("sqlite://{}?mode=rwc", path),
            ..Default::default()
        }
    }

    fn connect_options(&self) -> ConnectOptions {
        let mut opt = ConnectOptions::new(self.url.clone());
        opt.max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .connect_timeout(Duration::from_secs(self.connect_timeout_secs))
            .acquire_timeout(Duration::from_secs(self.acquire_timeout_secs))
            .sqlx_logging(false);
        opt
    }
}

/// Initialize database connection
pub async fn init_database(config: &DatabaseConfig) -> Result<DatabaseConnection, sea_orm::DbErr> {
    info!("Connecting to database: {}", config.url);
    let db = Database::connect(config.connect_options()).await?;
    info!("Database connected successfully");
    Ok(db)
}

#[cfg(test)]
pub(crate) mod test_support {
    use sea_orm::DatabaseConnection;
    use sea_orm_migration::MigratorTrait;

    use super::migrator::Migrator;
    use super::repositories::{SeaOrmBusinessRepository, SeaOrmResourceRepository};
    use super::{init_database, DatabaseConfig};
    use crate::domain::{
        Business, BusinessDraft, BusinessRepository, Resource, ResourceDraft, ResourceKind,
        ResourceRepository,
    };

    /// Migrated in-memory SQLite with one business and one table.
    /// Returns `(db, business_id, resource_id)`.
    pub async fn memory_db() -> (DatabaseConnection, String, String) {
        seeded_db(DatabaseConfig {
            url: "sqlite::memory:".into(),
            max_connections: 1,
            min_connections: 1,
            ..Default::default()
        })
        .await
    }

    /// Same seed on a SQLite file with a real connection pool, so writers
    /// actually race.
    pub async fn file_db(path: &std::path::Path) -> (DatabaseConnection, String, String) {
        seeded_db(DatabaseConfig {
            max_connections: 8,
            ..DatabaseConfig::sqlite(&path.display().to_string())
        })
        .await
    }

    async fn seeded_db(config: DatabaseConfig) -> (DatabaseConnection, String, String) {
        let db = init_database(&config).await.unwrap();
        Migrator::up(&db, None).await.unwrap();

        let business = Business::new(BusinessDraft {
            name: "Casa Lola".into(),
            slug: "casa-lola".into(),
            email: None,
            phone: None,
            address: None,
            is_active: true,
        });
        SeaOrmBusinessRepository::new(db.clone())
            .insert(business.clone())
            .await
            .unwrap();

        let table = Resource::new(
            business.id.clone(),
            ResourceDraft {
                kind: ResourceKind::Table,
                name: "Terraza 1".into(),
                min_capacity: Some(1),
                max_capacity: Some(6),
                is_active: true,
            },
        );
        SeaOrmResourceRepository::new(db.clone())
            .insert(table.clone())
            .await
            .unwrap();

        (db, business.id, table.id)
    }
}
