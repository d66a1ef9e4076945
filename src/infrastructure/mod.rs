//! Infrastructure layer - external concerns

pub mod crypto;
pub mod database;
pub mod notifications;
pub mod storage;

pub use database::{init_database, DatabaseConfig, SeaOrmRepositoryProvider};
pub use notifications::LogMailer;
pub use storage::InMemoryRepositoryProvider;
