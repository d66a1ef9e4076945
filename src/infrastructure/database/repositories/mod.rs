//! Database repository implementations
//!
//! Per-aggregate SeaORM repositories + unified RepositoryProvider.

pub mod business_repository;
pub mod repository_provider;
pub mod reservation_repository;
pub mod resource_repository;
pub mod user_repository;

pub use business_repository::SeaOrmBusinessRepository;
pub use repository_provider::SeaOrmRepositoryProvider;
pub use reservation_repository::SeaOrmReservationRepository;
pub use resource_repository::SeaOrmResourceRepository;
pub use user_repository::UserRepository;

use sea_orm::{DbErr, RuntimeErr, SqlErr};

use crate::domain::DomainError;

/// Any storage failure aborts the operation
pub(crate) fn db_err(e: DbErr) -> DomainError {
    DomainError::Persistence(format!("Database error: {}", e))
}

pub(crate) fn is_unique_violation(e: &DbErr) -> bool {
    matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Postgres `serialization_failure` and `deadlock_detected`
const PG_CONTENTION: [&str; 2] = ["40001", "40P01"];

/// SQLite (extended) result codes for SQLITE_BUSY and SQLITE_LOCKED
const SQLITE_CONTENTION: [&str; 7] = ["5", "261", "517", "773", "6", "262", "518"];

/// Lost a race against a concurrent writer: Postgres serialization failure
/// or SQLite lock contention.
pub(crate) fn is_write_contention(e: &DbErr) -> bool {
    database_code(e).is_some_and(|code| {
        PG_CONTENTION.contains(&code.as_str()) || SQLITE_CONTENTION.contains(&code.as_str())
    })
}

/// Driver error code of a failed statement, connection or commit
fn database_code(e: &DbErr) -> Option<String> {
    let inner = match e {
        DbErr::Conn(RuntimeErr::SqlxError(inner))
        | DbErr::Exec(RuntimeErr::SqlxError(inner))
        | DbErr::Query(RuntimeErr::SqlxError(inner)) => inner,
        _ => return None,
    };
    inner
        .as_database_error()
        .and_then(|db| db.code())
        .map(|code| code.into_owned())
}
