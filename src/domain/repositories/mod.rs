//! Repository traits for the domain layer
//!
//! Contains:
//! - `RepositoryProvider`: unified access to all per-aggregate repositories
//! - `DomainResult`: standard result type for domain operations

use super::business::BusinessRepository;
use super::reservation::ReservationRepository;
use super::resource::ResourceRepository;
use super::user::UserRepositoryInterface;
use crate::shared::errors::DomainError;

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

// ── RepositoryProvider ──────────────────────────────────────────

/// Provides access to all domain repositories.
///
/// Consumers request only the repository they need:
///
/// ```ignore
/// async fn handle(repos: &dyn RepositoryProvider) {
///     let table = repos.resources().find_by_id("res-1").await?;
///     let clashes = repos.reservations()
///         .find_overlapping("res-1", "biz-1", start, end, None)
///         .await?;
/// }
/// ```
pub trait RepositoryProvider: Send + Sync {
    fn businesses(&self) -> &dyn BusinessRepository;
    fn resources(&self) -> &dyn ResourceRepository;
    fn reservations(&self) -> &dyn ReservationRepository;
    fn users(&self) -> &dyn UserRepositoryInterface;
}
