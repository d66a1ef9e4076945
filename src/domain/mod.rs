pub mod business;
pub mod events;
pub mod repositories;
pub mod reservation;
pub mod resource;
pub mod user;

// Re-export commonly used types
pub use business::{Business, BusinessDraft, BusinessRepository};
pub use reservation::{
    ContactInfo, Reservation, ReservationDetails, ReservationFilter, ReservationInput,
    ReservationRepository, ReservationStatus, TimeRange,
};
pub use resource::{Resource, ResourceDraft, ResourceKind, ResourceRepository};
pub use user::{Actor, CreateUserDto, User, UserRepositoryInterface, UserRole};
pub use repositories::{DomainResult, RepositoryProvider};

// Re-export DomainError from shared for convenience
pub use crate::shared::errors::DomainError;
