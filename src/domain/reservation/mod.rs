//! Reservation aggregate
//!
//! Contains the Reservation entity, its time window, DTOs and repository interface.

pub mod dto;
pub mod model;
pub mod repository;
pub mod time_range;

pub use dto::{ReservationFilter, ReservationInput};
pub use model::{ContactInfo, Reservation, ReservationDetails, ReservationStatus};
pub use repository::ReservationRepository;
pub use time_range::TimeRange;
