//! Reservations of one business: CRUD, confirm and cancel

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
