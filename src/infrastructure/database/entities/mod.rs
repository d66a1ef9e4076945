//! Database entities module

pub mod business;
pub mod reservation;
pub mod resource;
pub mod user;

pub use business::Entity as Business;
pub use reservation::Entity as Reservation;
pub use resource::Entity as Resource;
pub use user::Entity as User;
