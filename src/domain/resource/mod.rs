//! Bookable resource aggregate (tables and rooms)

pub mod model;
pub mod repository;

pub use model::{Resource, ResourceDraft, ResourceKind};
pub use repository::ResourceRepository;
