//! Business (tenant) aggregate

pub mod model;
pub mod repository;

pub use model::{Business, BusinessDraft};
pub use repository::BusinessRepository;
