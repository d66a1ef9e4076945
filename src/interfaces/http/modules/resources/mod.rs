//! Tables and rooms of one business, plus slot availability

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
