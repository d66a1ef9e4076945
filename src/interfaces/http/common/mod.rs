//! Shared HTTP building blocks: envelope, error mapping, validated JSON

pub mod errors;
pub mod response;
pub mod validated_json;

pub use errors::{domain_error, status_for, ApiError, ApiResult};
pub use response::{ApiResponse, EmptyData, PageQuery, PaginatedResponse};
pub use validated_json::ValidatedJson;
