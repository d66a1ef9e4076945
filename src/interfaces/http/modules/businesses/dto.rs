//! Business DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::{Business, BusinessDraft};

fn default_true() -> bool {
    true
}

/// Body of create and update
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BusinessRequest {
    #[validate(length(min = 1, max = 120, message = "name must be 1-120 characters"))]
    pub name: String,
    /// Lowercase letters, digits and dashes
    #[validate(length(min = 2, max = 64, message = "slug must be 2-64 characters"))]
    pub slug: String,
    #[validate(email(message = "invalid email format"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl From<BusinessRequest> for BusinessDraft {
    fn from(r: BusinessRequest) -> Self {
        Self {
            name: r.name,
            slug: r.slug,
            email: r.email,
            phone: r.phone,
            address: r.address,
            is_active: r.is_active,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BusinessDto {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Business> for BusinessDto {
    fn from(b: Business) -> Self {
        Self {
            id: b.id,
            name: b.name,
            slug: b.slug,
            email: b.email,
            phone: b.phone,
            address: b.address,
            is_active: b.is_active,
            created_at: b.created_at,
            updated_at: b.updated_at,
        }
    }
}
