//! Business domain entity

use chrono::{DateTime, Utc};

/// Tenant owning resources and reservations
#[derive(Debug, Clone, PartialEq)]
pub struct Business {
    pub id: String,
    pub name: String,
    /// URL-friendly unique handle
    pub slug: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Editable business attributes
#[derive(Debug, Clone)]
pub struct BusinessDraft {
    pub name: String,
    pub slug: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_active: bool,
}

impl Business {
    pub fn new(draft: BusinessDraft) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: draft.name,
            slug: draft.slug,
            email: draft.email,
            phone: draft.phone,
            address: draft.address,
            is_active: draft.is_active,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn apply(&mut self, draft: BusinessDraft) {
        self.name = draft.name;
        self.slug = draft.slug;
        self.email = draft.email;
        self.phone = draft.phone;
        self.address = draft.address;
        self.is_active = draft.is_active;
        self.updated_at = Utc::now();
    }

    /// Open for new bookings
    pub fn accepts_bookings(&self) -> bool {
        self.is_active && self.deleted_at.is_none()
    }
}
