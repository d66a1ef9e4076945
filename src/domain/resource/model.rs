//! Resource domain entity

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, DomainResult};

/// What kind of thing is being booked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceKind {
    Table,
    Room,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Table => "Table",
            Self::Room => "Room",
        }
    }
}

impl FromStr for ResourceKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Table" | "table" => Ok(Self::Table),
            "Room" | "room" => Ok(Self::Room),
            other => Err(DomainError::Validation(format!(
                "Unknown resource kind: {}",
                other
            ))),
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A bookable table or room belonging to one business
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub id: String,
    pub business_id: String,
    pub kind: ResourceKind,
    pub name: String,
    pub min_capacity: Option<i32>,
    pub max_capacity: Option<i32>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Editable resource attributes
#[derive(Debug, Clone)]
pub struct ResourceDraft {
    pub kind: ResourceKind,
    pub name: String,
    pub min_capacity: Option<i32>,
    pub max_capacity: Option<i32>,
    pub is_active: bool,
}

impl ResourceDraft {
    /// Bounds are >= 1 and `min <= max` when both are present.
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::Validation("Resource name is required".into()));
        }
        for bound in [self.min_capacity, self.max_capacity].into_iter().flatten() {
            if bound < 1 {
                return Err(DomainError::Validation(
                    "Capacity bounds must be at least 1".into(),
                ));
            }
        }
        if let (Some(min), Some(max)) = (self.min_capacity, self.max_capacity) {
            if min > max {
                return Err(DomainError::Validation(format!(
                    "min_capacity ({}) exceeds max_capacity ({})",
                    min, max
                )));
            }
        }
        Ok(())
    }
}

impl Resource {
    pub fn new(business_id: impl Into<String>, draft: ResourceDraft) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            business_id: business_id.into(),
            kind: draft.kind,
            name: draft.name,
            min_capacity: draft.min_capacity,
            max_capacity: draft.max_capacity,
            is_active: draft.is_active,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn apply(&mut self, draft: ResourceDraft) {
        self.kind = draft.kind;
        self.name = draft.name;
        self.min_capacity = draft.min_capacity;
        self.max_capacity = draft.max_capacity;
        self.is_active = draft.is_active;
        self.updated_at = Utc::now();
    }

    pub fn is_bookable(&self) -> bool {
        self.is_active && self.deleted_at.is_none()
    }

    /// Check a party size against the defined capacity bounds.
    pub fn check_capacity(&self, guests: i32) -> DomainResult<()> {
        if let Some(min) = self.min_capacity {
            if guests < min {
                return Err(DomainError::Validation(format!(
                    "{} '{}' requires at least {} guests, got {}",
                    self.kind, self.name, min, guests
                )));
            }
        }
        if let Some(max) = self.max_capacity {
            if guests > max {
                return Err(DomainError::Validation(format!(
                    "{} '{}' seats at most {} guests, got {}",
                    self.kind, self.name, max, guests
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(min: Option<i32>, max: Option<i32>) -> ResourceDraft {
        ResourceDraft {
            kind: ResourceKind::Table,
            name: "T1".into(),
            min_capacity: min,
            max_capacity: max,
            is_active: true,
        }
    }

    #[test]
    fn capacity_bounds_are_inclusive() {
        let table = Resource::new("biz", draft(Some(2), Some(4)));
        assert!(table.check_capacity(1).is_err());
        assert!(table.check_capacity(2).is_ok());
        assert!(table.check_capacity(4).is_ok());
        assert!(table.check_capacity(5).is_err());
    }

    #[test]
    fn missing_bounds_do_not_constrain() {
        let open = Resource::new("biz", draft(None, None));
        assert!(open.check_capacity(1).is_ok());
        assert!(open.check_capacity(500).is_ok());

        let min_only = Resource::new("biz", draft(Some(6), None));
        assert!(min_only.check_capacity(5).is_err());
        assert!(min_only.check_capacity(60).is_ok());
    }

    #[test]
    fn draft_validation() {
        assert!(draft(Some(2), Some(4)).validate().is_ok());
        assert!(draft(Some(5), Some(4)).validate().is_err());
        assert!(draft(Some(0), None).validate().is_err());
        let mut nameless = draft(None, None);
        nameless.name = "  ".into();
        assert!(nameless.validate().is_err());
    }

    #[test]
    fn kind_parsing() {
        assert_eq!("room".parse::<ResourceKind>().unwrap(), ResourceKind::Room);
        assert!("desk".parse::<ResourceKind>().is_err());
    }
}
