use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::domain::{DomainError, DomainResult};

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserRole {
    /// Platform operator, not bound to a business
    Admin,
    /// Manages one business
    Owner,
    /// Front-of-house staff of one business
    #[default]
    Staff,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Owner => "owner",
            Self::Staff => "staff",
        }
    }
}

impl FromStr for UserRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "owner" => Ok(Self::Owner),
            "staff" => Ok(Self::Staff),
            other => Err(DomainError::Validation(format!("Unknown role: {}", other))),
        }
    }
}

/// User model
#[derive(Clone, Debug)]
pub struct User {
    pub id: String,
    pub business_id: Option<String>,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

/// The authenticated principal a request runs on behalf of.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Actor {
    pub user_id: String,
    pub username: String,
    pub role: UserRole,
    pub business_id: Option<String>,
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Admins may act on any business; everybody else only on their own.
    pub fn authorize_business(&self, business_id: &str) -> DomainResult<()> {
        if self.is_admin() || self.business_id.as_deref() == Some(business_id) {
            return Ok(());
        }
        Err(DomainError::Forbidden(format!(
            "User '{}' cannot access business '{}'",
            self.username, business_id
        )))
    }

    /// Like [`authorize_business`](Self::authorize_business) but also
    /// requires owner rights for non-admins.
    pub fn authorize_management(&self, business_id: &str) -> DomainResult<()> {
        self.authorize_business(business_id)?;
        if self.is_admin() || self.role == UserRole::Owner {
            return Ok(());
        }
        Err(DomainError::Forbidden(
            "Only business owners can manage this resource".into(),
        ))
    }

    pub fn require_admin(&self) -> DomainResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(DomainError::Forbidden("Admin role required".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(role: UserRole, business: Option<&str>) -> Actor {
        Actor {
            user_id: "u1".into(),
            username: "maria".into(),
            role,
            business_id: business.map(String::from),
        }
    }

    #[test]
    fn staff_is_scoped_to_own_business() {
        let staff = actor(UserRole::Staff, Some("biz-a"));
        assert!(staff.authorize_business("biz-a").is_ok());
        assert!(matches!(
            staff.authorize_business("biz-b"),
            Err(DomainError::Forbidden(_))
        ));
        assert!(staff.authorize_management("biz-a").is_err());
    }

    #[test]
    fn owner_manages_own_business_only() {
        let owner = actor(UserRole::Owner, Some("biz-a"));
        assert!(owner.authorize_management("biz-a").is_ok());
        assert!(owner.authorize_management("biz-b").is_err());
        assert!(owner.require_admin().is_err());
    }

    #[test]
    fn admin_reaches_every_business() {
        let admin = actor(UserRole::Admin, None);
        assert!(admin.authorize_business("anything").is_ok());
        assert!(admin.authorize_management("anything").is_ok());
        assert!(admin.require_admin().is_ok());
    }

    #[test]
    fn role_round_trip() {
        for role in [UserRole::Admin, UserRole::Owner, UserRole::Staff] {
            assert_eq!(role.as_str().parse::<UserRole>().unwrap(), role);
        }
    }
}
