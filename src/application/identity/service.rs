//! User management service: application-layer orchestration
//!
//! Login, registration and the default platform admin.
//! HTTP handlers should be thin wrappers that delegate to this service.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::domain::{
    Actor, CreateUserDto, DomainError, DomainResult, RepositoryProvider, User, UserRole,
};
use crate::infrastructure::crypto::jwt::{create_token, JwtConfig};
use crate::infrastructure::crypto::password::{hash_password, verify_password};
use crate::shared::is_plausible_email;

/// Authentication result returned after a successful login
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: User,
}

pub struct UserService {
    repos: Arc<dyn RepositoryProvider>,
    jwt_config: JwtConfig,
}

impl UserService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, jwt_config: JwtConfig) -> Self {
        Self { repos, jwt_config }
    }

    // ── Authentication ──────────────────────────────────────────

    /// Authenticate user by username/email + password and return a JWT.
    pub async fn login(&self, username_or_email: &str, password: &str) -> DomainResult<AuthResult> {
        let users = self.repos.users();
        let user = match users.get_user_by_username(username_or_email).await? {
            Some(user) => Some(user),
            None => users.get_user_by_email(username_or_email).await?,
        };

        let Some(mut user) = user else {
            return Err(DomainError::Unauthorized("Invalid credentials".into()));
        };

        if !user.is_active {
            return Err(DomainError::Unauthorized("Account is disabled".into()));
        }

        let valid = verify_password(password, &user.password_hash).unwrap_or(false);
        if !valid {
            return Err(DomainError::Unauthorized("Invalid credentials".into()));
        }

        let token = create_token(
            &user.id,
            &user.username,
            user.role,
            user.business_id.as_deref(),
            &self.jwt_config,
        )
        .map_err(|e| DomainError::Persistence(format!("Failed to create token: {}", e)))?;

        if let Err(e) = users.touch_last_login(&user.id).await {
            warn!(user_id = %user.id, error = %e, "Failed to record last login");
        }
        user.last_login_at = Some(Utc::now());

        info!(user_id = %user.id, username = %user.username, "User logged in");
        Ok(AuthResult {
            token,
            token_type: "Bearer".into(),
            expires_in: self.jwt_config.expiration_hours * 3600,
            user,
        })
    }

    // ── Registration ────────────────────────────────────────────

    /// Admins may create any user; owners only staff and owners of their
    /// own business.
    pub async fn register(&self, actor: &Actor, dto: CreateUserDto) -> DomainResult<User> {
        match dto.role {
            UserRole::Admin => actor.require_admin()?,
            UserRole::Owner | UserRole::Staff => {
                let business_id = dto.business_id.as_deref().ok_or_else(|| {
                    DomainError::Validation(format!(
                        "business_id is required for role '{}'",
                        dto.role.as_str()
                    ))
                })?;
                actor.authorize_management(business_id)?;
            }
        }

        let user = self.create_user(dto).await?;
        info!(
            user_id = %user.id,
            username = %user.username,
            role = user.role.as_str(),
            created_by = %actor.username,
            "New user registered"
        );
        Ok(user)
    }

    /// Create the platform admin when the user table is empty.
    pub async fn ensure_default_admin(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> DomainResult<Option<User>> {
        if self.repos.users().count_users().await? > 0 {
            return Ok(None);
        }

        let admin = self
            .create_user(CreateUserDto {
                username: username.to_string(),
                email: email.to_string(),
                role: UserRole::Admin,
                business_id: None,
                password: password.to_string(),
            })
            .await?;

        info!(username = %admin.username, "👤 Default admin created");
        Ok(Some(admin))
    }

    // ── Queries ─────────────────────────────────────────────────

    /// The user behind a token
    pub async fn me(&self, actor: &Actor) -> DomainResult<User> {
        self.repos
            .users()
            .get_user_by_id(&actor.user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", actor.user_id.clone()))
    }

    // ── Helpers ─────────────────────────────────────────────────

    async fn create_user(&self, dto: CreateUserDto) -> DomainResult<User> {
        if dto.username.len() < 3 || dto.username.len() > 50 {
            return Err(DomainError::Validation(
                "Username must be 3-50 characters".into(),
            ));
        }
        if dto.password.len() < 8 {
            return Err(DomainError::Validation(
                "Password must be at least 8 characters".into(),
            ));
        }
        if !is_plausible_email(&dto.email) {
            return Err(DomainError::Validation("Invalid email address".into()));
        }

        let business_id = match dto.role {
            UserRole::Admin => None,
            UserRole::Owner | UserRole::Staff => {
                let id = dto.business_id.clone().ok_or_else(|| {
                    DomainError::Validation("business_id is required".into())
                })?;
                self.repos
                    .businesses()
                    .find_by_id(&id)
                    .await?
                    .filter(|b| b.deleted_at.is_none())
                    .ok_or_else(|| DomainError::not_found("Business", id.clone()))?;
                Some(id)
            }
        };

        let password_hash = hash_password(&dto.password)
            .map_err(|e| DomainError::Persistence(format!("Failed to hash password: {}", e)))?;

        let now = Utc::now();
        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            business_id,
            username: dto.username,
            email: dto.email,
            password_hash,
            role: dto.role,
            is_active: true,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        };
        self.repos.users().create_user(user.clone()).await?;
        Ok(user)
    }
}
