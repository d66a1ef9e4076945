use async_trait::async_trait;

use super::User;
use crate::domain::DomainResult;

#[async_trait]
pub trait UserRepositoryInterface: Send + Sync {
    /// Insert; duplicate username or email fails with `DomainError::Conflict`
    async fn create_user(&self, user: User) -> DomainResult<()>;

    async fn get_user_by_username(&self, username: &str) -> DomainResult<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> DomainResult<Option<User>>;
    async fn get_user_by_id(&self, id: &str) -> DomainResult<Option<User>>;

    async fn touch_last_login(&self, id: &str) -> DomainResult<()>;
    async fn count_users(&self) -> DomainResult<u64>;
}
