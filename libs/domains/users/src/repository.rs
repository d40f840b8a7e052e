use async_trait::async_trait;

use crate::error::UserResult;
use crate::models::{User, UserFilter};

/// Persistence for user records, keyed by identity-provider uid
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: User) -> UserResult<User>;

    async fn get_by_id(&self, id: String) -> UserResult<Option<User>>;

    async fn list(&self, filter: UserFilter) -> UserResult<Vec<User>>;

    async fn count(&self, filter: UserFilter) -> UserResult<u64>;

    /// Whether another user already uses `email`
    async fn email_exists(&self, email: String, exclude: Option<String>) -> UserResult<bool>;

    async fn update(&self, user: User) -> UserResult<User>;

    async fn delete(&self, id: String) -> UserResult<bool>;
}
