use async_trait::async_trait;
use uuid::Uuid;

use super::RepoError;
use crate::domain::user::User;

#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Inserts or replaces. A taken email yields [`RepoError::Conflict`].
    async fn save_user(&self, user: User) -> Result<User, RepoError>;
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, RepoError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;
}
