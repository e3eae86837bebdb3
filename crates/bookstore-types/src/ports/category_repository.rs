use async_trait::async_trait;
use uuid::Uuid;

use super::RepoError;
use crate::domain::category::Category;
use crate::domain::page::{Page, PageRequest};

#[async_trait]
pub trait CategoryRepository: Send + Sync + 'static {
    async fn save_category(&self, category: Category) -> Result<Category, RepoError>;
    async fn find_category(&self, id: Uuid) -> Result<Option<Category>, RepoError>;
    async fn find_categories(&self, page: PageRequest) -> Result<Page<Category>, RepoError>;
    async fn delete_category(&self, id: Uuid) -> Result<bool, RepoError>;
}
