use std::sync::Arc;

use crate::errors::AppError;
use bookstore_types::domain::category::{Category, NewCategory};
use bookstore_types::domain::page::{Page, PageRequest};
use bookstore_types::ports::category_repository::CategoryRepository;
use uuid::Uuid;

pub struct CategoryService<R: CategoryRepository> {
    repo: Arc<R>,
}

impl<R: CategoryRepository> CategoryService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn create_category(&self, input: NewCategory) -> Result<Category, AppError> {
        let category = Category::new(input)?;
        let category = self.repo.save_category(category).await?;
        tracing::info!(category_id = %category.id, name = %category.name, "category created");
        Ok(category)
    }

    pub async fn update_category(&self, id: Uuid, input: NewCategory) -> Result<Category, AppError> {
        let mut category = self.get_category(id).await?;
        category.apply(input)?;
        Ok(self.repo.save_category(category).await?)
    }

    pub async fn get_category(&self, id: Uuid) -> Result<Category, AppError> {
        self.repo
            .find_category(id)
            .await?
            .ok_or_else(|| AppError::not_found("category", id))
    }

    pub async fn list_categories(&self, page: PageRequest) -> Result<Page<Category>, AppError> {
        Ok(self.repo.find_categories(page).await?)
    }

    pub async fn delete_category(&self, id: Uuid) -> Result<(), AppError> {
        if self.repo.delete_category(id).await? {
            tracing::info!(category_id = %id, "category deleted");
            Ok(())
        } else {
            Err(AppError::not_found("category", id))
        }
    }
}
