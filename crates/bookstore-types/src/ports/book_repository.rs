use async_trait::async_trait;
use uuid::Uuid;

use super::RepoError;
use crate::domain::book::Book;
use crate::domain::page::{Page, PageRequest};
use crate::domain::search::BookPredicate;

/// Reads never return soft-deleted books.
#[async_trait]
pub trait BookRepository: Send + Sync + 'static {
    /// Inserts or replaces. A taken isbn yields [`RepoError::Conflict`].
    async fn save_book(&self, book: Book) -> Result<Book, RepoError>;
    async fn find_book(&self, id: Uuid) -> Result<Option<Book>, RepoError>;
    /// Matching books ordered by title.
    async fn find_books(
        &self,
        predicate: &BookPredicate,
        page: PageRequest,
    ) -> Result<Page<Book>, RepoError>;
    /// Soft delete. `false` when no live book had that id.
    async fn delete_book(&self, id: Uuid) -> Result<bool, RepoError>;
}
