pub mod book_repository;
pub mod cart_repository;
pub mod category_repository;
pub mod order_repository;
pub mod user_repository;

use book_repository::BookRepository;
use cart_repository::CartRepository;
use category_repository::CategoryRepository;
use order_repository::OrderRepository;
use user_repository::UserRepository;

#[derive(thiserror::Error, Debug)]
pub enum RepoError {
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("db error: {0}")]
    DbError(String),
}

/// Everything the application layer needs from storage.
pub trait Store:
    BookRepository + CategoryRepository + UserRepository + CartRepository + OrderRepository
{
}

impl<T> Store for T where
    T: BookRepository + CategoryRepository + UserRepository + CartRepository + OrderRepository
{
}
