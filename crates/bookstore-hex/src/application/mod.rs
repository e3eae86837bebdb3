pub mod book_service;
pub mod cart_service;
pub mod category_service;
pub mod order_service;
pub mod user_service;

use std::sync::Arc;

use bookstore_types::ports::Store;
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use book_service::BookService;
use cart_service::CartService;
use category_service::CategoryService;
use order_service::OrderService;
use user_service::UserService;

/// Per-user async locks. Every read-modify-write of a cart, checkout
/// included, runs under its owner's lock.
#[derive(Default)]
pub struct CartLocks {
    locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl CartLocks {
    pub async fn lock(&self, user_id: Uuid) -> CartGuard<'_> {
        // Clone the handle out first so no shard guard is held across the await.
        let lock = self.locks.entry(user_id).or_default().clone();
        CartGuard {
            locks: &self.locks,
            user_id,
            guard: Some(lock.lock_owned().await),
        }
    }
}

/// Holds a user's cart lock. On drop the entry is evicted unless another
/// task still holds or waits on it.
pub struct CartGuard<'a> {
    locks: &'a DashMap<Uuid, Arc<Mutex<()>>>,
    user_id: Uuid,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for CartGuard<'_> {
    fn drop(&mut self) {
        self.guard.take();
        self.locks
            .remove_if(&self.user_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}

/// All application services over one shared store.
pub struct Services<R: Store> {
    pub books: BookService<R>,
    pub categories: CategoryService<R>,
    pub users: UserService<R>,
    pub carts: CartService<R>,
    pub orders: OrderService<R>,
}

impl<R: Store> Services<R> {
    pub fn new(repo: R) -> Self {
        let repo = Arc::new(repo);
        let locks = Arc::new(CartLocks::default());
        Self {
            books: BookService::new(repo.clone()),
            categories: CategoryService::new(repo.clone()),
            users: UserService::new(repo.clone()),
            carts: CartService::new(repo.clone(), locks.clone()),
            orders: OrderService::new(repo, locks),
        }
    }
}
