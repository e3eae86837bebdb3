#[cfg(not(any(feature = "memory", feature = "sqlite")))]
compile_error!("Enable a repo feature: `memory` or `sqlite`.");

use bookstore_types::domain::book::Book;
use bookstore_types::domain::cart::ShoppingCart;
use bookstore_types::domain::category::Category;
use bookstore_types::domain::order::{Order, OrderStatus};
use bookstore_types::domain::page::{Page, PageRequest};
use bookstore_types::domain::search::BookPredicate;
use bookstore_types::domain::user::User;
use bookstore_types::ports::book_repository::BookRepository;
use bookstore_types::ports::cart_repository::CartRepository;
use bookstore_types::ports::category_repository::CategoryRepository;
use bookstore_types::ports::order_repository::OrderRepository;
use bookstore_types::ports::user_repository::UserRepository;
use bookstore_types::ports::RepoError;
use uuid::Uuid;

#[cfg(feature = "memory")]
pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "sqlite")]
const DEFAULT_SQLITE_URL: &str = "sqlite://bookstore.db";

// Raised when a compare-and-set on an order's status loses the race.
pub(crate) fn status_changed(id: Uuid, current: OrderStatus) -> RepoError {
    RepoError::Conflict(format!(
        "order {id} is now {}, status was changed concurrently",
        current.as_str()
    ))
}

/// The storage backend picked at start-up.
#[derive(Clone)]
pub enum Repo {
    #[cfg(feature = "memory")]
    Memory(memory::InMemoryRepo),
    #[cfg(feature = "sqlite")]
    Sqlite(sqlite::SqliteRepo),
}

pub async fn build_repo(url: Option<&str>) -> anyhow::Result<Repo> {
    Repo::build_repo(url).await
}

impl Repo {
    #[cfg(all(feature = "memory", not(feature = "sqlite")))]
    pub async fn build_repo(_: Option<&str>) -> anyhow::Result<Self> {
        Ok(Self::Memory(memory::InMemoryRepo::new()))
    }

    #[cfg(all(feature = "sqlite", not(feature = "memory")))]
    pub async fn build_repo(database_url: Option<&str>) -> anyhow::Result<Self> {
        let url = database_url.unwrap_or(DEFAULT_SQLITE_URL);
        Ok(Self::Sqlite(sqlite::SqliteRepo::new(url).await?))
    }

    // With both adapters compiled in, a database url selects sqlite.
    #[cfg(all(feature = "sqlite", feature = "memory"))]
    pub async fn build_repo(database_url: Option<&str>) -> anyhow::Result<Self> {
        match database_url {
            Some(url) => Ok(Self::Sqlite(sqlite::SqliteRepo::new(url).await?)),
            None => Ok(Self::Memory(memory::InMemoryRepo::new())),
        }
    }

    pub fn backend(&self) -> &'static str {
        match self {
            #[cfg(feature = "memory")]
            Repo::Memory(_) => "memory",
            #[cfg(feature = "sqlite")]
            Repo::Sqlite(_) => "sqlite",
        }
    }
}

macro_rules! dispatch {
    ($self:ident, $inner:ident => $call:expr) => {
        match $self {
            #[cfg(feature = "memory")]
            Repo::Memory($inner) => $call,
            #[cfg(feature = "sqlite")]
            Repo::Sqlite($inner) => $call,
        }
    };
}

#[async_trait::async_trait]
impl BookRepository for Repo {
    async fn save_book(&self, book: Book) -> Result<Book, RepoError> {
        dispatch!(self, r => r.save_book(book).await)
    }

    async fn find_book(&self, id: Uuid) -> Result<Option<Book>, RepoError> {
        dispatch!(self, r => r.find_book(id).await)
    }

    async fn find_books(
        &self,
        predicate: &BookPredicate,
        page: PageRequest,
    ) -> Result<Page<Book>, RepoError> {
        dispatch!(self, r => r.find_books(predicate, page).await)
    }

    async fn delete_book(&self, id: Uuid) -> Result<bool, RepoError> {
        dispatch!(self, r => r.delete_book(id).await)
    }
}

#[async_trait::async_trait]
impl CategoryRepository for Repo {
    async fn save_category(&self, category: Category) -> Result<Category, RepoError> {
        dispatch!(self, r => r.save_category(category).await)
    }

    async fn find_category(&self, id: Uuid) -> Result<Option<Category>, RepoError> {
        dispatch!(self, r => r.find_category(id).await)
    }

    async fn find_categories(&self, page: PageRequest) -> Result<Page<Category>, RepoError> {
        dispatch!(self, r => r.find_categories(page).await)
    }

    async fn delete_category(&self, id: Uuid) -> Result<bool, RepoError> {
        dispatch!(self, r => r.delete_category(id).await)
    }
}

#[async_trait::async_trait]
impl UserRepository for Repo {
    async fn save_user(&self, user: User) -> Result<User, RepoError> {
        dispatch!(self, r => r.save_user(user).await)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        dispatch!(self, r => r.find_user(id).await)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        dispatch!(self, r => r.find_user_by_email(email).await)
    }
}

#[async_trait::async_trait]
impl CartRepository for Repo {
    async fn save_cart(&self, cart: ShoppingCart) -> Result<ShoppingCart, RepoError> {
        dispatch!(self, r => r.save_cart(cart).await)
    }

    async fn find_cart(&self, user_id: Uuid) -> Result<Option<ShoppingCart>, RepoError> {
        dispatch!(self, r => r.find_cart(user_id).await)
    }

    async fn find_cart_by_item(&self, item_id: Uuid) -> Result<Option<ShoppingCart>, RepoError> {
        dispatch!(self, r => r.find_cart_by_item(item_id).await)
    }
}

#[async_trait::async_trait]
impl OrderRepository for Repo {
    async fn place_order(&self, order: Order, cart_id: Uuid) -> Result<Order, RepoError> {
        dispatch!(self, r => r.place_order(order, cart_id).await)
    }

    async fn find_order(&self, id: Uuid) -> Result<Option<Order>, RepoError> {
        dispatch!(self, r => r.find_order(id).await)
    }

    async fn find_orders_by_user(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<Order>, RepoError> {
        dispatch!(self, r => r.find_orders_by_user(user_id, page).await)
    }

    async fn update_order_status(
        &self,
        id: Uuid,
        expected: OrderStatus,
        status: OrderStatus,
    ) -> Result<Option<Order>, RepoError> {
        dispatch!(self, r => r.update_order_status(id, expected, status).await)
    }

    async fn delete_order(&self, id: Uuid) -> Result<bool, RepoError> {
        dispatch!(self, r => r.delete_order(id).await)
    }
}
