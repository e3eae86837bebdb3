use async_trait::async_trait;
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
use crate::status_changed;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct InMemoryRepo {
    pub books: Arc<DashMap<Uuid, Book>>,
    pub categories: Arc<DashMap<Uuid, Category>>,
    pub users: Arc<DashMap<Uuid, User>>,
    pub carts: Arc<DashMap<Uuid, ShoppingCart>>,
    pub orders: Arc<DashMap<Uuid, Order>>,
    isbns: Arc<DashMap<String, Uuid>>,
    emails: Arc<DashMap<String, Uuid>>,
}

impl InMemoryRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Claims `key` for `owner` in a uniqueness index and releases `previous`
/// when the owner's key changed.
fn claim(
    index: &DashMap<String, Uuid>,
    key: &str,
    owner: Uuid,
    previous: Option<String>,
    what: &str,
) -> Result<(), RepoError> {
    match index.entry(key.to_string()) {
        Entry::Occupied(e) if *e.get() != owner => {
            return Err(RepoError::Conflict(format!("{what} {key} already exists")));
        }
        Entry::Occupied(_) => {}
        Entry::Vacant(e) => {
            e.insert(owner);
        }
    }
    if let Some(prev) = previous.filter(|p| p != key) {
        index.remove_if(&prev, |_, v| *v == owner);
    }
    Ok(())
}

#[async_trait]
impl BookRepository for InMemoryRepo {
    async fn save_book(&self, book: Book) -> Result<Book, RepoError> {
        let previous = self.books.get(&book.id).map(|b| b.isbn.clone());
        claim(&self.isbns, &book.isbn, book.id, previous, "isbn")?;
        self.books.insert(book.id, book.clone());
        Ok(book)
    }

    async fn find_book(&self, id: Uuid) -> Result<Option<Book>, RepoError> {
        Ok(self
            .books
            .get(&id)
            .filter(|b| !b.deleted)
            .map(|b| b.clone()))
    }

    async fn find_books(
        &self,
        predicate: &BookPredicate,
        page: PageRequest,
    ) -> Result<Page<Book>, RepoError> {
        let mut matched: Vec<Book> = self
            .books
            .iter()
            .filter(|kv| !kv.deleted && predicate.matches(kv.value()))
            .map(|kv| kv.value().clone())
            .collect();
        matched.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Ok(page.slice(matched))
    }

    async fn delete_book(&self, id: Uuid) -> Result<bool, RepoError> {
        match self.books.get_mut(&id) {
            Some(mut b) if !b.deleted => {
                b.deleted = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl CategoryRepository for InMemoryRepo {
    async fn save_category(&self, category: Category) -> Result<Category, RepoError> {
        self.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn find_category(&self, id: Uuid) -> Result<Option<Category>, RepoError> {
        Ok(self
            .categories
            .get(&id)
            .filter(|c| !c.deleted)
            .map(|c| c.clone()))
    }

    async fn find_categories(&self, page: PageRequest) -> Result<Page<Category>, RepoError> {
        let mut all: Vec<Category> = self
            .categories
            .iter()
            .filter(|kv| !kv.deleted)
            .map(|kv| kv.value().clone())
            .collect();
        all.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(page.slice(all))
    }

    async fn delete_category(&self, id: Uuid) -> Result<bool, RepoError> {
        match self.categories.get_mut(&id) {
            Some(mut c) if !c.deleted => {
                c.deleted = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryRepo {
    async fn save_user(&self, user: User) -> Result<User, RepoError> {
        let previous = self.users.get(&user.id).map(|u| u.email.clone());
        claim(&self.emails, &user.email, user.id, previous, "email")?;
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let id = match self.emails.get(email) {
            Some(id) => *id,
            None => return Ok(None),
        };
        self.find_user(id).await
    }
}

#[async_trait]
impl CartRepository for InMemoryRepo {
    async fn save_cart(&self, cart: ShoppingCart) -> Result<ShoppingCart, RepoError> {
        // The whole aggregate is swapped in one insert.
        self.carts.insert(cart.user_id, cart.clone());
        Ok(cart)
    }

    async fn find_cart(&self, user_id: Uuid) -> Result<Option<ShoppingCart>, RepoError> {
        Ok(self
            .carts
            .get(&user_id)
            .filter(|c| !c.deleted)
            .map(|c| c.clone()))
    }

    async fn find_cart_by_item(&self, item_id: Uuid) -> Result<Option<ShoppingCart>, RepoError> {
        Ok(self
            .carts
            .iter()
            .find(|kv| !kv.deleted && kv.contains_item(item_id))
            .map(|kv| kv.value().clone()))
    }
}

#[async_trait]
impl OrderRepository for InMemoryRepo {
    async fn place_order(&self, order: Order, cart_id: Uuid) -> Result<Order, RepoError> {
        self.orders.insert(order.id, order.clone());
        if let Some(mut cart) = self.carts.get_mut(&cart_id) {
            cart.clear();
        }
        Ok(order)
    }

    async fn find_order(&self, id: Uuid) -> Result<Option<Order>, RepoError> {
        Ok(self.orders.get(&id).map(|o| o.clone()))
    }

    async fn find_orders_by_user(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<Order>, RepoError> {
        let mut mine: Vec<Order> = self
            .orders
            .iter()
            .filter(|kv| kv.user_id == user_id)
            .map(|kv| kv.value().clone())
            .collect();
        mine.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(page.slice(mine))
    }

    async fn update_order_status(
        &self,
        id: Uuid,
        expected: OrderStatus,
        status: OrderStatus,
    ) -> Result<Option<Order>, RepoError> {
        let Some(mut v) = self.orders.get_mut(&id) else {
            return Ok(None);
        };
        if v.status != expected {
            return Err(status_changed(id, v.status));
        }
        v.status = status;
        Ok(Some(v.clone()))
    }

    async fn delete_order(&self, id: Uuid) -> Result<bool, RepoError> {
        Ok(self.orders.remove(&id).is_some())
    }
}
