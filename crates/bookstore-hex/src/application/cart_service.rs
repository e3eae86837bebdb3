use std::sync::Arc;

use crate::application::CartLocks;
use crate::errors::AppError;
use bookstore_types::domain::cart::{validate_quantity, CartItemView, CartView, ShoppingCart};
use bookstore_types::ports::book_repository::BookRepository;
use bookstore_types::ports::cart_repository::CartRepository;
use bookstore_types::ports::user_repository::UserRepository;
use uuid::Uuid;

pub struct CartService<R: BookRepository + UserRepository + CartRepository> {
    repo: Arc<R>,
    locks: Arc<CartLocks>,
}

impl<R: BookRepository + UserRepository + CartRepository> CartService<R> {
    pub fn new(repo: Arc<R>, locks: Arc<CartLocks>) -> Self {
        Self { repo, locks }
    }

    /// Adds a book to the caller's cart, creating the cart on first use.
    /// Adding a book already in the cart increases that line's quantity.
    pub async fn add_item(
        &self,
        user_id: Uuid,
        book_id: Uuid,
        quantity: i64,
    ) -> Result<CartView, AppError> {
        validate_quantity(quantity)?;
        let _guard = self.locks.lock(user_id).await;

        let mut cart = self.cart_or_create(user_id).await?;
        if self.repo.find_book(book_id).await?.is_none() {
            return Err(AppError::not_found("book", book_id));
        }
        let line = cart.add_item(book_id, quantity)?;
        tracing::info!(%user_id, %book_id, item_id = %line.id, quantity = line.quantity, "cart item added");

        let cart = self.repo.save_cart(cart).await?;
        self.view(cart).await
    }

    pub async fn get_cart(&self, user_id: Uuid) -> Result<CartView, AppError> {
        let cart = self
            .repo
            .find_cart(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("shopping cart for user", user_id))?;
        self.view(cart).await
    }

    /// Sets an absolute quantity on one of the caller's cart items.
    pub async fn update_quantity(
        &self,
        user_id: Uuid,
        item_id: Uuid,
        quantity: i64,
    ) -> Result<CartView, AppError> {
        validate_quantity(quantity)?;
        let _guard = self.locks.lock(user_id).await;

        let mut cart = self.owned_cart(user_id, item_id).await?;
        if !cart.update_quantity(item_id, quantity)? {
            return Err(AppError::not_found("cart item", item_id));
        }
        let cart = self.repo.save_cart(cart).await?;
        self.view(cart).await
    }

    pub async fn delete_item(&self, user_id: Uuid, item_id: Uuid) -> Result<(), AppError> {
        let _guard = self.locks.lock(user_id).await;

        let mut cart = self.owned_cart(user_id, item_id).await?;
        if cart.remove_item(item_id).is_none() {
            return Err(AppError::not_found("cart item", item_id));
        }
        self.repo.save_cart(cart).await?;
        tracing::info!(%user_id, %item_id, "cart item removed");
        Ok(())
    }

    pub async fn clear_cart(&self, user_id: Uuid) -> Result<(), AppError> {
        let _guard = self.locks.lock(user_id).await;

        let mut cart = self.cart_or_create(user_id).await?;
        cart.clear();
        self.repo.save_cart(cart).await?;
        tracing::info!(%user_id, "cart cleared");
        Ok(())
    }

    /// The stored cart, or a fresh unsaved one for a known user.
    async fn cart_or_create(&self, user_id: Uuid) -> Result<ShoppingCart, AppError> {
        if let Some(cart) = self.repo.find_cart(user_id).await? {
            return Ok(cart);
        }
        if self.repo.find_user(user_id).await?.is_none() {
            return Err(AppError::not_found("user", user_id));
        }
        Ok(ShoppingCart::new(user_id))
    }

    // Items in someone else's cart are reported exactly like missing ones.
    async fn owned_cart(&self, user_id: Uuid, item_id: Uuid) -> Result<ShoppingCart, AppError> {
        match self.repo.find_cart_by_item(item_id).await? {
            Some(cart) if cart.user_id == user_id => Ok(cart),
            _ => Err(AppError::not_found("cart item", item_id)),
        }
    }

    async fn view(&self, cart: ShoppingCart) -> Result<CartView, AppError> {
        let mut cart_items = Vec::with_capacity(cart.items.len());
        for item in cart.items {
            let book_title = self.repo.find_book(item.book_id).await?.map(|b| b.title);
            cart_items.push(CartItemView {
                id: item.id,
                book_id: item.book_id,
                book_title,
                quantity: item.quantity,
            });
        }
        Ok(CartView {
            id: cart.user_id,
            user_id: cart.user_id,
            cart_items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookstore_repo::memory::InMemoryRepo;
    use bookstore_types::domain::book::{Book, NewBook};
    use bookstore_types::domain::user::{NewUser, User};
    use rust_decimal::Decimal;

    struct Fixture {
        repo: Arc<InMemoryRepo>,
        svc: CartService<InMemoryRepo>,
        user: Uuid,
        book: Uuid,
    }

    async fn fixture() -> Fixture {
        let repo = Arc::new(InMemoryRepo::new());
        let user = repo
            .save_user(
                User::new(NewUser {
                    email: format!("{}@example.com", Uuid::new_v4()),
                    first_name: "Cart".into(),
                    last_name: "Owner".into(),
                    shipping_address: None,
                })
                .unwrap(),
            )
            .await
            .unwrap()
            .id;
        let book = repo
            .save_book(
                Book::new(NewBook {
                    title: "Dune".into(),
                    author: "Frank Herbert".into(),
                    isbn: Uuid::new_v4().to_string(),
                    price: Decimal::new(1000, 2),
                    description: None,
                    cover_image: None,
                    category_ids: Default::default(),
                })
                .unwrap(),
            )
            .await
            .unwrap()
            .id;
        let svc = CartService::new(repo.clone(), Arc::new(CartLocks::default()));
        Fixture {
            repo,
            svc,
            user,
            book,
        }
    }

    #[tokio::test]
    async fn add_creates_cart_then_merges() {
        let f = fixture().await;
        assert!(matches!(f.svc.get_cart(f.user).await, Err(AppError::NotFound(_))));

        f.svc.add_item(f.user, f.book, 2).await.unwrap();
        let view = f.svc.add_item(f.user, f.book, 3).await.unwrap();
        assert_eq!(view.user_id, f.user);
        assert_eq!(view.cart_items.len(), 1);
        assert_eq!(view.cart_items[0].quantity, 5);
        assert_eq!(view.cart_items[0].book_title.as_deref(), Some("Dune"));
    }

    #[tokio::test]
    async fn add_requires_known_user_and_book() {
        let f = fixture().await;
        let res = f.svc.add_item(Uuid::new_v4(), f.book, 1).await;
        assert!(matches!(res, Err(AppError::NotFound(_))));
        let res = f.svc.add_item(f.user, Uuid::new_v4(), 1).await;
        assert!(matches!(res, Err(AppError::NotFound(_))));
        let res = f.svc.add_item(f.user, f.book, 0).await;
        assert!(matches!(res, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn update_validates_before_lookup() {
        let f = fixture().await;
        // Non-positive quantity wins over the missing item.
        let res = f.svc.update_quantity(f.user, Uuid::new_v4(), 0).await;
        assert!(matches!(res, Err(AppError::BadRequest(_))));

        let item = f.svc.add_item(f.user, f.book, 1).await.unwrap().cart_items[0].id;
        let view = f.svc.update_quantity(f.user, item, 7).await.unwrap();
        assert_eq!(view.cart_items[0].quantity, 7);
        let res = f.svc.update_quantity(f.user, item, -2).await;
        assert!(matches!(res, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn foreign_items_look_missing() {
        let f = fixture().await;
        let item = f.svc.add_item(f.user, f.book, 1).await.unwrap().cart_items[0].id;
        let stranger = Uuid::new_v4();

        let res = f.svc.update_quantity(stranger, item, 4).await;
        assert!(matches!(res, Err(AppError::NotFound(_))));
        let res = f.svc.delete_item(stranger, item).await;
        assert!(matches!(res, Err(AppError::NotFound(_))));

        f.svc.delete_item(f.user, item).await.unwrap();
        let res = f.svc.delete_item(f.user, item).await;
        assert!(matches!(res, Err(AppError::NotFound(_))));
        assert!(f.svc.get_cart(f.user).await.unwrap().cart_items.is_empty());
    }

    #[tokio::test]
    async fn clear_creates_or_empties() {
        let f = fixture().await;
        f.svc.clear_cart(f.user).await.unwrap();
        assert!(f.svc.get_cart(f.user).await.unwrap().cart_items.is_empty());

        f.svc.add_item(f.user, f.book, 2).await.unwrap();
        f.svc.clear_cart(f.user).await.unwrap();
        assert!(f.repo.find_cart(f.user).await.unwrap().unwrap().is_empty());
    }

    #[tokio::test]
    async fn removed_book_keeps_line_without_title() {
        let f = fixture().await;
        f.svc.add_item(f.user, f.book, 1).await.unwrap();
        f.repo.delete_book(f.book).await.unwrap();
        let view = f.svc.get_cart(f.user).await.unwrap();
        assert_eq!(view.cart_items[0].book_title, None);
    }

    #[tokio::test]
    async fn concurrent_adds_for_one_user_are_not_lost() {
        let f = fixture().await;
        let svc = Arc::new(f.svc);
        let mut tasks = Vec::new();
        for _ in 0..16 {
            let svc = svc.clone();
            let (user, book) = (f.user, f.book);
            tasks.push(tokio::spawn(async move {
                svc.add_item(user, book, 1).await.unwrap();
            }));
        }
        for t in tasks {
            t.await.unwrap();
        }
        let view = svc.get_cart(f.user).await.unwrap();
        assert_eq!(view.cart_items[0].quantity, 16);
    }
}
