use async_trait::async_trait;
use uuid::Uuid;

use super::RepoError;
use crate::domain::cart::ShoppingCart;

#[async_trait]
pub trait CartRepository: Send + Sync + 'static {
    /// Persists the cart together with its full item set in one unit; items
    /// missing from `cart.items` are removed from storage.
    async fn save_cart(&self, cart: ShoppingCart) -> Result<ShoppingCart, RepoError>;
    async fn find_cart(&self, user_id: Uuid) -> Result<Option<ShoppingCart>, RepoError>;
    /// The cart owning the given item.
    async fn find_cart_by_item(&self, item_id: Uuid) -> Result<Option<ShoppingCart>, RepoError>;
}
