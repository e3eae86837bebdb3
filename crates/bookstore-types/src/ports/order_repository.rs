use async_trait::async_trait;
use uuid::Uuid;

use super::RepoError;
use crate::domain::order::{Order, OrderStatus};
use crate::domain::page::{Page, PageRequest};

#[async_trait]
pub trait OrderRepository: Send + Sync + 'static {
    /// Stores the order with its items and empties the cart `cart_id`, both
    /// or neither.
    async fn place_order(&self, order: Order, cart_id: Uuid) -> Result<Order, RepoError>;
    async fn find_order(&self, id: Uuid) -> Result<Option<Order>, RepoError>;
    /// Newest first.
    async fn find_orders_by_user(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<Order>, RepoError>;
    /// Sets the status only while it is still `expected`. A status that
    /// changed in between is a `Conflict`; a missing order is `Ok(None)`.
    async fn update_order_status(
        &self,
        id: Uuid,
        expected: OrderStatus,
        status: OrderStatus,
    ) -> Result<Option<Order>, RepoError>;
    /// Removes the order and its items.
    async fn delete_order(&self, id: Uuid) -> Result<bool, RepoError>;
}
