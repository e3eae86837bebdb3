use std::sync::Arc;

use crate::application::CartLocks;
use crate::errors::AppError;
use bookstore_types::domain::order::{Order, OrderItem, OrderStatus};
use bookstore_types::domain::page::{Page, PageRequest};
use bookstore_types::ports::book_repository::BookRepository;
use bookstore_types::ports::cart_repository::CartRepository;
use bookstore_types::ports::order_repository::OrderRepository;
use uuid::Uuid;

pub struct OrderService<R: BookRepository + CartRepository + OrderRepository> {
    repo: Arc<R>,
    locks: Arc<CartLocks>,
}

impl<R: BookRepository + CartRepository + OrderRepository> OrderService<R> {
    pub fn new(repo: Arc<R>, locks: Arc<CartLocks>) -> Self {
        Self { repo, locks }
    }

    /// Checks out the caller's cart. Every line is priced from the book as
    /// it is now; the order and the emptied cart are stored together.
    pub async fn create_order(
        &self,
        user_id: Uuid,
        shipping_address: String,
    ) -> Result<Order, AppError> {
        let _guard = self.locks.lock(user_id).await;

        let cart = self
            .repo
            .find_cart(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("shopping cart for user", user_id))?;

        let mut items = Vec::with_capacity(cart.items.len());
        for line in &cart.items {
            let book = self
                .repo
                .find_book(line.book_id)
                .await?
                .ok_or_else(|| AppError::not_found("book", line.book_id))?;
            items.push(OrderItem::snapshot(&book, line.quantity));
        }

        let order = Order::new(user_id, shipping_address, items)?;
        let order = self.repo.place_order(order, cart.id()).await?;
        tracing::info!(order_id = %order.id, %user_id, total = %order.total, "order placed");
        Ok(order)
    }

    pub async fn get_orders(&self, user_id: Uuid, page: PageRequest) -> Result<Page<Order>, AppError> {
        Ok(self.repo.find_orders_by_user(user_id, page).await?)
    }

    pub async fn get_order_by_id(&self, id: Uuid) -> Result<Order, AppError> {
        self.repo
            .find_order(id)
            .await?
            .ok_or_else(|| AppError::not_found("order", id))
    }

    pub async fn get_items_for_user(
        &self,
        user_id: Uuid,
        order_id: Uuid,
    ) -> Result<Vec<OrderItem>, AppError> {
        Ok(self.owned_order(user_id, order_id).await?.items)
    }

    pub async fn get_item(
        &self,
        user_id: Uuid,
        order_id: Uuid,
        item_id: Uuid,
    ) -> Result<OrderItem, AppError> {
        self.owned_order(user_id, order_id)
            .await?
            .item(item_id)
            .cloned()
            .ok_or_else(|| AppError::not_found("order item", item_id))
    }

    pub async fn get_items_for_admin(&self, order_id: Uuid) -> Result<Vec<OrderItem>, AppError> {
        Ok(self.get_order_by_id(order_id).await?.items)
    }

    /// Moves an order along its lifecycle. The total is left untouched.
    /// The write only lands if the status is still the one the move was
    /// checked against; otherwise the caller gets a `Conflict`.
    pub async fn update_order_status(&self, id: Uuid, status: OrderStatus) -> Result<Order, AppError> {
        let mut order = self.get_order_by_id(id).await?;
        let expected = order.status;
        order.update_status(status)?;
        let updated = self
            .repo
            .update_order_status(id, expected, status)
            .await?
            .ok_or_else(|| AppError::not_found("order", id))?;
        tracing::info!(order_id = %id, status = status.as_str(), "order status updated");
        Ok(updated)
    }

    pub async fn delete_order(&self, id: Uuid) -> Result<(), AppError> {
        if self.repo.delete_order(id).await? {
            tracing::info!(order_id = %id, "order deleted");
            Ok(())
        } else {
            Err(AppError::not_found("order", id))
        }
    }

    // Another user's order is indistinguishable from a missing one.
    async fn owned_order(&self, user_id: Uuid, order_id: Uuid) -> Result<Order, AppError> {
        match self.repo.find_order(order_id).await? {
            Some(order) if order.user_id == user_id => Ok(order),
            _ => Err(AppError::not_found("order", order_id)),
        }
    }
}
