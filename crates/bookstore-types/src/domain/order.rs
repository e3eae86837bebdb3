use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::book::Book;
use super::error::ensure;
use super::ValidationError;

const MIN_ADDRESS_LEN: usize = 5;
const MAX_ADDRESS_LEN: usize = 255;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Processing,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Pending -> {Processing, Cancelled} -> Completed, with Processing also
    /// allowed to cancel. Re-setting the current status is a no-op.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        self == next
            || matches!(
                (self, next),
                (Pending, Processing)
                    | (Pending, Cancelled)
                    | (Processing, Completed)
                    | (Processing, Cancelled)
            )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Processing => "Processing",
            OrderStatus::Completed => "Completed",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(OrderStatus::Pending),
            "Processing" => Some(OrderStatus::Processing),
            "Completed" => Some(OrderStatus::Completed),
            "Cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }
}

/// An order line. Title and unit price are copied from the book when the
/// order is placed and never follow later edits of the book.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderItem {
    pub id: Uuid,
    pub book_id: Uuid,
    pub book_title: String,
    pub quantity: u32,
    pub price: Decimal,
}

impl OrderItem {
    pub fn snapshot(book: &Book, quantity: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            book_id: book.id,
            book_title: book.title.clone(),
            quantity,
            price: book.price,
        }
    }

    /// `None` when the line total does not fit in a `Decimal`.
    pub fn line_total(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.quantity))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: OrderStatus,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
    pub shipping_address: String,
    pub items: Vec<OrderItem>,
}

impl Order {
    pub fn new(
        user_id: Uuid,
        shipping_address: String,
        items: Vec<OrderItem>,
    ) -> Result<Self, ValidationError> {
        let shipping_address = shipping_address.trim().to_string();
        let len = shipping_address.chars().count();
        ensure!(
            (MIN_ADDRESS_LEN..=MAX_ADDRESS_LEN).contains(&len),
            "shipping address must be between {MIN_ADDRESS_LEN} and {MAX_ADDRESS_LEN} characters"
        );
        ensure!(!items.is_empty(), "cannot place an order for an empty cart");
        for it in &items {
            ensure!(it.quantity > 0, "item quantity must be > 0");
            ensure!(it.price >= Decimal::ZERO, "item price must not be negative");
        }
        let total = items
            .iter()
            .try_fold(Decimal::ZERO, |acc, it| acc.checked_add(it.line_total()?))
            .ok_or_else(|| ValidationError::new("order total too large"))?;
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            status: OrderStatus::Pending,
            total,
            created_at: Utc::now(),
            shipping_address,
            items,
        })
    }

    pub fn item(&self, item_id: Uuid) -> Option<&OrderItem> {
        self.items.iter().find(|it| it.id == item_id)
    }

    pub fn update_status(&mut self, status: OrderStatus) -> Result<(), ValidationError> {
        ensure!(
            self.status.can_transition_to(status),
            "cannot move order from {} to {}",
            self.status.as_str(),
            status.as_str()
        );
        self.status = status;
        Ok(())
    }
}
