use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ensure;
use super::ValidationError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CartItem {
    pub id: Uuid,
    pub book_id: Uuid,
    pub quantity: u32,
}

/// One cart per user; the cart is identified by its owner's id and owns its
/// items outright. Saving the cart saves every item with it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShoppingCart {
    pub user_id: Uuid,
    pub items: Vec<CartItem>,
    #[serde(skip)]
    pub deleted: bool,
}

/// A cart quantity must be strictly positive and fit in a `u32`.
pub fn validate_quantity(quantity: i64) -> Result<u32, ValidationError> {
    ensure!(quantity > 0, "quantity must be positive, got {quantity}");
    u32::try_from(quantity).map_err(|_| ValidationError::new("quantity too large"))
}

impl ShoppingCart {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            items: Vec::new(),
            deleted: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.user_id
    }

    pub fn item(&self, item_id: Uuid) -> Option<&CartItem> {
        self.items.iter().find(|it| it.id == item_id)
    }

    pub fn contains_item(&self, item_id: Uuid) -> bool {
        self.item(item_id).is_some()
    }

    /// Adds `quantity` copies of a book. A second add for the same book
    /// accumulates into the existing line instead of creating another one.
    pub fn add_item(&mut self, book_id: Uuid, quantity: i64) -> Result<&CartItem, ValidationError> {
        let quantity = validate_quantity(quantity)?;
        let idx = match self.items.iter().position(|it| it.book_id == book_id) {
            Some(idx) => {
                let line = &mut self.items[idx];
                line.quantity = line
                    .quantity
                    .checked_add(quantity)
                    .ok_or_else(|| ValidationError::new("quantity too large"))?;
                idx
            }
            None => {
                self.items.push(CartItem {
                    id: Uuid::new_v4(),
                    book_id,
                    quantity,
                });
                self.items.len() - 1
            }
        };
        Ok(&self.items[idx])
    }

    /// Sets an absolute quantity. `Ok(false)` when the item is not in this cart.
    pub fn update_quantity(&mut self, item_id: Uuid, quantity: i64) -> Result<bool, ValidationError> {
        let quantity = validate_quantity(quantity)?;
        match self.items.iter_mut().find(|it| it.id == item_id) {
            Some(line) => {
                line.quantity = quantity;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn remove_item(&mut self, item_id: Uuid) -> Option<CartItem> {
        let idx = self.items.iter().position(|it| it.id == item_id)?;
        Some(self.items.remove(idx))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Read projection of a cart with book titles resolved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CartView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub cart_items: Vec<CartItemView>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CartItemView {
    pub id: Uuid,
    pub book_id: Uuid,
    /// `None` once the book has been removed from the catalogue.
    pub book_title: Option<String>,
    pub quantity: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adding_same_book_merges_quantities() {
        let mut cart = ShoppingCart::new(Uuid::new_v4());
        let book = Uuid::new_v4();
        let first = cart.add_item(book, 2).unwrap().id;
        let second = cart.add_item(book, 3).unwrap().id;
        assert_eq!(first, second);
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 5);

        cart.add_item(Uuid::new_v4(), 1).unwrap();
        assert_eq!(cart.items.len(), 2);
    }

    #[test]
    fn non_positive_quantities_rejected() {
        let mut cart = ShoppingCart::new(Uuid::new_v4());
        assert!(cart.add_item(Uuid::new_v4(), 0).is_err());
        assert!(cart.add_item(Uuid::new_v4(), -4).is_err());
        assert!(cart.is_empty());

        let id = cart.add_item(Uuid::new_v4(), 3).unwrap().id;
        assert!(cart.update_quantity(id, 0).is_err());
        assert!(cart.update_quantity(id, -1).is_err());
        assert_eq!(cart.item(id).unwrap().quantity, 3);
    }

    #[test]
    fn merge_overflow_rejected() {
        let mut cart = ShoppingCart::new(Uuid::new_v4());
        let book = Uuid::new_v4();
        cart.add_item(book, i64::from(u32::MAX)).unwrap();
        assert!(cart.add_item(book, 1).is_err());
        assert_eq!(cart.items[0].quantity, u32::MAX);
    }

    #[test]
    fn update_replaces_and_reports_missing() {
        let mut cart = ShoppingCart::new(Uuid::new_v4());
        let id = cart.add_item(Uuid::new_v4(), 3).unwrap().id;
        assert!(cart.update_quantity(id, 7).unwrap());
        assert_eq!(cart.item(id).unwrap().quantity, 7);
        assert!(!cart.update_quantity(Uuid::new_v4(), 1).unwrap());
    }

    #[test]
    fn remove_and_clear() {
        let mut cart = ShoppingCart::new(Uuid::new_v4());
        let id = cart.add_item(Uuid::new_v4(), 1).unwrap().id;
        cart.add_item(Uuid::new_v4(), 1).unwrap();
        assert!(cart.remove_item(id).is_some());
        assert!(cart.remove_item(id).is_none());
        cart.clear();
        assert!(cart.is_empty());
    }
}
