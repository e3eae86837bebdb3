use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{ensure, optional_text, required_text};
use super::ValidationError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub price: Decimal,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    pub category_ids: BTreeSet<Uuid>,
    #[serde(skip)]
    pub deleted: bool,
}

/// Payload for creating a book or replacing one in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub price: Decimal,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub category_ids: BTreeSet<Uuid>,
}

impl NewBook {
    fn validate(self) -> Result<Self, ValidationError> {
        ensure!(self.price >= Decimal::ZERO, "price must not be negative");
        Ok(Self {
            title: required_text("title", self.title)?,
            author: required_text("author", self.author)?,
            isbn: required_text("isbn", self.isbn)?,
            price: self.price,
            description: optional_text("description", self.description)?,
            cover_image: optional_text("cover_image", self.cover_image)?,
            category_ids: self.category_ids,
        })
    }
}

impl Book {
    pub fn new(input: NewBook) -> Result<Self, ValidationError> {
        let input = input.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            title: input.title,
            author: input.author,
            isbn: input.isbn,
            price: input.price,
            description: input.description,
            cover_image: input.cover_image,
            category_ids: input.category_ids,
            deleted: false,
        })
    }

    /// Overwrites every mutable field. Identity and the delete flag are kept.
    pub fn apply(&mut self, input: NewBook) -> Result<(), ValidationError> {
        let input = input.validate()?;
        self.title = input.title;
        self.author = input.author;
        self.isbn = input.isbn;
        self.price = input.price;
        self.description = input.description;
        self.cover_image = input.cover_image;
        self.category_ids = input.category_ids;
        Ok(())
    }
}
