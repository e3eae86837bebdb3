use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::book::Book;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BookField {
    Title,
    Author,
}

impl BookField {
    pub fn value(self, book: &Book) -> &str {
        match self {
            BookField::Title => &book.title,
            BookField::Author => &book.author,
        }
    }
}

/// A boolean test over a book, kept as data so that every store can
/// evaluate it: in memory through [`BookPredicate::matches`], or translated
/// into a query by a database adapter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum BookPredicate {
    Always,
    /// Case-insensitive substring match. `needle` is stored lowercased.
    FieldContains { field: BookField, needle: String },
    /// Empty disjunction matches nothing.
    AnyOf(Vec<BookPredicate>),
    /// Empty conjunction matches everything.
    AllOf(Vec<BookPredicate>),
    InCategory(Uuid),
}

impl BookPredicate {
    pub fn contains(field: BookField, needle: &str) -> Self {
        BookPredicate::FieldContains {
            field,
            needle: needle.to_lowercase(),
        }
    }

    /// Conjoins, flattening nested `AllOf` and dropping `Always`.
    pub fn and(self, other: BookPredicate) -> Self {
        match (self, other) {
            (BookPredicate::Always, p) | (p, BookPredicate::Always) => p,
            (BookPredicate::AllOf(mut a), BookPredicate::AllOf(b)) => {
                a.extend(b);
                BookPredicate::AllOf(a)
            }
            (BookPredicate::AllOf(mut a), p) => {
                a.push(p);
                BookPredicate::AllOf(a)
            }
            (p, BookPredicate::AllOf(mut b)) => {
                b.insert(0, p);
                BookPredicate::AllOf(b)
            }
            (a, b) => BookPredicate::AllOf(vec![a, b]),
        }
    }

    pub fn matches(&self, book: &Book) -> bool {
        match self {
            BookPredicate::Always => true,
            BookPredicate::FieldContains { field, needle } => {
                field.value(book).to_lowercase().contains(needle.as_str())
            }
            BookPredicate::AnyOf(ps) => ps.iter().any(|p| p.matches(book)),
            BookPredicate::AllOf(ps) => ps.iter().all(|p| p.matches(book)),
            BookPredicate::InCategory(id) => book.category_ids.contains(id),
        }
    }
}
