use std::collections::HashMap;

use super::predicate::{BookField, BookPredicate};
use super::SearchError;

/// One filterable attribute of a book.
pub trait SpecificationProvider {
    /// Stable filter name as it appears in a search request.
    fn key(&self) -> &'static str;

    /// Predicate matching any of `values`. Callers never pass an empty slice.
    fn specification(&self, values: &[String]) -> BookPredicate;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookFilter {
    Author,
    Title,
}

impl BookFilter {
    pub const ALL: [BookFilter; 2] = [BookFilter::Author, BookFilter::Title];

    fn field(self) -> BookField {
        match self {
            BookFilter::Author => BookField::Author,
            BookFilter::Title => BookField::Title,
        }
    }
}

impl SpecificationProvider for BookFilter {
    fn key(&self) -> &'static str {
        match self {
            BookFilter::Author => "author",
            BookFilter::Title => "title",
        }
    }

    fn specification(&self, values: &[String]) -> BookPredicate {
        let field = self.field();
        BookPredicate::AnyOf(
            values
                .iter()
                .map(|v| BookPredicate::contains(field, v))
                .collect(),
        )
    }
}

/// Filter key to provider lookup. Populated once while building and
/// read-only afterwards.
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    providers: HashMap<&'static str, BookFilter>,
}

impl ProviderRegistry {
    pub fn empty() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    pub fn register(mut self, provider: BookFilter) -> Self {
        self.providers.insert(provider.key(), provider);
        self
    }

    pub fn get(&self, key: &str) -> Result<BookFilter, SearchError> {
        self.providers
            .get(key)
            .copied()
            .ok_or_else(|| SearchError::ProviderNotFound(key.to_string()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.providers.keys().copied()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        BookFilter::ALL
            .into_iter()
            .fold(Self::empty(), ProviderRegistry::register)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_knows_author_and_title() {
        let registry = ProviderRegistry::default();
        assert_eq!(registry.get("author"), Ok(BookFilter::Author));
        assert_eq!(registry.get("title"), Ok(BookFilter::Title));
        assert_eq!(registry.keys().count(), 2);
    }

    #[test]
    fn unknown_key_fails() {
        let registry = ProviderRegistry::default();
        assert_eq!(
            registry.get("isbn"),
            Err(SearchError::ProviderNotFound("isbn".into()))
        );
        assert!(ProviderRegistry::empty().get("author").is_err());
    }

    #[test]
    fn specification_is_disjunction_over_values() {
        let p = BookFilter::Author.specification(&["King".into(), "tolkien".into()]);
        assert_eq!(
            p,
            BookPredicate::AnyOf(vec![
                BookPredicate::contains(BookField::Author, "king"),
                BookPredicate::contains(BookField::Author, "tolkien"),
            ])
        );
    }
}
