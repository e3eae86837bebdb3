//! Book search: filter predicates, the provider registry that maps filter
//! keys to them, and the builder that conjoins a request's filters.

mod builder;
mod predicate;
mod provider;

pub use builder::{BookSearchParameters, BookSpecificationBuilder};
pub use predicate::{BookField, BookPredicate};
pub use provider::{BookFilter, ProviderRegistry, SpecificationProvider};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("can't find specification provider for key: {0}")]
    ProviderNotFound(String),
}
