use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::predicate::BookPredicate;
use super::provider::{ProviderRegistry, SpecificationProvider};
use super::SearchError;

/// Filter key to the values requested for it, e.g. `author -> [king, tolkien]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookSearchParameters {
    pub filters: BTreeMap<String, Vec<String>>,
}

impl BookSearchParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, values: &[&str]) -> Self {
        for v in values {
            self.push(key, v);
        }
        self
    }

    /// Appends one value, splitting on commas. Blank pieces are dropped, but
    /// the key is still recorded so that unknown keys are reported.
    pub fn push(&mut self, key: &str, raw: &str) {
        let values = self.filters.entry(key.to_string()).or_default();
        values.extend(
            raw.split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string),
        );
    }
}

#[derive(Debug, Clone, Default)]
pub struct BookSpecificationBuilder {
    registry: ProviderRegistry,
}

impl BookSpecificationBuilder {
    pub fn new(registry: ProviderRegistry) -> Self {
        Self { registry }
    }

    pub fn build(&self, params: &BookSearchParameters) -> Result<BookPredicate, SearchError> {
        let mut spec = BookPredicate::Always;
        for (key, values) in &params.filters {
            let provider = self.registry.get(key)?;
            if values.is_empty() {
                continue;
            }
            spec = spec.and(provider.specification(values));
        }
        Ok(spec)
    }
}
