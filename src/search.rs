// Semantic product search: price pre-filter, then model ranking over what's left.

use std::collections::HashSet;

use crate::error::{CatalogError, Result};
use crate::filter::apply_constraint;
use crate::query_parser;
use crate::relevance::RelevanceOracle;
use crate::storage::Listing;

pub struct SemanticSearch {
    oracle: RelevanceOracle,
    dedupe_results: bool,
}

impl SemanticSearch {
    pub fn new(oracle: RelevanceOracle, dedupe_results: bool) -> Self {
        Self {
            oracle,
            dedupe_results,
        }
    }

    /// Products from `products` matching `query`, in the order the model ranked them.
    ///
    /// The model is not called when the price constraint leaves no candidates.
    /// Fails with `SearchFailed` if the model can't be reached; never returns partial results.
    pub async fn search<T>(&self, query: &str, products: &[T]) -> Result<Vec<T>>
    where
        T: Listing + Clone + Send + Sync,
    {
        let parsed = query_parser::parse(query);
        let candidates = apply_constraint(parsed.constraint, products);

        tracing::debug!(
            constraint = ?parsed.constraint,
            total = products.len(),
            candidates = candidates.len(),
            "price pre-filter applied"
        );

        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let indexes = self
            .oracle
            .rank(&parsed.query, &candidates)
            .await
            .map_err(|e| CatalogError::SearchFailed(Box::new(e)))?;

        Ok(self.select(&candidates, &indexes))
    }

    // Indexes are relative to `candidates`, never to the unfiltered list.
    fn select<T: Clone>(&self, candidates: &[T], indexes: &[usize]) -> Vec<T> {
        let mut seen = HashSet::new();
        indexes
            .iter()
            .filter(|&&index| !self.dedupe_results || seen.insert(index))
            .filter_map(|&index| candidates.get(index).cloned())
            .collect()
    }
}
