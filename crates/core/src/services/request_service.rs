use std::collections::HashSet;

use crate::models::request::PortfolioRequest;
use crate::models::selection::{PortfolioSelection, DEFAULT_WEIGHT};
use crate::models::symbol::normalize_symbol;

/// Turns a selection into the body sent to the backend.
///
/// Pure business logic, no I/O. The result is always well-formed, even for
/// the transitional states of an edit in progress:
/// - weights are coerced (blank or non-numeric → 0)
/// - the benchmark appears exactly once; when not selected it is appended last
///   with weight 1, when selected its user weight is kept
/// - an empty selection yields `{ [benchmark], [1] }`
#[derive(Debug, Clone)]
pub struct PortfolioRequestBuilder {
    benchmark: String,
}

impl PortfolioRequestBuilder {
    pub fn new(benchmark: &str) -> Self {
        Self {
            benchmark: normalize_symbol(benchmark),
        }
    }

    pub fn benchmark(&self) -> &str {
        &self.benchmark
    }

    pub fn build_request(&self, selection: &PortfolioSelection) -> PortfolioRequest {
        let mut seen = HashSet::with_capacity(selection.len() + 1);
        let mut symbols = Vec::with_capacity(selection.len() + 1);
        let mut weights = Vec::with_capacity(selection.len() + 1);

        for entry in selection.iter() {
            if !seen.insert(entry.symbol.as_str()) {
                continue;
            }
            symbols.push(entry.symbol.clone());
            weights.push(entry.weight_value());
        }

        if !seen.contains(self.benchmark.as_str()) {
            symbols.push(self.benchmark.clone());
            weights.push(DEFAULT_WEIGHT);
        }

        PortfolioRequest { symbols, weights }
    }
}
