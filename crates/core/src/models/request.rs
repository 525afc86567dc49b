use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of the "custom portfolio" POST: `{ "symbols": [...], "shares": [...] }`.
///
/// `symbols` and `weights` always have the same length and order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioRequest {
    pub symbols: Vec<String>,

    #[serde(rename = "shares")]
    pub weights: Vec<f64>,
}

impl PortfolioRequest {
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.iter().any(|s| s == symbol)
    }

    pub fn weight_of(&self, symbol: &str) -> Option<f64> {
        self.symbols
            .iter()
            .position(|s| s == symbol)
            .and_then(|idx| self.weights.get(idx).copied())
    }

    /// `(symbol, weight)` pairs in request order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, f64)> {
        self.symbols
            .iter()
            .map(String::as_str)
            .zip(self.weights.iter().copied())
    }
}

/// Identity of one issued request.
///
/// Views compare these, never response contents, to decide whether a
/// completion is still current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
