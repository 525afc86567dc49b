use serde::{Deserialize, Serialize};

use super::symbol::normalize_symbol;

/// Default weight given to a freshly added symbol.
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// The raw weight as the user typed it.
///
/// Kept unvalidated so an input field can hold `""` or `"1."` mid-edit.
/// Consumers read it through [`WeightInput::coerce`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WeightInput {
    Number(f64),
    Text(String),
}

impl WeightInput {
    /// Numeric value used downstream. Empty, non-numeric and non-finite input is 0.
    pub fn coerce(&self) -> f64 {
        let value = match self {
            WeightInput::Number(n) => *n,
            WeightInput::Text(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        };
        if value.is_finite() {
            value
        } else {
            0.0
        }
    }

    /// Equality that treats two NaN numbers as the same input.
    pub fn same_as(&self, other: &WeightInput) -> bool {
        match (self, other) {
            (WeightInput::Number(a), WeightInput::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            _ => self == other,
        }
    }
}

impl Default for WeightInput {
    fn default() -> Self {
        WeightInput::Number(DEFAULT_WEIGHT)
    }
}

impl From<f64> for WeightInput {
    fn from(n: f64) -> Self {
        WeightInput::Number(n)
    }
}

impl From<&str> for WeightInput {
    fn from(s: &str) -> Self {
        WeightInput::Text(s.to_string())
    }
}

impl From<String> for WeightInput {
    fn from(s: String) -> Self {
        WeightInput::Text(s)
    }
}

/// One row of the portfolio being viewed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioEntry {
    pub symbol: String,
    pub weight: WeightInput,
}

impl PortfolioEntry {
    pub fn new(symbol: &str) -> Self {
        Self {
            symbol: normalize_symbol(symbol),
            weight: WeightInput::default(),
        }
    }

    pub fn with_weight(symbol: &str, weight: impl Into<WeightInput>) -> Self {
        Self {
            symbol: normalize_symbol(symbol),
            weight: weight.into(),
        }
    }

    /// Coerced weight, see [`WeightInput::coerce`].
    pub fn weight_value(&self) -> f64 {
        self.weight.coerce()
    }
}

/// Ordered set of entries; symbols are unique.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSelection {
    pub entries: Vec<PortfolioEntry>,
}

impl PortfolioSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.position(symbol).is_some()
    }

    pub fn get(&self, symbol: &str) -> Option<&PortfolioEntry> {
        self.position(symbol).map(|idx| &self.entries[idx])
    }

    pub fn position(&self, symbol: &str) -> Option<usize> {
        let upper = normalize_symbol(symbol);
        self.entries.iter().position(|e| e.symbol == upper)
    }

    pub fn symbols(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.symbol.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PortfolioEntry> {
        self.entries.iter()
    }

    /// Same symbols in the same order with the same raw weights.
    pub fn same_as(&self, other: &PortfolioSelection) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .zip(other.iter())
                .all(|(a, b)| a.symbol == b.symbol && a.weight.same_as(&b.weight))
    }
}

/// What subscribers of the selection store receive.
///
/// `revision` increases with every published change, including a clear of an
/// already empty selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionSnapshot {
    pub revision: u64,
    pub selection: PortfolioSelection,
}
