use serde::{Deserialize, Serialize};

/// Normalize a ticker the way every entry point expects it: trimmed, uppercased.
pub fn normalize_symbol(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// A tradable symbol from the static catalog (e.g. `AMZN` / "Amazon.com, Inc.").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolInfo {
    /// Ticker symbol, uppercased
    pub symbol: String,

    /// Human-readable company or fund name
    pub name: String,
}

impl SymbolInfo {
    pub fn new(symbol: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            symbol: normalize_symbol(&symbol.into()),
            name: name.into().trim().to_string(),
        }
    }
}
