use std::collections::HashSet;

use crate::errors::CoreError;
use crate::models::symbol::{normalize_symbol, SymbolInfo};

/// Static, in-memory list of tradable symbols, loaded once per session.
///
/// Search is local; no network round-trip per keystroke.
#[derive(Debug, Clone, Default)]
pub struct SymbolCatalog {
    entries: Vec<SymbolInfo>,
}

impl SymbolCatalog {
    /// Build a catalog, dropping unusable rows.
    ///
    /// Rows with a blank symbol or name, or whose name carries a "Note"
    /// annotation, are skipped. The first occurrence of a symbol wins.
    pub fn from_entries(entries: impl IntoIterator<Item = SymbolInfo>) -> Self {
        let mut seen = HashSet::new();
        let entries = entries
            .into_iter()
            .map(|e| SymbolInfo::new(e.symbol, e.name))
            .filter(|e| !e.symbol.is_empty() && !e.name.is_empty() && !e.name.contains("Note"))
            .filter(|e| seen.insert(e.symbol.clone()))
            .collect();
        Self { entries }
    }

    /// Parse the static `[{ "symbol": ..., "name": ... }]` asset.
    pub fn from_json_str(json: &str) -> Result<Self, CoreError> {
        let entries: Vec<SymbolInfo> = serde_json::from_str(json)
            .map_err(|e| CoreError::Catalog(format!("Failed to parse symbol catalog: {e}")))?;
        Ok(Self::from_entries(entries))
    }

    /// Load the catalog file from disk (native only, not WASM).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Self, CoreError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[SymbolInfo] {
        &self.entries
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.get(symbol).is_some()
    }

    pub fn get(&self, symbol: &str) -> Option<&SymbolInfo> {
        let upper = normalize_symbol(symbol);
        self.entries.iter().find(|e| e.symbol == upper)
    }

    /// Candidates for a typeahead term, best matches first.
    ///
    /// Ranking: symbol prefix, then symbol substring, then name substring
    /// (case-insensitive). Catalog order is kept within each rank. An empty
    /// term matches everything.
    pub fn search(&self, term: &str, limit: usize) -> Vec<SymbolInfo> {
        let upper = normalize_symbol(term);
        if upper.is_empty() {
            return self.entries.iter().take(limit).cloned().collect();
        }
        let lower = upper.to_lowercase();

        let mut ranked: Vec<(u8, &SymbolInfo)> = self
            .entries
            .iter()
            .filter_map(|e| {
                if e.symbol.starts_with(&upper) {
                    Some((0, e))
                } else if e.symbol.contains(&upper) {
                    Some((1, e))
                } else if e.name.to_lowercase().contains(&lower) {
                    Some((2, e))
                } else {
                    None
                }
            })
            .collect();
        // stable: catalog order survives within a rank
        ranked.sort_by_key(|(rank, _)| *rank);

        ranked
            .into_iter()
            .take(limit)
            .map(|(_, e)| e.clone())
            .collect()
    }
}
