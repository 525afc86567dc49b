use log::debug;
use tokio::sync::watch;

use crate::models::selection::{
    PortfolioEntry, PortfolioSelection, SelectionSnapshot, WeightInput,
};
use crate::models::symbol::normalize_symbol;

/// Holds the portfolio being viewed; the single source of truth for every view.
///
/// Mutations are synchronous. Each published change replaces the snapshot in
/// a `watch` channel, so subscribers always observe the latest selection and
/// never a partially applied one. Mutators return `true` when they published.
pub struct PortfolioSelectionStore {
    max_entries: usize,
    tx: watch::Sender<SelectionSnapshot>,
}

impl PortfolioSelectionStore {
    pub fn new(max_entries: usize) -> Self {
        let (tx, _) = watch::channel(SelectionSnapshot::default());
        Self { max_entries, tx }
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Subscribe to snapshots. The receiver starts at the current one.
    pub fn subscribe(&self) -> watch::Receiver<SelectionSnapshot> {
        self.tx.subscribe()
    }

    /// The live selection.
    pub fn current_selection(&self) -> PortfolioSelection {
        self.tx.borrow().selection.clone()
    }

    pub fn snapshot(&self) -> SelectionSnapshot {
        self.tx.borrow().clone()
    }

    pub fn revision(&self) -> u64 {
        self.tx.borrow().revision
    }

    /// Append `symbol` with weight 1.
    ///
    /// No-op when the symbol is blank, already present, or the cap is reached.
    pub fn add(&mut self, symbol: &str) -> bool {
        let symbol = normalize_symbol(symbol);
        if symbol.is_empty() {
            return false;
        }
        let max = self.max_entries;
        self.publish_if(|selection| {
            if selection.len() >= max || selection.contains(&symbol) {
                return false;
            }
            selection.entries.push(PortfolioEntry::new(&symbol));
            true
        })
    }

    /// Remove `symbol` if present.
    pub fn remove(&mut self, symbol: &str) -> bool {
        let symbol = normalize_symbol(symbol);
        self.publish_if(|selection| match selection.position(&symbol) {
            Some(idx) => {
                selection.entries.remove(idx);
                true
            }
            None => false,
        })
    }

    /// Store the raw weight as typed. No validation; see [`WeightInput::coerce`].
    pub fn set_weight(&mut self, symbol: &str, raw: impl Into<WeightInput>) -> bool {
        let symbol = normalize_symbol(symbol);
        let raw = raw.into();
        self.publish_if(|selection| match selection.position(&symbol) {
            Some(idx) if !selection.entries[idx].weight.same_as(&raw) => {
                selection.entries[idx].weight = raw;
                true
            }
            _ => false,
        })
    }

    /// Empty the selection and publish, even if it was already empty.
    ///
    /// Subscribers see the empty snapshot before this returns.
    pub fn clear(&mut self) {
        self.tx.send_modify(|snap| {
            snap.selection.entries.clear();
            snap.revision += 1;
        });
        debug!("Selection cleared (revision {})", self.revision());
    }

    /// Replace the selection with `symbols`, in order.
    ///
    /// Symbols already selected keep their weight; new ones get weight 1.
    /// Blank and repeated symbols are skipped, and the list is cut at the cap.
    pub fn replace_symbols<S: AsRef<str>>(&mut self, symbols: &[S]) -> bool {
        let max = self.max_entries;
        let symbols: Vec<String> = symbols.iter().map(|s| normalize_symbol(s.as_ref())).collect();
        self.publish_if(|selection| {
            let mut next = PortfolioSelection::new();
            for symbol in symbols.iter().filter(|s| !s.is_empty()) {
                if next.len() >= max {
                    break;
                }
                if next.contains(symbol) {
                    continue;
                }
                let entry = selection
                    .get(symbol)
                    .cloned()
                    .unwrap_or_else(|| PortfolioEntry::new(symbol));
                next.entries.push(entry);
            }
            if next.same_as(selection) {
                return false;
            }
            *selection = next;
            true
        })
    }

    fn publish_if(&mut self, modify: impl FnOnce(&mut PortfolioSelection) -> bool) -> bool {
        let changed = self.tx.send_if_modified(|snap| {
            let changed = modify(&mut snap.selection);
            if changed {
                snap.revision += 1;
            }
            changed
        });
        if changed {
            debug!(
                "Selection changed (revision {}): {:?}",
                self.revision(),
                self.tx.borrow().selection.symbols()
            );
        }
        changed
    }
}

impl Default for PortfolioSelectionStore {
    fn default() -> Self {
        Self::new(10)
    }
}
