use log::debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::models::symbol::SymbolInfo;
use crate::services::catalog_service::SymbolCatalog;

/// A delayed callback that can be cancelled or rescheduled.
///
/// Scheduling again aborts the pending task first. Dropping the timer cancels
/// it. Must be used from within a Tokio runtime.
#[derive(Debug, Default)]
pub struct DelayTimer {
    handle: Option<JoinHandle<()>>,
}

impl DelayTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule<F>(&mut self, delay: Duration, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();
        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            callback();
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// `true` while a scheduled callback has neither run nor been cancelled.
    pub fn is_pending(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for DelayTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Candidates published for a search term.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResults {
    pub term: String,
    pub matches: Vec<SymbolInfo>,
}

/// Typeahead over the symbol catalog.
///
/// Each keystroke restarts the quiet period; results for a term are only
/// computed once input has been idle for `delay`. A superseded callback that
/// already woke up is ignored through the generation counter.
pub struct DebouncedSearch {
    catalog: Arc<SymbolCatalog>,
    delay: Duration,
    limit: usize,
    timer: DelayTimer,
    generation: Arc<AtomicU64>,
    tx: Arc<watch::Sender<SearchResults>>,
}

impl DebouncedSearch {
    pub fn new(catalog: Arc<SymbolCatalog>, delay: Duration, limit: usize) -> Self {
        let initial = SearchResults {
            term: String::new(),
            matches: catalog.search("", limit),
        };
        let (tx, _) = watch::channel(initial);
        Self {
            catalog,
            delay,
            limit,
            timer: DelayTimer::new(),
            generation: Arc::new(AtomicU64::new(0)),
            tx: Arc::new(tx),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchResults> {
        self.tx.subscribe()
    }

    /// Latest published results.
    pub fn results(&self) -> SearchResults {
        self.tx.borrow().clone()
    }

    pub fn is_pending(&self) -> bool {
        self.timer.is_pending()
    }

    /// Record a keystroke: cancel the pending recompute and schedule a new one.
    ///
    /// Without a Tokio runtime there is no timer to schedule on, so the term
    /// is searched right away.
    pub fn on_input(&mut self, term: impl Into<String>) {
        let term = term.into();
        if tokio::runtime::Handle::try_current().is_err() {
            debug!("No Tokio runtime; searching '{term}' without debounce");
            self.flush(&term);
            return;
        }
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let current = Arc::clone(&self.generation);
        let catalog = Arc::clone(&self.catalog);
        let tx = Arc::clone(&self.tx);
        let limit = self.limit;

        self.timer.schedule(self.delay, move || {
            if current.load(Ordering::SeqCst) != generation {
                return;
            }
            let matches = catalog.search(&term, limit);
            debug!("Search '{term}': {} candidates", matches.len());
            tx.send_replace(SearchResults { term, matches });
        });
    }

    /// Recompute immediately for `term`, dropping any pending keystroke.
    pub fn flush(&mut self, term: &str) -> SearchResults {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.timer.cancel();
        let results = SearchResults {
            term: term.to_string(),
            matches: self.catalog.search(term, self.limit),
        };
        self.tx.send_replace(results.clone());
        results
    }

    /// Cancel pending work and go back to the unfiltered list.
    pub fn reset(&mut self) {
        self.flush("");
    }
}
