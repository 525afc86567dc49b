pub mod errors;
pub mod gateway;
pub mod models;
pub mod services;

use log::{info, warn};
use std::sync::Arc;
use tokio::sync::watch;

use errors::CoreError;
use gateway::traits::PortfolioBackend;
use models::{
    chart::{LineChartData, StockRow, StockSortOrder},
    request::PortfolioRequest,
    selection::{PortfolioSelection, SelectionSnapshot, WeightInput},
    series::PortfolioViewResponse,
    settings::Settings,
    symbol::{normalize_symbol, SymbolInfo},
    view::{ViewKind, ViewState},
};
use services::{
    catalog_service::SymbolCatalog,
    request_service::PortfolioRequestBuilder,
    search_service::{DebouncedSearch, SearchResults},
    selection_service::PortfolioSelectionStore,
    series_service::{sort_stock_rows, SeriesTransformer},
    view_service::{PendingFetch, ViewBinder},
};

/// Main entry point for the portfolio dashboard core.
///
/// Owns one session ("page view"): the selection store, the three views bound
/// to it, the symbol catalog and the backend. All state lives in memory and is
/// gone with the session.
///
/// Every selection mutation synchronously updates the views' states and queues
/// at most one fetch per view. Queued fetches run on [`Dashboard::refresh`], or
/// can be taken with [`Dashboard::take_pending`] and completed later in any
/// order through [`Dashboard::complete`].
#[must_use]
pub struct Dashboard {
    settings: Settings,
    catalog: Arc<SymbolCatalog>,
    store: PortfolioSelectionStore,
    views: [ViewBinder; 3],
    backend: Arc<dyn PortfolioBackend>,
    pending: Vec<PendingFetch>,
    search: DebouncedSearch,
    builder: PortfolioRequestBuilder,
    transformer: SeriesTransformer,
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("backend", &self.backend.name())
            .field("catalog", &self.catalog.len())
            .field("selection", &self.store.current_selection().symbols())
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl Dashboard {
    /// Start a session against any backend.
    ///
    /// The views start `Empty`; trend and performance queue a benchmark
    /// baseline fetch.
    pub fn new(
        settings: Settings,
        catalog: SymbolCatalog,
        backend: Arc<dyn PortfolioBackend>,
    ) -> Result<Self, CoreError> {
        settings.validate()?;
        let catalog = Arc::new(catalog);
        let store = PortfolioSelectionStore::new(settings.max_selection);
        let views = ViewKind::ALL.map(|kind| ViewBinder::new(kind, store.subscribe(), &settings));
        let search = DebouncedSearch::new(
            Arc::clone(&catalog),
            settings.search_debounce(),
            settings.search_limit,
        );
        info!(
            "Dashboard session started: {} symbols in catalog, benchmark {}, backend {}",
            catalog.len(),
            settings.benchmark_symbol,
            backend.name()
        );

        let mut dashboard = Self {
            builder: PortfolioRequestBuilder::new(&settings.benchmark_symbol),
            transformer: SeriesTransformer::new(&settings.benchmark_symbol),
            settings,
            catalog,
            store,
            views,
            backend,
            pending: Vec::new(),
            search,
        };
        for view in &mut dashboard.views {
            if let Some(fetch) = view.refresh() {
                dashboard.pending.push(fetch);
            }
        }
        Ok(dashboard)
    }

    /// Start a session against the HTTP backend described by `settings`.
    pub fn with_http(settings: Settings, catalog: SymbolCatalog) -> Result<Self, CoreError> {
        let backend = Arc::new(gateway::http::HttpGateway::new(&settings));
        Self::new(settings, catalog, backend)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn catalog(&self) -> &SymbolCatalog {
        &self.catalog
    }

    pub fn backend(&self) -> Arc<dyn PortfolioBackend> {
        Arc::clone(&self.backend)
    }

    // ── Selection ───────────────────────────────────────────────────

    /// Add a catalog symbol with weight 1.
    ///
    /// Unknown symbols are rejected while a catalog is loaded; a full or
    /// duplicate add is a no-op returning `Ok(false)`.
    pub fn add_symbol(&mut self, symbol: &str) -> Result<bool, CoreError> {
        let symbol = normalize_symbol(symbol);
        self.ensure_known(&symbol)?;
        let changed = self.store.add(&symbol);
        self.sync_views();
        Ok(changed)
    }

    pub fn remove_symbol(&mut self, symbol: &str) -> bool {
        let changed = self.store.remove(symbol);
        self.sync_views();
        changed
    }

    /// Store a weight exactly as typed (number, text, or empty while editing).
    pub fn set_weight(&mut self, symbol: &str, raw: impl Into<WeightInput>) -> bool {
        let changed = self.store.set_weight(symbol, raw);
        self.sync_views();
        changed
    }

    /// Reset the selection. Every view is `Empty` when this returns.
    pub fn clear_selection(&mut self) {
        self.store.clear();
        self.sync_views();
    }

    /// Apply the rows ticked in the stock table as the new selection.
    ///
    /// Same catalog rule as [`Dashboard::add_symbol`]: one unknown symbol
    /// rejects the whole update and leaves the selection untouched.
    pub fn apply_table_selection<S: AsRef<str>>(&mut self, symbols: &[S]) -> Result<bool, CoreError> {
        for symbol in symbols {
            let symbol = normalize_symbol(symbol.as_ref());
            if !symbol.is_empty() {
                self.ensure_known(&symbol)?;
            }
        }
        let changed = self.store.replace_symbols(symbols);
        self.sync_views();
        Ok(changed)
    }

    /// Unknown symbols are rejected while a catalog is loaded.
    fn ensure_known(&self, symbol: &str) -> Result<(), CoreError> {
        if !self.catalog.is_empty() && !self.catalog.contains(symbol) {
            return Err(CoreError::ValidationError(format!(
                "Unknown symbol '{symbol}'"
            )));
        }
        Ok(())
    }

    pub fn selection(&self) -> PortfolioSelection {
        self.store.current_selection()
    }

    pub fn subscribe(&self) -> watch::Receiver<SelectionSnapshot> {
        self.store.subscribe()
    }

    /// The request the current selection maps to.
    pub fn current_request(&self) -> PortfolioRequest {
        self.builder.build_request(&self.store.current_selection())
    }

    /// Back to a fresh session: empty selection, unfiltered search.
    pub fn reload(&mut self) {
        self.search.reset();
        self.clear_selection();
        info!("Dashboard session reset");
    }

    // ── Views ───────────────────────────────────────────────────────

    pub fn view(&self, kind: ViewKind) -> &ViewState {
        self.binder(kind).state()
    }

    pub fn pending_fetches(&self) -> &[PendingFetch] {
        &self.pending
    }

    /// Hand the queued fetches to the caller, who completes them later.
    pub fn take_pending(&mut self) -> Vec<PendingFetch> {
        std::mem::take(&mut self.pending)
    }

    /// Feed a fetch outcome back. Returns `false` if the view had moved on.
    pub fn complete(
        &mut self,
        fetch: &PendingFetch,
        result: Result<PortfolioViewResponse, CoreError>,
    ) -> bool {
        self.binder_mut(fetch.kind).complete(fetch, result)
    }

    /// Run every queued fetch against the backend and apply the results.
    /// Returns how many were applied.
    pub async fn refresh(&mut self) -> usize {
        let fetches = self.take_pending();
        let mut applied = 0;
        for fetch in &fetches {
            let result = self
                .backend
                .fetch_portfolio_view(fetch.kind, &fetch.request)
                .await;
            if self.complete(fetch, result) {
                applied += 1;
            }
        }
        applied
    }

    fn binder(&self, kind: ViewKind) -> &ViewBinder {
        &self.views[kind.index()]
    }

    fn binder_mut(&mut self, kind: ViewKind) -> &mut ViewBinder {
        &mut self.views[kind.index()]
    }

    /// Let every view observe the store; keep only fetches that are still current.
    fn sync_views(&mut self) {
        for view in &mut self.views {
            if let Some(fetch) = view.sync() {
                self.pending.push(fetch);
            }
        }
        let views = &self.views;
        self.pending
            .retain(|p| views[p.kind.index()].latest_request() == Some(p.request_id));
    }

    // ── Stock table & prediction ────────────────────────────────────

    /// Rows for the stock table, sorted. Empty if the backend cannot answer.
    pub async fn load_stock_table(&self, order: StockSortOrder) -> Vec<StockRow> {
        match self.backend.fetch_market_overview().await {
            Ok(series) => {
                let mut rows = self.transformer.to_stock_rows(&series);
                sort_stock_rows(&mut rows, order);
                rows
            }
            Err(e) => {
                warn!("Stock table unavailable: {e}");
                Vec::new()
            }
        }
    }

    /// Prediction line for one symbol, if the backend answers.
    ///
    /// The backend predicts raw closes; the line is the percent change from
    /// the first predicted close.
    pub async fn prediction_chart(&self, symbol: &str) -> Option<LineChartData> {
        match self.backend.fetch_prediction(symbol).await {
            Ok(series) => Some(self.transformer.to_rebased_change(&series)),
            Err(e) => {
                warn!("Prediction for {symbol} unavailable: {e}");
                None
            }
        }
    }

    // ── Search ──────────────────────────────────────────────────────

    /// Immediate catalog search.
    #[must_use]
    pub fn search_symbols(&self, term: &str) -> Vec<SymbolInfo> {
        self.catalog.search(term, self.settings.search_limit)
    }

    /// Debounced search: results are published after the quiet period.
    /// Outside a Tokio runtime they are published immediately.
    pub fn search_input(&mut self, term: impl Into<String>) {
        self.search.on_input(term);
    }

    pub fn search_results(&self) -> watch::Receiver<SearchResults> {
        self.search.subscribe()
    }
}
