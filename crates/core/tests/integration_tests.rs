use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::{Arc, Mutex};

use portfolio_view_core::errors::CoreError;
use portfolio_view_core::gateway::traits::PortfolioBackend;
use portfolio_view_core::models::chart::StockSortOrder;
use portfolio_view_core::models::request::PortfolioRequest;
use portfolio_view_core::models::series::{
    DistributionRecord, PortfolioViewResponse, SymbolSeries, TimeSeriesResponse, PORTFOLIO_SERIES,
};
use portfolio_view_core::models::settings::Settings;
use portfolio_view_core::models::symbol::SymbolInfo;
use portfolio_view_core::models::view::{ViewData, ViewKind, ViewState};
use portfolio_view_core::services::catalog_service::SymbolCatalog;
use portfolio_view_core::Dashboard;

// ═══════════════════════════════════════════════════════════════════
// Mock Backend (for testing without a running server)
// ═══════════════════════════════════════════════════════════════════

struct MockBackend {
    fail: bool,
    calls: Mutex<Vec<(ViewKind, PortfolioRequest)>>,
}

impl MockBackend {
    fn new() -> Self {
        Self {
            fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    fn calls(&self) -> Vec<(ViewKind, PortfolioRequest)> {
        self.calls.lock().unwrap().clone()
    }

    fn dates() -> Vec<NaiveDate> {
        vec![
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
        ]
    }
}

#[async_trait]
impl PortfolioBackend for MockBackend {
    fn name(&self) -> &str {
        "MockBackend"
    }

    async fn fetch_portfolio_view(
        &self,
        kind: ViewKind,
        request: &PortfolioRequest,
    ) -> Result<PortfolioViewResponse, CoreError> {
        self.calls.lock().unwrap().push((kind, request.clone()));
        if self.fail {
            return Err(CoreError::Network("connection refused".into()));
        }

        match kind {
            ViewKind::Trend => {
                // every symbol gains 10% per position in the request
                let series = request
                    .symbols
                    .iter()
                    .enumerate()
                    .map(|(i, s)| SymbolSeries::new(s.clone(), vec![1.0, 1.0 + 0.1 * (i + 1) as f64]))
                    .collect();
                Ok(PortfolioViewResponse {
                    timeseries: Some(TimeSeriesResponse::new(Self::dates(), series)?),
                    distribution: None,
                })
            }
            ViewKind::Distribution => Ok(PortfolioViewResponse {
                timeseries: None,
                distribution: Some(
                    request
                        .pairs()
                        .map(|(s, w)| DistributionRecord::new(s, w * 100.0))
                        .collect(),
                ),
            }),
            ViewKind::Performance => {
                let series = vec![
                    SymbolSeries::new("SPY", vec![1.0, 1.02]),
                    SymbolSeries::new(PORTFOLIO_SERIES, vec![1.0, 1.08]),
                ];
                Ok(PortfolioViewResponse {
                    timeseries: Some(TimeSeriesResponse::new(Self::dates(), series)?),
                    distribution: None,
                })
            }
        }
    }

    async fn fetch_market_overview(&self) -> Result<TimeSeriesResponse, CoreError> {
        if self.fail {
            return Err(CoreError::Network("connection refused".into()));
        }
        TimeSeriesResponse::new(
            Self::dates(),
            vec![
                SymbolSeries::new("AMZN", vec![1.0, 1.04]),
                SymbolSeries::new("META", vec![1.0, 0.97]),
                SymbolSeries::new("NKE", vec![1.0, 1.01]),
            ],
        )
    }

    async fn fetch_prediction(&self, symbol: &str) -> Result<TimeSeriesResponse, CoreError> {
        if self.fail {
            return Err(CoreError::Network("connection refused".into()));
        }
        TimeSeriesResponse::new(Self::dates(), vec![SymbolSeries::new(symbol, vec![180.5, 182.1])])
    }
}

fn catalog() -> SymbolCatalog {
    SymbolCatalog::from_entries(vec![
        SymbolInfo::new("AMZN", "Amazon.com, Inc."),
        SymbolInfo::new("META", "Meta Platforms, Inc."),
        SymbolInfo::new("NKE", "Nike, Inc."),
        SymbolInfo::new("SPY", "SPDR S&P 500 ETF Trust"),
    ])
}

fn dashboard_with(backend: Arc<MockBackend>) -> Dashboard {
    let _ = env_logger::builder().is_test(true).try_init();
    Dashboard::new(Settings::default(), catalog(), backend).unwrap()
}

// ═══════════════════════════════════════════════════════════════════
// Session start
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_new_session_is_empty_with_baseline_fetches() {
    let dashboard = dashboard_with(Arc::new(MockBackend::new()));

    for kind in ViewKind::ALL {
        assert_eq!(dashboard.view(kind), &ViewState::Empty);
    }
    let pending = dashboard.pending_fetches();
    assert_eq!(pending.len(), 2);
    assert!(pending.iter().all(|p| p.request.symbols == vec!["SPY"]));
    assert!(pending.iter().all(|p| p.kind != ViewKind::Distribution));
}

#[test]
fn test_invalid_settings_rejected() {
    let settings = Settings {
        max_selection: 0,
        ..Settings::default()
    };
    let err = Dashboard::new(settings, catalog(), Arc::new(MockBackend::new())).unwrap_err();
    assert!(matches!(err, CoreError::InvalidSettings(_)));
}

#[tokio::test]
async fn test_baseline_shows_benchmark_only() {
    let mut dashboard = dashboard_with(Arc::new(MockBackend::new()));
    assert_eq!(dashboard.refresh().await, 2);

    match dashboard.view(ViewKind::Trend) {
        ViewState::Ready(ViewData::Trend(chart)) => {
            assert_eq!(chart.series.len(), 1);
            assert!(chart.series[0].benchmark);
        }
        other => panic!("unexpected trend state {other:?}"),
    }
    assert_eq!(dashboard.view(ViewKind::Distribution), &ViewState::Empty);
}

// ═══════════════════════════════════════════════════════════════════
// Selection flow
// ═══════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_single_symbol_full_distribution() {
    let backend = Arc::new(MockBackend::new());
    let mut dashboard = dashboard_with(Arc::clone(&backend));

    assert!(dashboard.add_symbol("amzn").unwrap());
    for kind in ViewKind::ALL {
        assert!(dashboard.view(kind).is_loading());
    }
    assert_eq!(dashboard.pending_fetches().len(), 3);

    dashboard.refresh().await;

    match dashboard.view(ViewKind::Distribution) {
        ViewState::Ready(ViewData::Distribution(pie)) => {
            assert_eq!(pie.slices.len(), 1);
            assert_eq!(pie.slices[0].symbol, "AMZN");
            assert_eq!(pie.slices[0].share_pct, 100.0);
        }
        other => panic!("unexpected distribution state {other:?}"),
    }
    match dashboard.view(ViewKind::Trend) {
        ViewState::Ready(ViewData::Trend(chart)) => {
            let symbols: Vec<&str> = chart.series.iter().map(|s| s.symbol.as_str()).collect();
            assert_eq!(symbols, vec!["AMZN", "SPY"]);
            assert!(chart.series.iter().all(|s| s.values[0] == 0.0));
        }
        other => panic!("unexpected trend state {other:?}"),
    }
    match dashboard.view(ViewKind::Performance) {
        ViewState::Ready(ViewData::Performance(perf)) => {
            assert_eq!(perf.points.len(), 2);
            assert!((perf.points[1].portfolio.unwrap() - 8.0).abs() < 1e-9);
        }
        other => panic!("unexpected performance state {other:?}"),
    }

    let sent: Vec<_> = backend
        .calls()
        .into_iter()
        .filter(|(_, r)| r.contains("AMZN"))
        .collect();
    assert_eq!(sent.len(), 3);
    assert!(sent.iter().all(|(_, r)| r.symbols == vec!["AMZN", "SPY"] && r.weights == vec![1.0, 1.0]));
}

#[test]
fn test_unknown_symbol_rejected() {
    let mut dashboard = dashboard_with(Arc::new(MockBackend::new()));
    let err = dashboard.add_symbol("XYZ").unwrap_err();
    assert!(matches!(err, CoreError::ValidationError(ref m) if m.contains("XYZ")));
    assert!(dashboard.selection().is_empty());
}

#[test]
fn test_empty_catalog_accepts_any_symbol() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut dashboard = Dashboard::new(
        Settings::default(),
        SymbolCatalog::default(),
        Arc::new(MockBackend::new()),
    )
    .unwrap();
    assert!(dashboard.add_symbol("XYZ").unwrap());
}

#[test]
fn test_blank_weight_sent_as_zero() {
    let mut dashboard = dashboard_with(Arc::new(MockBackend::new()));
    dashboard.add_symbol("AMZN").unwrap();
    dashboard.add_symbol("META").unwrap();
    dashboard.set_weight("AMZN", "");

    let request = dashboard.current_request();
    assert_eq!(request.symbols, vec!["AMZN", "META", "SPY"]);
    assert_eq!(request.weights, vec![0.0, 1.0, 1.0]);
}

#[test]
fn test_only_latest_fetch_per_view_stays_queued() {
    let mut dashboard = dashboard_with(Arc::new(MockBackend::new()));
    dashboard.add_symbol("AMZN").unwrap();
    dashboard.add_symbol("META").unwrap();
    dashboard.set_weight("META", 3.0);

    let pending = dashboard.pending_fetches();
    assert_eq!(pending.len(), 3);
    for fetch in pending {
        assert_eq!(fetch.request.weight_of("META"), Some(3.0));
    }
}

#[tokio::test]
async fn test_clear_empties_every_view() {
    let mut dashboard = dashboard_with(Arc::new(MockBackend::new()));
    dashboard.add_symbol("AMZN").unwrap();
    dashboard.refresh().await;

    dashboard.clear_selection();

    for kind in ViewKind::ALL {
        assert_eq!(dashboard.view(kind), &ViewState::Empty);
        assert!(!dashboard.view(kind).is_loading());
    }
    assert!(dashboard.selection().is_empty());
}

#[tokio::test]
async fn test_clear_discards_inflight_results() {
    let mut dashboard = dashboard_with(Arc::new(MockBackend::new()));
    dashboard.add_symbol("AMZN").unwrap();
    let inflight = dashboard.take_pending();
    dashboard.clear_selection();

    let backend = dashboard.backend();
    for fetch in &inflight {
        let result = backend.fetch_portfolio_view(fetch.kind, &fetch.request).await;
        assert!(!dashboard.complete(fetch, result));
    }
    assert_eq!(dashboard.view(ViewKind::Distribution), &ViewState::Empty);
}

// ═══════════════════════════════════════════════════════════════════
// Out-of-order completion
// ═══════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_out_of_order_responses_keep_latest_selection() {
    let mut dashboard = dashboard_with(Arc::new(MockBackend::new()));
    let backend = dashboard.backend();
    dashboard.take_pending();

    dashboard.add_symbol("AMZN").unwrap();
    let first = dashboard.take_pending();
    dashboard.add_symbol("META").unwrap();
    let second = dashboard.take_pending();

    // second batch answers first
    for fetch in &second {
        let result = backend.fetch_portfolio_view(fetch.kind, &fetch.request).await;
        assert!(dashboard.complete(fetch, result));
    }
    for fetch in &first {
        let result = backend.fetch_portfolio_view(fetch.kind, &fetch.request).await;
        assert!(!dashboard.complete(fetch, result));
    }

    match dashboard.view(ViewKind::Distribution) {
        ViewState::Ready(ViewData::Distribution(pie)) => {
            let symbols: Vec<&str> = pie.slices.iter().map(|s| s.symbol.as_str()).collect();
            assert_eq!(symbols, vec!["AMZN", "META"]);
            assert_eq!(pie.get("META").unwrap().share_pct, 50.0);
        }
        other => panic!("unexpected distribution state {other:?}"),
    }
    match dashboard.view(ViewKind::Trend) {
        ViewState::Ready(ViewData::Trend(chart)) => assert_eq!(chart.series.len(), 3),
        other => panic!("unexpected trend state {other:?}"),
    }
}

// ═══════════════════════════════════════════════════════════════════
// Backend failures
// ═══════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_failing_backend_falls_back_to_request() {
    let mut dashboard = dashboard_with(Arc::new(MockBackend::failing()));
    dashboard.refresh().await;
    for kind in ViewKind::ALL {
        assert_eq!(dashboard.view(kind), &ViewState::Empty);
    }

    dashboard.add_symbol("AMZN").unwrap();
    dashboard.add_symbol("NKE").unwrap();
    dashboard.set_weight("NKE", 3.0);
    assert_eq!(dashboard.refresh().await, 3);

    match dashboard.view(ViewKind::Distribution) {
        ViewState::Fallback { data: ViewData::Distribution(pie), reason } => {
            assert!(reason.contains("connection refused"));
            assert_eq!(pie.get("AMZN").unwrap().share_pct, 25.0);
            assert_eq!(pie.get("NKE").unwrap().share_pct, 75.0);
        }
        other => panic!("unexpected distribution state {other:?}"),
    }
    match dashboard.view(ViewKind::Trend) {
        ViewState::Fallback { data: ViewData::Trend(chart), .. } => {
            assert_eq!(chart.series.len(), 3);
            assert!(chart.dates.is_empty());
        }
        other => panic!("unexpected trend state {other:?}"),
    }
    assert!(matches!(
        dashboard.view(ViewKind::Performance),
        ViewState::Fallback { data: ViewData::Performance(_), .. }
    ));
}

// ═══════════════════════════════════════════════════════════════════
// Stock table, prediction, search
// ═══════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_stock_table_sorted_by_gain() {
    let dashboard = dashboard_with(Arc::new(MockBackend::new()));
    let rows = dashboard.load_stock_table(StockSortOrder::GainDesc).await;
    let symbols: Vec<&str> = rows.iter().map(|r| r.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["AMZN", "NKE", "META"]);
    assert_eq!(rows[0].percent_gain, 4.0);
    assert_eq!(rows[2].close, 97.0);
}

#[tokio::test]
async fn test_stock_table_empty_when_backend_down() {
    let dashboard = dashboard_with(Arc::new(MockBackend::failing()));
    assert!(dashboard.load_stock_table(StockSortOrder::SymbolAsc).await.is_empty());
}

#[tokio::test]
async fn test_table_selection_replaces_portfolio() {
    let mut dashboard = dashboard_with(Arc::new(MockBackend::new()));
    dashboard.add_symbol("AMZN").unwrap();
    dashboard.set_weight("AMZN", 2.0);

    assert!(dashboard.apply_table_selection(&["NKE", "AMZN"]).unwrap());
    let selection = dashboard.selection();
    assert_eq!(selection.symbols(), vec!["NKE", "AMZN"]);
    assert_eq!(selection.get("AMZN").unwrap().weight_value(), 2.0);
    assert!(dashboard.view(ViewKind::Distribution).is_loading());
}

#[test]
fn test_table_selection_rejects_unknown_symbol() {
    let mut dashboard = dashboard_with(Arc::new(MockBackend::new()));
    dashboard.add_symbol("AMZN").unwrap();
    let revision = dashboard.subscribe().borrow().revision;

    let err = dashboard.apply_table_selection(&["NKE", "xyz"]).unwrap_err();
    assert!(matches!(err, CoreError::ValidationError(ref m) if m.contains("XYZ")));
    assert_eq!(dashboard.selection().symbols(), vec!["AMZN"]);
    assert_eq!(dashboard.subscribe().borrow().revision, revision);
}

#[tokio::test]
async fn test_prediction_chart() {
    let dashboard = dashboard_with(Arc::new(MockBackend::new()));
    let chart = dashboard.prediction_chart("AMZN").await.unwrap();
    let line = chart.get("AMZN").unwrap();
    // raw closes, rebased on the first predicted close
    assert_eq!(line.values[0], 0.0);
    let expected = (182.1 / 180.5 - 1.0) * 100.0;
    assert!((line.values[1] - expected).abs() < 1e-9);
    assert!(line.values[1] < 1.0);

    let down = dashboard_with(Arc::new(MockBackend::failing()));
    assert!(down.prediction_chart("AMZN").await.is_none());
}

#[test]
fn test_search_symbols_ranked() {
    let dashboard = dashboard_with(Arc::new(MockBackend::new()));
    let hits = dashboard.search_symbols("n");
    assert_eq!(hits[0].symbol, "NKE");
    assert!(hits.iter().any(|h| h.symbol == "AMZN"));
}

#[test]
fn test_search_input_without_runtime_publishes_immediately() {
    let mut dashboard = dashboard_with(Arc::new(MockBackend::new()));
    dashboard.search_input("nike");

    let results = dashboard.search_results().borrow().clone();
    assert_eq!(results.term, "nike");
    assert_eq!(results.matches.len(), 1);
    assert_eq!(results.matches[0].symbol, "NKE");
}

#[tokio::test]
async fn test_reload_resets_session() {
    let mut dashboard = dashboard_with(Arc::new(MockBackend::new()));
    dashboard.add_symbol("AMZN").unwrap();
    dashboard.add_symbol("META").unwrap();
    dashboard.search_input("me");

    dashboard.reload();

    assert!(dashboard.selection().is_empty());
    for kind in ViewKind::ALL {
        assert_eq!(dashboard.view(kind), &ViewState::Empty);
    }
    let results = dashboard.search_results().borrow().clone();
    assert_eq!(results.term, "");
    assert_eq!(results.matches.len(), 4);
}
