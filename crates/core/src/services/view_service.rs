use log::{debug, warn};
use tokio::sync::watch;

use crate::errors::CoreError;
use crate::models::chart::PerformanceChartData;
use crate::models::request::{PortfolioRequest, RequestId};
use crate::models::selection::{PortfolioSelection, SelectionSnapshot};
use crate::models::series::{PortfolioViewResponse, SymbolSeries, TimeSeriesResponse};
use crate::models::settings::Settings;
use crate::models::view::{ViewData, ViewKind, ViewState};
use crate::services::request_service::PortfolioRequestBuilder;
use crate::services::series_service::{DistributionOptions, SeriesTransformer};

/// A request a view has issued and is waiting on.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingFetch {
    pub kind: ViewKind,
    pub request_id: RequestId,
    pub request: PortfolioRequest,
}

/// Keeps one view consistent with the selection store.
///
/// On every observed selection change the binder builds its own request and
/// tags it with a fresh [`RequestId`]. Only the completion carrying the latest
/// id is applied; anything older is dropped on arrival, whatever order the
/// responses come back in. In-flight requests are never cancelled.
pub struct ViewBinder {
    kind: ViewKind,
    selection_rx: watch::Receiver<SelectionSnapshot>,
    builder: PortfolioRequestBuilder,
    transformer: SeriesTransformer,
    latest: Option<RequestId>,
    state: ViewState,
}

impl ViewBinder {
    pub fn new(
        kind: ViewKind,
        selection_rx: watch::Receiver<SelectionSnapshot>,
        settings: &Settings,
    ) -> Self {
        Self {
            kind,
            selection_rx,
            builder: PortfolioRequestBuilder::new(&settings.benchmark_symbol),
            transformer: SeriesTransformer::new(&settings.benchmark_symbol),
            latest: None,
            state: ViewState::Empty,
        }
    }

    pub fn kind(&self) -> ViewKind {
        self.kind
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Id of the request whose completion would currently be applied.
    pub fn latest_request(&self) -> Option<RequestId> {
        self.latest
    }

    /// Begin a fetch if the store published since the last look.
    pub fn sync(&mut self) -> Option<PendingFetch> {
        if !self.selection_rx.has_changed().unwrap_or(false) {
            return None;
        }
        self.refresh()
    }

    /// Begin a fetch for the current snapshot, changed or not.
    pub fn refresh(&mut self) -> Option<PendingFetch> {
        let selection = self.selection_rx.borrow_and_update().selection.clone();
        self.begin(&selection)
    }

    /// Supersede whatever is in flight and derive a new request from `selection`.
    ///
    /// An empty selection switches to [`ViewState::Empty`] right away. Trend and
    /// performance still ask for the benchmark baseline; the distribution view
    /// has nothing to ask for since it leaves the benchmark out.
    pub fn begin(&mut self, selection: &PortfolioSelection) -> Option<PendingFetch> {
        if selection.is_empty() {
            self.state = ViewState::Empty;
            self.latest = None;
            if self.kind == ViewKind::Distribution {
                return None;
            }
        }

        let request = self.builder.build_request(selection);
        let request_id = RequestId::new();
        self.latest = Some(request_id);
        if !selection.is_empty() {
            self.state = ViewState::Loading { request_id };
        }
        debug!("{} view issued request {request_id}: {:?}", self.kind, request.symbols);

        Some(PendingFetch {
            kind: self.kind,
            request_id,
            request,
        })
    }

    /// Apply the outcome of `fetch`. Returns `false` when it was superseded.
    ///
    /// Failures never surface: the view falls back to data derived from the
    /// request itself (an empty selection stays `Empty`).
    pub fn complete(
        &mut self,
        fetch: &PendingFetch,
        result: Result<PortfolioViewResponse, CoreError>,
    ) -> bool {
        if fetch.kind != self.kind || self.latest != Some(fetch.request_id) {
            debug!("{} view discarded stale response {}", self.kind, fetch.request_id);
            return false;
        }

        let rendered = result.and_then(|response| self.render(&response, &fetch.request));
        self.state = match rendered {
            Ok(data) => ViewState::Ready(data),
            Err(e) => {
                warn!("{} view: backend request failed ({e}); showing request-derived data", self.kind);
                if self.state == ViewState::Empty {
                    ViewState::Empty
                } else {
                    ViewState::Fallback {
                        data: self.fallback(&fetch.request),
                        reason: e.to_string(),
                    }
                }
            }
        };
        true
    }

    fn render(
        &self,
        response: &PortfolioViewResponse,
        request: &PortfolioRequest,
    ) -> Result<ViewData, CoreError> {
        match self.kind {
            ViewKind::Trend => {
                let series = Self::require_series(response)?;
                Ok(ViewData::Trend(self.transformer.to_percent_change(series)))
            }
            ViewKind::Distribution => Ok(ViewData::Distribution(self.transformer.to_distribution(
                response,
                request,
                DistributionOptions::default(),
            ))),
            ViewKind::Performance => {
                let series = Self::require_series(response)?;
                Ok(ViewData::Performance(self.transformer.to_performance(series)))
            }
        }
    }

    fn require_series(response: &PortfolioViewResponse) -> Result<&TimeSeriesResponse, CoreError> {
        response
            .timeseries
            .as_ref()
            .ok_or_else(|| CoreError::MissingField("series".into()))
    }

    /// What the view shows when the backend cannot answer.
    fn fallback(&self, request: &PortfolioRequest) -> ViewData {
        match self.kind {
            ViewKind::Trend => {
                let placeholder = TimeSeriesResponse {
                    dates: Vec::new(),
                    series: request
                        .symbols
                        .iter()
                        .map(|s| SymbolSeries::new(s.clone(), Vec::new()))
                        .collect(),
                };
                ViewData::Trend(self.transformer.to_percent_change(&placeholder))
            }
            ViewKind::Distribution => ViewData::Distribution(self.transformer.distribution_from_records(
                &SeriesTransformer::fallback_distribution(request),
                DistributionOptions::default(),
            )),
            ViewKind::Performance => ViewData::Performance(PerformanceChartData::default()),
        }
    }
}
