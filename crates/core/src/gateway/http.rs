use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, Response};
use serde::Serialize;

use crate::errors::CoreError;
use crate::models::request::PortfolioRequest;
use crate::models::series::{PortfolioViewResponse, TimeSeriesResponse, PORTFOLIO_SERIES};
use crate::models::settings::{Endpoints, Settings};
use crate::models::symbol::normalize_symbol;
use crate::models::view::ViewKind;
use super::traits::PortfolioBackend;

/// JSON-over-HTTP client for the dashboard backend.
///
/// - `POST {custom_portfolio}` with `{ symbols, shares }` for trend and distribution views
/// - `POST {performance}` with the same body for the performance view
/// - `GET {market_overview}` for the stock table
/// - `POST {predict}` with `{ symbol }` for a single prediction series
pub struct HttpGateway {
    client: Client,
    base_url: String,
    endpoints: Endpoints,
}

#[derive(Serialize)]
struct PredictionRequest<'a> {
    symbol: &'a str,
}

impl HttpGateway {
    pub fn new(settings: &Settings) -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(settings.request_timeout());
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            endpoints: settings.endpoints.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    fn path_for(&self, kind: ViewKind) -> &str {
        match kind {
            ViewKind::Trend | ViewKind::Distribution => &self.endpoints.custom_portfolio,
            ViewKind::Performance => &self.endpoints.performance,
        }
    }

    async fn post_json<B: Serialize + ?Sized + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<String, CoreError> {
        let url = self.url(path);
        debug!("POST {url}");
        let resp = self.client.post(&url).json(body).send().await?;
        Self::read_body(path, resp).await
    }

    async fn get(&self, path: &str) -> Result<String, CoreError> {
        let url = self.url(path);
        debug!("GET {url}");
        let resp = self.client.get(&url).send().await?;
        Self::read_body(path, resp).await
    }

    async fn read_body(path: &str, resp: Response) -> Result<String, CoreError> {
        let status = resp.status();
        if !status.is_success() {
            warn!("Backend answered {status} for {path}");
            return Err(CoreError::HttpStatus {
                status: status.as_u16(),
                endpoint: path.to_string(),
            });
        }
        Ok(resp.text().await?)
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl PortfolioBackend for HttpGateway {
    fn name(&self) -> &str {
        "HTTP"
    }

    async fn fetch_portfolio_view(
        &self,
        kind: ViewKind,
        request: &PortfolioRequest,
    ) -> Result<PortfolioViewResponse, CoreError> {
        let body = self.post_json(self.path_for(kind), request).await?;
        PortfolioViewResponse::from_json(&body)
    }

    async fn fetch_market_overview(&self) -> Result<TimeSeriesResponse, CoreError> {
        let body = self.get(&self.endpoints.market_overview).await?;
        TimeSeriesResponse::from_json(&body)
    }

    async fn fetch_prediction(&self, symbol: &str) -> Result<TimeSeriesResponse, CoreError> {
        let symbol = normalize_symbol(symbol);
        let body = self
            .post_json(&self.endpoints.predict, &PredictionRequest { symbol: &symbol })
            .await?;
        let mut series = TimeSeriesResponse::from_json(&body)?;
        series.rename_series(PORTFOLIO_SERIES, &symbol);
        Ok(series)
    }
}
