use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::request::PortfolioRequest;
use crate::models::series::{PortfolioViewResponse, TimeSeriesResponse};
use crate::models::view::ViewKind;

/// The only seam through which the crate reaches the network.
///
/// [`HttpGateway`](super::http::HttpGateway) is the production implementation;
/// tests plug in in-memory backends. Implementations never touch shared state
/// and never retry.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait PortfolioBackend: Send + Sync {
    /// Human-readable name of this backend (for logs/errors).
    fn name(&self) -> &str;

    /// Fetch the data one view needs for the given request.
    async fn fetch_portfolio_view(
        &self,
        kind: ViewKind,
        request: &PortfolioRequest,
    ) -> Result<PortfolioViewResponse, CoreError>;

    /// Normalized series for every symbol listed in the stock table.
    async fn fetch_market_overview(&self) -> Result<TimeSeriesResponse, CoreError>;

    /// Predicted series for one symbol, keyed by that symbol.
    async fn fetch_prediction(&self, symbol: &str) -> Result<TimeSeriesResponse, CoreError>;
}
