use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::CoreError;

/// Backend paths, relative to [`Settings::api_base_url`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    /// POST `{ symbols, shares }` → time series and/or distribution
    pub custom_portfolio: String,
    /// POST `{ symbols, shares }` → benchmark vs. portfolio series
    pub performance: String,
    /// GET → normalized series for every symbol in the stock table
    pub market_overview: String,
    /// POST `{ symbol }` → single predicted series
    pub predict: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            custom_portfolio: "/api/custom_portfolio".to_string(),
            performance: "/api/performance_timeseries".to_string(),
            market_overview: "/api/portfolio_timeseries".to_string(),
            predict: "/api/predict".to_string(),
        }
    }
}

/// Session configuration. Any field missing from a JSON config takes its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Scheme + host of the backend (e.g., "http://localhost:5000").
    pub api_base_url: String,

    /// The reference instrument always sent with a request.
    pub benchmark_symbol: String,

    /// Maximum number of symbols in a selection.
    pub max_selection: usize,

    /// Quiet period after the last keystroke before search results recompute.
    pub search_debounce_ms: u64,

    /// Maximum number of search candidates returned.
    pub search_limit: usize,

    pub request_timeout_secs: u64,

    pub endpoints: Endpoints,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000".to_string(),
            benchmark_symbol: "SPY".to_string(),
            max_selection: 10,
            search_debounce_ms: 250,
            search_limit: 50,
            request_timeout_secs: 30,
            endpoints: Endpoints::default(),
        }
    }
}

impl Settings {
    /// Parse and validate settings from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, CoreError> {
        let mut settings: Settings = serde_json::from_str(json)
            .map_err(|e| CoreError::InvalidSettings(e.to_string()))?;
        settings.benchmark_symbol = settings.benchmark_symbol.trim().to_uppercase();
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file on disk (native only, not WASM).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Self, CoreError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.api_base_url.trim().is_empty() {
            return Err(CoreError::InvalidSettings("api_base_url must not be empty".into()));
        }
        if self.benchmark_symbol.trim().is_empty() {
            return Err(CoreError::InvalidSettings("benchmark_symbol must not be empty".into()));
        }
        if self.max_selection == 0 {
            return Err(CoreError::InvalidSettings("max_selection must be at least 1".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(CoreError::InvalidSettings(
                "request_timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
