use chrono::NaiveDate;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::CoreError;
use super::symbol::normalize_symbol;

/// Series key the backend uses for the weighted portfolio line, and the key
/// given to single-series (`predictions` / `close`) responses.
pub const PORTFOLIO_SERIES: &str = "Portfolio";

/// One symbol's values, index-aligned with [`TimeSeriesResponse::dates`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolSeries {
    pub symbol: String,
    pub values: Vec<f64>,
}

impl SymbolSeries {
    pub fn new(symbol: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            symbol: symbol.into(),
            values,
        }
    }
}

/// Dates plus per-symbol values, in the order the backend sent them.
///
/// Every value sequence has exactly `dates.len()` elements.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimeSeriesResponse {
    pub dates: Vec<NaiveDate>,
    pub series: Vec<SymbolSeries>,
}

impl TimeSeriesResponse {
    /// Build a response, checking length alignment and date order.
    pub fn new(dates: Vec<NaiveDate>, series: Vec<SymbolSeries>) -> Result<Self, CoreError> {
        let response = Self { dates, series };
        response.validate()?;
        Ok(response)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(pair) = self.dates.windows(2).find(|w| w[1] < w[0]) {
            return Err(CoreError::Decode(format!(
                "Dates are not ascending: {} follows {}",
                pair[1], pair[0]
            )));
        }
        for s in &self.series {
            if s.values.len() != self.dates.len() {
                return Err(CoreError::Decode(format!(
                    "Series '{}' has {} values for {} dates",
                    s.symbol,
                    s.values.len(),
                    self.dates.len()
                )));
            }
        }
        Ok(())
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn get(&self, symbol: &str) -> Option<&[f64]> {
        self.series
            .iter()
            .find(|s| s.symbol == symbol)
            .map(|s| s.values.as_slice())
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.series.iter().map(|s| s.symbol.as_str())
    }

    /// Decode a body that must carry a time series.
    pub fn from_json(body: &str) -> Result<Self, CoreError> {
        PortfolioViewResponse::from_json(body)?
            .timeseries
            .ok_or_else(|| CoreError::MissingField("series".into()))
    }

    /// Rename a series key in place (used to key single-series responses by ticker).
    pub fn rename_series(&mut self, from: &str, to: &str) {
        if let Some(s) = self.series.iter_mut().find(|s| s.symbol == from) {
            s.symbol = to.to_string();
        }
    }
}

/// One pie slice as the backend reports it.
///
/// Both `{"Symbol","Value"}` and `{"symbol","value"}` decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionRecord {
    #[serde(alias = "Symbol")]
    pub symbol: String,

    #[serde(alias = "Value")]
    pub value: f64,
}

impl DistributionRecord {
    pub fn new(symbol: impl Into<String>, value: f64) -> Self {
        Self {
            symbol: normalize_symbol(&symbol.into()),
            value,
        }
    }
}

/// Decoded answer of the custom-portfolio endpoint.
///
/// Either part may be missing; at least one is always present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PortfolioViewResponse {
    pub timeseries: Option<TimeSeriesResponse>,
    pub distribution: Option<Vec<DistributionRecord>>,
}

impl PortfolioViewResponse {
    pub fn from_json(body: &str) -> Result<Self, CoreError> {
        let wire: WireResponse = serde_json::from_str(body)?;
        match wire {
            WireResponse::Records(records) => Ok(Self {
                timeseries: None,
                distribution: Some(normalize_records(records)),
            }),
            WireResponse::Envelope(envelope) => envelope.into_response(),
        }
    }
}

// ── Wire types ──────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(untagged)]
enum WireResponse {
    Records(Vec<DistributionRecord>),
    Envelope(WireEnvelope),
}

#[derive(Deserialize)]
struct WireEnvelope {
    #[serde(default)]
    dates: Option<Vec<String>>,

    #[serde(default, deserialize_with = "ordered_series")]
    series: Option<Vec<SymbolSeries>>,

    #[serde(default)]
    predictions: Option<Vec<f64>>,

    #[serde(default)]
    close: Option<Vec<f64>>,

    #[serde(default)]
    distribution: Option<Vec<DistributionRecord>>,
}

impl WireEnvelope {
    fn into_response(self) -> Result<PortfolioViewResponse, CoreError> {
        let series = match (self.series, self.predictions.or(self.close)) {
            (Some(series), _) => Some(series),
            (None, Some(values)) => Some(vec![SymbolSeries::new(PORTFOLIO_SERIES, values)]),
            (None, None) => None,
        };

        let timeseries = match (self.dates, series) {
            (Some(dates), Some(series)) => {
                let dates = dates
                    .iter()
                    .map(|d| parse_iso_date(d))
                    .collect::<Result<Vec<_>, _>>()?;
                Some(TimeSeriesResponse::new(dates, series)?)
            }
            (Some(_), None) => return Err(CoreError::MissingField("series".into())),
            (None, Some(_)) => return Err(CoreError::MissingField("dates".into())),
            (None, None) => None,
        };

        let distribution = self.distribution.map(normalize_records);
        if timeseries.is_none() && distribution.is_none() {
            return Err(CoreError::MissingField("distribution".into()));
        }

        Ok(PortfolioViewResponse {
            timeseries,
            distribution,
        })
    }
}

fn normalize_records(records: Vec<DistributionRecord>) -> Vec<DistributionRecord> {
    records
        .into_iter()
        .map(|r| DistributionRecord::new(r.symbol, r.value))
        .collect()
}

/// Parse the leading `YYYY-MM-DD` of an ISO date or timestamp string.
pub fn parse_iso_date(raw: &str) -> Result<NaiveDate, CoreError> {
    let trimmed = raw.trim();
    let day = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|e| CoreError::Decode(format!("Invalid date '{raw}': {e}")))
}

/// `{ "AMZN": [...], "SPY": [...] }` into a Vec that keeps the JSON key order.
fn ordered_series<'de, D>(deserializer: D) -> Result<Option<Vec<SymbolSeries>>, D::Error>
where
    D: Deserializer<'de>,
{
    struct SeriesVisitor;

    impl<'de> Visitor<'de> for SeriesVisitor {
        type Value = Option<Vec<SymbolSeries>>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of symbol to numeric series")
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
        where
            D: Deserializer<'de>,
        {
            deserializer.deserialize_map(self)
        }

        fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
        where
            M: MapAccess<'de>,
        {
            let mut series = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((symbol, values)) = map.next_entry::<String, Vec<f64>>()? {
                series.push(SymbolSeries::new(symbol, values));
            }
            Ok(Some(series))
        }
    }

    deserializer.deserialize_option(SeriesVisitor)
}
