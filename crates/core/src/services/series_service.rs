use std::cmp::Ordering;

use crate::models::chart::{
    palette_color, LineChartData, LineSeries, PerformanceChartData, PerformancePoint,
    PieChartData, PieSlice, StockRow, StockSortOrder, BENCHMARK_COLOR,
};
use crate::models::request::PortfolioRequest;
use crate::models::series::{
    DistributionRecord, PortfolioViewResponse, TimeSeriesResponse, PORTFOLIO_SERIES,
};
use crate::models::symbol::normalize_symbol;

/// Options for [`SeriesTransformer::to_distribution`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DistributionOptions {
    pub exclude_benchmark: bool,
}

impl Default for DistributionOptions {
    fn default() -> Self {
        Self {
            exclude_benchmark: true,
        }
    }
}

/// Rebase a normalized series (first value 1) to percent change.
pub fn percent_change(values: &[f64]) -> Vec<f64> {
    values.iter().map(|v| (v - 1.0) * 100.0).collect()
}

/// Rebase raw prices to percent change against the first observation.
/// All zeros when the first value is 0.
pub fn rebased_change(values: &[f64]) -> Vec<f64> {
    match values.first() {
        Some(&first) if first != 0.0 => values.iter().map(|v| (v / first - 1.0) * 100.0).collect(),
        _ => vec![0.0; values.len()],
    }
}

/// Share of `value` in `total` as a percentage; 0 when the total is 0.
pub fn share_pct(value: f64, total: f64) -> f64 {
    if total > 0.0 {
        value / total * 100.0
    } else {
        0.0
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Reshapes backend data into chart-ready structures.
///
/// The core computes all the numbers; the frontend only renders. Every
/// method is pure and returns a fresh value.
#[derive(Debug, Clone)]
pub struct SeriesTransformer {
    benchmark: String,
}

impl SeriesTransformer {
    pub fn new(benchmark: &str) -> Self {
        Self {
            benchmark: normalize_symbol(benchmark),
        }
    }

    pub fn benchmark(&self) -> &str {
        &self.benchmark
    }

    /// Color for a symbol given its position among non-benchmark symbols.
    fn color_for(&self, symbol: &str, other_index: &mut usize) -> String {
        if symbol == self.benchmark {
            BENCHMARK_COLOR.to_string()
        } else {
            let color = palette_color(*other_index);
            *other_index += 1;
            color.to_string()
        }
    }

    /// Per-symbol `(v - 1) * 100`, index-aligned with the dates.
    /// The benchmark line is kept and flagged.
    pub fn to_percent_change(&self, response: &TimeSeriesResponse) -> LineChartData {
        self.line_chart(response, percent_change)
    }

    /// Same shape as [`Self::to_percent_change`] for series of raw prices
    /// (e.g. predicted closes), rebased on their first observation.
    pub fn to_rebased_change(&self, response: &TimeSeriesResponse) -> LineChartData {
        self.line_chart(response, rebased_change)
    }

    fn line_chart(&self, response: &TimeSeriesResponse, rebase: fn(&[f64]) -> Vec<f64>) -> LineChartData {
        let mut other_index = 0;
        let series = response
            .series
            .iter()
            .map(|s| LineSeries {
                symbol: s.symbol.clone(),
                values: rebase(&s.values),
                color: self.color_for(&s.symbol, &mut other_index),
                benchmark: s.symbol == self.benchmark,
            })
            .collect();

        LineChartData {
            dates: response.dates.clone(),
            series,
        }
    }

    /// Pie data for a view response.
    ///
    /// Uses the backend's value breakdown when present, otherwise the
    /// requested weights. Negative values count as 0.
    pub fn to_distribution(
        &self,
        response: &PortfolioViewResponse,
        request: &PortfolioRequest,
        options: DistributionOptions,
    ) -> PieChartData {
        match &response.distribution {
            Some(records) => self.distribution_from_records(records, options),
            None => self.distribution_from_records(&Self::fallback_distribution(request), options),
        }
    }

    /// Records derived from the request alone: value = weight.
    pub fn fallback_distribution(request: &PortfolioRequest) -> Vec<DistributionRecord> {
        request
            .pairs()
            .map(|(symbol, weight)| DistributionRecord::new(symbol, weight.max(0.0)))
            .collect()
    }

    pub fn distribution_from_records(
        &self,
        records: &[DistributionRecord],
        options: DistributionOptions,
    ) -> PieChartData {
        let kept: Vec<(&str, f64)> = records
            .iter()
            .filter(|r| !(options.exclude_benchmark && r.symbol == self.benchmark))
            .map(|r| (r.symbol.as_str(), if r.value.is_finite() { r.value.max(0.0) } else { 0.0 }))
            .collect();
        let total: f64 = kept.iter().map(|(_, v)| v).sum();

        let mut other_index = 0;
        let slices = kept
            .into_iter()
            .map(|(symbol, value)| PieSlice {
                symbol: symbol.to_string(),
                value,
                share_pct: share_pct(value, total),
                color: self.color_for(symbol, &mut other_index),
            })
            .collect();

        PieChartData { slices, total }
    }

    /// Benchmark vs. `Portfolio` in percent change, one point per date.
    pub fn to_performance(&self, response: &TimeSeriesResponse) -> PerformanceChartData {
        let benchmark = response.get(&self.benchmark);
        let portfolio = response.get(PORTFOLIO_SERIES);

        let points = response
            .dates
            .iter()
            .enumerate()
            .map(|(i, date)| PerformancePoint {
                date: *date,
                benchmark: benchmark.and_then(|s| s.get(i)).map(|v| (v - 1.0) * 100.0),
                portfolio: portfolio.and_then(|s| s.get(i)).map(|v| (v - 1.0) * 100.0),
            })
            .collect();

        PerformanceChartData { points }
    }

    /// Rows for the stock table: last close and gain since the first observation.
    pub fn to_stock_rows(&self, response: &TimeSeriesResponse) -> Vec<StockRow> {
        let mut other_index = 0;
        response
            .series
            .iter()
            .filter_map(|s| {
                let start = *s.values.first()?;
                let end = *s.values.last()?;
                let gain = if start != 0.0 {
                    (end - start) / start * 100.0
                } else {
                    0.0
                };
                Some(StockRow {
                    symbol: s.symbol.clone(),
                    close: round2(end * 100.0),
                    percent_gain: round2(gain),
                    color: self.color_for(&s.symbol, &mut other_index),
                })
            })
            .collect()
    }
}

/// Sort stock rows in place by the chosen column.
pub fn sort_stock_rows(rows: &mut [StockRow], order: StockSortOrder) {
    let by_f64 = |a: f64, b: f64| a.partial_cmp(&b).unwrap_or(Ordering::Equal);
    match order {
        StockSortOrder::SymbolAsc => rows.sort_by(|a, b| a.symbol.cmp(&b.symbol)),
        StockSortOrder::SymbolDesc => rows.sort_by(|a, b| b.symbol.cmp(&a.symbol)),
        StockSortOrder::CloseAsc => rows.sort_by(|a, b| by_f64(a.close, b.close)),
        StockSortOrder::CloseDesc => rows.sort_by(|a, b| by_f64(b.close, a.close)),
        StockSortOrder::GainAsc => rows.sort_by(|a, b| by_f64(a.percent_gain, b.percent_gain)),
        StockSortOrder::GainDesc => rows.sort_by(|a, b| by_f64(b.percent_gain, a.percent_gain)),
    }
}
