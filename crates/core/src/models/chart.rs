use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Color reserved for the benchmark line, slice and table swatch.
pub const BENCHMARK_COLOR: &str = "#000000";

/// Colors handed out to non-benchmark symbols, by position.
pub const PALETTE: [&str; 10] = [
    "#8884d8", "#82ca9d", "#ffc658", "#ff8042", "#8dd1e1",
    "#a4de6c", "#d0ed57", "#fa8072", "#b0e0e6", "#ffbb28",
];

/// Palette color for the `index`-th non-benchmark symbol.
pub fn palette_color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

/// One line of the trend chart, values already in percent change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSeries {
    pub symbol: String,
    pub values: Vec<f64>,
    pub color: String,
    /// Benchmark lines are drawn emphasized.
    pub benchmark: bool,
}

/// Trend chart: shared date axis plus one line per symbol.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineChartData {
    pub dates: Vec<NaiveDate>,
    pub series: Vec<LineSeries>,
}

impl LineChartData {
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn get(&self, symbol: &str) -> Option<&LineSeries> {
        self.series.iter().find(|s| s.symbol == symbol)
    }
}

/// One pie slice with its share of the total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieSlice {
    pub symbol: String,
    pub value: f64,
    /// Percentage of [`PieChartData::total`]; 0 when the total is 0.
    pub share_pct: f64,
    pub color: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PieChartData {
    pub slices: Vec<PieSlice>,
    pub total: f64,
}

impl PieChartData {
    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    pub fn get(&self, symbol: &str) -> Option<&PieSlice> {
        self.slices.iter().find(|s| s.symbol == symbol)
    }
}

/// Benchmark vs. portfolio on one date, in percent change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformancePoint {
    pub date: NaiveDate,
    pub benchmark: Option<f64>,
    pub portfolio: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceChartData {
    pub points: Vec<PerformancePoint>,
}

impl PerformanceChartData {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// A row of the sortable stock table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRow {
    pub symbol: String,
    /// Last normalized value scaled by 100, rounded to cents.
    pub close: f64,
    /// Gain from first to last observation in percent, rounded to 2 decimals.
    pub percent_gain: f64,
    pub color: String,
}

/// Column + direction for sorting the stock table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockSortOrder {
    SymbolAsc,
    SymbolDesc,
    CloseAsc,
    CloseDesc,
    GainAsc,
    GainDesc,
}
