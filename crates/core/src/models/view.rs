use serde::{Deserialize, Serialize};

use super::chart::{LineChartData, PerformanceChartData, PieChartData};
use super::request::RequestId;

/// The three views that consume the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViewKind {
    /// Percent-change line per symbol, benchmark included
    Trend,
    /// Pie of value by symbol, benchmark excluded
    Distribution,
    /// Benchmark vs. weighted portfolio line
    Performance,
}

impl ViewKind {
    pub const ALL: [ViewKind; 3] = [ViewKind::Trend, ViewKind::Distribution, ViewKind::Performance];

    /// Position in [`ViewKind::ALL`].
    pub fn index(self) -> usize {
        match self {
            ViewKind::Trend => 0,
            ViewKind::Distribution => 1,
            ViewKind::Performance => 2,
        }
    }
}

impl std::fmt::Display for ViewKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewKind::Trend => write!(f, "Trend"),
            ViewKind::Distribution => write!(f, "Distribution"),
            ViewKind::Performance => write!(f, "Performance"),
        }
    }
}

/// Chart-ready payload of a view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ViewData {
    Trend(LineChartData),
    Distribution(PieChartData),
    Performance(PerformanceChartData),
}

impl ViewData {
    pub fn kind(&self) -> ViewKind {
        match self {
            ViewData::Trend(_) => ViewKind::Trend,
            ViewData::Distribution(_) => ViewKind::Distribution,
            ViewData::Performance(_) => ViewKind::Performance,
        }
    }
}

/// What a view currently shows.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    /// Nothing selected. A valid, renderable state.
    Empty,
    /// Waiting on the given request.
    Loading { request_id: RequestId },
    /// Backend data for the latest request.
    Ready(ViewData),
    /// Backend failed; data derived from the request alone.
    Fallback { data: ViewData, reason: String },
}

impl ViewState {
    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading { .. })
    }

    pub fn data(&self) -> Option<&ViewData> {
        match self {
            ViewState::Ready(data) | ViewState::Fallback { data, .. } => Some(data),
            ViewState::Empty | ViewState::Loading { .. } => None,
        }
    }
}
