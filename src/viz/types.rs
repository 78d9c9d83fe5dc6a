//! Public types and constants for the visualization module.

use crate::dashboard::{DashboardPage, Tab};
use crate::models::{AmenityRecord, RegularityRecord};
use crate::stats::{LineScore, WeekdayMatrix};
use serde::{Deserialize, Serialize};

/// Legend placement options (timeline only; the other charts label their marks directly).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegendMode {
    /// Overlay legend inside the plotting area (may overlap data).
    Inside,
    /// Separate legend panel on the right side.
    Right,
    /// Separate legend band at the top.
    Top,
    /// Separate legend band at the bottom.
    Bottom,
}

/// The four dashboard charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartKind {
    /// Daily rate per line with the target line.
    Timeline,
    /// Horizontal bars of mean rate per line, best first.
    Ranking,
    /// Line x weekday mean rate grid.
    WeeklyHeatmap,
    /// Amenity locations.
    Map,
}

impl From<Tab> for ChartKind {
    fn from(tab: Tab) -> Self {
        match tab {
            Tab::Timeline => ChartKind::Timeline,
            Tab::Ranking => ChartKind::Ranking,
            Tab::Weekly => ChartKind::WeeklyHeatmap,
            Tab::Map => ChartKind::Map,
        }
    }
}

pub const DEFAULT_LEGEND_MODE: LegendMode = LegendMode::Bottom;

/// Default punctuality objective (percent).
pub const DEFAULT_TARGET_RATE: f64 = 95.0;

/// Rendering knobs shared by every chart kind.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartOptions {
    pub width: u32,
    pub height: u32,
    /// Caption; empty picks a default per kind.
    pub title: String,
    pub legend: LegendMode,
    pub target_rate: f64,
    /// Number format tag for axis labels, e.g. `en` or `fr`.
    pub locale: String,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 600,
            title: String::new(),
            legend: DEFAULT_LEGEND_MODE,
            target_rate: DEFAULT_TARGET_RATE,
            locale: "en".into(),
        }
    }
}

/// Borrowed data a chart may draw from; each kind reads only its own slice.
#[derive(Debug, Clone, Copy)]
pub struct ChartInput<'a> {
    pub regularity: &'a [RegularityRecord],
    pub ranking: &'a [LineScore],
    pub weekly: &'a WeekdayMatrix,
    pub amenities: &'a [AmenityRecord],
}

impl<'a> ChartInput<'a> {
    pub fn from_page(page: &'a DashboardPage) -> Self {
        Self {
            regularity: &page.data.regularity,
            ranking: &page.ranking,
            weekly: &page.weekly,
            amenities: page.map.rows(),
        }
    }
}
