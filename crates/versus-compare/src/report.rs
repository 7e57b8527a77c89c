//! Rendering-agnostic views over a finished [`ComparisonReport`].
//!
//! Front ends (the CLI today) read these instead of poking at the raw maps,
//! so `N/A` defaulting, winner flags and chart score fallbacks behave the
//! same everywhere.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::types::{ComparisonReport, Item, Metric};

/// Radar charts become unreadable past this many axes.
pub const MAX_CHART_METRICS: usize = 8;

/// Fewer axes than this and no chart is drawn.
pub const MIN_CHART_METRICS: usize = 3;

/// Shown for cells the model left empty.
pub const MISSING_VALUE: &str = "N/A";

const NEUTRAL_SCORE: f64 = 50.0;

static FIRST_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("valid number regex"));

/// One table row: a metric with a cell per item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow<'a> {
    pub metric: &'a Metric,
    pub cells: Vec<TableCell<'a>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableCell<'a> {
    pub item: &'a str,
    pub value: &'a str,
    pub is_winner: bool,
}

/// One radar-chart series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries<'a> {
    pub item: &'a str,
    /// Aligned with [`Chart::labels`].
    pub scores: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart<'a> {
    pub labels: Vec<&'a str>,
    pub series: Vec<ChartSeries<'a>>,
}

/// Items whose name was changed by spelling correction.
#[must_use]
pub fn corrections(report: &ComparisonReport) -> Vec<&Item> {
    report.items.iter().filter(|i| i.was_corrected()).collect()
}

/// Builds the comparison table in metric display order and item order.
#[must_use]
pub fn table(report: &ComparisonReport) -> Vec<TableRow<'_>> {
    let data = &report.comparison;
    data.metrics
        .iter()
        .map(|metric| {
            let winner = data.winner(&metric.name);
            let cells = report
                .items
                .iter()
                .map(|item| TableCell {
                    item: item.name(),
                    value: data
                        .value(item.name(), &metric.name)
                        .unwrap_or(MISSING_VALUE),
                    is_winner: winner == Some(item.name()),
                })
                .collect();
            TableRow { metric, cells }
        })
        .collect()
}

/// Builds the radar chart from the first [`MAX_CHART_METRICS`] metrics.
///
/// Returns `None` when fewer than [`MIN_CHART_METRICS`] metrics exist. A
/// missing chart score falls back to the first number in the display value,
/// clamped to `[0, 100]`, and finally to a neutral 50.
#[must_use]
pub fn chart(report: &ComparisonReport) -> Option<Chart<'_>> {
    let data = &report.comparison;
    let metrics: Vec<&Metric> = data.metrics.iter().take(MAX_CHART_METRICS).collect();
    if metrics.len() < MIN_CHART_METRICS {
        return None;
    }

    let series = report
        .items
        .iter()
        .map(|item| ChartSeries {
            item: item.name(),
            scores: metrics
                .iter()
                .map(|metric| {
                    data.chart_scores
                        .get(&metric.name)
                        .and_then(|scores| scores.get(item.name()))
                        .copied()
                        .unwrap_or_else(|| {
                            fallback_score(data.value(item.name(), &metric.name))
                        })
                })
                .collect(),
        })
        .collect();

    Some(Chart {
        labels: metrics.iter().map(|m| m.name.as_str()).collect(),
        series,
    })
}

fn fallback_score(display: Option<&str>) -> f64 {
    display
        .and_then(|v| FIRST_NUMBER.find(v))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .map_or(NEUTRAL_SCORE, |n| n.clamp(0.0, 100.0))
}

/// Item → image URL pairs, in item order, only when every item has an image.
#[must_use]
pub fn gallery(report: &ComparisonReport) -> Option<Vec<(&str, &str)>> {
    report
        .items
        .iter()
        .map(|item| {
            report
                .images
                .get(item.name())
                .map(|url| (item.name(), url.as_str()))
        })
        .collect()
}
