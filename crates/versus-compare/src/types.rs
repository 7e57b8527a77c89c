use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::SynthesisError;

/// What the caller asked to compare.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComparisonRequest {
    /// Raw item names as typed; blanks are dropped during validation.
    pub items: Vec<String>,
    /// Extra metrics the user wants covered.
    pub custom_params: Vec<String>,
    /// Use only `custom_params` instead of adding them to the model's own picks.
    pub custom_only: bool,
}

/// One compared item. Lookups after spelling correction use `corrected`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    pub original: String,
    pub corrected: String,
}

impl Item {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.corrected
    }

    /// `true` when correction changed more than letter case.
    #[must_use]
    pub fn was_corrected(&self) -> bool {
        self.original.to_lowercase() != self.corrected.to_lowercase()
    }
}

/// Grounded research collected for one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResearchResult {
    pub item: String,
    /// Research text with the image marker removed.
    pub content: String,
    pub citations: Vec<String>,
    pub image_url: Option<String>,
}

/// A cited URL shown in the sources list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Source {
    pub title: String,
    pub url: String,
    pub item: String,
}

/// A comparison dimension chosen by the synthesizer.
///
/// The model sometimes returns bare strings instead of objects; those become
/// objective metrics with an empty description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawMetric", rename_all = "camelCase")]
pub struct Metric {
    pub name: String,
    pub description: String,
    pub is_objective: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawMetric {
    Name(String),
    Full {
        name: String,
        #[serde(default)]
        description: Option<String>,
        #[serde(default, rename = "isObjective")]
        is_objective: Option<bool>,
    },
}

impl From<RawMetric> for Metric {
    fn from(raw: RawMetric) -> Self {
        match raw {
            RawMetric::Name(name) => Self {
                name,
                description: String::new(),
                is_objective: true,
            },
            RawMetric::Full {
                name,
                description,
                is_objective,
            } => Self {
                name,
                description: description.unwrap_or_default(),
                is_objective: is_objective.unwrap_or(true),
            },
        }
    }
}

/// A metric the synthesizer could not settle from the initial research.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowUpRequest {
    pub metric: String,
    #[serde(default)]
    pub query: String,
}

/// Structured output of the synthesis step.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonData {
    /// Display order is the order returned by the model.
    pub metrics: Vec<Metric>,
    /// item → metric → display value.
    pub comparison: BTreeMap<String, BTreeMap<String, String>>,
    /// metric → item → score in `[0, 100]`, higher is better.
    pub chart_scores: BTreeMap<String, BTreeMap<String, f64>>,
    /// metric → winning item, `None` when subjective.
    pub winners: BTreeMap<String, Option<String>>,
    pub needs_more_info: Vec<FollowUpRequest>,
}

impl ComparisonData {
    /// Builds comparison data from the model's JSON object.
    ///
    /// `metrics` and `comparison` are required. Everything else is optional
    /// and malformed entries are skipped rather than rejected. Winners and
    /// chart scores for metrics not listed in `metrics` are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`SynthesisError::InvalidStructure`] if the value is not an
    /// object or lacks `metrics`/`comparison`.
    pub fn from_value(value: Value) -> Result<Self, SynthesisError> {
        let Value::Object(mut root) = value else {
            return Err(invalid("response is not a JSON object"));
        };

        let metrics = match root.remove("metrics") {
            Some(Value::Array(entries)) => entries
                .into_iter()
                .filter_map(|entry| match serde_json::from_value::<Metric>(entry) {
                    Ok(metric) => Some(metric),
                    Err(e) => {
                        tracing::debug!(error = %e, "skipping malformed metric entry");
                        None
                    }
                })
                .collect::<Vec<_>>(),
            Some(Value::Null) | None => return Err(invalid("missing \"metrics\"")),
            Some(_) => return Err(invalid("\"metrics\" is not an array")),
        };

        let comparison = match root.remove("comparison") {
            Some(Value::Object(items)) => items
                .into_iter()
                .map(|(item, cells)| (item, display_cells(cells)))
                .collect(),
            Some(Value::Null) | None => return Err(invalid("missing \"comparison\"")),
            Some(_) => return Err(invalid("\"comparison\" is not an object")),
        };

        let chart_scores = match root.remove("chartScores") {
            Some(Value::Object(by_metric)) => by_metric
                .into_iter()
                .map(|(metric, scores)| (metric, numeric_cells(scores)))
                .collect(),
            _ => BTreeMap::new(),
        };

        let winners = match root.remove("winners") {
            Some(Value::Object(by_metric)) => by_metric
                .into_iter()
                .map(|(metric, winner)| match winner {
                    Value::String(name) if name != "null" && !name.trim().is_empty() => {
                        (metric, Some(name))
                    }
                    _ => (metric, None),
                })
                .collect(),
            _ => BTreeMap::new(),
        };

        let needs_more_info = match root.remove("needsMoreInfo") {
            Some(Value::Array(entries)) => entries
                .into_iter()
                .filter_map(|entry| serde_json::from_value::<FollowUpRequest>(entry).ok())
                .collect(),
            _ => Vec::new(),
        };

        let mut data = Self {
            metrics,
            comparison,
            chart_scores,
            winners,
            needs_more_info,
        };
        data.drop_unknown_metrics();
        Ok(data)
    }

    #[must_use]
    pub fn has_metric(&self, name: &str) -> bool {
        self.metrics.iter().any(|m| m.name == name)
    }

    /// Display value for one cell, if the model supplied a non-empty one.
    #[must_use]
    pub fn value(&self, item: &str, metric: &str) -> Option<&str> {
        self.comparison
            .get(item)
            .and_then(|cells| cells.get(metric))
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    #[must_use]
    pub fn winner(&self, metric: &str) -> Option<&str> {
        self.winners.get(metric).and_then(|w| w.as_deref())
    }

    fn drop_unknown_metrics(&mut self) {
        let known: HashSet<String> = self.metrics.iter().map(|m| m.name.clone()).collect();
        self.winners.retain(|metric, _| {
            let keep = known.contains(metric);
            if !keep {
                tracing::debug!(metric = %metric, "dropping winner for unlisted metric");
            }
            keep
        });
        self.chart_scores.retain(|metric, _| {
            let keep = known.contains(metric);
            if !keep {
                tracing::debug!(metric = %metric, "dropping chart scores for unlisted metric");
            }
            keep
        });
    }
}

fn invalid(reason: &str) -> SynthesisError {
    SynthesisError::InvalidStructure {
        reason: reason.to_owned(),
    }
}

/// Converts a metric → value object into display strings. Nulls are skipped.
fn display_cells(cells: Value) -> BTreeMap<String, String> {
    let Value::Object(cells) = cells else {
        return BTreeMap::new();
    };
    cells
        .into_iter()
        .filter_map(|(metric, value)| {
            let text = match value {
                Value::Null => return None,
                Value::String(s) => s,
                other => other.to_string(),
            };
            Some((metric, text))
        })
        .collect()
}

/// Keeps numeric scores (and numeric strings) from an item → score object.
fn numeric_cells(scores: Value) -> BTreeMap<String, f64> {
    let Value::Object(scores) = scores else {
        return BTreeMap::new();
    };
    scores
        .into_iter()
        .filter_map(|(item, score)| {
            let n = match score {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            }?;
            n.is_finite().then_some((item, n))
        })
        .collect()
}

/// Final artifact of a successful comparison run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub items: Vec<Item>,
    pub comparison: ComparisonData,
    /// Cited URLs, unique by URL, in first-seen order.
    pub sources: Vec<Source>,
    /// item → image URL, for items whose research carried one.
    pub images: BTreeMap<String, String>,
    pub follow_up_searches: usize,
}

impl ComparisonReport {
    #[must_use]
    pub fn item_names(&self) -> Vec<&str> {
        self.items.iter().map(Item::name).collect()
    }
}
