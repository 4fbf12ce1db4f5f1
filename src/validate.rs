//! Input validation: resolves raw input shapes into canonical entities.
//!
//! Raw input arrives as one of three closed shapes ([`RawInput`]). The
//! validator resolves the shape once, discards non-finite entries and
//! enforces the per-analysis minimum sizes, so that the engines only ever
//! see clean [`MeasurementSeries`], [`GroupedSeries`] or [`CategoryTally`]
//! values.
//!
//! # Examples
//!
//! ```
//! use u_quality::validate::{validate_series, RawInput, MIN_CONTROL_CHART_POINTS};
//!
//! let raw = RawInput::RawSequence(vec![10.0, f64::NAN, 12.0, 8.0]);
//! let series = validate_series(&raw, MIN_CONTROL_CHART_POINTS).unwrap();
//! assert_eq!(series.as_slice(), &[10.0, 12.0, 8.0]);
//! ```

use std::collections::HashSet;
use std::ops::Deref;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AnalysisError, Result};

/// Minimum valid points for an individuals control chart.
pub const MIN_CONTROL_CHART_POINTS: usize = 3;
/// Minimum valid points for a capability study.
pub const MIN_CAPABILITY_POINTS: usize = 10;
/// Minimum valid points per ANOVA group.
pub const MIN_GROUP_POINTS: usize = 2;
/// Minimum number of ANOVA groups.
pub const MIN_GROUPS: usize = 2;
/// Minimum number of Pareto categories.
pub const MIN_CATEGORIES: usize = 2;
/// Minimum valid points for a probability plot.
pub const MIN_DISTRIBUTION_POINTS: usize = 3;

/// The closed set of raw input shapes accepted at the boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum RawInput {
    /// A plain ordered sequence of measurements.
    RawSequence(Vec<f64>),
    /// Labelled collections of measurements (label order preserved).
    LabeledRecords(Vec<(String, Vec<f64>)>),
    /// Labelled scalar tallies (label order preserved).
    CategoryMapping(Vec<(String, f64)>),
}

impl RawInput {
    /// Short name of the shape, used in error messages.
    pub fn shape_name(&self) -> &'static str {
        match self {
            RawInput::RawSequence(_) => "raw sequence",
            RawInput::LabeledRecords(_) => "labeled records",
            RawInput::CategoryMapping(_) => "category mapping",
        }
    }

    /// Resolves a JSON value into one of the raw shapes.
    ///
    /// - an array of numbers becomes [`RawInput::RawSequence`]
    /// - an object whose values are arrays becomes [`RawInput::LabeledRecords`]
    /// - an object whose values are numbers becomes [`RawInput::CategoryMapping`]
    /// - an object whose only key is `"data"`, holding an array or object,
    ///   is resolved through that key; otherwise `"data"` is an ordinary label
    ///
    /// `null` entries are kept as NaN and discarded later as non-finite.
    /// Anything else is a schema error.
    pub fn from_json(value: &Value) -> Result<Self> {
        match value {
            Value::Array(items) => Ok(RawInput::RawSequence(json_numbers("data", items)?)),
            Value::Object(map) => {
                if let Some(inner) = envelope(map) {
                    return RawInput::from_json(inner);
                }
                if map.is_empty() {
                    return Err(AnalysisError::schema("data", "empty object"));
                }
                if map.values().all(Value::is_array) {
                    let mut records = Vec::with_capacity(map.len());
                    for (label, v) in map {
                        let items = v.as_array().map(Vec::as_slice).unwrap_or(&[]);
                        records.push((label.clone(), json_numbers(label, items)?));
                    }
                    Ok(RawInput::LabeledRecords(records))
                } else if map.values().all(|v| v.is_number() || v.is_null()) {
                    let entries = map
                        .iter()
                        .map(|(label, v)| (label.clone(), v.as_f64().unwrap_or(f64::NAN)))
                        .collect();
                    Ok(RawInput::CategoryMapping(entries))
                } else {
                    Err(AnalysisError::schema(
                        "data",
                        "object values must be all arrays or all numbers",
                    ))
                }
            }
            other => Err(AnalysisError::schema(
                "data",
                format!("expected an array or object, got {}", json_kind(other)),
            )),
        }
    }
}

/// The payload of a `{"data": ...}` wrapper, if `map` is one.
fn envelope(map: &serde_json::Map<String, Value>) -> Option<&Value> {
    match map.get("data") {
        Some(inner) if map.len() == 1 && (inner.is_array() || inner.is_object()) => Some(inner),
        _ => None,
    }
}

fn json_numbers(field: &str, items: &[Value]) -> Result<Vec<f64>> {
    items
        .iter()
        .map(|item| match item {
            Value::Number(n) => n
                .as_f64()
                .ok_or_else(|| AnalysisError::schema(field, "number out of range")),
            Value::Null => Ok(f64::NAN),
            other => Err(AnalysisError::schema(
                field,
                format!("expected a number, got {}", json_kind(other)),
            )),
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ---------------------------------------------------------------------------
// Canonical entities
// ---------------------------------------------------------------------------

/// Ordered, immutable sequence of finite measurements.
///
/// Order is time order; nothing downstream of the validator re-sorts it
/// in place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasurementSeries {
    values: Vec<f64>,
}

impl MeasurementSeries {
    /// Builds a series from raw values, discarding non-finite entries.
    ///
    /// Fails with `InsufficientData` (naming `field`) when fewer than
    /// `min_points` finite values remain.
    pub fn new(field: &str, raw: &[f64], min_points: usize) -> Result<Self> {
        let values: Vec<f64> = raw.iter().copied().filter(|v| v.is_finite()).collect();
        if values.len() < min_points {
            tracing::warn!(field, required = min_points, actual = values.len(), "insufficient data");
            return Err(AnalysisError::insufficient_data(field, min_points, values.len()));
        }
        Ok(Self { values })
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.values
    }
}

impl Deref for MeasurementSeries {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.values
    }
}

/// One labelled group of an ANOVA input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    pub label: String,
    pub series: MeasurementSeries,
}

/// Labelled groups with unique labels; at least two groups of two points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedSeries {
    groups: Vec<Group>,
}

impl GroupedSeries {
    /// Builds grouped data from labelled raw collections.
    pub fn new(records: &[(String, Vec<f64>)]) -> Result<Self> {
        if records.len() < MIN_GROUPS {
            tracing::warn!(groups = records.len(), "insufficient groups");
            return Err(AnalysisError::InsufficientGroups {
                required: MIN_GROUPS,
                actual: records.len(),
            });
        }
        ensure_unique_labels(records.iter().map(|(l, _)| l.as_str()))?;

        let groups = records
            .iter()
            .map(|(label, raw)| {
                let series =
                    MeasurementSeries::new(&format!("group '{label}'"), raw, MIN_GROUP_POINTS)?;
                Ok(Group {
                    label: label.clone(),
                    series,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { groups })
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of observations over all groups.
    pub fn total_observations(&self) -> usize {
        self.groups.iter().map(|g| g.series.len()).sum()
    }
}

/// Labelled non-negative tallies; at least two entries with a positive sum.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTally {
    entries: Vec<(String, f64)>,
}

impl CategoryTally {
    /// Builds a tally, discarding entries whose value is not finite.
    pub fn new(entries: &[(String, f64)]) -> Result<Self> {
        ensure_unique_labels(entries.iter().map(|(l, _)| l.as_str()))?;

        let mut kept = Vec::with_capacity(entries.len());
        for (label, value) in entries {
            if !value.is_finite() {
                continue;
            }
            if *value < 0.0 {
                tracing::warn!(category = %label, value, "negative tally");
                return Err(AnalysisError::invalid_value(
                    format!("category '{label}'"),
                    format!("value must be non-negative, got {value}"),
                ));
            }
            kept.push((label.clone(), *value));
        }

        if kept.len() < MIN_CATEGORIES {
            tracing::warn!(categories = kept.len(), "insufficient categories");
            return Err(AnalysisError::InsufficientCategories {
                required: MIN_CATEGORIES,
                actual: kept.len(),
            });
        }
        let total: f64 = kept.iter().map(|(_, v)| v).sum();
        if total <= 0.0 {
            return Err(AnalysisError::degenerate("data", "all category values are zero"));
        }
        Ok(Self { entries: kept })
    }

    /// Counts label occurrences, keeping first-seen order.
    pub fn from_occurrences<I, S>(labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut counts: Vec<(String, f64)> = Vec::new();
        for label in labels {
            let label = label.as_ref();
            match counts.iter_mut().find(|(l, _)| l == label) {
                Some((_, c)) => *c += 1.0,
                None => counts.push((label.to_string(), 1.0)),
            }
        }
        Self::new(&counts)
    }

    pub fn entries(&self) -> &[(String, f64)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.entries.iter().map(|(_, v)| v).sum()
    }
}

fn ensure_unique_labels<'a>(labels: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for label in labels {
        if !seen.insert(label) {
            return Err(AnalysisError::schema(
                "data",
                format!("duplicate label '{label}'"),
            ));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Shape resolution
// ---------------------------------------------------------------------------

/// Resolves a raw input to a single measurement series.
///
/// Accepts a raw sequence, or labelled records holding exactly one
/// collection.
pub fn validate_series(input: &RawInput, min_points: usize) -> Result<MeasurementSeries> {
    match input {
        RawInput::RawSequence(values) => MeasurementSeries::new("data", values, min_points),
        RawInput::LabeledRecords(records) if records.len() == 1 => {
            let (label, values) = &records[0];
            MeasurementSeries::new(label, values, min_points)
        }
        other => Err(AnalysisError::schema(
            "data",
            format!("expected a numeric sequence, got {}", other.shape_name()),
        )),
    }
}

/// Resolves a raw input to grouped data for variance analysis.
pub fn validate_groups(input: &RawInput) -> Result<GroupedSeries> {
    match input {
        RawInput::LabeledRecords(records) => GroupedSeries::new(records),
        other => Err(AnalysisError::schema(
            "data",
            format!("expected labelled groups, got {}", other.shape_name()),
        )),
    }
}

/// Resolves a raw input to a category tally for Pareto ranking.
pub fn validate_tally(input: &RawInput) -> Result<CategoryTally> {
    match input {
        RawInput::CategoryMapping(entries) => CategoryTally::new(entries),
        other => Err(AnalysisError::schema(
            "data",
            format!("expected a category mapping, got {}", other.shape_name()),
        )),
    }
}
