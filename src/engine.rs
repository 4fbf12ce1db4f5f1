//! Request dispatch: one entry point for every analysis.
//!
//! An [`AnalysisRequest`] names the analysis, carries its raw input and
//! its parameters. [`run`] validates everything first and only then
//! computes, so a failing request never produces a partial report.
//!
//! # Examples
//!
//! ```
//! use u_quality::engine::{run_json, AnalysisReport, AnalysisRequest, run};
//!
//! let request = AnalysisRequest::from_json_str(
//!     r#"{"analysis": "pareto", "data": {"A": 40, "B": 30, "C": 20, "D": 10}}"#,
//! ).unwrap();
//! match run(&request).unwrap() {
//!     AnalysisReport::Pareto(p) => assert_eq!(p.vital_few, vec!["A", "B", "C"]),
//!     other => panic!("unexpected report {:?}", other.kind()),
//! }
//!
//! let json = run_json(r#"{"analysis": "i_chart", "data": [10, 12, 11, 13, 10]}"#).unwrap();
//! assert_eq!(json["analysis"], "i_chart");
//! ```

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::anova::{one_way_anova, AnovaResult};
use crate::capability::{process_capability, CapabilityReport, SpecLimits};
use crate::config::{
    check_alpha, check_confidence_level, check_pareto_threshold, AnalysisConfig,
    DEFAULT_ALPHA, DEFAULT_CONFIDENCE_LEVEL, DEFAULT_PARETO_THRESHOLD,
};
use crate::distribution::{probability_plot, DistributionKind, ProbabilityPlot};
use crate::error::{AnalysisError, Result};
use crate::pareto::{pareto_analysis, ParetoAnalysis};
use crate::process::{process_analysis, ProcessAnalysis};
use crate::spc::{individuals_chart, IndividualsChart};
use crate::validate::{
    validate_groups, validate_series, validate_tally, RawInput, MIN_CAPABILITY_POINTS,
    MIN_CATEGORIES, MIN_CONTROL_CHART_POINTS, MIN_DISTRIBUTION_POINTS, MIN_GROUP_POINTS,
};

/// The analyses the engine can dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    IChart,
    Capability,
    Anova,
    Pareto,
    ProbabilityPlot,
    ProcessAnalysis,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 6] = [
        AnalysisKind::IChart,
        AnalysisKind::Capability,
        AnalysisKind::Anova,
        AnalysisKind::Pareto,
        AnalysisKind::ProbabilityPlot,
        AnalysisKind::ProcessAnalysis,
    ];

    /// Wire name of the analysis.
    pub fn name(self) -> &'static str {
        match self {
            AnalysisKind::IChart => "i_chart",
            AnalysisKind::Capability => "capability",
            AnalysisKind::Anova => "anova",
            AnalysisKind::Pareto => "pareto",
            AnalysisKind::ProbabilityPlot => "probability_plot",
            AnalysisKind::ProcessAnalysis => "process_analysis",
        }
    }

    /// Minimum sample size: valid points per series, per group for
    /// `anova`, categories for `pareto`.
    ///
    /// `process_analysis` needs [`MIN_CAPABILITY_POINTS`] once
    /// specification limits are given.
    pub fn min_points(self) -> usize {
        match self {
            AnalysisKind::IChart | AnalysisKind::ProcessAnalysis => MIN_CONTROL_CHART_POINTS,
            AnalysisKind::Capability => MIN_CAPABILITY_POINTS,
            AnalysisKind::Anova => MIN_GROUP_POINTS,
            AnalysisKind::Pareto => MIN_CATEGORIES,
            AnalysisKind::ProbabilityPlot => MIN_DISTRIBUTION_POINTS,
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn default_alpha() -> f64 {
    DEFAULT_ALPHA
}

fn default_threshold() -> f64 {
    DEFAULT_PARETO_THRESHOLD
}

fn default_confidence() -> f64 {
    DEFAULT_CONFIDENCE_LEVEL
}

/// Accepts either a tagged [`RawInput`] or a bare JSON shape.
fn raw_input<'de, D>(deserializer: D) -> std::result::Result<RawInput, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if let Ok(tagged) = serde_json::from_value::<RawInput>(value.clone()) {
        return Ok(tagged);
    }
    RawInput::from_json(&value).map_err(serde::de::Error::custom)
}

/// One analysis request.
///
/// On the wire the analysis is selected by the `"analysis"` key; the
/// input goes under `"data"` as an array, an object of arrays or an
/// object of numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "analysis", rename_all = "snake_case")]
pub enum AnalysisRequest {
    IChart {
        #[serde(deserialize_with = "raw_input")]
        data: RawInput,
    },
    Capability {
        #[serde(deserialize_with = "raw_input")]
        data: RawInput,
        lsl: f64,
        usl: f64,
        #[serde(default)]
        target: Option<f64>,
    },
    Anova {
        #[serde(deserialize_with = "raw_input")]
        data: RawInput,
        #[serde(default = "default_alpha")]
        alpha: f64,
    },
    Pareto {
        #[serde(deserialize_with = "raw_input")]
        data: RawInput,
        #[serde(default = "default_threshold")]
        threshold: f64,
    },
    ProbabilityPlot {
        #[serde(deserialize_with = "raw_input")]
        data: RawInput,
        #[serde(default)]
        distribution: DistributionKind,
        #[serde(default = "default_confidence")]
        confidence_level: f64,
    },
    ProcessAnalysis {
        #[serde(deserialize_with = "raw_input")]
        data: RawInput,
        #[serde(default)]
        lsl: Option<f64>,
        #[serde(default)]
        usl: Option<f64>,
        #[serde(default)]
        target: Option<f64>,
        #[serde(default)]
        distribution: DistributionKind,
        #[serde(default = "default_confidence")]
        confidence_level: f64,
    },
}

impl AnalysisRequest {
    /// Parses a JSON request. Shape and type problems are schema errors.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| AnalysisError::schema("request", e.to_string()))
    }

    pub fn i_chart(data: RawInput) -> Self {
        AnalysisRequest::IChart { data }
    }

    pub fn capability(data: RawInput, spec: SpecLimits) -> Self {
        AnalysisRequest::Capability {
            data,
            lsl: spec.lsl,
            usl: spec.usl,
            target: spec.target,
        }
    }

    pub fn anova(data: RawInput, config: &AnalysisConfig) -> Self {
        AnalysisRequest::Anova {
            data,
            alpha: config.alpha,
        }
    }

    pub fn pareto(data: RawInput, config: &AnalysisConfig) -> Self {
        AnalysisRequest::Pareto {
            data,
            threshold: config.pareto_threshold,
        }
    }

    pub fn probability_plot(data: RawInput, config: &AnalysisConfig) -> Self {
        AnalysisRequest::ProbabilityPlot {
            data,
            distribution: config.distribution,
            confidence_level: config.confidence_level,
        }
    }

    pub fn process_analysis(
        data: RawInput,
        spec: Option<SpecLimits>,
        config: &AnalysisConfig,
    ) -> Self {
        AnalysisRequest::ProcessAnalysis {
            data,
            lsl: spec.map(|s| s.lsl),
            usl: spec.map(|s| s.usl),
            target: spec.and_then(|s| s.target),
            distribution: config.distribution,
            confidence_level: config.confidence_level,
        }
    }

    pub fn kind(&self) -> AnalysisKind {
        match self {
            AnalysisRequest::IChart { .. } => AnalysisKind::IChart,
            AnalysisRequest::Capability { .. } => AnalysisKind::Capability,
            AnalysisRequest::Anova { .. } => AnalysisKind::Anova,
            AnalysisRequest::Pareto { .. } => AnalysisKind::Pareto,
            AnalysisRequest::ProbabilityPlot { .. } => AnalysisKind::ProbabilityPlot,
            AnalysisRequest::ProcessAnalysis { .. } => AnalysisKind::ProcessAnalysis,
        }
    }

    pub fn data(&self) -> &RawInput {
        match self {
            AnalysisRequest::IChart { data }
            | AnalysisRequest::Capability { data, .. }
            | AnalysisRequest::Anova { data, .. }
            | AnalysisRequest::Pareto { data, .. }
            | AnalysisRequest::ProbabilityPlot { data, .. }
            | AnalysisRequest::ProcessAnalysis { data, .. } => data,
        }
    }
}

/// Result of a dispatched analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "analysis", content = "result", rename_all = "snake_case")]
pub enum AnalysisReport {
    IChart(IndividualsChart),
    Capability(CapabilityReport),
    Anova(AnovaResult),
    Pareto(ParetoAnalysis),
    ProbabilityPlot(ProbabilityPlot),
    ProcessAnalysis(ProcessAnalysis),
}

impl AnalysisReport {
    pub fn kind(&self) -> AnalysisKind {
        match self {
            AnalysisReport::IChart(_) => AnalysisKind::IChart,
            AnalysisReport::Capability(_) => AnalysisKind::Capability,
            AnalysisReport::Anova(_) => AnalysisKind::Anova,
            AnalysisReport::Pareto(_) => AnalysisKind::Pareto,
            AnalysisReport::ProbabilityPlot(_) => AnalysisKind::ProbabilityPlot,
            AnalysisReport::ProcessAnalysis(_) => AnalysisKind::ProcessAnalysis,
        }
    }

    /// Plain-language summary carried by every report.
    pub fn interpretation(&self) -> &str {
        match self {
            AnalysisReport::IChart(r) => &r.interpretation,
            AnalysisReport::Capability(r) => &r.interpretation,
            AnalysisReport::Anova(r) => &r.interpretation,
            AnalysisReport::Pareto(r) => &r.interpretation,
            AnalysisReport::ProbabilityPlot(r) => &r.interpretation,
            AnalysisReport::ProcessAnalysis(r) => &r.interpretation,
        }
    }

    pub fn to_json(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(|e| AnalysisError::schema("report", e.to_string()))
    }
}

/// Specification limits from optional request fields.
fn spec_from_parts(lsl: f64, usl: f64, target: Option<f64>) -> Result<SpecLimits> {
    let spec = SpecLimits::new(lsl, usl)?;
    match target {
        Some(t) => spec.with_target(t),
        None => Ok(spec),
    }
}

/// Validates a request and runs the analysis it names.
///
/// # Errors
///
/// Every validation error (schema, sizes, parameters, specification
/// limits) is raised before any statistic is computed; engine errors
/// such as `Domain` or `Degenerate` follow.
pub fn run(request: &AnalysisRequest) -> Result<AnalysisReport> {
    let kind = request.kind();
    tracing::info!(analysis = %kind, input = request.data().shape_name(), "running analysis");

    let report = match request {
        AnalysisRequest::IChart { data } => {
            let series = validate_series(data, kind.min_points())?;
            AnalysisReport::IChart(individuals_chart(&series)?)
        }
        AnalysisRequest::Capability {
            data,
            lsl,
            usl,
            target,
        } => {
            let spec = spec_from_parts(*lsl, *usl, *target)?;
            let series = validate_series(data, kind.min_points())?;
            AnalysisReport::Capability(process_capability(&series, &spec)?)
        }
        AnalysisRequest::Anova { data, alpha } => {
            check_alpha(*alpha)?;
            let groups = validate_groups(data)?;
            AnalysisReport::Anova(one_way_anova(&groups, *alpha)?)
        }
        AnalysisRequest::Pareto { data, threshold } => {
            check_pareto_threshold(*threshold)?;
            let tally = validate_tally(data)?;
            AnalysisReport::Pareto(pareto_analysis(&tally, *threshold)?)
        }
        AnalysisRequest::ProbabilityPlot {
            data,
            distribution,
            confidence_level,
        } => {
            check_confidence_level(*confidence_level)?;
            let series = validate_series(data, kind.min_points())?;
            AnalysisReport::ProbabilityPlot(probability_plot(
                &series,
                *distribution,
                *confidence_level,
            )?)
        }
        AnalysisRequest::ProcessAnalysis {
            data,
            lsl,
            usl,
            target,
            distribution,
            confidence_level,
        } => {
            check_confidence_level(*confidence_level)?;
            let spec = match (lsl, usl) {
                (Some(l), Some(u)) => Some(spec_from_parts(*l, *u, *target)?),
                (None, None) => None,
                _ => {
                    return Err(AnalysisError::invalid_specification(
                        "both LSL and USL are required for capability assessment",
                    ))
                }
            };
            let min = if spec.is_some() {
                MIN_CAPABILITY_POINTS
            } else {
                kind.min_points()
            };
            let series = validate_series(data, min)?;
            AnalysisReport::ProcessAnalysis(process_analysis(
                &series,
                spec.as_ref(),
                *distribution,
                *confidence_level,
            )?)
        }
    };

    tracing::info!(analysis = %kind, "analysis completed");
    Ok(report)
}

/// Parses a JSON request, runs it and returns the report as JSON.
pub fn run_json(json: &str) -> Result<Value> {
    let request = AnalysisRequest::from_json_str(json)?;
    run(&request)?.to_json()
}
