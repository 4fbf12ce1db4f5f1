//! Combined process analysis: stability, capability and distribution.
//!
//! Runs the individuals chart, an optional capability study and a
//! probability plot over one series, then rates the process as a whole.
//!
//! # Overall status
//!
//! | Stable | Capability | Distribution fits | Status |
//! |--------|------------|-------------------|--------|
//! | yes | capable | yes | Excellent |
//! | yes | capable or marginal | any | Good |
//! | yes | other | any | StableButNeedsImprovement |
//! | no | any | any | NeedsSignificantImprovement |
//!
//! A process is stable when no observation lies beyond the control limits.

use serde::{Deserialize, Serialize};
use u_numflow::stats;

use crate::capability::{process_capability, CapabilityReport, SpecLimits};
use crate::distribution::{probability_plot, DistributionKind, ProbabilityPlot};
use crate::error::{AnalysisError, Result};
use crate::interpret::{ControlStatus, CPK_CAPABLE, CPK_MARGINAL};
use crate::spc::{individuals_chart, IndividualsChart};
use crate::validate::{MIN_CAPABILITY_POINTS, MIN_CONTROL_CHART_POINTS};
use crate::value::StatValue;

/// Correlation at or above which a non-normal fit is accepted.
pub const FIT_CORRELATION_MIN: f64 = 0.95;
/// Anderson-Darling p-value above which normality is accepted.
pub const NORMALITY_ALPHA: f64 = 0.05;

/// Descriptive statistics of the analysed series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessSummary {
    pub sample_size: usize,
    pub minimum: f64,
    pub maximum: f64,
    pub mean: f64,
    /// Sample standard deviation (n-1).
    pub std_dev: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityStatus {
    Capable,
    Marginal,
    NotCapable,
    /// No specification limits were given.
    NotAssessed,
}

impl CapabilityStatus {
    pub fn from_cpk(cpk: StatValue) -> Self {
        if cpk.at_least(CPK_CAPABLE) {
            CapabilityStatus::Capable
        } else if cpk.at_least(CPK_MARGINAL) {
            CapabilityStatus::Marginal
        } else {
            CapabilityStatus::NotCapable
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionStatus {
    FitsAssumed,
    DoesNotFit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    Excellent,
    Good,
    StableButNeedsImprovement,
    NeedsSignificantImprovement,
}

/// Rating of the process as a whole.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallAssessment {
    pub stability_status: ControlStatus,
    pub capability_status: CapabilityStatus,
    pub distribution_status: DistributionStatus,
    pub overall_status: OverallStatus,
    pub recommendations: Vec<String>,
}

/// Result of a combined process analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessAnalysis {
    pub summary: ProcessSummary,
    pub stability: IndividualsChart,
    /// Present when specification limits were given.
    pub capability: Option<CapabilityReport>,
    pub distribution: ProbabilityPlot,
    pub assessment: OverallAssessment,
    pub interpretation: String,
}

/// Runs the three analyses over one series.
///
/// Any failing sub-analysis fails the whole call; no partial result is
/// returned.
///
/// # Errors
///
/// - `InsufficientData` below 3 observations, or below 10 when `spec` is given
/// - every error of [`individuals_chart`], [`process_capability`] and
///   [`probability_plot`]
///
/// # Examples
///
/// ```
/// use u_quality::capability::SpecLimits;
/// use u_quality::distribution::DistributionKind;
/// use u_quality::process::{process_analysis, OverallStatus};
///
/// let data = [10.0, 10.1, 9.9, 10.05, 9.95, 10.02, 9.98, 10.03, 9.97, 10.0];
/// let spec = SpecLimits::new(9.0, 11.0).unwrap();
/// let r = process_analysis(&data, Some(&spec), DistributionKind::Normal, 0.95).unwrap();
/// assert_eq!(r.assessment.overall_status, OverallStatus::Excellent);
/// ```
pub fn process_analysis(
    data: &[f64],
    spec: Option<&SpecLimits>,
    distribution: DistributionKind,
    confidence_level: f64,
) -> Result<ProcessAnalysis> {
    let required = if spec.is_some() {
        MIN_CAPABILITY_POINTS
    } else {
        MIN_CONTROL_CHART_POINTS
    };
    if data.len() < required {
        return Err(AnalysisError::insufficient_data("data", required, data.len()));
    }
    tracing::debug!(
        n = data.len(),
        with_spec = spec.is_some(),
        distribution = %distribution,
        "computing process analysis"
    );

    let stability = individuals_chart(data)?;
    let capability = spec.map(|s| process_capability(data, s)).transpose()?;
    let distribution_plot = probability_plot(data, distribution, confidence_level)?;
    let summary = summarize(data)?;

    let assessment = assess(&stability, capability.as_ref(), &distribution_plot);
    let interpretation = describe_process(&summary, &stability, capability.as_ref(), &distribution_plot);

    tracing::debug!(status = ?assessment.overall_status, "process analysis computed");

    Ok(ProcessAnalysis {
        summary,
        stability,
        capability,
        distribution: distribution_plot,
        assessment,
        interpretation,
    })
}

// ---------------------------------------------------------------------------
// Assessment
// ---------------------------------------------------------------------------

fn summarize(data: &[f64]) -> Result<ProcessSummary> {
    let mean = stats::mean(data)
        .ok_or_else(|| AnalysisError::invalid_value("data", "mean is undefined"))?;
    let std_dev = stats::std_dev(data).unwrap_or(0.0);
    let minimum = data.iter().copied().fold(f64::INFINITY, f64::min);
    let maximum = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Ok(ProcessSummary {
        sample_size: data.len(),
        minimum,
        maximum,
        mean,
        std_dev,
    })
}

fn distribution_fits(plot: &ProbabilityPlot) -> bool {
    match &plot.normality_test {
        Some(ad) => ad.p_value > NORMALITY_ALPHA,
        None => plot.fit.correlation >= FIT_CORRELATION_MIN,
    }
}

fn assess(
    chart: &IndividualsChart,
    capability: Option<&CapabilityReport>,
    plot: &ProbabilityPlot,
) -> OverallAssessment {
    let mut recommendations = Vec::new();

    let stable = chart.out_of_control.is_empty();
    if !stable {
        recommendations
            .push("Investigate and eliminate sources of special cause variation".to_string());
    }

    let capability_status = capability.map_or(CapabilityStatus::NotAssessed, |c| {
        CapabilityStatus::from_cpk(c.indices.cpk)
    });
    match capability_status {
        CapabilityStatus::Marginal => recommendations
            .push("Improve process capability through variation reduction".to_string()),
        CapabilityStatus::NotCapable => recommendations.push(
            "Significant process improvement required to meet specifications".to_string(),
        ),
        CapabilityStatus::NotAssessed => recommendations
            .push("Provide LSL and USL for capability assessment".to_string()),
        CapabilityStatus::Capable => {}
    }

    let distribution_status = if distribution_fits(plot) {
        DistributionStatus::FitsAssumed
    } else {
        recommendations
            .push("Consider alternative distribution or data transformation".to_string());
        DistributionStatus::DoesNotFit
    };

    let overall_status = match (stable, capability_status, distribution_status) {
        (true, CapabilityStatus::Capable, DistributionStatus::FitsAssumed) => {
            OverallStatus::Excellent
        }
        (true, CapabilityStatus::Capable | CapabilityStatus::Marginal, _) => OverallStatus::Good,
        (true, _, _) => OverallStatus::StableButNeedsImprovement,
        (false, _, _) => OverallStatus::NeedsSignificantImprovement,
    };

    if recommendations.is_empty() {
        recommendations.push(match overall_status {
            OverallStatus::Excellent => "Continue monitoring with control charts".to_string(),
            _ => "Implement systematic improvement methodology".to_string(),
        });
    }

    OverallAssessment {
        stability_status: chart.status,
        capability_status,
        distribution_status,
        overall_status,
        recommendations,
    }
}

fn describe_process(
    summary: &ProcessSummary,
    chart: &IndividualsChart,
    capability: Option<&CapabilityReport>,
    plot: &ProbabilityPlot,
) -> String {
    let mut parts = vec![format!(
        "Process analysis of {} measurements with mean value {:.4}.",
        summary.sample_size, summary.mean
    )];

    if chart.out_of_control.is_empty() {
        parts.push(
            "Process appears statistically stable with no out-of-control points detected."
                .to_string(),
        );
    } else {
        parts.push(format!(
            "Process shows instability with {} out-of-control points requiring investigation.",
            chart.out_of_control.len()
        ));
    }

    match capability {
        Some(c) => {
            let cpk = c.indices.cpk;
            parts.push(match CapabilityStatus::from_cpk(cpk) {
                CapabilityStatus::Capable => format!(
                    "Process is capable (Cpk = {cpk}) and meets specification requirements."
                ),
                CapabilityStatus::Marginal => format!(
                    "Process has marginal capability (Cpk = {cpk}) and may need improvement."
                ),
                _ => format!(
                    "Process is not capable (Cpk = {cpk}) and requires significant improvement."
                ),
            });
        }
        None => parts.push(
            "Capability analysis requires specification limits for assessment.".to_string(),
        ),
    }

    let verb = if distribution_fits(plot) {
        "follows"
    } else {
        "does not follow"
    };
    parts.push(match &plot.normality_test {
        Some(ad) => format!(
            "Data {verb} {} distribution (p-value = {:.4}).",
            plot.distribution, ad.p_value
        ),
        None => format!(
            "Data {verb} {} distribution (r = {:.4}).",
            plot.distribution, plot.fit.correlation
        ),
    });

    parts.join(" ")
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn assessment_is_consistent(
            data in proptest::collection::vec(50.0_f64..150.0, 10..60),
            half_width in 1.0_f64..200.0,
        ) {
            let mean = data.iter().sum::<f64>() / data.len() as f64;
            let spec = SpecLimits::new(mean - half_width, mean + half_width).expect("spec");
            let r = match process_analysis(&data, Some(&spec), DistributionKind::Normal, 0.95) {
                Ok(r) => r,
                Err(_) => return Ok(()),
            };
            prop_assert!(!r.assessment.recommendations.is_empty());
            prop_assert_eq!(
                r.assessment.overall_status == OverallStatus::NeedsSignificantImprovement,
                !r.stability.out_of_control.is_empty()
            );
            prop_assert!(r.summary.minimum <= r.summary.mean && r.summary.mean <= r.summary.maximum);
            prop_assert!(r.capability.is_some());

            let again = process_analysis(&data, Some(&spec), DistributionKind::Normal, 0.95)
                .expect("repeatable");
            prop_assert_eq!(r, again);
        }
    }
}
