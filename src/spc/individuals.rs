//! Individuals (I-MR) control chart.
//!
//! Monitors single time-ordered observations using the moving range of
//! consecutive observations to estimate process variability.
//!
//! # Algorithm
//!
//! 1. Moving ranges: MR_i = |x_i - x_{i-1}| for i = 1..n-1.
//! 2. Center line: X-bar = mean of the observations.
//! 3. sigma-hat = MR-bar / d2, with d2 = 1.128 for a range of two.
//! 4. I chart limits: X-bar ± 3 sigma-hat.
//! 5. MR chart limits: CL = MR-bar, UCL = D4 * MR-bar, LCL = 0.
//!
//! # Reference
//!
//! Montgomery, D.C. (2019). *Introduction to Statistical Quality Control*, 8th ed.,
//! Chapter 6: Control Charts for Variables.

use serde::Serialize;
use u_numflow::stats;

use super::chart::{
    ChartPoint, ControlLimits, MovingRangeLimits, RuleViolation, ViolationType, D2_MOVING_RANGE,
    D4_MOVING_RANGE,
};
use super::rules::{RunRule, WesternElectricRules};
use crate::error::{AnalysisError, Result};
use crate::interpret::{describe_control_chart, ControlStatus};

/// Minimum observations for a moving range to exist.
pub const MIN_OBSERVATIONS: usize = 2;

/// Result of an individuals chart computation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndividualsChart {
    pub sample_size: usize,
    /// I chart center line and limits.
    pub limits: ControlLimits,
    pub average_moving_range: f64,
    /// MR_1..MR_{n-1}; `moving_ranges[i]` belongs to observation `i + 1`.
    pub moving_ranges: Vec<f64>,
    pub moving_range_limits: MovingRangeLimits,
    /// 6 sigma-hat.
    pub natural_tolerance: f64,
    /// Indices of observations outside `[lcl, ucl]`.
    pub out_of_control: Vec<usize>,
    /// Every supplementary-rule window that fired.
    pub rule_violations: Vec<RuleViolation>,
    /// Observations annotated with the signals that involve them.
    pub points: Vec<ChartPoint>,
    pub status: ControlStatus,
    pub interpretation: String,
}

impl IndividualsChart {
    pub fn is_in_control(&self) -> bool {
        self.status == ControlStatus::InControl
    }
}

/// Computes an individuals chart over time-ordered observations.
///
/// The input order is the time order and is never changed.
///
/// # Errors
///
/// - `InsufficientData` if fewer than 2 observations
/// - `InvalidValue` if any observation is not finite
///
/// # Examples
///
/// ```
/// use u_quality::spc::individuals_chart;
///
/// let chart = individuals_chart(&[10.0, 12.0, 8.0, 11.0, 9.0]).unwrap();
/// assert!((chart.limits.center - 10.0).abs() < 1e-12);
/// assert!((chart.average_moving_range - 2.75).abs() < 1e-12);
/// assert!(chart.out_of_control.is_empty());
/// ```
pub fn individuals_chart(data: &[f64]) -> Result<IndividualsChart> {
    let n = data.len();
    if n < MIN_OBSERVATIONS {
        return Err(AnalysisError::insufficient_data("data", MIN_OBSERVATIONS, n));
    }
    if data.iter().any(|v| !v.is_finite()) {
        return Err(AnalysisError::invalid_value("data", "observations must be finite"));
    }
    tracing::debug!(n, "computing individuals chart");

    let moving_ranges: Vec<f64> = data.windows(2).map(|w| (w[1] - w[0]).abs()).collect();

    let x_bar = stats::mean(data)
        .ok_or_else(|| AnalysisError::invalid_value("data", "mean is undefined"))?;
    let mr_bar = stats::mean(&moving_ranges)
        .ok_or_else(|| AnalysisError::invalid_value("data", "moving range is undefined"))?;
    let sigma_hat = mr_bar / D2_MOVING_RANGE;

    // Zero moving ranges mean a constant series; its value is the exact
    // center, while the computed mean may be off by an ulp.
    let center = if mr_bar == 0.0 { data[0] } else { x_bar };
    let limits = ControlLimits::new(center, sigma_hat);
    let moving_range_limits = MovingRangeLimits {
        center: mr_bar,
        ucl: D4_MOVING_RANGE * mr_bar,
        lcl: 0.0,
    };

    let out_of_control: Vec<usize> = data
        .iter()
        .enumerate()
        .filter(|(_, &v)| limits.is_beyond(v))
        .map(|(i, _)| i)
        .collect();

    let rule_violations = WesternElectricRules.check(data, &limits);

    let mut points: Vec<ChartPoint> = data
        .iter()
        .enumerate()
        .map(|(i, &v)| ChartPoint {
            index: i,
            value: v,
            violations: Vec::new(),
        })
        .collect();
    for &i in &out_of_control {
        points[i].violations.push(ViolationType::BeyondLimits);
    }
    apply_violations(&mut points, &rule_violations);

    let status = ControlStatus::classify(out_of_control.len(), rule_violations.len());
    let interpretation = describe_control_chart(out_of_control.len(), rule_violations.len(), n);

    tracing::debug!(
        center,
        ucl = limits.ucl,
        lcl = limits.lcl,
        out_of_control = out_of_control.len(),
        rule_violations = rule_violations.len(),
        "individuals chart computed"
    );

    Ok(IndividualsChart {
        sample_size: n,
        limits,
        average_moving_range: mr_bar,
        moving_ranges,
        moving_range_limits,
        natural_tolerance: 6.0 * sigma_hat,
        out_of_control,
        rule_violations,
        points,
        status,
        interpretation,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Annotates every point covered by a fired window, once per rule.
fn apply_violations(points: &mut [ChartPoint], violations: &[RuleViolation]) {
    for violation in violations {
        for &idx in &violation.points {
            if let Some(point) = points.get_mut(idx) {
                if !point.violations.contains(&violation.rule) {
                    point.violations.push(violation.rule);
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
