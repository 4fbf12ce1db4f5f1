//! Core control chart types.
//!
//! Defines the building blocks shared by the individuals chart and the run
//! rules: control limits, chart points with violation annotations, and
//! the control chart factor tables.
//!
//! # References
//!
//! - Montgomery, D.C. (2019). *Introduction to Statistical Quality Control*, 8th ed.
//! - ASTM E2587: Standard Practice for Use of Control Charts

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Control chart factor tables (ASTM E2587), indexed by subgroup size n=2..10
// Index 0 corresponds to n=2.
// ---------------------------------------------------------------------------

/// d2 factors (mean of the range distribution) for estimating sigma from R-bar.
///
/// sigma-hat = R-bar / d2.
pub const D2: [f64; 9] = [1.128, 1.693, 2.059, 2.326, 2.534, 2.704, 2.847, 2.970, 3.078];

/// D4 factors for the range chart upper control limit.
///
/// UCL_R = D4 * R-bar.
pub const D4: [f64; 9] = [3.267, 2.575, 2.282, 2.114, 2.004, 1.924, 1.864, 1.816, 1.777];

/// d2 for a moving range of two consecutive observations.
pub const D2_MOVING_RANGE: f64 = D2[0];

/// D4 for a moving range of two consecutive observations.
pub const D4_MOVING_RANGE: f64 = D4[0];

/// Width of the control limits in units of sigma-hat.
pub const LIMIT_SIGMAS: f64 = 3.0;

/// Control limits for the individuals chart.
///
/// # Invariants
///
/// - `ucl - center == center - lcl` (symmetric around the center line)
/// - `sigma_hat >= 0`; when it is zero, `ucl == lcl == center`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlLimits {
    /// Center line (process mean).
    pub center: f64,
    /// Upper control limit (center + 3 sigma-hat).
    pub ucl: f64,
    /// Lower control limit (center - 3 sigma-hat).
    pub lcl: f64,
    /// Estimated process sigma.
    pub sigma_hat: f64,
}

impl ControlLimits {
    /// Limits at ±3 sigma-hat around `center`.
    pub fn new(center: f64, sigma_hat: f64) -> Self {
        let half_width = LIMIT_SIGMAS * sigma_hat;
        Self {
            center,
            ucl: center + half_width,
            lcl: center - half_width,
            sigma_hat,
        }
    }

    /// Upper and lower boundaries of the zone `k` sigma-hat from center.
    pub fn zone(&self, k: f64) -> (f64, f64) {
        (
            self.center + k * self.sigma_hat,
            self.center - k * self.sigma_hat,
        )
    }

    /// `true` if the value lies strictly outside `[lcl, ucl]`.
    pub fn is_beyond(&self, value: f64) -> bool {
        value > self.ucl || value < self.lcl
    }
}

/// Limits of the moving-range chart (LCL is always 0 for n=2).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovingRangeLimits {
    /// Average moving range.
    pub center: f64,
    /// D4 * MR-bar.
    pub ucl: f64,
    pub lcl: f64,
}

/// Kinds of special-cause signal detected on an individuals chart.
///
/// # Reference
///
/// Western Electric (1956). *Statistical Quality Control Handbook*.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationType {
    /// A single point beyond the 3-sigma control limits (rule 1).
    BeyondLimits,

    /// 2 of 3 consecutive points beyond 2 sigma on the same side (rule 2).
    ///
    /// An early warning of a potential shift.
    TwoOfThreeBeyond2Sigma,

    /// 4 of 5 consecutive points beyond 1 sigma on the same side (rule 3).
    ///
    /// Indicates a small sustained shift.
    FourOfFiveBeyond1Sigma,

    /// 8 consecutive points on one side of the center line (rule 4).
    ///
    /// Indicates a sustained shift in the process mean.
    EightOneSide,
}

impl ViolationType {
    /// Western Electric rule number.
    pub fn rule_number(self) -> u8 {
        match self {
            ViolationType::BeyondLimits => 1,
            ViolationType::TwoOfThreeBeyond2Sigma => 2,
            ViolationType::FourOfFiveBeyond1Sigma => 3,
            ViolationType::EightOneSide => 4,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ViolationType::BeyondLimits => "Point beyond control limits",
            ViolationType::TwoOfThreeBeyond2Sigma => "2 out of 3 points beyond 2-sigma",
            ViolationType::FourOfFiveBeyond1Sigma => "4 out of 5 points beyond 1-sigma",
            ViolationType::EightOneSide => "8 consecutive points on one side of center line",
        }
    }
}

/// Side of the center line a run lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Above,
    Below,
}

/// A single point on the chart with every signal that involves it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    /// Zero-based position in time order.
    pub index: usize,
    /// The observation.
    pub value: f64,
    /// Signals whose window contains this point (deduplicated).
    pub violations: Vec<ViolationType>,
}

/// One run-rule window that fired.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleViolation {
    /// Which rule fired.
    pub rule: ViolationType,
    /// Index of the first point in the window.
    pub window_start: usize,
    /// Indices of every point in the window.
    pub points: Vec<usize>,
    /// Side of the center line the signal is on.
    pub side: Side,
}

impl RuleViolation {
    pub fn description(&self) -> &'static str {
        self.rule.description()
    }
}
