//! Qualitative interpretation of numeric results.
//!
//! Maps engine outputs to fixed labels. The breakpoints are part of the
//! documented behavior and must not drift: downstream reports and tests
//! compare the labels verbatim.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::StatValue;

/// Cpk at or above which a process is rated excellent.
pub const CPK_EXCELLENT: f64 = 1.67;
/// Cpk at or above which a process is capable.
pub const CPK_CAPABLE: f64 = 1.33;
/// Cpk at or above which a process is marginal.
pub const CPK_MARGINAL: f64 = 1.0;

/// η² breakpoints (Cohen, 1988): small, medium, large.
pub const ETA_SQUARED_BREAKPOINTS: [f64; 3] = [0.01, 0.06, 0.14];

/// Gini breakpoints: moderate, high, very high.
pub const GINI_BREAKPOINTS: [f64; 3] = [0.2, 0.5, 0.8];

/// Probability-plot correlation breakpoints: fair, good, excellent.
pub const FIT_BREAKPOINTS: [f64; 3] = [0.90, 0.95, 0.99];

macro_rules! labelled {
    ($ty:ident { $($variant:ident => $label:expr),+ $(,)? }) => {
        impl $ty {
            /// Human-readable label.
            pub fn label(self) -> &'static str {
                match self {
                    $($ty::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

/// Process capability rating from Cpk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityRating {
    Excellent,
    Capable,
    Marginal,
    NotCapable,
}

labelled!(CapabilityRating {
    Excellent => "Excellent",
    Capable => "Good/Capable",
    Marginal => "Marginal",
    NotCapable => "Not Capable",
});

impl CapabilityRating {
    /// Rates a Cpk value; the unbounded sentinel is excellent.
    pub fn from_cpk(cpk: StatValue) -> Self {
        if cpk.at_least(CPK_EXCELLENT) {
            CapabilityRating::Excellent
        } else if cpk.at_least(CPK_CAPABLE) {
            CapabilityRating::Capable
        } else if cpk.at_least(CPK_MARGINAL) {
            CapabilityRating::Marginal
        } else {
            CapabilityRating::NotCapable
        }
    }
}

/// Outcome of a significance test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Significance {
    Significant,
    NotSignificant,
}

labelled!(Significance {
    Significant => "Significant",
    NotSignificant => "Not Significant",
});

impl Significance {
    /// Significant when `p_value < alpha`.
    pub fn from_p_value(p_value: f64, alpha: f64) -> Self {
        if p_value < alpha {
            Significance::Significant
        } else {
            Significance::NotSignificant
        }
    }

    pub fn is_significant(self) -> bool {
        self == Significance::Significant
    }
}

/// Magnitude of η².
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectSize {
    Negligible,
    Small,
    Medium,
    Large,
}

labelled!(EffectSize {
    Negligible => "Negligible",
    Small => "Small",
    Medium => "Medium",
    Large => "Large",
});

impl EffectSize {
    pub fn from_eta_squared(eta_squared: f64) -> Self {
        let [small, medium, large] = ETA_SQUARED_BREAKPOINTS;
        if eta_squared >= large {
            EffectSize::Large
        } else if eta_squared >= medium {
            EffectSize::Medium
        } else if eta_squared >= small {
            EffectSize::Small
        } else {
            EffectSize::Negligible
        }
    }
}

/// Concentration of a Pareto tally, from its Gini coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Concentration {
    Low,
    Moderate,
    High,
    VeryHigh,
}

labelled!(Concentration {
    Low => "Low inequality - values are relatively evenly distributed",
    Moderate => "Moderate inequality - some concentration of values",
    High => "High inequality - significant concentration in few categories",
    VeryHigh => "Very high inequality - extreme concentration (classic Pareto pattern)",
});

impl Concentration {
    pub fn from_gini(gini: f64) -> Self {
        let [moderate, high, very_high] = GINI_BREAKPOINTS;
        if gini < moderate {
            Concentration::Low
        } else if gini < high {
            Concentration::Moderate
        } else if gini < very_high {
            Concentration::High
        } else {
            Concentration::VeryHigh
        }
    }
}

/// Quality of a probability-plot straight-line fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitQuality {
    Excellent,
    Good,
    Fair,
    Poor,
}

labelled!(FitQuality {
    Excellent => "Excellent",
    Good => "Good",
    Fair => "Fair",
    Poor => "Poor",
});

impl FitQuality {
    pub fn from_correlation(r: f64) -> Self {
        let [fair, good, excellent] = FIT_BREAKPOINTS;
        if r >= excellent {
            FitQuality::Excellent
        } else if r >= good {
            FitQuality::Good
        } else if r >= fair {
            FitQuality::Fair
        } else {
            FitQuality::Poor
        }
    }
}

/// Stability of an individuals chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlStatus {
    /// No point beyond the limits and no run-rule violation.
    InControl,
    /// At least one point beyond the control limits.
    OutOfControl,
    /// All points within limits but a run rule fired.
    RuleViolations,
}

labelled!(ControlStatus {
    InControl => "In Control",
    OutOfControl => "Out of Control",
    RuleViolations => "Rule Violations",
});

impl ControlStatus {
    pub fn classify(out_of_control: usize, rule_violations: usize) -> Self {
        if out_of_control > 0 {
            ControlStatus::OutOfControl
        } else if rule_violations > 0 {
            ControlStatus::RuleViolations
        } else {
            ControlStatus::InControl
        }
    }
}

// ---------------------------------------------------------------------------
// Narrative summaries
// ---------------------------------------------------------------------------

/// One-paragraph summary of an individuals chart.
pub fn describe_control_chart(out_of_control: usize, rule_violations: usize, n: usize) -> String {
    match ControlStatus::classify(out_of_control, rule_violations) {
        ControlStatus::InControl => "Process appears to be in statistical control with no points \
             beyond control limits or Western Electric rule violations."
            .to_string(),
        ControlStatus::OutOfControl => format!(
            "Process shows {out_of_control} out-of-control points ({:.1}% of data). \
             Investigate special causes.",
            out_of_control as f64 / n.max(1) as f64 * 100.0
        ),
        ControlStatus::RuleViolations => format!(
            "Process has {rule_violations} Western Electric rule violations. \
             Pattern suggests potential process instability."
        ),
    }
}

/// One-paragraph summary of a capability study.
pub fn describe_capability(cpk: StatValue, ppm_total: f64, sigma_level: f64) -> String {
    format!(
        "Process capability is {} (Cpk = {cpk}). Expected defect rate: {ppm_total:.0} PPM \
         ({sigma_level:.1} sigma level).",
        CapabilityRating::from_cpk(cpk)
    )
}

/// One-paragraph summary of an ANOVA omnibus test.
pub fn describe_anova(f_statistic: StatValue, p_value: f64, significance: Significance) -> String {
    match significance {
        Significance::Significant => format!(
            "Significant difference detected between groups (F = {f_statistic}, p = {p_value:.4}). \
             At least one group mean differs from others."
        ),
        Significance::NotSignificant => format!(
            "No significant difference between group means (F = {f_statistic}, p = {p_value:.4}). \
             Groups appear statistically similar."
        ),
    }
}

/// One-paragraph summary of a Pareto split.
pub fn describe_pareto(vital_count: usize, total_count: usize, vital_percentage: f64) -> String {
    format!(
        "Pareto analysis identifies {vital_count} out of {total_count} categories ({:.1}%) as \
         'vital few', accounting for {vital_percentage:.1}% of total impact.",
        vital_count as f64 / total_count.max(1) as f64 * 100.0
    )
}

/// One-paragraph summary of a probability plot.
pub fn describe_fit(correlation: f64, outlier_count: usize, distribution: &str) -> String {
    let quality = FitQuality::from_correlation(correlation);
    let outliers = if outlier_count > 0 {
        format!(" {outlier_count} potential outliers detected.")
    } else {
        String::new()
    };
    format!("{quality} fit to {distribution} distribution (r = {correlation:.4}).{outliers}")
}
