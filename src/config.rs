//! Analysis parameters shared by the engines.
//!
//! # Examples
//!
//! ```
//! use u_quality::config::AnalysisConfig;
//! use u_quality::distribution::DistributionKind;
//!
//! let cfg = AnalysisConfig::from_json_str(r#"{"alpha": 0.01, "distribution": "weibull"}"#).unwrap();
//! assert!((cfg.alpha - 0.01).abs() < 1e-15);
//! assert!((cfg.pareto_threshold - 0.8).abs() < 1e-15);
//! assert_eq!(cfg.distribution, DistributionKind::Weibull);
//! ```

use serde::{Deserialize, Serialize};

use crate::distribution::DistributionKind;
use crate::error::{AnalysisError, Result};

/// Default significance level for variance analysis.
pub const DEFAULT_ALPHA: f64 = 0.05;
/// Default cumulative share that defines the vital few.
pub const DEFAULT_PARETO_THRESHOLD: f64 = 0.8;
/// Default confidence level for probability-plot bands.
pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.95;

/// Tunable parameters. Every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Significance level for the ANOVA omnibus test and Tukey HSD.
    pub alpha: f64,
    /// Cumulative fraction (0, 1] at which the vital few are cut.
    pub pareto_threshold: f64,
    /// Confidence level (0, 1) for probability-plot bands.
    pub confidence_level: f64,
    /// Reference distribution for probability plots.
    pub distribution: DistributionKind,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            pareto_threshold: DEFAULT_PARETO_THRESHOLD,
            confidence_level: DEFAULT_CONFIDENCE_LEVEL,
            distribution: DistributionKind::Normal,
        }
    }
}

impl AnalysisConfig {
    /// Parses a JSON document and validates it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: AnalysisConfig = serde_json::from_str(json)
            .map_err(|e| AnalysisError::schema("config", e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Checks every parameter against its admissible range.
    pub fn validate(&self) -> Result<()> {
        check_alpha(self.alpha)?;
        check_pareto_threshold(self.pareto_threshold)?;
        check_confidence_level(self.confidence_level)?;
        Ok(())
    }
}

/// `alpha` must lie in (0, 1).
pub fn check_alpha(alpha: f64) -> Result<()> {
    if alpha.is_finite() && alpha > 0.0 && alpha < 1.0 {
        Ok(())
    } else {
        Err(AnalysisError::invalid_value(
            "alpha",
            format!("must be in (0, 1), got {alpha}"),
        ))
    }
}

/// The Pareto threshold must lie in (0, 1].
pub fn check_pareto_threshold(threshold: f64) -> Result<()> {
    if threshold.is_finite() && threshold > 0.0 && threshold <= 1.0 {
        Ok(())
    } else {
        Err(AnalysisError::invalid_value(
            "threshold",
            format!("must be in (0, 1], got {threshold}"),
        ))
    }
}

/// The confidence level must lie in (0, 1).
pub fn check_confidence_level(level: f64) -> Result<()> {
    if level.is_finite() && level > 0.0 && level < 1.0 {
        Ok(())
    } else {
        Err(AnalysisError::invalid_value(
            "confidence_level",
            format!("must be in (0, 1), got {level}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = AnalysisConfig::default();
        assert!((cfg.alpha - 0.05).abs() < f64::EPSILON);
        assert!((cfg.pareto_threshold - 0.8).abs() < f64::EPSILON);
        assert!((cfg.confidence_level - 0.95).abs() < f64::EPSILON);
        assert_eq!(cfg.distribution, DistributionKind::Normal);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn empty_document_gives_defaults() {
        let cfg = AnalysisConfig::from_json_str("{}").expect("valid");
        assert_eq!(cfg, AnalysisConfig::default());
    }

    #[test]
    fn out_of_range_values_rejected() {
        assert!(AnalysisConfig::from_json_str(r#"{"alpha": 0.0}"#).is_err());
        assert!(AnalysisConfig::from_json_str(r#"{"alpha": 1.0}"#).is_err());
        assert!(AnalysisConfig::from_json_str(r#"{"pareto_threshold": 1.5}"#).is_err());
        assert!(AnalysisConfig::from_json_str(r#"{"confidence_level": 1.0}"#).is_err());
    }

    #[test]
    fn threshold_of_one_is_allowed() {
        assert!(check_pareto_threshold(1.0).is_ok());
    }

    #[test]
    fn unknown_fields_are_schema_errors() {
        let err = AnalysisConfig::from_json_str(r#"{"alpah": 0.05}"#).unwrap_err();
        assert_eq!(err.code(), crate::error::codes::SCHEMA);
    }

    #[test]
    fn unknown_distribution_rejected() {
        assert!(AnalysisConfig::from_json_str(r#"{"distribution": "gamma"}"#).is_err());
    }
}
