//! Probability plots with straight-line fit and confidence bands.
//!
//! # Algorithm
//!
//! 1. Sort the data ascending.
//! 2. Plotting positions pᵢ = (i - 0.3) / (n + 0.4), i = 1..n.
//! 3. Linearize: data axis through [`DistributionKind::transform`],
//!    quantile axis through [`DistributionKind::quantile`].
//! 4. Least-squares line of the transformed data on the quantiles; Pearson r.
//! 5. Band per point: pᵢ ± z·sqrt(pᵢ(1 - pᵢ)/n), clipped to [0.001, 0.999],
//!    mapped through the quantile function, the fitted line and the inverse
//!    transform back to the value scale.
//! 6. A point outside its band is an outlier.
//!
//! # References
//!
//! - Benard, A. & Bos-Levenbach, E.C. (1953). "The plotting of observations
//!   on probability paper". *Statistica Neerlandica* 7, pp. 163-173.
//! - Nelson, W. (1982). *Applied Life Data Analysis*. Wiley.

use serde::Serialize;
use u_numflow::special;
use u_numflow::stats;

use super::anderson_darling::{anderson_darling_test, AndersonDarlingResult};
use super::kind::DistributionKind;
use crate::config::check_confidence_level;
use crate::error::{AnalysisError, Result};
use crate::interpret::{describe_fit, FitQuality};
use crate::validate::MIN_DISTRIBUTION_POINTS;

/// Offset of the median-rank plotting position.
const RANK_OFFSET: f64 = 0.3;
/// Probability clip applied to band bounds before inversion.
pub const BAND_PROBABILITY_FLOOR: f64 = 0.001;
pub const BAND_PROBABILITY_CEIL: f64 = 0.999;

/// Straight-line fit on the linearized axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Pearson correlation of quantiles and transformed data.
    pub correlation: f64,
    pub r_squared: f64,
    pub quality: FitQuality,
}

/// Value-scale confidence band around one plotted point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConfidenceBand {
    pub lower: f64,
    pub upper: f64,
}

impl ConfidenceBand {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

/// Points outside their confidence band.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Outliers {
    /// Positions in the sorted data.
    pub indices: Vec<usize>,
    pub values: Vec<f64>,
}

impl Outliers {
    pub fn count(&self) -> usize {
        self.indices.len()
    }
}

/// Result of a probability plot.
///
/// All per-point vectors are aligned with `sorted_values`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbabilityPlot {
    pub distribution: DistributionKind,
    pub sample_size: usize,
    pub confidence_level: f64,
    pub sorted_values: Vec<f64>,
    pub plotting_positions: Vec<f64>,
    pub theoretical_quantiles: Vec<f64>,
    pub transformed_data: Vec<f64>,
    pub fit: LinearFit,
    pub bands: Vec<ConfidenceBand>,
    pub outliers: Outliers,
    /// Present for the normal distribution only.
    pub normality_test: Option<AndersonDarlingResult>,
    pub interpretation: String,
}

/// Median-rank plotting positions (i - 0.3) / (n + 0.4), i = 1..n.
///
/// # Examples
///
/// ```
/// use u_quality::distribution::plotting_positions;
///
/// let p = plotting_positions(5);
/// assert!((p[0] - 0.7 / 5.4).abs() < 1e-15);
/// assert!((p[2] - 0.5).abs() < 1e-15);
/// ```
pub fn plotting_positions(n: usize) -> Vec<f64> {
    let denom = n as f64 + 1.0 - 2.0 * RANK_OFFSET;
    (1..=n).map(|i| (i as f64 - RANK_OFFSET) / denom).collect()
}

/// Draws a probability plot of `data` against `kind`.
///
/// # Errors
///
/// - `InsufficientData` if fewer than 3 observations
/// - `InvalidValue` if `confidence_level` is outside (0, 1) or an observation is not finite
/// - `Domain` if a log-scale distribution meets a non-positive value
/// - `Degenerate` if the transformed data has zero spread
///
/// # Examples
///
/// ```
/// use u_quality::distribution::{probability_plot, DistributionKind};
///
/// let plot = probability_plot(&[3.0, 1.0, 5.0, 2.0, 4.0], DistributionKind::Normal, 0.95).unwrap();
/// assert_eq!(plot.sorted_values, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
/// assert!(plot.fit.correlation > 0.98);
/// assert!(plot.normality_test.is_some());
/// ```
pub fn probability_plot(
    data: &[f64],
    kind: DistributionKind,
    confidence_level: f64,
) -> Result<ProbabilityPlot> {
    check_confidence_level(confidence_level)?;
    let n = data.len();
    if n < MIN_DISTRIBUTION_POINTS {
        return Err(AnalysisError::insufficient_data("data", MIN_DISTRIBUTION_POINTS, n));
    }
    if data.iter().any(|v| !v.is_finite()) {
        return Err(AnalysisError::invalid_value("data", "observations must be finite"));
    }
    if kind.requires_positive() {
        if let Some(bad) = data.iter().find(|&&v| v <= 0.0) {
            return Err(AnalysisError::domain(
                "data",
                format!("{kind} distribution requires positive values, got {bad}"),
            ));
        }
    }
    tracing::debug!(n, distribution = %kind, confidence_level, "computing probability plot");

    let mut sorted_values = data.to_vec();
    sorted_values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let plotting_positions = plotting_positions(n);
    let theoretical_quantiles: Vec<f64> =
        plotting_positions.iter().map(|&p| kind.quantile(p)).collect();
    let transformed_data: Vec<f64> = sorted_values.iter().map(|&x| kind.transform(x)).collect();

    let fit = fit_line(&theoretical_quantiles, &transformed_data)?;

    let z = special::inverse_normal_cdf(1.0 - (1.0 - confidence_level) / 2.0);
    let bands: Vec<ConfidenceBand> = plotting_positions
        .iter()
        .map(|&p| confidence_band(kind, &fit, p, n, z))
        .collect();

    let mut outliers = Outliers::default();
    for (i, (&value, band)) in sorted_values.iter().zip(bands.iter()).enumerate() {
        if !band.contains(value) {
            outliers.indices.push(i);
            outliers.values.push(value);
        }
    }

    let normality_test = match kind {
        DistributionKind::Normal => Some(anderson_darling_test(&sorted_values)?),
        DistributionKind::Lognormal | DistributionKind::Weibull => None,
    };

    let interpretation = describe_fit(fit.correlation, outliers.count(), kind.name());
    tracing::debug!(
        r = fit.correlation,
        outliers = outliers.count(),
        "probability plot computed"
    );

    Ok(ProbabilityPlot {
        distribution: kind,
        sample_size: n,
        confidence_level,
        sorted_values,
        plotting_positions,
        theoretical_quantiles,
        transformed_data,
        fit,
        bands,
        outliers,
        normality_test,
        interpretation,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Least-squares line of `y` on `x`.
fn fit_line(x: &[f64], y: &[f64]) -> Result<LinearFit> {
    let undefined = || AnalysisError::degenerate("data", "fit is undefined");
    let x_mean = stats::mean(x).ok_or_else(undefined)?;
    let y_mean = stats::mean(y).ok_or_else(undefined)?;
    let x_var = stats::variance(x).ok_or_else(undefined)?;
    let y_var = stats::variance(y).ok_or_else(undefined)?;
    let cov = stats::covariance(x, y).ok_or_else(undefined)?;

    if y_var < 1e-300 {
        return Err(AnalysisError::degenerate(
            "data",
            "all values are identical; the correlation is undefined",
        ));
    }
    if x_var < 1e-300 {
        return Err(undefined());
    }

    let slope = cov / x_var;
    let intercept = y_mean - slope * x_mean;
    let correlation = (cov / (x_var.sqrt() * y_var.sqrt())).clamp(-1.0, 1.0);

    Ok(LinearFit {
        slope,
        intercept,
        correlation,
        r_squared: correlation * correlation,
        quality: FitQuality::from_correlation(correlation),
    })
}

fn confidence_band(
    kind: DistributionKind,
    fit: &LinearFit,
    p: f64,
    n: usize,
    z: f64,
) -> ConfidenceBand {
    let se = (p * (1.0 - p) / n as f64).sqrt();
    let clip = |q: f64| q.clamp(BAND_PROBABILITY_FLOOR, BAND_PROBABILITY_CEIL);
    let to_value = |prob: f64| kind.inverse_transform(fit.intercept + fit.slope * kind.quantile(prob));

    let a = to_value(clip(p - z * se));
    let b = to_value(clip(p + z * se));
    ConfidenceBand {
        lower: a.min(b),
        upper: a.max(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn five_points_normal() {
        let plot = probability_plot(&[1.0, 2.0, 3.0, 4.0, 5.0], DistributionKind::Normal, 0.95)
            .expect("plot");
        assert_eq!(plot.sample_size, 5);
        for w in plot.plotting_positions.windows(2) {
            assert!(w[1] > w[0]);
        }
        assert!(plot.plotting_positions.iter().all(|&p| p > 0.0 && p < 1.0));
        for w in plot.theoretical_quantiles.windows(2) {
            assert!(w[1] > w[0]);
        }
        // symmetric positions give a zero middle quantile
        assert!(plot.theoretical_quantiles[2].abs() < 1e-9);
        assert!((plot.fit.intercept - 3.0).abs() < 1e-9);
        assert!(plot.fit.slope > 0.0);
        assert_eq!(plot.fit.quality, FitQuality::Excellent);
        assert!(plot.outliers.indices.is_empty());
        assert_eq!(plot.transformed_data, plot.sorted_values);
    }

    #[test]
    fn positions_are_median_ranks() {
        let p = plotting_positions(4);
        let expected = [0.7 / 4.4, 1.7 / 4.4, 2.7 / 4.4, 3.7 / 4.4];
        for (a, b) in p.iter().zip(expected) {
            assert!((a - b).abs() < 1e-15);
        }
    }

    #[test]
    fn bands_bracket_the_fitted_line() {
        let data = [2.3, 4.1, 3.3, 5.0, 3.8, 4.4, 2.9, 3.6, 4.8, 3.1];
        let plot = probability_plot(&data, DistributionKind::Normal, 0.95).expect("plot");
        for (i, band) in plot.bands.iter().enumerate() {
            let fitted = plot.fit.intercept + plot.fit.slope * plot.theoretical_quantiles[i];
            assert!(band.lower <= fitted && fitted <= band.upper, "point {i}");
        }
    }

    #[test]
    fn wider_confidence_gives_wider_bands() {
        let data = [2.3, 4.1, 3.3, 5.0, 3.8, 4.4, 2.9, 3.6, 4.8, 3.1];
        let narrow = probability_plot(&data, DistributionKind::Normal, 0.80).expect("plot");
        let wide = probability_plot(&data, DistributionKind::Normal, 0.99).expect("plot");
        for (n, w) in narrow.bands.iter().zip(wide.bands.iter()) {
            assert!(w.upper - w.lower >= n.upper - n.lower - 1e-12);
        }
    }

    #[test]
    fn extreme_point_is_an_outlier() {
        let data = [10.0, 10.1, 9.9, 10.2, 9.8, 10.0, 10.1, 9.9, 10.0, 25.0];
        let plot = probability_plot(&data, DistributionKind::Normal, 0.95).expect("plot");
        assert!(plot.outliers.indices.contains(&9), "{:?}", plot.outliers);
        assert_eq!(plot.outliers.values.last(), Some(&25.0));
        assert!(plot.interpretation.contains("potential outliers"));
    }

    #[test]
    fn lognormal_uses_log_data() {
        let data = [1.0, 2.0, 4.0, 8.0, 16.0];
        let plot = probability_plot(&data, DistributionKind::Lognormal, 0.95).expect("plot");
        for (t, x) in plot.transformed_data.iter().zip(plot.sorted_values.iter()) {
            assert!((t - x.ln()).abs() < 1e-15);
        }
        assert!(plot.fit.correlation > 0.98);
        assert!(plot.normality_test.is_none());
        // bands live on the value scale
        assert!(plot.bands.iter().all(|b| b.lower > 0.0));
    }

    #[test]
    fn weibull_quantiles() {
        let data = [12.0, 25.0, 31.0, 40.0, 48.0, 57.0, 66.0];
        let plot = probability_plot(&data, DistributionKind::Weibull, 0.95).expect("plot");
        for (q, p) in plot.theoretical_quantiles.iter().zip(plot.plotting_positions.iter()) {
            assert!((q - (-(1.0 - p).ln()).ln()).abs() < 1e-12);
        }
        assert!(plot.normality_test.is_none());
    }

    #[test]
    fn log_distributions_reject_non_positive() {
        for kind in [DistributionKind::Lognormal, DistributionKind::Weibull] {
            let err = probability_plot(&[1.0, 0.0, 2.0], kind, 0.95).unwrap_err();
            assert_eq!(err.code(), crate::error::codes::DOMAIN);
        }
        assert!(probability_plot(&[-1.0, 0.0, 2.0], DistributionKind::Normal, 0.95).is_ok());
    }

    #[test]
    fn constant_data_is_degenerate() {
        let err = probability_plot(&[4.0; 5], DistributionKind::Normal, 0.95).unwrap_err();
        assert_eq!(err.code(), crate::error::codes::DEGENERATE);
    }

    #[test]
    fn rejects_bad_confidence_level() {
        assert!(probability_plot(&[1.0, 2.0, 3.0], DistributionKind::Normal, 1.0).is_err());
        assert!(probability_plot(&[1.0, 2.0, 3.0], DistributionKind::Normal, 0.0).is_err());
    }

    #[test]
    fn needs_three_points() {
        let err = probability_plot(&[1.0, 2.0], DistributionKind::Normal, 0.95).unwrap_err();
        assert_eq!(err, AnalysisError::insufficient_data("data", 3, 2));
    }
}
