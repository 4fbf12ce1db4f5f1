//! Anderson-Darling normality test.
//!
//! More sensitive to tail deviations than Kolmogorov-Smirnov.
//!
//! # Algorithm
//!
//! 1. Standardize sorted data: zᵢ = (x₍ᵢ₎ - x̄) / s
//! 2. Compute A² = -n - (1/n) Σᵢ (2i-1) [ln Φ(zᵢ) + ln(1 - Φ(z_{n+1-i}))]
//! 3. Report Stephens (1986) correction: A*² = A² (1 + 0.75/n + 2.25/n²)
//! 4. Look up the p-value of A² in a fixed step table
//!
//! # References
//!
//! - Anderson & Darling (1952). "Asymptotic theory of certain goodness of
//!   fit criteria based on stochastic processes". Annals of Mathematical
//!   Statistics, 23(2), 193–212.
//! - Stephens (1986). "Tests based on EDF statistics". In D'Agostino &
//!   Stephens (Eds.), Goodness-of-Fit Techniques. Marcel Dekker.

use serde::Serialize;
use u_numflow::special;
use u_numflow::stats;

use crate::error::{AnalysisError, Result};

/// Upper bounds of the A² steps in [`ad_p_value`].
pub const AD_BREAKPOINTS: [f64; 7] = [0.2, 0.34, 0.47, 0.64, 0.78, 0.91, 1.09];

/// p-value for each step; the last entry applies at and above the final breakpoint.
pub const AD_P_VALUES: [f64; 8] = [0.8, 0.5, 0.25, 0.1, 0.05, 0.025, 0.01, 0.005];

/// Result of the Anderson-Darling normality test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AndersonDarlingResult {
    /// The A² test statistic (raw, before sample-size correction).
    pub statistic: f64,
    /// The modified statistic A*² = A² × (1 + 0.75/n + 2.25/n²).
    pub statistic_star: f64,
    /// Step-table p-value of A². Small values reject normality.
    pub p_value: f64,
}

/// Step-table p-value: the first breakpoint strictly above `statistic`
/// selects the value.
///
/// # Examples
///
/// ```
/// use u_quality::distribution::ad_p_value;
///
/// assert_eq!(ad_p_value(0.1), 0.8);
/// assert_eq!(ad_p_value(0.2), 0.5);
/// assert_eq!(ad_p_value(2.0), 0.005);
/// ```
pub fn ad_p_value(statistic: f64) -> f64 {
    AD_BREAKPOINTS
        .iter()
        .position(|&b| statistic < b)
        .map_or(AD_P_VALUES[AD_P_VALUES.len() - 1], |i| AD_P_VALUES[i])
}

/// Anderson-Darling normality test: H₀: data is normally distributed.
///
/// # Errors
///
/// - `InsufficientData` if fewer than 3 observations
/// - `InvalidValue` if any observation is not finite
/// - `Degenerate` if all values are identical
///
/// # Examples
///
/// ```
/// use u_quality::distribution::anderson_darling_test;
///
/// let r = anderson_darling_test(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
/// assert!((r.statistic - 0.1436).abs() < 1e-3);
/// assert_eq!(r.p_value, 0.8);
/// ```
pub fn anderson_darling_test(data: &[f64]) -> Result<AndersonDarlingResult> {
    let n = data.len();
    if n < 3 {
        return Err(AnalysisError::insufficient_data("data", 3, n));
    }
    if data.iter().any(|v| !v.is_finite()) {
        return Err(AnalysisError::invalid_value("data", "observations must be finite"));
    }

    let mean = stats::mean(data)
        .ok_or_else(|| AnalysisError::invalid_value("data", "mean is undefined"))?;
    let sd = stats::std_dev(data).unwrap_or(0.0);
    if sd < 1e-300 {
        return Err(AnalysisError::degenerate("data", "zero variance"));
    }

    let mut x: Vec<f64> = data.to_vec();
    x.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let nf = n as f64;
    let mut s = 0.0;
    for i in 0..n {
        // Clamp to avoid ln(0)
        let phi = special::standard_normal_cdf((x[i] - mean) / sd).clamp(1e-15, 1.0 - 1e-15);
        let phi_rev =
            special::standard_normal_cdf((x[n - 1 - i] - mean) / sd).clamp(1e-15, 1.0 - 1e-15);
        let coeff = (2 * i + 1) as f64;
        s += coeff * (phi.ln() + (1.0 - phi_rev).ln());
    }

    let a2 = -nf - s / nf;
    let a2_star = a2 * (1.0 + 0.75 / nf + 2.25 / (nf * nf));

    Ok(AndersonDarlingResult {
        statistic: a2,
        statistic_star: a2_star,
        p_value: ad_p_value(a2),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_steps() {
        let cases = [
            (0.0, 0.8),
            (0.19, 0.8),
            (0.2, 0.5),
            (0.4, 0.25),
            (0.5, 0.1),
            (0.7, 0.05),
            (0.8, 0.025),
            (1.0, 0.01),
            (1.09, 0.005),
            (5.0, 0.005),
        ];
        for (stat, p) in cases {
            assert_eq!(ad_p_value(stat), p, "A² = {stat}");
        }
    }

    #[test]
    fn tables_are_monotone() {
        for w in AD_BREAKPOINTS.windows(2) {
            assert!(w[1] > w[0]);
        }
        for w in AD_P_VALUES.windows(2) {
            assert!(w[1] < w[0]);
        }
        assert_eq!(AD_P_VALUES.len(), AD_BREAKPOINTS.len() + 1);
    }

    #[test]
    fn evenly_spaced_data_looks_normal() {
        let r = anderson_darling_test(&[1.0, 2.0, 3.0, 4.0, 5.0]).expect("ad");
        assert!((r.statistic - 0.1436).abs() < 1e-3, "got {}", r.statistic);
        assert_eq!(r.p_value, 0.8);
        assert!(r.statistic_star > r.statistic);
    }

    #[test]
    fn skewed_data_rejects_normality() {
        let data = [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 20.0];
        let r = anderson_darling_test(&data).expect("ad");
        assert!(r.statistic > 1.09, "got {}", r.statistic);
        assert_eq!(r.p_value, 0.005);
    }

    #[test]
    fn stephens_correction_factor() {
        let data = [2.1, 3.4, 1.9, 5.6, 4.4, 3.3, 2.8, 4.0];
        let r = anderson_darling_test(&data).expect("ad");
        let n = 8.0;
        let expected = r.statistic * (1.0 + 0.75 / n + 2.25 / (n * n));
        assert!((r.statistic_star - expected).abs() < 1e-12);
    }

    #[test]
    fn constant_data_is_degenerate() {
        let err = anderson_darling_test(&[3.0; 6]).unwrap_err();
        assert_eq!(err.code(), crate::error::codes::DEGENERATE);
    }

    #[test]
    fn too_few_points() {
        assert!(anderson_darling_test(&[1.0, 2.0]).is_err());
    }
}
