//! Sigma quality levels and normal-tail defect rates.
//!
//! Sigma levels follow the 1.5-sigma long-term shift: a "six sigma"
//! process is one whose nearest limit sits 4.5 sigma from the mean in
//! the long run, about 3.4 PPM.
//!
//! | Sigma | PPM |
//! |-------|-----|
//! | 6.0   | 3.4 |
//! | 4.0   | 6,210 |
//! | 3.0   | 66,807 |
//!
//! # References
//!
//! - Harry & Schroeder (2000), *Six Sigma*.

use u_numflow::special::{inverse_normal_cdf, standard_normal_cdf};

/// Conventional long-term shift between short- and long-term sigma.
pub const SIGMA_SHIFT: f64 = 1.5;

/// Sigma level reported when no defects are expected.
pub const MAX_SIGMA_LEVEL: f64 = 6.0;

/// One-sided PPM of a process at `sigma` level: 1e6 * Phi(1.5 - sigma).
///
/// ```
/// use u_quality::capability::sigma_to_ppm;
///
/// assert!((sigma_to_ppm(6.0) - 3.4).abs() < 0.1);
/// ```
pub fn sigma_to_ppm(sigma: f64) -> f64 {
    tail_ppm(sigma - SIGMA_SHIFT)
}

/// Inverse of [`sigma_to_ppm`]. `None` unless `ppm` lies in (0, 1e6).
///
/// ```
/// use u_quality::capability::ppm_to_sigma;
///
/// assert!((ppm_to_sigma(66_807.0).unwrap() - 3.0).abs() < 0.01);
/// assert!(ppm_to_sigma(0.0).is_none());
/// ```
pub fn ppm_to_sigma(ppm: f64) -> Option<f64> {
    if !(ppm > 0.0 && ppm < 1_000_000.0) {
        return None;
    }
    let z = -inverse_normal_cdf(ppm / 1_000_000.0);
    z.is_finite().then_some(z + SIGMA_SHIFT)
}

/// Upper-tail defect rate beyond `z` standard deviations, in PPM.
///
/// Evaluated as Phi(-z) so deep tails keep their precision.
pub(crate) fn tail_ppm(z: f64) -> f64 {
    1_000_000.0 * standard_normal_cdf(-z)
}

/// Sigma level of a two-sided defect estimate.
///
/// ```text
/// sigma = Phi_inv(1 - PPM / 2,000,000) + 1.5
/// ```
///
/// The total is split evenly between the two tails before inverting.
/// Returns [`MAX_SIGMA_LEVEL`] when `ppm_total` is zero.
///
/// # Examples
///
/// ```
/// use u_quality::capability::defect_sigma_level;
///
/// assert_eq!(defect_sigma_level(0.0), 6.0);
/// // 2700 PPM split over two tails is a 3-sigma process, 4.5 after the shift
/// assert!((defect_sigma_level(2_699.8) - 4.5).abs() < 0.01);
/// ```
pub fn defect_sigma_level(ppm_total: f64) -> f64 {
    if ppm_total.is_nan() || ppm_total <= 0.0 {
        return MAX_SIGMA_LEVEL;
    }
    let per_tail = (ppm_total / 2_000_000.0).min(1.0);
    // Phi_inv(1 - q) == -Phi_inv(q)
    let z = -inverse_normal_cdf(per_tail);
    if z.is_finite() {
        z + SIGMA_SHIFT
    } else {
        MAX_SIGMA_LEVEL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEVELS: [(f64, f64); 5] = [
        (6.0, 3.4),
        (5.0, 233.0),
        (4.0, 6_210.0),
        (3.0, 66_807.0),
        (2.0, 308_538.0),
    ];

    #[test]
    fn level_table() {
        for (sigma, ppm) in LEVELS {
            let got = sigma_to_ppm(sigma);
            assert!((got - ppm).abs() / ppm < 0.01, "sigma {sigma}: {got}");
            let back = ppm_to_sigma(got).expect("in range");
            assert!((back - sigma).abs() < 1e-4, "ppm {got}: {back}");
        }
    }

    #[test]
    fn ppm_to_sigma_out_of_range() {
        for ppm in [0.0, -1.0, 1_000_000.0, 1_500_000.0, f64::NAN] {
            assert!(ppm_to_sigma(ppm).is_none(), "{ppm}");
        }
    }

    #[test]
    fn defect_sigma_level_zero_ppm_is_six() {
        assert_eq!(defect_sigma_level(0.0), MAX_SIGMA_LEVEL);
    }

    #[test]
    fn defect_sigma_level_three_sigma_process() {
        // +-3 sigma limits on a centered normal process: 2699.8 PPM total
        let sigma = defect_sigma_level(2_699.8);
        assert!((sigma - 4.5).abs() < 0.01, "got {sigma}");
    }

    #[test]
    fn defect_sigma_level_decreases_with_ppm() {
        let levels: Vec<f64> = [1.0, 10.0, 100.0, 1_000.0, 10_000.0, 100_000.0]
            .iter()
            .map(|&p| defect_sigma_level(p))
            .collect();
        for w in levels.windows(2) {
            assert!(w[0] > w[1], "{} > {}", w[0], w[1]);
        }
    }

    #[test]
    fn defect_sigma_level_tiny_ppm_is_finite() {
        let sigma = defect_sigma_level(1e-9);
        assert!(sigma.is_finite() && sigma > MAX_SIGMA_LEVEL, "got {sigma}");
    }

    #[test]
    fn tail_ppm_is_upper_tail() {
        assert!((tail_ppm(0.0) - 500_000.0).abs() < 1e-6);
        assert!((tail_ppm(3.0) - 1_349.9).abs() < 0.5);
    }
}
