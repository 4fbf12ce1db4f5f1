//! Studentized range distribution.
//!
//! Critical values q(alpha; k, df) for Tukey's HSD and the upper-tail
//! probability of an observed studentized range.
//!
//! # Algorithm
//!
//! For alpha = 0.05 and k = 2..10 the critical value comes from the
//! published table, interpolated linearly in 1/df between tabulated
//! degrees of freedom. Everywhere else the distribution is integrated
//! numerically:
//!
//! ```text
//! W(w)        = k ∫ φ(z) [Φ(z) - Φ(z - w)]^(k-1) dz          (df = ∞)
//! P(Q < q)    = ∫ f_s(s) W(q s) ds,   s = sqrt(χ²_df / df)
//! ```
//!
//! Both integrals use composite Simpson's rule; the critical value is the
//! root of P(Q < q) = 1 - alpha, found by bisection.
//!
//! # References
//!
//! - Harter, H.L. (1960). "Tables of Range and Studentized Range".
//!   *Annals of Mathematical Statistics* 31(4), pp. 1122-1147.
//! - Lund, R.E. & Lund, J.R. (1983). "Algorithm AS 190: Probabilities and
//!   Upper Quantiles for the Studentized Range". *Applied Statistics* 32(2).

use u_numflow::special;

/// Significance level the critical-value table is tabulated for.
pub const TABLE_ALPHA: f64 = 0.05;

/// Degrees of freedom of the table columns; the last column is df = ∞.
const TABLE_DF: [f64; 26] = [
    1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0, 17.0,
    18.0, 19.0, 20.0, 24.0, 30.0, 40.0, 60.0, 120.0, f64::INFINITY,
];

/// q(0.05; k, df), rows k = 2..10, columns [`TABLE_DF`].
const Q_TABLE_05: [[f64; 26]; 9] = [
    [
        17.97, 6.08, 4.50, 3.93, 3.64, 3.46, 3.34, 3.26, 3.20, 3.15, 3.11, 3.08, 3.06, 3.03, 3.01,
        3.00, 2.98, 2.97, 2.96, 2.95, 2.92, 2.89, 2.86, 2.83, 2.80, 2.77,
    ],
    [
        26.98, 8.33, 5.91, 5.04, 4.60, 4.34, 4.16, 4.04, 3.95, 3.88, 3.82, 3.77, 3.73, 3.70, 3.67,
        3.65, 3.63, 3.61, 3.59, 3.58, 3.53, 3.49, 3.44, 3.40, 3.36, 3.31,
    ],
    [
        32.82, 9.80, 6.82, 5.76, 5.22, 4.90, 4.68, 4.53, 4.41, 4.33, 4.26, 4.20, 4.15, 4.11, 4.08,
        4.05, 4.02, 4.00, 3.98, 3.96, 3.90, 3.85, 3.79, 3.74, 3.68, 3.63,
    ],
    [
        37.08, 10.88, 7.50, 6.29, 5.67, 5.30, 5.06, 4.89, 4.76, 4.65, 4.57, 4.51, 4.45, 4.41, 4.37,
        4.33, 4.30, 4.28, 4.25, 4.23, 4.17, 4.10, 4.04, 3.98, 3.92, 3.86,
    ],
    [
        40.41, 11.74, 8.04, 6.71, 6.03, 5.63, 5.36, 5.17, 5.02, 4.91, 4.82, 4.75, 4.69, 4.64, 4.59,
        4.56, 4.52, 4.49, 4.47, 4.45, 4.37, 4.30, 4.23, 4.16, 4.10, 4.03,
    ],
    [
        43.12, 12.44, 8.48, 7.05, 6.33, 5.90, 5.61, 5.40, 5.24, 5.12, 5.03, 4.95, 4.88, 4.83, 4.78,
        4.74, 4.70, 4.67, 4.65, 4.62, 4.54, 4.46, 4.39, 4.31, 4.24, 4.17,
    ],
    [
        45.40, 13.03, 8.85, 7.35, 6.58, 6.12, 5.82, 5.60, 5.43, 5.30, 5.20, 5.12, 5.05, 4.99, 4.94,
        4.90, 4.86, 4.82, 4.79, 4.77, 4.68, 4.60, 4.52, 4.44, 4.36, 4.29,
    ],
    [
        47.36, 13.54, 9.18, 7.60, 6.80, 6.32, 6.00, 5.77, 5.59, 5.46, 5.35, 5.27, 5.19, 5.13, 5.08,
        5.03, 4.99, 4.96, 4.92, 4.90, 4.81, 4.72, 4.63, 4.55, 4.47, 4.39,
    ],
    [
        49.07, 13.99, 9.46, 7.83, 6.99, 6.49, 6.16, 5.92, 5.74, 5.60, 5.49, 5.39, 5.32, 5.25, 5.20,
        5.15, 5.11, 5.07, 5.04, 5.01, 4.92, 4.82, 4.73, 4.65, 4.56, 4.47,
    ],
];

/// Smallest and largest group count covered by the table.
const TABLE_K_MIN: usize = 2;
const TABLE_K_MAX: usize = 10;

/// Half-width of the integration range over the standard normal.
const Z_LIMIT: f64 = 8.0;
/// Simpson intervals over z (even).
const Z_INTERVALS: usize = 160;
/// Simpson intervals over s (even).
const S_INTERVALS: usize = 240;
/// Above this many degrees of freedom s is treated as the constant 1.
const DF_ASYMPTOTIC: f64 = 5_000.0;

/// Where a critical value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CriticalValueSource {
    Table,
    Numerical,
}

/// Critical value q(alpha; k, df) of the studentized range.
///
/// Returns `None` if `k < 2`, `df == 0` or `alpha` is outside (0, 1).
///
/// # Examples
///
/// ```
/// use u_quality::anova::tukey_critical_value;
///
/// let (q, _) = tukey_critical_value(0.05, 3, 6).unwrap();
/// assert!((q - 4.34).abs() < 1e-12);
/// ```
pub fn tukey_critical_value(alpha: f64, k: usize, df: usize) -> Option<(f64, CriticalValueSource)> {
    if k < 2 || df == 0 || !(alpha > 0.0 && alpha < 1.0) {
        return None;
    }
    if (alpha - TABLE_ALPHA).abs() < 1e-12 && (TABLE_K_MIN..=TABLE_K_MAX).contains(&k) {
        return Some((table_lookup(k, df as f64), CriticalValueSource::Table));
    }
    numerical_quantile(1.0 - alpha, k, df as f64).map(|q| (q, CriticalValueSource::Numerical))
}

/// Upper-tail probability P(Q >= q) for `k` means and `df` error degrees of freedom.
///
/// Returns `None` if `k < 2` or `df == 0`.
pub fn studentized_range_sf(q: f64, k: usize, df: usize) -> Option<f64> {
    if k < 2 || df == 0 || q.is_nan() {
        return None;
    }
    if q <= 0.0 {
        return Some(1.0);
    }
    if q.is_infinite() {
        return Some(0.0);
    }
    Some((1.0 - studentized_range_cdf(q, k, df as f64)).clamp(0.0, 1.0))
}

// ---------------------------------------------------------------------------
// Table lookup
// ---------------------------------------------------------------------------

/// Interpolates the row for `k` linearly in 1/df.
fn table_lookup(k: usize, df: f64) -> f64 {
    let row = &Q_TABLE_05[k - TABLE_K_MIN];
    if let Some(i) = TABLE_DF.iter().position(|&d| d == df) {
        return row[i];
    }
    // df lies strictly between two columns (df >= 1 always hits or passes column 0).
    let hi = TABLE_DF.iter().position(|&d| d > df).unwrap_or(TABLE_DF.len() - 1);
    let lo = hi.saturating_sub(1);
    let inv = |d: f64| if d.is_infinite() { 0.0 } else { 1.0 / d };
    let (x0, x1, x) = (inv(TABLE_DF[lo]), inv(TABLE_DF[hi]), inv(df));
    if (x0 - x1).abs() < f64::EPSILON {
        return row[hi];
    }
    row[lo] + (row[hi] - row[lo]) * (x0 - x) / (x0 - x1)
}

// ---------------------------------------------------------------------------
// Numerical integration
// ---------------------------------------------------------------------------

/// Composite Simpson's rule over `[a, b]` with an even number of intervals.
fn simpson<F: Fn(f64) -> f64>(f: F, a: f64, b: f64, intervals: usize) -> f64 {
    let h = (b - a) / intervals as f64;
    let mut sum = f(a) + f(b);
    for i in 1..intervals {
        let x = a + i as f64 * h;
        sum += if i % 2 == 1 { 4.0 * f(x) } else { 2.0 * f(x) };
    }
    sum * h / 3.0
}

/// CDF of the range of `k` standard normal variables.
fn range_cdf(w: f64, k: usize) -> f64 {
    if w <= 0.0 {
        return 0.0;
    }
    let kf = k as f64;
    let inner = |z: f64| {
        let pdf = (-0.5 * z * z).exp() / (2.0 * std::f64::consts::PI).sqrt();
        let band = special::standard_normal_cdf(z) - special::standard_normal_cdf(z - w);
        pdf * band.max(0.0).powi(k as i32 - 1)
    };
    (kf * simpson(inner, -Z_LIMIT, Z_LIMIT, Z_INTERVALS)).clamp(0.0, 1.0)
}

/// Log density of s = sqrt(χ²_df / df).
fn ln_scaled_chi_pdf(s: f64, df: f64) -> f64 {
    let half = df / 2.0;
    half * df.ln() - special::ln_gamma(half) - (half - 1.0) * std::f64::consts::LN_2
        + (df - 1.0) * s.ln()
        - half * s * s
}

/// CDF of the studentized range with `df` error degrees of freedom.
fn studentized_range_cdf(q: f64, k: usize, df: f64) -> f64 {
    if df > DF_ASYMPTOTIC {
        return range_cdf(q, k);
    }
    let h = Z_LIMIT / (2.0 * df).sqrt();
    let lo = (1.0 - h).max(0.0);
    let hi = 1.0 + h;
    let integrand = |s: f64| {
        if s <= 0.0 {
            return 0.0;
        }
        ln_scaled_chi_pdf(s, df).exp() * range_cdf(q * s, k)
    };
    simpson(integrand, lo, hi, S_INTERVALS).clamp(0.0, 1.0)
}

/// Solves P(Q < q) = p by bisection.
fn numerical_quantile(p: f64, k: usize, df: f64) -> Option<f64> {
    let mut lo = 0.0;
    let mut hi = 8.0;
    while studentized_range_cdf(hi, k, df) < p {
        hi *= 2.0;
        if hi > 1e4 {
            return None;
        }
    }
    for _ in 0..60 {
        let mid = 0.5 * (lo + hi);
        if studentized_range_cdf(mid, k, df) < p {
            lo = mid;
        } else {
            hi = mid;
        }
        if hi - lo < 1e-6 {
            break;
        }
    }
    Some(0.5 * (lo + hi))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_exact_entries() {
        assert_eq!(tukey_critical_value(0.05, 3, 6), Some((4.34, CriticalValueSource::Table)));
        assert_eq!(tukey_critical_value(0.05, 2, 1), Some((17.97, CriticalValueSource::Table)));
        assert_eq!(tukey_critical_value(0.05, 10, 120), Some((4.56, CriticalValueSource::Table)));
    }

    #[test]
    fn table_interpolates_in_reciprocal_df() {
        // df = 27 between 24 (3.53) and 30 (3.49) for k = 3
        let (q, _) = tukey_critical_value(0.05, 3, 27).expect("q");
        let w = (1.0 / 24.0 - 1.0 / 27.0) / (1.0 / 24.0 - 1.0 / 30.0);
        assert!((q - (3.53 + (3.49 - 3.53) * w)).abs() < 1e-12);
        assert!(q < 3.53 && q > 3.49);
    }

    #[test]
    fn table_large_df_approaches_infinity_column() {
        let (q, _) = tukey_critical_value(0.05, 4, 100_000).expect("q");
        assert!((q - 3.63).abs() < 0.001, "got {q}");
    }

    #[test]
    fn table_monotone_in_k_and_df() {
        for row in Q_TABLE_05.windows(2) {
            for (a, b) in row[0].iter().zip(row[1].iter()) {
                assert!(b > a);
            }
        }
        for row in &Q_TABLE_05 {
            for w in row.windows(2) {
                assert!(w[1] < w[0]);
            }
        }
    }

    #[test]
    fn range_cdf_two_means_matches_closed_form() {
        // Range of two N(0,1) is |Z1 - Z2| = sqrt(2)|Z|
        let w = 2.77;
        let expected = 2.0 * special::standard_normal_cdf(w / 2.0_f64.sqrt()) - 1.0;
        assert!((range_cdf(w, 2) - expected).abs() < 1e-6);
    }

    #[test]
    fn numerical_matches_table() {
        for &(k, df, table) in &[(3_usize, 10_usize, 3.88), (5, 20, 4.23), (2, 6, 3.46)] {
            let q = numerical_quantile(0.95, k, df as f64).expect("q");
            assert!((q - table).abs() < 0.02, "k={k} df={df}: {q} vs {table}");
        }
    }

    #[test]
    fn numerical_used_off_table() {
        let (q01, src) = tukey_critical_value(0.01, 3, 20).expect("q");
        assert_eq!(src, CriticalValueSource::Numerical);
        // Harter (1960): q(0.01; 3, 20) = 4.64
        assert!((q01 - 4.64).abs() < 0.03, "got {q01}");

        let (q12, src) = tukey_critical_value(0.05, 12, 30).expect("q");
        assert_eq!(src, CriticalValueSource::Numerical);
        // q(0.05; 12, 30) = 5.00
        assert!((q12 - 5.00).abs() < 0.03, "got {q12}");
    }

    #[test]
    fn survival_at_critical_value_is_alpha() {
        let p = studentized_range_sf(3.88, 3, 10).expect("p");
        assert!((p - 0.05).abs() < 0.005, "got {p}");
    }

    #[test]
    fn survival_edges() {
        assert_eq!(studentized_range_sf(0.0, 3, 10), Some(1.0));
        assert_eq!(studentized_range_sf(f64::INFINITY, 3, 10), Some(0.0));
        assert_eq!(studentized_range_sf(1.0, 1, 10), None);
    }

    #[test]
    fn invalid_arguments() {
        assert!(tukey_critical_value(0.05, 1, 10).is_none());
        assert!(tukey_critical_value(0.05, 3, 0).is_none());
        assert!(tukey_critical_value(1.5, 3, 10).is_none());
    }
}
