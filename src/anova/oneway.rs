//! One-way analysis of variance with Tukey HSD post-hoc comparisons.
//!
//! # Algorithm
//!
//! F = MS_between / MS_within where
//! MS_between = SS_between / (k-1),
//! MS_within = SS_within / (N-k).
//!
//! When the omnibus test is significant and there are more than two
//! groups, every unordered pair (i, j) is compared with the Tukey-Kramer
//! criterion:
//!
//! ```text
//! HSD = q(alpha; k, N-k) * sqrt(MS_within * (1/n_i + 1/n_j) / 2)
//! ```
//!
//! # References
//!
//! - Fisher (1925). "Statistical Methods for Research Workers".
//! - Tukey (1949). "Comparing Individual Means in the Analysis of Variance".
//!   *Biometrics* 5(2), pp. 99-114.
//! - Kramer (1956). "Extension of Multiple Range Tests to Group Means with
//!   Unequal Numbers of Replications". *Biometrics* 12(3), pp. 307-310.

use serde::Serialize;
use u_numflow::special;
use u_numflow::stats;

use super::studentized::{studentized_range_sf, tukey_critical_value, CriticalValueSource};
use crate::config::check_alpha;
use crate::error::{AnalysisError, Result};
use crate::interpret::{describe_anova, EffectSize, Significance};
use crate::validate::{GroupedSeries, MIN_GROUPS, MIN_GROUP_POINTS};
use crate::value::StatValue;

/// Summary statistics of one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStatistics {
    pub label: String,
    pub size: usize,
    pub mean: f64,
    /// Sample standard deviation (n-1).
    pub std_dev: f64,
}

/// Result of one-way ANOVA.
///
/// # Invariants
///
/// - `df_between + df_within == df_total`
/// - `ss_between + ss_within == ss_total` (up to rounding)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnovaResult {
    pub groups: Vec<GroupStatistics>,
    pub grand_mean: f64,
    pub ss_between: f64,
    pub ss_within: f64,
    pub ss_total: f64,
    pub df_between: usize,
    pub df_within: usize,
    pub df_total: usize,
    pub ms_between: f64,
    pub ms_within: f64,
    /// Unbounded when MS_within is zero.
    pub f_statistic: StatValue,
    pub p_value: f64,
    pub alpha: f64,
    pub significance: Significance,
    /// η² = SS_between / SS_total.
    pub eta_squared: f64,
    pub effect_size: EffectSize,
    /// Present only for a significant omnibus test with more than two groups.
    pub post_hoc: Option<TukeyHsd>,
    pub interpretation: String,
}

/// Tukey HSD post-hoc comparisons.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TukeyHsd {
    pub alpha: f64,
    /// q(alpha; k, df_within).
    pub critical_value: f64,
    pub critical_value_source: CriticalValueSource,
    /// Pairs (i, j), i < j, in input order.
    pub comparisons: Vec<PostHocComparison>,
}

/// One pairwise comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostHocComparison {
    pub group_a: String,
    pub group_b: String,
    /// mean_a - mean_b.
    pub mean_difference: f64,
    pub hsd: f64,
    /// `|mean_difference| > hsd`.
    pub significant: bool,
    /// Upper-tail probability of the observed studentized range.
    pub p_value: f64,
}

/// One-way ANOVA over validated groups. H₀: all group means are equal.
///
/// Groups keep their input order; post-hoc pairs follow that order.
/// With zero within-group variance F is [`StatValue::Unbounded`] and p = 0;
/// if every observation is identical η² is 0 as well.
///
/// # Errors
///
/// - `InsufficientGroups` if fewer than 2 groups
/// - `InsufficientData` naming the group if any has fewer than 2 observations
/// - `InvalidValue` if `alpha` is outside (0, 1)
///
/// # Examples
///
/// ```
/// use u_quality::anova::one_way_anova;
/// use u_quality::validate::GroupedSeries;
///
/// let groups = GroupedSeries::new(&[
///     ("A".to_string(), vec![1.0, 2.0, 3.0]),
///     ("B".to_string(), vec![4.0, 5.0, 6.0]),
///     ("C".to_string(), vec![7.0, 8.0, 9.0]),
/// ]).unwrap();
/// let r = one_way_anova(&groups, 0.05).unwrap();
/// assert!((r.f_statistic.finite().unwrap() - 27.0).abs() < 1e-9);
/// assert!(r.post_hoc.is_some());
/// ```
pub fn one_way_anova(data: &GroupedSeries, alpha: f64) -> Result<AnovaResult> {
    check_alpha(alpha)?;
    let k = data.len();
    if k < MIN_GROUPS {
        return Err(AnalysisError::InsufficientGroups {
            required: MIN_GROUPS,
            actual: k,
        });
    }
    for g in data.groups() {
        if g.series.len() < MIN_GROUP_POINTS {
            return Err(AnalysisError::insufficient_data(
                format!("group '{}'", g.label),
                MIN_GROUP_POINTS,
                g.series.len(),
            ));
        }
    }
    let total_n = data.total_observations();
    tracing::debug!(groups = k, n = total_n, alpha, "computing one-way ANOVA");

    // Grand mean
    let grand_sum: f64 = data.groups().iter().flat_map(|g| g.series.iter()).sum();
    let grand_mean = grand_sum / total_n as f64;

    let groups = data
        .groups()
        .iter()
        .map(|g| {
            Ok(GroupStatistics {
                label: g.label.clone(),
                size: g.series.len(),
                mean: stats::mean(&g.series).ok_or_else(|| {
                    AnalysisError::invalid_value(format!("group '{}'", g.label), "mean is undefined")
                })?,
                std_dev: stats::std_dev(&g.series).unwrap_or(0.0),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    // Sum of squares
    let ss_between: f64 = groups
        .iter()
        .map(|g| g.size as f64 * (g.mean - grand_mean).powi(2))
        .sum();
    let ss_within: f64 = data
        .groups()
        .iter()
        .zip(groups.iter())
        .map(|(g, s)| g.series.iter().map(|&x| (x - s.mean).powi(2)).sum::<f64>())
        .sum();
    let ss_total = ss_between + ss_within;

    let df_between = k - 1;
    let df_within = total_n - k;
    let df_total = total_n - 1;

    let ms_between = ss_between / df_between as f64;
    let ms_within = ss_within / df_within as f64;

    let f_statistic = StatValue::ratio(ms_between, ms_within);
    let p_value = match f_statistic {
        StatValue::Finite(f) => {
            (1.0 - special::f_distribution_cdf(f, df_between as f64, df_within as f64))
                .clamp(0.0, 1.0)
        }
        StatValue::Unbounded => 0.0,
    };
    let significance = Significance::from_p_value(p_value, alpha);

    // All observations identical: nothing to explain.
    let eta_squared = if ss_total > 0.0 {
        ss_between / ss_total
    } else {
        0.0
    };
    let effect_size = EffectSize::from_eta_squared(eta_squared);

    let post_hoc = if significance.is_significant() && k > 2 {
        Some(tukey_hsd(&groups, ms_within, df_within, alpha)?)
    } else {
        None
    };

    let interpretation = describe_anova(f_statistic, p_value, significance);
    tracing::debug!(
        f = %f_statistic,
        p_value,
        eta_squared,
        comparisons = post_hoc.as_ref().map_or(0, |t| t.comparisons.len()),
        "one-way ANOVA computed"
    );

    Ok(AnovaResult {
        groups,
        grand_mean,
        ss_between,
        ss_within,
        ss_total,
        df_between,
        df_within,
        df_total,
        ms_between,
        ms_within,
        f_statistic,
        p_value,
        alpha,
        significance,
        eta_squared,
        effect_size,
        post_hoc,
        interpretation,
    })
}

// ---------------------------------------------------------------------------
// Tukey HSD
// ---------------------------------------------------------------------------

fn tukey_hsd(
    groups: &[GroupStatistics],
    ms_within: f64,
    df_within: usize,
    alpha: f64,
) -> Result<TukeyHsd> {
    let k = groups.len();
    let (critical_value, critical_value_source) = tukey_critical_value(alpha, k, df_within)
        .ok_or_else(|| {
            AnalysisError::degenerate("alpha", "studentized range quantile did not converge")
        })?;

    let mut comparisons = Vec::with_capacity(k * (k - 1) / 2);
    for (i, a) in groups.iter().enumerate() {
        for b in &groups[i + 1..] {
            let pooled_error = ms_within * (1.0 / a.size as f64 + 1.0 / b.size as f64) / 2.0;
            let se = pooled_error.sqrt();
            let hsd = critical_value * se;
            let mean_difference = a.mean - b.mean;
            let diff = mean_difference.abs();

            let q_observed = if se > 0.0 {
                diff / se
            } else if diff > 0.0 {
                f64::INFINITY
            } else {
                0.0
            };
            let p_value = studentized_range_sf(q_observed, k, df_within).unwrap_or(1.0);

            comparisons.push(PostHocComparison {
                group_a: a.label.clone(),
                group_b: b.label.clone(),
                mean_difference,
                hsd,
                significant: diff > hsd,
                p_value,
            });
        }
    }

    Ok(TukeyHsd {
        alpha,
        critical_value,
        critical_value_source,
        comparisons,
    })
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn groups_strategy() -> impl Strategy<Value = Vec<Vec<f64>>> {
        proptest::collection::vec(proptest::collection::vec(-100.0_f64..100.0, 2..10), 2..6)
    }

    proptest! {
        #[test]
        fn sum_of_squares_decomposes(raw in groups_strategy()) {
            let records: Vec<(String, Vec<f64>)> = raw
                .into_iter()
                .enumerate()
                .map(|(i, v)| (format!("g{i}"), v))
                .collect();
            let data = GroupedSeries::new(&records).expect("valid");
            let r = one_way_anova(&data, 0.05).expect("anova");

            let all: Vec<f64> = records.iter().flat_map(|(_, v)| v.iter().copied()).collect();
            let mean = all.iter().sum::<f64>() / all.len() as f64;
            let sst: f64 = all.iter().map(|x| (x - mean).powi(2)).sum();
            prop_assert!((r.ss_between + r.ss_within - sst).abs() <= 1e-6 * sst.max(1.0));
            prop_assert_eq!(r.df_between + r.df_within, r.df_total);
            prop_assert!((0.0..=1.0).contains(&r.p_value));
            prop_assert!((0.0..=1.0 + 1e-12).contains(&r.eta_squared));
        }
    }
}
