//! Pareto analysis: impact ranking, vital few and concentration.
//!
//! # Algorithm
//!
//! 1. Sort categories by value, descending. The sort is stable: tied
//!    categories keep their input order.
//! 2. percentage_i = value_i / total * 100; cumulative_i is the running sum.
//! 3. The vital few are the shortest prefix whose cumulative percentage
//!    reaches `threshold * 100` (the crossing category included).
//! 4. Gini coefficient over the ascending values with ranks 1..n:
//!    G = 2 Σ i·x_(i) / (n Σ x) - (n + 1) / n.
//!
//! # References
//!
//! - Juran, J.M. (1951). *Quality Control Handbook*.
//! - Gini, C. (1912). "Variabilità e mutabilità".
//!
//! # Examples
//!
//! ```
//! use u_quality::pareto::pareto_analysis;
//! use u_quality::validate::CategoryTally;
//!
//! let tally = CategoryTally::new(&[
//!     ("A".to_string(), 40.0),
//!     ("B".to_string(), 30.0),
//!     ("C".to_string(), 20.0),
//!     ("D".to_string(), 10.0),
//! ]).unwrap();
//! let r = pareto_analysis(&tally, 0.8).unwrap();
//! assert_eq!(r.vital_few, vec!["A", "B", "C"]);
//! ```

use serde::Serialize;

use crate::config::check_pareto_threshold;
use crate::error::{AnalysisError, Result};
use crate::interpret::{describe_pareto, Concentration};
use crate::validate::{CategoryTally, MIN_CATEGORIES};

/// One ranked category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParetoEntry {
    pub category: String,
    pub value: f64,
    pub percentage: f64,
    pub cumulative_percentage: f64,
}

/// Result of a Pareto analysis.
///
/// # Invariants
///
/// - `ranking` is ordered by value, descending
/// - `cumulative_percentage` is non-decreasing and ends at 100 (up to rounding)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParetoAnalysis {
    pub ranking: Vec<ParetoEntry>,
    pub total: f64,
    pub threshold: f64,
    /// Categories of the shortest prefix reaching the threshold.
    pub vital_few: Vec<String>,
    /// Cumulative percentage reached by the vital few.
    pub vital_few_percentage: f64,
    pub gini: f64,
    pub concentration: Concentration,
    pub interpretation: String,
}

impl ParetoAnalysis {
    pub fn vital_few_count(&self) -> usize {
        self.vital_few.len()
    }
}

/// Ranks a tally and splits it into the vital few and the trivial many.
///
/// # Errors
///
/// - `InvalidValue` if `threshold` is outside (0, 1]
/// - `InsufficientCategories` if fewer than 2 categories
/// - `Degenerate` if the values sum to zero
pub fn pareto_analysis(tally: &CategoryTally, threshold: f64) -> Result<ParetoAnalysis> {
    check_pareto_threshold(threshold)?;
    if tally.len() < MIN_CATEGORIES {
        return Err(AnalysisError::InsufficientCategories {
            required: MIN_CATEGORIES,
            actual: tally.len(),
        });
    }
    let total = tally.total();
    if total <= 0.0 {
        return Err(AnalysisError::degenerate("data", "category values sum to zero"));
    }
    tracing::debug!(categories = tally.len(), total, threshold, "computing Pareto analysis");

    // Vec::sort_by is stable; ties keep input order.
    let mut sorted: Vec<&(String, f64)> = tally.entries().iter().collect();
    sorted.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let mut cumulative = 0.0;
    let ranking: Vec<ParetoEntry> = sorted
        .iter()
        .map(|(category, value)| {
            let percentage = value / total * 100.0;
            cumulative += percentage;
            ParetoEntry {
                category: category.clone(),
                value: *value,
                percentage,
                cumulative_percentage: cumulative,
            }
        })
        .collect();

    let cutoff = vital_few_len(&ranking, threshold * 100.0);
    let vital_few: Vec<String> = ranking[..cutoff]
        .iter()
        .map(|e| e.category.clone())
        .collect();
    let vital_few_percentage = ranking[cutoff - 1].cumulative_percentage;

    let values: Vec<f64> = ranking.iter().map(|e| e.value).collect();
    let gini = gini_coefficient(&values);
    let concentration = Concentration::from_gini(gini);
    let interpretation = describe_pareto(vital_few.len(), ranking.len(), vital_few_percentage);

    tracing::debug!(vital_few = vital_few.len(), gini, "Pareto analysis computed");

    Ok(ParetoAnalysis {
        ranking,
        total,
        threshold,
        vital_few,
        vital_few_percentage,
        gini,
        concentration,
        interpretation,
    })
}

/// Gini coefficient of non-negative values, in any order.
///
/// Returns 0 for an empty slice or a zero total.
///
/// # Examples
///
/// ```
/// use u_quality::pareto::gini_coefficient;
///
/// assert!(gini_coefficient(&[5.0, 5.0, 5.0]).abs() < 1e-12);
/// assert!((gini_coefficient(&[0.0, 0.0, 0.0, 12.0]) - 0.75).abs() < 1e-12);
/// ```
pub fn gini_coefficient(values: &[f64]) -> f64 {
    let n = values.len();
    let total: f64 = values.iter().sum();
    if n == 0 || total <= 0.0 {
        return 0.0;
    }
    let mut ascending = values.to_vec();
    ascending.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let nf = n as f64;
    let weighted: f64 = ascending
        .iter()
        .enumerate()
        .map(|(i, &x)| (i + 1) as f64 * x)
        .sum();
    2.0 * weighted / (nf * total) - (nf + 1.0) / nf
}

/// Length of the shortest prefix whose cumulative percentage reaches `target`.
fn vital_few_len(ranking: &[ParetoEntry], target: f64) -> usize {
    // Rounding can leave the last cumulative a hair under 100.
    const TOLERANCE: f64 = 1e-9;
    ranking
        .iter()
        .position(|e| e.cumulative_percentage + TOLERANCE >= target)
        .map_or(ranking.len(), |i| i + 1)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn cumulative_monotone_and_complete(
            values in proptest::collection::vec(0.0_f64..1000.0, 2..30),
            threshold in 0.01_f64..=1.0,
        ) {
            prop_assume!(values.iter().sum::<f64>() > 0.0);
            let entries: Vec<(String, f64)> = values
                .iter()
                .enumerate()
                .map(|(i, &v)| (format!("c{i}"), v))
                .collect();
            let t = CategoryTally::new(&entries).expect("valid");
            let r = pareto_analysis(&t, threshold).expect("pareto");

            for w in r.ranking.windows(2) {
                prop_assert!(w[1].cumulative_percentage >= w[0].cumulative_percentage);
                prop_assert!(w[1].value <= w[0].value);
            }
            let last = r.ranking.last().expect("non-empty").cumulative_percentage;
            prop_assert!((last - 100.0).abs() < 1e-6);
            prop_assert!(!r.vital_few.is_empty());
            prop_assert!(r.vital_few_percentage + 1e-9 >= threshold * 100.0);
            prop_assert!((0.0..1.0).contains(&r.gini) || r.gini.abs() < 1e-12);
        }
    }
}
