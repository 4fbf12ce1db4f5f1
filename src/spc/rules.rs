//! Western Electric run rules for individuals charts.
//!
//! Each supplementary rule is evaluated over every sliding window of its
//! length. Overlapping windows that fire are reported independently; no
//! deduplication is performed, so a long run produces one violation per
//! window position.
//!
//! # References
//!
//! - Western Electric (1956). *Statistical Quality Control Handbook*.
//! - Montgomery, D.C. (2019). *Introduction to Statistical Quality Control*, 8th ed.

use super::chart::{ControlLimits, RuleViolation, Side, ViolationType};

/// A set of run rules applied to time-ordered values.
pub trait RunRule {
    /// Returns every window that fires, ordered by window start.
    fn check(&self, values: &[f64], limits: &ControlLimits) -> Vec<RuleViolation>;
}

/// The three supplementary Western Electric rules.
///
/// 1. 2 of 3 consecutive points beyond 2 sigma, same side
/// 2. 4 of 5 consecutive points beyond 1 sigma, same side
/// 3. 8 consecutive points on the same side of the center line
///
/// The rule "one point beyond 3 sigma" is reported separately as the
/// out-of-control set.
pub struct WesternElectricRules;

/// Window length for the 2-of-3 rule.
const TWO_OF_THREE_WINDOW: usize = 3;
/// Window length for the 4-of-5 rule.
const FOUR_OF_FIVE_WINDOW: usize = 5;
/// Run length for the one-side rule.
const ONE_SIDE_RUN: usize = 8;

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Fires on every window of `width` in which at least `required` points lie
/// beyond `k` sigma on the same side.
fn check_k_of_m(
    values: &[f64],
    limits: &ControlLimits,
    width: usize,
    required: usize,
    k: f64,
    rule: ViolationType,
) -> Vec<RuleViolation> {
    let mut violations = Vec::new();
    if values.len() < width {
        return violations;
    }

    let (upper, lower) = limits.zone(k);
    for (start, window) in values.windows(width).enumerate() {
        let above = window.iter().filter(|&&v| v > upper).count();
        let below = window.iter().filter(|&&v| v < lower).count();
        let side = if above >= required {
            Some(Side::Above)
        } else if below >= required {
            Some(Side::Below)
        } else {
            None
        };
        if let Some(side) = side {
            violations.push(RuleViolation {
                rule,
                window_start: start,
                points: (start..start + width).collect(),
                side,
            });
        }
    }
    violations
}

/// 2 of 3 consecutive points beyond 2 sigma on the same side.
fn check_two_of_three(values: &[f64], limits: &ControlLimits) -> Vec<RuleViolation> {
    check_k_of_m(
        values,
        limits,
        TWO_OF_THREE_WINDOW,
        2,
        2.0,
        ViolationType::TwoOfThreeBeyond2Sigma,
    )
}

/// 4 of 5 consecutive points beyond 1 sigma on the same side.
fn check_four_of_five(values: &[f64], limits: &ControlLimits) -> Vec<RuleViolation> {
    check_k_of_m(
        values,
        limits,
        FOUR_OF_FIVE_WINDOW,
        4,
        1.0,
        ViolationType::FourOfFiveBeyond1Sigma,
    )
}

/// 8 consecutive points strictly on one side of the center line.
///
/// A point exactly on the center line belongs to neither side.
fn check_one_side(values: &[f64], limits: &ControlLimits) -> Vec<RuleViolation> {
    let mut violations = Vec::new();
    if values.len() < ONE_SIDE_RUN {
        return violations;
    }

    let cl = limits.center;
    for (start, window) in values.windows(ONE_SIDE_RUN).enumerate() {
        let side = if window.iter().all(|&v| v > cl) {
            Some(Side::Above)
        } else if window.iter().all(|&v| v < cl) {
            Some(Side::Below)
        } else {
            None
        };
        if let Some(side) = side {
            violations.push(RuleViolation {
                rule: ViolationType::EightOneSide,
                window_start: start,
                points: (start..start + ONE_SIDE_RUN).collect(),
                side,
            });
        }
    }
    violations
}

impl RunRule for WesternElectricRules {
    fn check(&self, values: &[f64], limits: &ControlLimits) -> Vec<RuleViolation> {
        let mut results = Vec::new();
        results.extend(check_two_of_three(values, limits));
        results.extend(check_four_of_five(values, limits));
        results.extend(check_one_side(values, limits));
        // Stable: equal starts keep rule order.
        results.sort_by_key(|v| v.window_start);
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> ControlLimits {
        // sigma = 1.0 → 1σ zone [24, 26], 2σ zone [23, 27]
        ControlLimits::new(25.0, 1.0)
    }

    // --- 2 of 3 beyond 2σ ---

    #[test]
    fn test_two_of_three_above() {
        let v = check_two_of_three(&[27.5, 25.0, 27.5], &limits());
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].rule, ViolationType::TwoOfThreeBeyond2Sigma);
        assert_eq!(v[0].side, Side::Above);
        assert_eq!(v[0].points, vec![0, 1, 2]);
    }

    #[test]
    fn test_two_of_three_below() {
        let v = check_two_of_three(&[22.5, 25.0, 22.5], &limits());
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].side, Side::Below);
    }

    #[test]
    fn test_two_of_three_mixed_sides_does_not_fire() {
        let v = check_two_of_three(&[27.5, 25.0, 22.5], &limits());
        assert!(v.is_empty());
    }

    #[test]
    fn test_two_of_three_overlapping_windows_reported_separately() {
        // windows [0..3], [1..4], [2..5] all hold two points above 27
        let v = check_two_of_three(&[27.5, 27.5, 25.0, 27.5, 27.5], &limits());
        let starts: Vec<usize> = v.iter().map(|x| x.window_start).collect();
        assert_eq!(starts, vec![0, 1, 2]);
    }

    #[test]
    fn test_two_sigma_boundary_is_not_beyond() {
        let v = check_two_of_three(&[27.0, 27.0, 27.0], &limits());
        assert!(v.is_empty());
    }

    // --- 4 of 5 beyond 1σ ---

    #[test]
    fn test_four_of_five_above() {
        let v = check_four_of_five(&[26.5, 26.5, 25.0, 26.5, 26.5], &limits());
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].rule, ViolationType::FourOfFiveBeyond1Sigma);
        assert_eq!(v[0].points, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_three_of_five_not_enough() {
        let v = check_four_of_five(&[26.5, 25.0, 25.0, 26.5, 26.5], &limits());
        assert!(v.is_empty());
    }

    // --- 8 on one side ---

    #[test]
    fn test_eight_above() {
        let v = check_one_side(&[25.5; 8], &limits());
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].rule, ViolationType::EightOneSide);
        assert_eq!(v[0].side, Side::Above);
    }

    #[test]
    fn test_seven_not_enough() {
        assert!(check_one_side(&[25.5; 7], &limits()).is_empty());
    }

    #[test]
    fn test_ten_below_gives_three_windows() {
        let v = check_one_side(&[24.5; 10], &limits());
        assert_eq!(v.len(), 3);
        assert_eq!(v[2].window_start, 2);
        assert_eq!(v[2].points, (2..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_point_on_center_breaks_run() {
        let mut values = [25.5; 9];
        values[4] = 25.0;
        assert!(check_one_side(&values, &limits()).is_empty());
    }

    // --- Combined ---

    #[test]
    fn test_western_electric_sorted_by_window_start() {
        let values = [25.5, 25.5, 25.5, 26.5, 26.5, 26.5, 27.5, 27.5, 25.5];
        let v = WesternElectricRules.check(&values, &limits());
        assert!(!v.is_empty());
        for w in v.windows(2) {
            assert!(w[0].window_start <= w[1].window_start);
        }
        assert!(v.iter().any(|x| x.rule == ViolationType::EightOneSide));
        assert!(v.iter().any(|x| x.rule == ViolationType::FourOfFiveBeyond1Sigma));
        assert!(v.iter().any(|x| x.rule == ViolationType::TwoOfThreeBeyond2Sigma));
    }

    #[test]
    fn test_no_violations_in_random_looking_data() {
        let values = [25.5, 24.8, 25.2, 24.9, 25.1];
        assert!(WesternElectricRules.check(&values, &limits()).is_empty());
    }

    #[test]
    fn test_short_series_has_no_windows() {
        assert!(WesternElectricRules.check(&[30.0, 30.0], &limits()).is_empty());
    }
}
