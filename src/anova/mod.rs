//! Variance analysis.
//!
//! - [`one_way_anova`]: omnibus F test, η² effect size and Tukey HSD post-hoc
//! - [`tukey_critical_value`]: studentized range quantile (table or numerical)
//! - [`studentized_range_sf`]: upper-tail probability of a studentized range

mod oneway;
mod studentized;

pub use oneway::{one_way_anova, AnovaResult, GroupStatistics, PostHocComparison, TukeyHsd};
pub use studentized::{
    studentized_range_sf, tukey_critical_value, CriticalValueSource, TABLE_ALPHA,
};
