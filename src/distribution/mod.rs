//! Distribution fit assessment.
//!
//! - [`probability_plot`]: plotting positions, linear fit, confidence bands and outliers
//! - [`anderson_darling_test`]: normality test with a step-table p-value
//! - [`DistributionKind`]: normal, lognormal or weibull reference distribution

mod anderson_darling;
mod kind;
mod plot;

pub use anderson_darling::{
    ad_p_value, anderson_darling_test, AndersonDarlingResult, AD_BREAKPOINTS, AD_P_VALUES,
};
pub use kind::DistributionKind;
pub use plot::{
    plotting_positions, probability_plot, ConfidenceBand, LinearFit, Outliers, ProbabilityPlot,
    BAND_PROBABILITY_CEIL, BAND_PROBABILITY_FLOOR,
};
