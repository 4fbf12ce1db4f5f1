//! Statistical Process Control (SPC) charts.
//!
//! Individuals (I-MR) chart with Western Electric run rules.
//!
//! - [`individuals_chart`]: center line, limits and signals for single observations
//! - [`WesternElectricRules`]: supplementary run rules evaluated over sliding windows
//!
//! # References
//!
//! - Montgomery, D.C. (2019). *Introduction to Statistical Quality Control*, 8th ed.
//! - ASTM E2587: Standard Practice for Use of Control Charts
//! - Western Electric (1956). *Statistical Quality Control Handbook*.

mod chart;
mod individuals;
mod rules;

pub use chart::{
    ChartPoint, ControlLimits, MovingRangeLimits, RuleViolation, Side, ViolationType, D2,
    D2_MOVING_RANGE, D4, D4_MOVING_RANGE, LIMIT_SIGMAS,
};
pub use individuals::{individuals_chart, IndividualsChart, MIN_OBSERVATIONS};
pub use rules::{RunRule, WesternElectricRules};
