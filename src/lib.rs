//! # u-quality
//!
//! Statistical process control, process capability, variance analysis,
//! Pareto ranking and distribution fitting for quality engineering.
//!
//! Every analysis takes validated numeric input, returns a plain result
//! record and attaches a short plain-language interpretation.
//!
//! ## Modules
//!
//! - [`validate`]: Raw input shapes, cleaning and minimum sizes
//! - [`spc`]: Individuals (I-MR) chart with Western Electric rules
//! - [`capability`]: Capability indices (Cp, Cpk, Pp, Ppk, Cpm), PPM, sigma level
//! - [`anova`]: One-way ANOVA with Tukey HSD post-hoc comparisons
//! - [`pareto`]: Pareto ranking, vital few and Gini concentration
//! - [`distribution`]: Probability plots, confidence bands, Anderson-Darling
//! - [`process`]: Combined stability, capability and distribution assessment
//! - [`interpret`]: Ratings and narrative text shared by the engines
//! - [`engine`]: Tagged request dispatch and JSON entry point
//! - [`config`]: Analysis parameters and their defaults
//!
//! ## Design Philosophy
//!
//! - **Validate first**: engines only see clean series, groups or tallies
//! - **Numerical stability**: Leverages `u-numflow` for statistics and special functions
//! - **No partial results**: every failure is an [`AnalysisError`] with a stable code
//! - **Research-backed**: All algorithms reference academic literature

pub mod anova;
pub mod capability;
pub mod config;
pub mod distribution;
pub mod engine;
pub mod error;
pub mod interpret;
pub mod pareto;
pub mod process;
pub mod spc;
pub mod validate;
pub mod value;

pub use engine::{run, run_json, AnalysisKind, AnalysisReport, AnalysisRequest};
pub use error::{AnalysisError, Result};
pub use value::StatValue;
