//! Process capability analysis.
//!
//! Compares the natural spread of a process with its two-sided
//! specification limits.
//!
//! # Indices
//!
//! - **Cp**, **Cpk**: Short-term capability (sample sigma)
//! - **Pp**, **Ppk**: Long-term performance (population sigma)
//! - **Cpm**: Taguchi capability (target deviation)
//!
//! # Defect estimate
//!
//! - [`DefectAnalysis`]: normal-tail PPM above USL and below LSL
//! - [`defect_sigma_level`]: two-sided sigma level of a PPM total
//! - [`sigma_to_ppm`] / [`ppm_to_sigma`]: one-sided conversions
//!
//! # References
//!
//! - Montgomery (2019), *Introduction to Statistical Quality Control*, 8th ed.

mod indices;
mod sigma_level;

pub use indices::{process_capability, CapabilityIndices, CapabilityReport, DefectAnalysis, SpecLimits};
pub use sigma_level::{
    defect_sigma_level, ppm_to_sigma, sigma_to_ppm, MAX_SIGMA_LEVEL, SIGMA_SHIFT,
};
