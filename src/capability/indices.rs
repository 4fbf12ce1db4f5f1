//! Process capability indices (Cp, Cpk, Pp, Ppk, Cpm).
//!
//! Process capability indices quantify how well a process output fits within
//! specification limits. Cp/Cpk use the sample standard deviation (n-1),
//! Pp/Ppk use the population standard deviation (n).
//!
//! A zero standard deviation makes the indices unbounded; they are then
//! reported as [`StatValue::Unbounded`] rather than an `f64` infinity.
//!
//! # References
//!
//! - Montgomery (2019), *Introduction to Statistical Quality Control*, 8th ed.,
//!   Chapter 8.
//! - Kane (1986), "Process Capability Indices", *Journal of Quality Technology*
//!   18(1), pp. 41--52.
//! - Chan, Cheng & Spiring (1988), "A New Measure of Process Capability: Cpm",
//!   *Journal of Quality Technology* 20(3), pp. 162--175.

use serde::{Deserialize, Serialize};
use u_numflow::stats;

use super::sigma_level::{defect_sigma_level, tail_ppm};
use crate::error::{AnalysisError, Result};
use crate::interpret::{describe_capability, CapabilityRating};
use crate::value::StatValue;

/// Two-sided specification with an optional target.
///
/// # Examples
///
/// ```
/// use u_quality::capability::SpecLimits;
///
/// let spec = SpecLimits::new(9.0, 11.0).unwrap();
/// assert!((spec.target() - 10.0).abs() < 1e-12);
///
/// // LSL must be strictly below USL
/// assert!(SpecLimits::new(11.0, 9.0).is_err());
/// // target must lie within the limits
/// assert!(SpecLimits::new(9.0, 11.0).unwrap().with_target(12.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpecLimits {
    pub lsl: f64,
    pub usl: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<f64>,
}

impl SpecLimits {
    /// Creates a specification.
    ///
    /// # Errors
    ///
    /// `InvalidSpecification` if either limit is non-finite or `lsl >= usl`.
    pub fn new(lsl: f64, usl: f64) -> Result<Self> {
        let spec = Self {
            lsl,
            usl,
            target: None,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Sets the target used for Cpm.
    ///
    /// # Errors
    ///
    /// `InvalidSpecification` if the target lies outside `[lsl, usl]`.
    pub fn with_target(mut self, target: f64) -> Result<Self> {
        self.target = Some(target);
        self.validate()?;
        Ok(self)
    }

    /// Checks the limit and target ordering.
    ///
    /// Deserialized specifications bypass [`SpecLimits::new`], so engines
    /// call this before computing.
    pub fn validate(&self) -> Result<()> {
        if !self.lsl.is_finite() || !self.usl.is_finite() {
            return Err(AnalysisError::invalid_specification(
                "specification limits must be finite",
            ));
        }
        if self.lsl >= self.usl {
            return Err(AnalysisError::invalid_specification(format!(
                "LSL ({}) must be less than USL ({})",
                self.lsl, self.usl
            )));
        }
        if let Some(t) = self.target {
            if !t.is_finite() || t < self.lsl || t > self.usl {
                return Err(AnalysisError::invalid_specification(format!(
                    "target ({t}) must lie within [{}, {}]",
                    self.lsl, self.usl
                )));
            }
        }
        Ok(())
    }

    /// USL - LSL.
    pub fn tolerance(&self) -> f64 {
        self.usl - self.lsl
    }

    /// The explicit target, or the midpoint of the limits.
    pub fn target(&self) -> f64 {
        self.target.unwrap_or((self.lsl + self.usl) / 2.0)
    }
}

/// Computed capability indices.
///
/// # Invariants
///
/// - `cpk == min(cpu, cpl)` and `ppk == min(ppu, ppl)`
/// - every index is [`StatValue::Unbounded`] when its standard deviation is zero
///
/// # Index interpretation
///
/// | Index | Value | Interpretation |
/// |-------|-------|----------------|
/// | Cp/Pp | >= 1.33 | Process is capable |
/// | Cpk/Ppk | >= 1.33 | Process is capable and centered |
/// | Cpm | >= 1.33 | Process meets Taguchi loss criterion |
///
/// Reference: Montgomery (2019), Chapter 8, Table 8.5.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapabilityIndices {
    /// Cp = (USL - LSL) / (6 * s).
    pub cp: StatValue,
    /// Cpk = min(Cpu, Cpl).
    pub cpk: StatValue,
    /// Cpu = (USL - mean) / (3 * s).
    pub cpu: StatValue,
    /// Cpl = (mean - LSL) / (3 * s).
    pub cpl: StatValue,
    /// Pp = (USL - LSL) / (6 * sigma_pop).
    pub pp: StatValue,
    /// Ppk = min(Ppu, Ppl).
    pub ppk: StatValue,
    pub ppu: StatValue,
    pub ppl: StatValue,
    /// Cpm = (USL - LSL) / (6 * sqrt(s^2 + (mean - target)^2)).
    ///
    /// Reference: Chan, Cheng & Spiring (1988).
    pub cpm: StatValue,
}

/// Normal-tail defect estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DefectAnalysis {
    /// (USL - mean) / s; `None` when s = 0.
    pub z_usl: Option<f64>,
    /// (LSL - mean) / s; `None` when s = 0.
    pub z_lsl: Option<f64>,
    pub ppm_above_usl: f64,
    pub ppm_below_lsl: f64,
    pub ppm_total: f64,
    /// Short-term sigma level with the 1.5 sigma shift; 6.0 when no defects are expected.
    pub sigma_level: f64,
}

/// Full result of a capability study.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapabilityReport {
    pub sample_size: usize,
    pub mean: f64,
    /// Standard deviation with n-1 denominator.
    pub sample_std: f64,
    /// Standard deviation with n denominator.
    pub population_std: f64,
    pub spec: SpecLimits,
    /// Target used for Cpm (explicit or midpoint).
    pub target: f64,
    pub indices: CapabilityIndices,
    pub defects: DefectAnalysis,
    pub rating: CapabilityRating,
    pub interpretation: String,
}

/// Runs a capability study against two-sided specification limits.
///
/// # Errors
///
/// - `InvalidSpecification` if the limits or target are inconsistent
/// - `InsufficientData` if fewer than 2 observations
/// - `InvalidValue` if any observation is not finite
///
/// # Examples
///
/// ```
/// use u_quality::capability::{process_capability, SpecLimits};
///
/// let spec = SpecLimits::new(9.0, 11.0).unwrap();
/// let data = [9.5, 10.0, 10.2, 9.8, 10.1, 10.3, 9.9, 10.0, 10.1, 9.9];
/// let report = process_capability(&data, &spec).unwrap();
/// assert_eq!(report.indices.cpk, report.indices.cpu.min(report.indices.cpl));
/// assert!(report.indices.cp.finite().unwrap() > 1.0);
/// ```
pub fn process_capability(data: &[f64], spec: &SpecLimits) -> Result<CapabilityReport> {
    spec.validate()?;
    let n = data.len();
    if n < 2 {
        return Err(AnalysisError::insufficient_data("data", 2, n));
    }
    if data.iter().any(|v| !v.is_finite()) {
        return Err(AnalysisError::invalid_value("data", "observations must be finite"));
    }
    tracing::debug!(n, lsl = spec.lsl, usl = spec.usl, "computing process capability");

    let mean = stats::mean(data)
        .ok_or_else(|| AnalysisError::invalid_value("data", "mean is undefined"))?;
    let variance = stats::variance(data)
        .ok_or_else(|| AnalysisError::invalid_value("data", "variance is undefined"))?;
    let sample_std = variance.sqrt();
    let population_std = (variance * (n - 1) as f64 / n as f64).sqrt();
    let target = spec.target();

    let indices = compute_indices(spec, mean, sample_std, population_std, target);
    let defects = defect_analysis(spec, mean, sample_std);
    let rating = CapabilityRating::from_cpk(indices.cpk);
    let interpretation = describe_capability(indices.cpk, defects.ppm_total, defects.sigma_level);

    tracing::debug!(
        cp = %indices.cp,
        cpk = %indices.cpk,
        ppm = defects.ppm_total,
        "process capability computed"
    );

    Ok(CapabilityReport {
        sample_size: n,
        mean,
        sample_std,
        population_std,
        spec: *spec,
        target,
        indices,
        defects,
        rating,
        interpretation,
    })
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

fn compute_indices(
    spec: &SpecLimits,
    mean: f64,
    sample_std: f64,
    population_std: f64,
    target: f64,
) -> CapabilityIndices {
    let tolerance = spec.tolerance();

    // Short-term indices (sample sigma)
    let cp = StatValue::ratio(tolerance, 6.0 * sample_std);
    let cpu = StatValue::ratio(spec.usl - mean, 3.0 * sample_std);
    let cpl = StatValue::ratio(mean - spec.lsl, 3.0 * sample_std);

    // Long-term indices (population sigma)
    let pp = StatValue::ratio(tolerance, 6.0 * population_std);
    let ppu = StatValue::ratio(spec.usl - mean, 3.0 * population_std);
    let ppl = StatValue::ratio(mean - spec.lsl, 3.0 * population_std);

    // Taguchi Cpm index
    let offset = mean - target;
    let cpm = StatValue::ratio(
        tolerance,
        6.0 * (sample_std * sample_std + offset * offset).sqrt(),
    );

    CapabilityIndices {
        cp,
        cpk: cpu.min(cpl),
        cpu,
        cpl,
        pp,
        ppk: ppu.min(ppl),
        ppu,
        ppl,
        cpm,
    }
}

fn defect_analysis(spec: &SpecLimits, mean: f64, sample_std: f64) -> DefectAnalysis {
    let (z_usl, z_lsl, ppm_above_usl, ppm_below_lsl) = if sample_std > 0.0 {
        let z_usl = (spec.usl - mean) / sample_std;
        let z_lsl = (spec.lsl - mean) / sample_std;
        (
            Some(z_usl),
            Some(z_lsl),
            tail_ppm(z_usl),
            // lower tail mirrors the upper: Phi(z) = 1 - Phi(-z)
            tail_ppm(-z_lsl),
        )
    } else {
        // Every observation sits at the mean.
        let above = if mean > spec.usl { 1_000_000.0 } else { 0.0 };
        let below = if mean < spec.lsl { 1_000_000.0 } else { 0.0 };
        (None, None, above, below)
    };
    let ppm_total = ppm_above_usl + ppm_below_lsl;

    DefectAnalysis {
        z_usl,
        z_lsl,
        ppm_above_usl,
        ppm_below_lsl,
        ppm_total,
        sigma_level: defect_sigma_level(ppm_total),
    }
}
