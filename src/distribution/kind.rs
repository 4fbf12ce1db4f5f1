//! Reference distributions for probability plots.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use u_numflow::special;

use crate::error::AnalysisError;

/// Distribution a probability plot is drawn against.
///
/// # Linearizing transforms
///
/// | Kind | Data axis | Quantile axis |
/// |------|-----------|---------------|
/// | normal | x | Φ⁻¹(p) |
/// | lognormal | ln x | Φ⁻¹(p) |
/// | weibull | ln x | ln(-ln(1 - p)) |
///
/// # Examples
///
/// ```
/// use u_quality::distribution::DistributionKind;
///
/// let kind: DistributionKind = "weibull".parse().unwrap();
/// assert_eq!(kind, DistributionKind::Weibull);
/// assert!(kind.requires_positive());
/// assert!("gamma".parse::<DistributionKind>().is_err());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistributionKind {
    #[default]
    Normal,
    Lognormal,
    Weibull,
}

impl DistributionKind {
    pub const ALL: [DistributionKind; 3] = [
        DistributionKind::Normal,
        DistributionKind::Lognormal,
        DistributionKind::Weibull,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DistributionKind::Normal => "normal",
            DistributionKind::Lognormal => "lognormal",
            DistributionKind::Weibull => "weibull",
        }
    }

    /// `true` if the data must be strictly positive.
    pub fn requires_positive(self) -> bool {
        !matches!(self, DistributionKind::Normal)
    }

    /// Maps an observation onto the linearized data axis.
    pub fn transform(self, x: f64) -> f64 {
        match self {
            DistributionKind::Normal => x,
            DistributionKind::Lognormal | DistributionKind::Weibull => x.ln(),
        }
    }

    /// Maps a point on the linearized data axis back to the value scale.
    pub fn inverse_transform(self, y: f64) -> f64 {
        match self {
            DistributionKind::Normal => y,
            DistributionKind::Lognormal | DistributionKind::Weibull => y.exp(),
        }
    }

    /// Linearized theoretical quantile at cumulative probability `p` in (0, 1).
    pub fn quantile(self, p: f64) -> f64 {
        match self {
            DistributionKind::Normal | DistributionKind::Lognormal => {
                special::inverse_normal_cdf(p)
            }
            DistributionKind::Weibull => (-(1.0 - p).ln()).ln(),
        }
    }
}

impl fmt::Display for DistributionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DistributionKind {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        DistributionKind::ALL
            .into_iter()
            .find(|k| k.name() == lowered)
            .ok_or_else(|| {
                AnalysisError::invalid_value(
                    "distribution",
                    format!("unsupported distribution '{s}' (expected normal, lognormal or weibull)"),
                )
            })
    }
}
