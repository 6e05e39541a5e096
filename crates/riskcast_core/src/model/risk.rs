//! Risk register entities
//!
//! A `Risk` is a named source of potential cost/schedule deviation, modeled by
//! a probability distribution over its impact. Risks optionally declare
//! correlation dependencies on other risks and carry mitigation strategies
//! that reduce realized impact when enabled.

use serde::{Deserialize, Serialize};

use crate::stats;

use super::ids::{MitigationId, RiskId};

/// Project risk categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskCategory {
    Technical,
    Schedule,
    Cost,
    Resource,
    External,
    Quality,
    Regulatory,
}

impl RiskCategory {
    /// All supported categories, in declaration order
    pub const ALL: [RiskCategory; 7] = [
        RiskCategory::Technical,
        RiskCategory::Schedule,
        RiskCategory::Cost,
        RiskCategory::Resource,
        RiskCategory::External,
        RiskCategory::Quality,
        RiskCategory::Regulatory,
    ];

    /// Stable lowercase label, matching the serialized form
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            RiskCategory::Technical => "technical",
            RiskCategory::Schedule => "schedule",
            RiskCategory::Cost => "cost",
            RiskCategory::Resource => "resource",
            RiskCategory::External => "external",
            RiskCategory::Quality => "quality",
            RiskCategory::Regulatory => "regulatory",
        }
    }
}

/// Which outcome dimensions a risk affects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactType {
    Cost,
    Schedule,
    Both,
}

impl ImpactType {
    /// All supported impact types, in declaration order
    pub const ALL: [ImpactType; 3] = [ImpactType::Cost, ImpactType::Schedule, ImpactType::Both];

    /// Stable lowercase label, matching the serialized form
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            ImpactType::Cost => "cost",
            ImpactType::Schedule => "schedule",
            ImpactType::Both => "both",
        }
    }

    #[must_use]
    pub fn affects_cost(&self) -> bool {
        matches!(self, ImpactType::Cost | ImpactType::Both)
    }

    #[must_use]
    pub fn affects_schedule(&self) -> bool {
        matches!(self, ImpactType::Schedule | ImpactType::Both)
    }
}

/// Probability distribution over a risk's impact magnitude.
///
/// Parameters are authored directly in impact units (currency for cost
/// impacts, days for schedule impacts). Sampling is a pure inverse-CDF
/// transform of a uniform draw in (0, 1), so the correlation layer fully
/// controls the randomness: the same draw and parameters always produce the
/// same value.
///
/// Parameter validity is checked once, when the simulation request is
/// validated; `sample` assumes parameters have already been accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ImpactDistribution {
    Normal {
        mean: f64,
        std_dev: f64,
    },
    Triangular {
        min: f64,
        mode: f64,
        max: f64,
    },
    Uniform {
        min: f64,
        max: f64,
    },
    /// Beta distribution scaled into `[0, scale]`
    Beta {
        alpha: f64,
        beta: f64,
        scale: f64,
    },
    /// Parameterized on the underlying normal: `exp(mu + sigma * z)`
    LogNormal {
        mu: f64,
        sigma: f64,
    },
}

impl ImpactDistribution {
    /// Stable lowercase kind label, matching the serialized `type` tag
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            ImpactDistribution::Normal { .. } => "normal",
            ImpactDistribution::Triangular { .. } => "triangular",
            ImpactDistribution::Uniform { .. } => "uniform",
            ImpactDistribution::Beta { .. } => "beta",
            ImpactDistribution::LogNormal { .. } => "lognormal",
        }
    }

    /// All supported distribution kind labels
    pub const KINDS: [&'static str; 5] = ["normal", "triangular", "uniform", "beta", "lognormal"];

    /// Transform a uniform draw in (0, 1) into a realized impact value.
    ///
    /// The draw is clamped away from 0 and 1 so inverse CDFs with infinite
    /// support stay finite.
    #[must_use]
    pub fn sample(&self, uniform_draw: f64) -> f64 {
        let u = uniform_draw.clamp(stats::UNIFORM_DRAW_FLOOR, 1.0 - stats::UNIFORM_DRAW_FLOOR);
        match self {
            ImpactDistribution::Normal { mean, std_dev } => mean + std_dev * stats::norm_inv_cdf(u),
            ImpactDistribution::Triangular { min, mode, max } => {
                let span = max - min;
                let mode_fraction = (mode - min) / span;
                if u < mode_fraction {
                    min + (u * span * (mode - min)).sqrt()
                } else {
                    max - ((1.0 - u) * span * (max - mode)).sqrt()
                }
            }
            ImpactDistribution::Uniform { min, max } => min + u * (max - min),
            ImpactDistribution::Beta { alpha, beta, scale } => {
                scale * stats::inv_inc_beta(*alpha, *beta, u)
            }
            ImpactDistribution::LogNormal { mu, sigma } => {
                (mu + sigma * stats::norm_inv_cdf(u)).exp()
            }
        }
    }

    /// Analytic mean of the distribution, used for execution-time estimation
    /// and severity reporting. Not used in the sampling hot loop.
    #[must_use]
    pub fn mean(&self) -> f64 {
        match self {
            ImpactDistribution::Normal { mean, .. } => *mean,
            ImpactDistribution::Triangular { min, mode, max } => (min + mode + max) / 3.0,
            ImpactDistribution::Uniform { min, max } => (min + max) / 2.0,
            ImpactDistribution::Beta { alpha, beta, scale } => scale * alpha / (alpha + beta),
            ImpactDistribution::LogNormal { mu, sigma } => (mu + 0.5 * sigma * sigma).exp(),
        }
    }
}

/// An intervention that reduces a risk's realized impact.
///
/// `effectiveness` is the fraction of impact removed when the mitigation is
/// enabled: an effectiveness of 0.6 leaves 40% of the raw impact. Mitigations
/// start disabled; scenarios enable them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mitigation {
    pub id: MitigationId,
    pub name: String,
    /// One-time cost of implementing the mitigation
    pub cost: f64,
    /// Fraction of impact removed, in [0, 1]
    pub effectiveness: f64,
    /// Lead time to put the mitigation in place
    pub implementation_days: f64,
    #[serde(default)]
    pub enabled: bool,
}

/// A named source of potential project cost/schedule deviation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Risk {
    pub id: RiskId,
    pub name: String,
    pub category: RiskCategory,
    pub impact_type: ImpactType,
    pub distribution: ImpactDistribution,
    /// Reference impact magnitude, used to anchor severity reporting. The
    /// sampled distribution value is already in impact units; this is never
    /// multiplied into samples.
    pub baseline_impact: f64,
    /// Other risks this risk co-moves with (entries in the correlation matrix)
    #[serde(default)]
    pub correlation_dependencies: Vec<RiskId>,
    #[serde(default)]
    pub mitigations: Vec<Mitigation>,
}

impl Risk {
    /// Combined impact multiplier from all enabled mitigations.
    ///
    /// Enabled mitigations compound multiplicatively: two mitigations of
    /// effectiveness 0.5 leave 25% of the raw impact.
    #[must_use]
    pub fn mitigation_factor(&self) -> f64 {
        self.mitigations
            .iter()
            .filter(|m| m.enabled)
            .map(|m| 1.0 - m.effectiveness)
            .product()
    }

    /// Look up a mitigation by id
    #[must_use]
    pub fn mitigation(&self, id: MitigationId) -> Option<&Mitigation> {
        self.mitigations.iter().find(|m| m.id == id)
    }

    /// Mutable lookup, used by the scenario generator when toggling activation
    pub fn mitigation_mut(&mut self, id: MitigationId) -> Option<&mut Mitigation> {
        self.mitigations.iter_mut().find(|m| m.id == id)
    }
}
