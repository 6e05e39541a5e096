//! Scenarios and scenario comparisons
//!
//! A `Scenario` is a named set of parameter changes applied against a base
//! risk register to produce a derived register; the base is never mutated.
//! A `ScenarioComparison` captures the statistical difference between two
//! scenarios' outcome distributions.

use serde::{Deserialize, Serialize};

use super::ids::{MitigationId, RiskId, ScenarioId};
use super::risk::ImpactDistribution;

/// One modification to a risk in the base register
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ParameterChange {
    /// Swap the risk's impact distribution for a new one
    ReplaceDistribution {
        risk_id: RiskId,
        distribution: ImpactDistribution,
    },
    /// Re-anchor the risk's reference impact
    SetBaselineImpact { risk_id: RiskId, baseline_impact: f64 },
    /// Enable one of the risk's mitigations
    ActivateMitigation {
        risk_id: RiskId,
        mitigation_id: MitigationId,
    },
    /// Disable one of the risk's mitigations
    DeactivateMitigation {
        risk_id: RiskId,
        mitigation_id: MitigationId,
    },
}

impl ParameterChange {
    /// The risk this change targets
    #[must_use]
    pub fn risk_id(&self) -> RiskId {
        match self {
            ParameterChange::ReplaceDistribution { risk_id, .. }
            | ParameterChange::SetBaselineImpact { risk_id, .. }
            | ParameterChange::ActivateMitigation { risk_id, .. }
            | ParameterChange::DeactivateMitigation { risk_id, .. } => *risk_id,
        }
    }
}

/// A named, derived view of the risk register
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: ScenarioId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Marks the reference scenario for comparisons
    #[serde(default)]
    pub is_baseline: bool,
    #[serde(default)]
    pub changes: Vec<ParameterChange>,
}

/// Qualitative bucket for Cohen's d, standard thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectSize {
    Negligible,
    Small,
    Medium,
    Large,
}

impl EffectSize {
    /// Classify an absolute Cohen's d: <0.2 negligible, <0.5 small,
    /// <0.8 medium, otherwise large.
    #[must_use]
    pub fn classify(cohens_d: f64) -> Self {
        let d = cohens_d.abs();
        if d < 0.2 {
            EffectSize::Negligible
        } else if d < 0.5 {
            EffectSize::Small
        } else if d < 0.8 {
            EffectSize::Medium
        } else {
            EffectSize::Large
        }
    }
}

/// Difference between two scenarios on one outcome dimension
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricComparison {
    pub mean_a: f64,
    pub mean_b: f64,
    pub mean_difference: f64,
    /// Change relative to scenario A, in percent
    pub percent_change: f64,
    /// Welch's t-test two-sided p-value
    pub p_value: f64,
    pub significant: bool,
    pub cohens_d: f64,
    pub effect_size: EffectSize,
}

/// Pairwise comparison of two scenarios' outcome distributions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioComparison {
    pub scenario_a: ScenarioId,
    pub scenario_b: ScenarioId,
    pub cost: MetricComparison,
    pub schedule: MetricComparison,
}
