//! Realized impact of a single risk in a single iteration
//!
//! The sampled distribution value is already expressed in impact units
//! (currency for cost, days for schedule); impact type gates which outcome
//! dimensions receive it, and enabled mitigations scale it down. The
//! baseline impact never multiplies into the sample — distribution
//! parameters are authored in absolute units.

use crate::model::{ImpactType, Risk};

/// Cost and schedule impact realized by one risk in one iteration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RealizedImpact {
    pub cost: f64,
    pub schedule: f64,
}

/// Combine a sampled value with the risk's impact type and enabled
/// mitigations into realized (cost, schedule) impacts.
///
/// A schedule-only risk produces a zero cost impact and vice versa. Each
/// enabled mitigation of effectiveness `e` multiplies the impact by `1 - e`.
#[must_use]
pub fn realize(risk: &Risk, sampled_value: f64) -> RealizedImpact {
    let mitigated = sampled_value * risk.mitigation_factor();
    match risk.impact_type {
        ImpactType::Cost => RealizedImpact {
            cost: mitigated,
            schedule: 0.0,
        },
        ImpactType::Schedule => RealizedImpact {
            cost: 0.0,
            schedule: mitigated,
        },
        ImpactType::Both => RealizedImpact {
            cost: mitigated,
            schedule: mitigated,
        },
    }
}
