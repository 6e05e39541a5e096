//! Simulation request — the immutable input bundle for one run

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::correlation::CorrelationMatrix;
use super::ids::RiskId;
use super::risk::Risk;

/// Everything the engine needs for one simulation run.
///
/// The engine only reads the request; the caller owns the register and the
/// matrix. `seed` makes the run bit-reproducible; when absent a seed is drawn
/// from entropy and recorded in the run metadata so the run can be replayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    pub risks: Vec<Risk>,
    #[serde(default)]
    pub correlations: CorrelationMatrix,
    pub iterations: usize,
    #[serde(default)]
    pub seed: Option<u64>,
    /// Project cost with no risks realized — the reference point outcomes are
    /// reported against
    pub baseline_cost: f64,
    /// Project duration (days) with no risks realized
    pub baseline_schedule: f64,
}

impl SimulationRequest {
    /// Map from risk id to index in `risks` (the order outcome breakdowns use)
    #[must_use]
    pub fn risk_index(&self) -> FxHashMap<RiskId, usize> {
        self.risks
            .iter()
            .enumerate()
            .map(|(i, r)| (r.id, i))
            .collect()
    }

    /// Look up a risk by id
    #[must_use]
    pub fn risk(&self, id: RiskId) -> Option<&Risk> {
        self.risks.iter().find(|r| r.id == id)
    }
}
