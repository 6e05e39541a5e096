//! Pairwise correlation structure between risks
//!
//! The matrix is stored sparsely as a list of declared pairs; undeclared
//! pairs are independent (coefficient 0) and the diagonal is implicitly 1.
//! Symmetry is by construction: a pair is keyed on the unordered id pair, so
//! setting (a, b) and reading (b, a) agree.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::ids::RiskId;
use super::risk::Risk;

/// One declared correlation between two risks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrelationEntry {
    pub first: RiskId,
    pub second: RiskId,
    pub coefficient: f64,
}

/// Sparse symmetric correlation matrix over a risk register
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    entries: Vec<CorrelationEntry>,
}

impl CorrelationMatrix {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare (or overwrite) the coefficient for an unordered pair.
    ///
    /// Setting the diagonal is ignored; it is implicitly 1.
    pub fn set(&mut self, a: RiskId, b: RiskId, coefficient: f64) {
        if a == b {
            return;
        }
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|e| e.first == first && e.second == second)
        {
            entry.coefficient = coefficient;
        } else {
            self.entries.push(CorrelationEntry {
                first,
                second,
                coefficient,
            });
        }
    }

    /// Coefficient for a pair: 1 on the diagonal, 0 for undeclared pairs.
    #[must_use]
    pub fn coefficient(&self, a: RiskId, b: RiskId) -> f64 {
        if a == b {
            return 1.0;
        }
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        self.entries
            .iter()
            .find(|e| e.first == first && e.second == second)
            .map_or(0.0, |e| e.coefficient)
    }

    /// Iterate over declared pairs (canonical order, first <= second)
    pub fn iter(&self) -> impl Iterator<Item = &CorrelationEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Densify into an n×n row-major matrix following the order of `risks`.
    ///
    /// Entries referencing ids not present in `risks` are skipped; validation
    /// reports them before any simulation reaches this point.
    #[must_use]
    pub fn to_dense(&self, risks: &[Risk]) -> Vec<f64> {
        let n = risks.len();
        let index: FxHashMap<RiskId, usize> = risks
            .iter()
            .enumerate()
            .map(|(i, r)| (r.id, i))
            .collect();

        let mut dense = vec![0.0; n * n];
        for i in 0..n {
            dense[i * n + i] = 1.0;
        }
        for entry in &self.entries {
            if let (Some(&i), Some(&j)) = (index.get(&entry.first), index.get(&entry.second)) {
                dense[i * n + j] = entry.coefficient;
                dense[j * n + i] = entry.coefficient;
            }
        }
        dense
    }
}
