//! Request builder DSL
//!
//! Fluent construction of risk registers and simulation requests with
//! automatic ID assignment and name-based correlation lookups.
//!
//! ```ignore
//! let request = RequestBuilder::new()
//!     .iterations(10_000)
//!     .seed(42)
//!     .baseline_cost(1_000_000.0)
//!     .risk(RiskBuilder::cost("Vendor delay")
//!         .category(RiskCategory::External)
//!         .triangular(25_000.0, 75_000.0, 150_000.0)
//!         .baseline_impact(75_000.0)
//!         .mitigation("Second source", 15_000.0, 0.5, 30.0))
//!     .risk(RiskBuilder::schedule("Integration slip")
//!         .normal(30.0, 10.0)
//!         .baseline_impact(30.0))
//!     .correlation("Vendor delay", "Integration slip", 0.6)
//!     .build()?;
//! ```

use std::collections::HashMap;

use crate::error::{ValidationError, ValidationIssue};
use crate::model::{
    CorrelationMatrix, ImpactDistribution, ImpactType, Mitigation, MitigationId, Risk,
    RiskCategory, RiskId, SimulationRequest,
};

/// Builder for a single risk; IDs are assigned by `RequestBuilder::build`
#[derive(Debug, Clone)]
pub struct RiskBuilder {
    name: String,
    category: RiskCategory,
    impact_type: ImpactType,
    distribution: Option<ImpactDistribution>,
    baseline_impact: f64,
    mitigations: Vec<PendingMitigation>,
}

#[derive(Debug, Clone)]
struct PendingMitigation {
    name: String,
    cost: f64,
    effectiveness: f64,
    implementation_days: f64,
    enabled: bool,
}

impl RiskBuilder {
    fn with_impact_type(name: impl Into<String>, impact_type: ImpactType) -> Self {
        Self {
            name: name.into(),
            category: RiskCategory::Technical,
            impact_type,
            distribution: None,
            baseline_impact: 0.0,
            mitigations: Vec::new(),
        }
    }

    /// A risk affecting project cost only
    #[must_use]
    pub fn cost(name: impl Into<String>) -> Self {
        Self::with_impact_type(name, ImpactType::Cost)
    }

    /// A risk affecting project schedule only
    #[must_use]
    pub fn schedule(name: impl Into<String>) -> Self {
        Self::with_impact_type(name, ImpactType::Schedule)
    }

    /// A risk affecting both cost and schedule
    #[must_use]
    pub fn both(name: impl Into<String>) -> Self {
        Self::with_impact_type(name, ImpactType::Both)
    }

    #[must_use]
    pub fn category(mut self, category: RiskCategory) -> Self {
        self.category = category;
        self
    }

    #[must_use]
    pub fn normal(mut self, mean: f64, std_dev: f64) -> Self {
        self.distribution = Some(ImpactDistribution::Normal { mean, std_dev });
        self
    }

    #[must_use]
    pub fn triangular(mut self, min: f64, mode: f64, max: f64) -> Self {
        self.distribution = Some(ImpactDistribution::Triangular { min, mode, max });
        self
    }

    #[must_use]
    pub fn uniform(mut self, min: f64, max: f64) -> Self {
        self.distribution = Some(ImpactDistribution::Uniform { min, max });
        self
    }

    #[must_use]
    pub fn beta(mut self, alpha: f64, beta: f64, scale: f64) -> Self {
        self.distribution = Some(ImpactDistribution::Beta { alpha, beta, scale });
        self
    }

    #[must_use]
    pub fn lognormal(mut self, mu: f64, sigma: f64) -> Self {
        self.distribution = Some(ImpactDistribution::LogNormal { mu, sigma });
        self
    }

    #[must_use]
    pub fn baseline_impact(mut self, value: f64) -> Self {
        self.baseline_impact = value;
        self
    }

    /// Attach a mitigation, disabled by default (scenarios enable it)
    #[must_use]
    pub fn mitigation(
        mut self,
        name: impl Into<String>,
        cost: f64,
        effectiveness: f64,
        implementation_days: f64,
    ) -> Self {
        self.mitigations.push(PendingMitigation {
            name: name.into(),
            cost,
            effectiveness,
            implementation_days,
            enabled: false,
        });
        self
    }

    /// Attach a mitigation that starts enabled
    #[must_use]
    pub fn active_mitigation(
        mut self,
        name: impl Into<String>,
        cost: f64,
        effectiveness: f64,
        implementation_days: f64,
    ) -> Self {
        self.mitigations.push(PendingMitigation {
            name: name.into(),
            cost,
            effectiveness,
            implementation_days,
            enabled: true,
        });
        self
    }
}

#[derive(Debug, Clone)]
struct PendingCorrelation {
    first: String,
    second: String,
    coefficient: f64,
}

/// Builder for a complete simulation request
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    iterations: usize,
    seed: Option<u64>,
    baseline_cost: f64,
    baseline_schedule: f64,
    pending_risks: Vec<RiskBuilder>,
    pending_correlations: Vec<PendingCorrelation>,
    next_risk_id: u16,
    next_mitigation_id: u16,
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            iterations: 10_000,
            seed: None,
            baseline_cost: 0.0,
            baseline_schedule: 0.0,
            pending_risks: Vec::new(),
            pending_correlations: Vec::new(),
            next_risk_id: 0,
            next_mitigation_id: 0,
        }
    }

    #[must_use]
    pub fn iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn baseline_cost(mut self, value: f64) -> Self {
        self.baseline_cost = value;
        self
    }

    #[must_use]
    pub fn baseline_schedule(mut self, value: f64) -> Self {
        self.baseline_schedule = value;
        self
    }

    #[must_use]
    pub fn risk(mut self, risk: RiskBuilder) -> Self {
        self.pending_risks.push(risk);
        self
    }

    /// Declare a correlation between two risks by name; resolved at build
    #[must_use]
    pub fn correlation(
        mut self,
        first: impl Into<String>,
        second: impl Into<String>,
        coefficient: f64,
    ) -> Self {
        self.pending_correlations.push(PendingCorrelation {
            first: first.into(),
            second: second.into(),
            coefficient,
        });
        self
    }

    /// Resolve names, assign IDs, and assemble the request.
    ///
    /// Fails when a risk has no distribution or a correlation references an
    /// unknown name; all such problems are collected before returning.
    pub fn build(self) -> Result<SimulationRequest, ValidationError> {
        let mut issues = Vec::new();
        let mut risks = Vec::with_capacity(self.pending_risks.len());
        let mut ids_by_name: HashMap<String, RiskId> = HashMap::new();
        let mut next_risk_id = self.next_risk_id;
        let mut next_mitigation_id = self.next_mitigation_id;

        for pending in self.pending_risks {
            let id = RiskId(next_risk_id);
            next_risk_id += 1;

            let Some(distribution) = pending.distribution else {
                issues.push(ValidationIssue::for_risk(
                    id,
                    "distribution_type",
                    format!("risk '{}' has no distribution", pending.name),
                ));
                continue;
            };

            if ids_by_name.contains_key(&pending.name) {
                issues.push(ValidationIssue::for_risk(
                    id,
                    "name",
                    format!("duplicate risk name '{}'", pending.name),
                ));
            }
            ids_by_name.insert(pending.name.clone(), id);

            let mitigations = pending
                .mitigations
                .into_iter()
                .map(|m| {
                    let mitigation_id = MitigationId(next_mitigation_id);
                    next_mitigation_id += 1;
                    Mitigation {
                        id: mitigation_id,
                        name: m.name,
                        cost: m.cost,
                        effectiveness: m.effectiveness,
                        implementation_days: m.implementation_days,
                        enabled: m.enabled,
                    }
                })
                .collect();

            risks.push(Risk {
                id,
                name: pending.name,
                category: pending.category,
                impact_type: pending.impact_type,
                distribution,
                baseline_impact: pending.baseline_impact,
                correlation_dependencies: Vec::new(),
                mitigations,
            });
        }

        let mut correlations = CorrelationMatrix::new();
        for pending in self.pending_correlations {
            let first = ids_by_name.get(&pending.first).copied();
            let second = ids_by_name.get(&pending.second).copied();
            match (first, second) {
                (Some(a), Some(b)) => {
                    correlations.set(a, b, pending.coefficient);
                    // Record the dependency on both risks
                    for (id, other) in [(a, b), (b, a)] {
                        if let Some(risk) = risks.iter_mut().find(|r| r.id == id)
                            && !risk.correlation_dependencies.contains(&other)
                        {
                            risk.correlation_dependencies.push(other);
                        }
                    }
                }
                _ => {
                    let unknown = if first.is_none() {
                        &pending.first
                    } else {
                        &pending.second
                    };
                    issues.push(ValidationIssue::new(
                        "correlations",
                        format!("correlation references unknown risk '{unknown}'"),
                    ));
                }
            }
        }

        if issues.is_empty() {
            Ok(SimulationRequest {
                risks,
                correlations,
                iterations: self.iterations,
                seed: self.seed,
                baseline_cost: self.baseline_cost,
                baseline_schedule: self.baseline_schedule,
            })
        } else {
            Err(ValidationError::new(issues))
        }
    }
}
