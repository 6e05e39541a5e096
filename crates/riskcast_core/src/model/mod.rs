mod correlation;
mod ids;
mod request;
mod results;
mod risk;
mod scenario;

pub use correlation::{CorrelationEntry, CorrelationMatrix};
pub use ids::{MitigationId, RiskId, ScenarioId};
pub use request::SimulationRequest;
pub use results::{
    ConfidenceInterval, ContributionRemainder, ConvergenceMetrics, IterationOutcome,
    OutcomeStatistics, PERCENTILE_TOLERANCE, RiskContribution, RunMetadata, SimulationResult,
    SimulationRun, SimulationWarning,
};
pub use risk::{ImpactDistribution, ImpactType, Mitigation, Risk, RiskCategory};
pub use scenario::{
    EffectSize, MetricComparison, ParameterChange, Scenario, ScenarioComparison,
};
