//! Simulation outputs
//!
//! `IterationOutcome` rows are the raw product of the engine; `SimulationRun`
//! bundles them with convergence metrics and run metadata; `SimulationResult`
//! is the analyzer's immutable summary. Results are values: created once per
//! completed run and never mutated afterwards.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::ids::RiskId;

/// Tolerance for floating-point percentile lookup
pub const PERCENTILE_TOLERANCE: f64 = 0.001;

/// One simulated trial across all risks.
///
/// `risk_costs` / `risk_schedules` are indexed in register order and sum to
/// the corresponding totals (aggregation is additive).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationOutcome {
    pub total_cost: f64,
    pub total_schedule: f64,
    pub risk_costs: Vec<f64>,
    pub risk_schedules: Vec<f64>,
}

/// Stability metrics for a completed run.
///
/// Computed over trailing windows of the outcome series: the run is converged
/// when the relative change in mean and variance between successive windows
/// drops below the configured threshold on both outcome dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceMetrics {
    pub converged: bool,
    /// Iteration count at which stability was first reached
    pub converged_at: Option<usize>,
    /// Relative mean change over the final window pair (worst dimension)
    pub mean_delta: f64,
    /// Relative variance change over the final window pair (worst dimension)
    pub variance_delta: f64,
    /// Window size used, in iterations
    pub window: usize,
}

/// Non-fatal conditions surfaced alongside results.
///
/// Corrections are never silent: anything that touched statistical fidelity
/// (like a repaired correlation matrix) shows up here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum SimulationWarning {
    /// The correlation matrix was not positive semi-definite and was adjusted
    /// by spectral clipping; `max_adjustment` is the largest absolute change
    /// applied to any coefficient.
    CorrelationRepaired { max_adjustment: f64 },
    /// Summary statistics had not stabilized by the end of the run.
    NotConverged {
        mean_delta: f64,
        variance_delta: f64,
    },
    /// The request's estimated runtime exceeds the configured limit.
    EstimatedTimeExceedsLimit {
        estimated: Duration,
        limit: Duration,
    },
}

impl fmt::Display for SimulationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationWarning::CorrelationRepaired { max_adjustment } => write!(
                f,
                "correlation matrix adjusted to nearest valid structure (max coefficient change {max_adjustment:.4})"
            ),
            SimulationWarning::NotConverged {
                mean_delta,
                variance_delta,
            } => write!(
                f,
                "run did not converge (mean delta {mean_delta:.4}, variance delta {variance_delta:.4})"
            ),
            SimulationWarning::EstimatedTimeExceedsLimit { estimated, limit } => write!(
                f,
                "estimated execution time {estimated:?} exceeds limit {limit:?}"
            ),
        }
    }
}

/// Run provenance: enough to reproduce and audit the run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    /// The seed actually used (explicit or drawn from entropy)
    pub seed: u64,
    pub iterations: usize,
    pub execution_time: Duration,
    #[serde(default)]
    pub warnings: Vec<SimulationWarning>,
}

/// Raw engine output: outcome rows plus convergence and provenance.
///
/// Feed this to `analysis::analyze` for the summary, or to the comparator
/// for significance testing between scenarios (which needs the raw arrays).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRun {
    pub outcomes: Vec<IterationOutcome>,
    pub convergence: ConvergenceMetrics,
    pub metadata: RunMetadata,
}

impl SimulationRun {
    /// Total cost impact per iteration, in iteration order
    #[must_use]
    pub fn cost_series(&self) -> Vec<f64> {
        self.outcomes.iter().map(|o| o.total_cost).collect()
    }

    /// Total schedule impact per iteration, in iteration order
    #[must_use]
    pub fn schedule_series(&self) -> Vec<f64> {
        self.outcomes.iter().map(|o| o.total_schedule).collect()
    }
}

/// Confidence interval at a given level (e.g. 0.95)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub level: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Descriptive statistics for one outcome dimension (cost or schedule).
///
/// `std_dev` is the sample standard deviation (n − 1 denominator), used
/// consistently across percentile, CI, and significance math.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeStatistics {
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    /// std_dev / mean; 0 when the mean is 0
    pub coefficient_of_variation: f64,
    pub min: f64,
    pub max: f64,
    /// (percentile fraction, value) pairs, e.g. (0.50, 81_500.0)
    pub percentiles: Vec<(f64, f64)>,
    pub confidence_intervals: Vec<ConfidenceInterval>,
}

impl OutcomeStatistics {
    /// Find a percentile value with floating-point tolerance
    #[must_use]
    pub fn percentile(&self, target: f64) -> Option<f64> {
        self.percentiles
            .iter()
            .find(|(p, _)| (*p - target).abs() < PERCENTILE_TOLERANCE)
            .map(|(_, v)| *v)
    }

    /// Find a confidence interval by level with floating-point tolerance
    #[must_use]
    pub fn confidence_interval(&self, level: f64) -> Option<&ConfidenceInterval> {
        self.confidence_intervals
            .iter()
            .find(|ci| (ci.level - level).abs() < PERCENTILE_TOLERANCE)
    }
}

/// One risk's share of outcome variance.
///
/// Shares are percentages of total outcome variance. When risks are
/// correlated, covariance means the shares need not sum to exactly 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskContribution {
    pub risk_id: RiskId,
    pub name: String,
    pub cost_variance_share: f64,
    pub schedule_variance_share: f64,
    pub mean_cost_impact: f64,
    pub mean_schedule_impact: f64,
}

/// Aggregate of the contributions below the reported top N
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContributionRemainder {
    pub risks: usize,
    pub cost_variance_share: f64,
    pub schedule_variance_share: f64,
}

/// Immutable analyzer summary of a completed run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub cost: OutcomeStatistics,
    pub schedule: OutcomeStatistics,
    /// Ranked by cost variance share, descending; at most the configured top N
    pub contributions: Vec<RiskContribution>,
    /// Everything past the top N, aggregated
    #[serde(default)]
    pub other_contributions: Option<ContributionRemainder>,
    pub convergence: ConvergenceMetrics,
    pub metadata: RunMetadata,
}
