//! Results analyzer
//!
//! Consumes the raw per-iteration outcomes of a run and produces the
//! immutable `SimulationResult`: interpolated percentiles, confidence
//! intervals, descriptive statistics (sample std-dev, n − 1), and per-risk
//! variance attribution ranked by contribution.

use crate::config::EngineConfig;
use crate::model::{
    ConfidenceInterval, ContributionRemainder, OutcomeStatistics, Risk, RiskContribution,
    SimulationResult, SimulationRun,
};
use crate::stats;

/// Summarize a completed run.
///
/// `risks` must be the register the run was produced from (breakdown columns
/// are positional). Degenerate runs — a single iteration, or identical
/// outcomes — produce zero std-dev and collapsed percentiles without error.
#[must_use]
pub fn analyze(run: &SimulationRun, risks: &[Risk], config: &EngineConfig) -> SimulationResult {
    let cost_series = run.cost_series();
    let schedule_series = run.schedule_series();

    let cost = outcome_statistics(&cost_series, config);
    let schedule = outcome_statistics(&schedule_series, config);

    let (contributions, other_contributions) =
        rank_contributions(run, risks, &cost_series, &schedule_series, config);

    SimulationResult {
        cost,
        schedule,
        contributions,
        other_contributions,
        convergence: run.convergence,
        metadata: run.metadata.clone(),
    }
}

/// Descriptive statistics for one outcome dimension
fn outcome_statistics(series: &[f64], config: &EngineConfig) -> OutcomeStatistics {
    let mut sorted = series.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mean = stats::mean(series);
    let std_dev = stats::sample_variance(series).sqrt();
    let median = stats::percentile_of_sorted(&sorted, 0.5);
    let coefficient_of_variation = if mean != 0.0 { std_dev / mean } else { 0.0 };

    let percentiles = config
        .reported_percentiles
        .iter()
        .map(|&p| (p, stats::percentile_of_sorted(&sorted, p)))
        .collect();

    let confidence_intervals = config
        .confidence_levels
        .iter()
        .map(|&level| {
            let tail = (1.0 - level) / 2.0;
            ConfidenceInterval {
                level,
                lower: stats::percentile_of_sorted(&sorted, tail),
                upper: stats::percentile_of_sorted(&sorted, 1.0 - tail),
            }
        })
        .collect();

    OutcomeStatistics {
        mean,
        median,
        std_dev,
        coefficient_of_variation,
        min: sorted.first().copied().unwrap_or(0.0),
        max: sorted.last().copied().unwrap_or(0.0),
        percentiles,
        confidence_intervals,
    }
}

/// Variance attribution: each risk's contribution variance as a percentage
/// of total outcome variance, ranked descending by cost share. The top N are
/// reported individually; the rest aggregate into a remainder bucket.
fn rank_contributions(
    run: &SimulationRun,
    risks: &[Risk],
    cost_series: &[f64],
    schedule_series: &[f64],
    config: &EngineConfig,
) -> (Vec<RiskContribution>, Option<ContributionRemainder>) {
    let total_cost_variance = stats::sample_variance(cost_series);
    let total_schedule_variance = stats::sample_variance(schedule_series);

    let share = |variance: f64, total: f64| -> f64 {
        if total > 0.0 { variance / total * 100.0 } else { 0.0 }
    };

    let mut contributions: Vec<RiskContribution> = risks
        .iter()
        .enumerate()
        .map(|(i, risk)| {
            let costs: Vec<f64> = run.outcomes.iter().map(|o| o.risk_costs[i]).collect();
            let schedules: Vec<f64> = run.outcomes.iter().map(|o| o.risk_schedules[i]).collect();

            RiskContribution {
                risk_id: risk.id,
                name: risk.name.clone(),
                cost_variance_share: share(stats::sample_variance(&costs), total_cost_variance),
                schedule_variance_share: share(
                    stats::sample_variance(&schedules),
                    total_schedule_variance,
                ),
                mean_cost_impact: stats::mean(&costs),
                mean_schedule_impact: stats::mean(&schedules),
            }
        })
        .collect();

    contributions.sort_by(|a, b| {
        b.cost_variance_share
            .partial_cmp(&a.cost_variance_share)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(
                b.schedule_variance_share
                    .partial_cmp(&a.schedule_variance_share)
                    .unwrap_or(std::cmp::Ordering::Equal),
            )
    });

    if contributions.len() > config.top_contributions {
        let rest = contributions.split_off(config.top_contributions);
        let remainder = ContributionRemainder {
            risks: rest.len(),
            cost_variance_share: rest.iter().map(|c| c.cost_variance_share).sum(),
            schedule_variance_share: rest.iter().map(|c| c.schedule_variance_share).sum(),
        };
        (contributions, Some(remainder))
    } else {
        (contributions, None)
    }
}
