//! Scenario comparator
//!
//! Compares two (or more) scenarios' outcome distributions: difference of
//! means with percentage change, Welch's t-test for significance (the
//! unequal-variance form — scenario changes routinely change spread, not
//! just location), and Cohen's d with the standard qualitative buckets.

use crate::config::EngineConfig;
use crate::model::{
    EffectSize, MetricComparison, ScenarioComparison, ScenarioId, SimulationRun,
};
use crate::stats;

/// Compare two scenarios' runs, dimension by dimension.
///
/// Percentage change is relative to scenario A, which callers conventionally
/// make the baseline.
#[must_use]
pub fn compare(
    scenario_a: ScenarioId,
    run_a: &SimulationRun,
    scenario_b: ScenarioId,
    run_b: &SimulationRun,
    config: &EngineConfig,
) -> ScenarioComparison {
    ScenarioComparison {
        scenario_a,
        scenario_b,
        cost: compare_metric(&run_a.cost_series(), &run_b.cost_series(), config),
        schedule: compare_metric(&run_a.schedule_series(), &run_b.schedule_series(), config),
    }
}

/// All pairwise comparisons for two or more scenario runs, in input order.
#[must_use]
pub fn compare_all(
    runs: &[(ScenarioId, &SimulationRun)],
    config: &EngineConfig,
) -> Vec<ScenarioComparison> {
    let mut comparisons = Vec::new();
    for i in 0..runs.len() {
        for j in (i + 1)..runs.len() {
            let (id_a, run_a) = runs[i];
            let (id_b, run_b) = runs[j];
            comparisons.push(compare(id_a, run_a, id_b, run_b, config));
        }
    }
    comparisons
}

fn compare_metric(a: &[f64], b: &[f64], config: &EngineConfig) -> MetricComparison {
    let mean_a = stats::mean(a);
    let mean_b = stats::mean(b);
    let mean_difference = mean_b - mean_a;

    let percent_change = if mean_a != 0.0 {
        mean_difference / mean_a.abs() * 100.0
    } else {
        0.0
    };

    let p_value = welch_p_value(a, b);
    let cohens_d = cohens_d(a, b);

    MetricComparison {
        mean_a,
        mean_b,
        mean_difference,
        percent_change,
        p_value,
        significant: p_value < config.significance_alpha,
        cohens_d,
        effect_size: EffectSize::classify(cohens_d),
    }
}

/// Two-sided p-value from Welch's unequal-variance t-test with the
/// Welch–Satterthwaite degrees of freedom.
fn welch_p_value(a: &[f64], b: &[f64]) -> f64 {
    let n_a = a.len() as f64;
    let n_b = b.len() as f64;
    if n_a < 2.0 || n_b < 2.0 {
        return 1.0;
    }

    let var_a = stats::sample_variance(a);
    let var_b = stats::sample_variance(b);
    let se_a = var_a / n_a;
    let se_b = var_b / n_b;
    let se = (se_a + se_b).sqrt();

    if se == 0.0 {
        // Both samples are constant: identical means are indistinguishable,
        // different means are unambiguously distinct.
        return if stats::mean(a) == stats::mean(b) { 1.0 } else { 0.0 };
    }

    let t = (stats::mean(b) - stats::mean(a)) / se;
    let df = (se_a + se_b).powi(2)
        / (se_a.powi(2) / (n_a - 1.0) + se_b.powi(2) / (n_b - 1.0));

    stats::student_t_two_sided_p(t, df)
}

/// Cohen's d with pooled sample standard deviation.
fn cohens_d(a: &[f64], b: &[f64]) -> f64 {
    let n_a = a.len() as f64;
    let n_b = b.len() as f64;
    if n_a < 2.0 || n_b < 2.0 {
        return 0.0;
    }

    let pooled_variance = ((n_a - 1.0) * stats::sample_variance(a)
        + (n_b - 1.0) * stats::sample_variance(b))
        / (n_a + n_b - 2.0);
    let pooled = pooled_variance.sqrt();

    let difference = stats::mean(b) - stats::mean(a);
    if pooled > 0.0 {
        difference / pooled
    } else if difference == 0.0 {
        0.0
    } else {
        // Constant samples with different means: effect is unbounded; report
        // against a vanishing spread so classification lands on "large".
        difference / f64::EPSILON
    }
}
