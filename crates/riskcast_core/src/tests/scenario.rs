//! Tests for scenario derivation and comparison
//!
//! These verify that:
//! - Applying an empty change set is the identity
//! - Changes produce derived registers without touching the base
//! - Mitigation activation reduces impact by exactly its effectiveness
//! - The comparator detects real effects and ignores noise

use crate::config::{EngineConfig, RequestBuilder, RiskBuilder};
use crate::model::{
    EffectSize, ImpactDistribution, MitigationId, ParameterChange, RiskId, Scenario, ScenarioId,
};
use crate::{comparison, scenario, simulation};

fn base_request() -> crate::model::SimulationRequest {
    RequestBuilder::new()
        .iterations(10_000)
        .seed(42)
        .baseline_cost(1_000_000.0)
        .baseline_schedule(365.0)
        .risk(
            RiskBuilder::cost("Vendor cost overrun")
                .normal(100_000.0, 5_000.0)
                .baseline_impact(100_000.0)
                .mitigation("Fixed-price contract", 10_000.0, 0.6, 45.0),
        )
        .build()
        .unwrap()
}

fn scenario_with(id: u16, name: &str, changes: Vec<ParameterChange>) -> Scenario {
    Scenario {
        id: ScenarioId(id),
        name: name.to_string(),
        description: String::new(),
        is_baseline: changes.is_empty(),
        changes,
    }
}

#[test]
fn test_empty_change_set_is_identity() {
    let request = base_request();
    let baseline = scenario_with(0, "baseline", Vec::new());

    let derived = scenario::apply_scenario(&request.risks, &baseline).unwrap();
    assert_eq!(derived, request.risks);
}

#[test]
fn test_changes_do_not_touch_the_base_register() {
    let request = base_request();
    let original = request.risks.clone();

    let mitigated = scenario_with(
        1,
        "mitigated",
        vec![ParameterChange::ActivateMitigation {
            risk_id: RiskId(0),
            mitigation_id: MitigationId(0),
        }],
    );

    let derived = scenario::apply_scenario(&request.risks, &mitigated).unwrap();
    assert!(derived[0].mitigations[0].enabled);
    assert_eq!(request.risks, original);
    assert!(!request.risks[0].mitigations[0].enabled);
}

#[test]
fn test_replace_distribution_and_baseline() {
    let request = base_request();
    let revised = scenario_with(
        2,
        "revised estimate",
        vec![
            ParameterChange::ReplaceDistribution {
                risk_id: RiskId(0),
                distribution: ImpactDistribution::Triangular {
                    min: 50_000.0,
                    mode: 90_000.0,
                    max: 200_000.0,
                },
            },
            ParameterChange::SetBaselineImpact {
                risk_id: RiskId(0),
                baseline_impact: 90_000.0,
            },
        ],
    );

    let derived = scenario::apply_scenario(&request.risks, &revised).unwrap();
    assert!(matches!(
        derived[0].distribution,
        ImpactDistribution::Triangular { .. }
    ));
    assert_eq!(derived[0].baseline_impact, 90_000.0);
}

#[test]
fn test_unknown_references_are_collected() {
    let request = base_request();
    let broken = scenario_with(
        3,
        "broken",
        vec![
            ParameterChange::SetBaselineImpact {
                risk_id: RiskId(99),
                baseline_impact: 1.0,
            },
            ParameterChange::ActivateMitigation {
                risk_id: RiskId(0),
                mitigation_id: MitigationId(77),
            },
        ],
    );

    let err = scenario::apply_scenario(&request.risks, &broken).unwrap_err();
    assert_eq!(err.issues.len(), 2);
    assert!(err.issues.iter().any(|i| i.field == "parameter_changes.risk_id"));
    assert!(
        err.issues
            .iter()
            .any(|i| i.field == "parameter_changes.mitigation_id")
    );
}

#[test]
fn test_mitigation_scales_mean_impact_exactly() {
    let request = base_request();
    let config = EngineConfig::default();

    let mitigated = scenario_with(
        1,
        "mitigated",
        vec![ParameterChange::ActivateMitigation {
            risk_id: RiskId(0),
            mitigation_id: MitigationId(0),
        }],
    );
    let derived = scenario::apply_to_request(&request, &mitigated).unwrap();

    // Same seed, same draws: every iteration is scaled by exactly 1 - 0.6
    let base_run = simulation::run(&request, &config).unwrap();
    let mitigated_run = simulation::run(&derived, &config).unwrap();

    let base_mean = crate::stats::mean(&base_run.cost_series());
    let mitigated_mean = crate::stats::mean(&mitigated_run.cost_series());

    assert!(mitigated_mean < base_mean);
    let ratio = mitigated_mean / base_mean;
    assert!((ratio - 0.4).abs() < 1e-9, "ratio {ratio}");
}

#[test]
fn test_comparator_flags_a_large_real_effect() {
    let request = base_request();
    let config = EngineConfig::default();

    let mitigated = scenario_with(
        1,
        "mitigated",
        vec![ParameterChange::ActivateMitigation {
            risk_id: RiskId(0),
            mitigation_id: MitigationId(0),
        }],
    );
    let derived = scenario::apply_to_request(&request, &mitigated).unwrap();

    let base_run = simulation::run(&request, &config).unwrap();
    let mitigated_run = simulation::run(&derived, &config).unwrap();

    let result = comparison::compare(
        ScenarioId(0),
        &base_run,
        ScenarioId(1),
        &mitigated_run,
        &config,
    );

    assert!(result.cost.significant);
    assert!(result.cost.p_value < 1e-6);
    assert!(result.cost.cohens_d.abs() >= 0.8);
    assert_eq!(result.cost.effect_size, EffectSize::Large);

    // Mitigation removes 60% of a ~100k mean impact
    assert!(result.cost.mean_difference < -50_000.0);
    assert!((result.cost.percent_change + 60.0).abs() < 2.0);
}

#[test]
fn test_comparator_ignores_pure_noise() {
    let request = base_request();
    let config = EngineConfig::default();

    // Same register, different seeds: any difference is sampling noise
    let mut other = request.clone();
    other.seed = Some(43);

    let run_a = simulation::run(&request, &config).unwrap();
    let run_b = simulation::run(&other, &config).unwrap();

    let result = comparison::compare(ScenarioId(0), &run_a, ScenarioId(1), &run_b, &config);

    assert_eq!(result.cost.effect_size, EffectSize::Negligible);
    assert!(result.cost.cohens_d.abs() < 0.2);
}

#[test]
fn test_compare_all_is_pairwise() {
    let request = base_request();
    let config = EngineConfig::default();

    let run_a = simulation::run(&request, &config).unwrap();
    let mut with_other_seed = request.clone();
    with_other_seed.seed = Some(7);
    let run_b = simulation::run(&with_other_seed, &config).unwrap();
    with_other_seed.seed = Some(8);
    let run_c = simulation::run(&with_other_seed, &config).unwrap();

    let comparisons = comparison::compare_all(
        &[
            (ScenarioId(0), &run_a),
            (ScenarioId(1), &run_b),
            (ScenarioId(2), &run_c),
        ],
        &config,
    );

    assert_eq!(comparisons.len(), 3);
    assert_eq!(
        (comparisons[0].scenario_a, comparisons[0].scenario_b),
        (ScenarioId(0), ScenarioId(1))
    );
    assert_eq!(
        (comparisons[2].scenario_a, comparisons[2].scenario_b),
        (ScenarioId(1), ScenarioId(2))
    );
}

#[test]
fn test_schedule_dimension_is_compared_too() {
    let request = RequestBuilder::new()
        .iterations(10_000)
        .seed(5)
        .risk(
            RiskBuilder::schedule("Slip")
                .normal(30.0, 3.0)
                .baseline_impact(30.0)
                .mitigation("Overtime", 20_000.0, 0.5, 0.0),
        )
        .build()
        .unwrap();
    let config = EngineConfig::default();

    let mitigated = scenario_with(
        1,
        "overtime",
        vec![ParameterChange::ActivateMitigation {
            risk_id: RiskId(0),
            mitigation_id: MitigationId(0),
        }],
    );
    let derived = scenario::apply_to_request(&request, &mitigated).unwrap();

    let run_a = simulation::run(&request, &config).unwrap();
    let run_b = simulation::run(&derived, &config).unwrap();
    let result = comparison::compare(ScenarioId(0), &run_a, ScenarioId(1), &run_b, &config);

    assert!(result.schedule.significant);
    assert!(result.schedule.mean_difference < 0.0);
    // Cost dimension is untouched by a schedule-only risk
    assert_eq!(result.cost.mean_a, 0.0);
    assert_eq!(result.cost.mean_b, 0.0);
    assert!(!result.cost.significant);
}
