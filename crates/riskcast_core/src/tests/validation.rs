//! Tests for exhaustive request validation and the data contract
//!
//! These verify that:
//! - Every independent problem is reported, not just the first
//! - Field references are precise enough for a boundary layer to surface
//! - Validation never mutates or runs the request
//! - Model types round-trip through JSON unchanged

use std::time::Duration;

use crate::config::{EngineConfig, RequestBuilder, RiskBuilder};
use crate::model::{ImpactDistribution, RiskId, SimulationRequest};
use crate::validation::{estimate_execution_time, validate_request};

fn valid_request() -> SimulationRequest {
    RequestBuilder::new()
        .iterations(10_000)
        .seed(1)
        .baseline_cost(100_000.0)
        .baseline_schedule(90.0)
        .risk(
            RiskBuilder::cost("ok")
                .triangular(1_000.0, 2_000.0, 4_000.0)
                .baseline_impact(2_000.0),
        )
        .build()
        .unwrap()
}

#[test]
fn test_valid_request_passes() {
    let report = validate_request(&valid_request(), &EngineConfig::default());
    assert!(report.valid);
    assert!(report.errors.is_empty());
}

#[test]
fn test_mode_above_max_is_exactly_one_error() {
    let mut request = valid_request();
    request.risks[0].distribution = ImpactDistribution::Triangular {
        min: 1_000.0,
        mode: 5_000.0,
        max: 4_000.0,
    };

    let report = validate_request(&request, &EngineConfig::default());
    assert!(!report.valid);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].field, "distribution_parameters.mode");
    assert_eq!(report.errors[0].risk_id, Some(RiskId(0)));
}

#[test]
fn test_iteration_count_below_minimum() {
    let mut request = valid_request();
    request.iterations = 50;

    let report = validate_request(&request, &EngineConfig::default());
    assert!(!report.valid);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].field, "iterations");
}

#[test]
fn test_independent_problems_are_all_reported() {
    // Three unrelated problems: bad triangular parameters, an out-of-range
    // correlation coefficient, and an iteration count below the minimum.
    let mut request = RequestBuilder::new()
        .iterations(50)
        .risk(
            RiskBuilder::cost("bad triangle")
                .triangular(10.0, 50.0, 40.0)
                .baseline_impact(40.0),
        )
        .risk(
            RiskBuilder::cost("fine")
                .uniform(0.0, 10.0)
                .baseline_impact(5.0),
        )
        .build()
        .unwrap();
    request
        .correlations
        .set(RiskId(0), RiskId(1), 1.5);

    let report = validate_request(&request, &EngineConfig::default());
    assert!(!report.valid);
    assert!(
        report.errors.len() >= 3,
        "expected at least 3 errors, got {:?}",
        report.errors
    );

    let fields: Vec<&str> = report.errors.iter().map(|e| e.field.as_str()).collect();
    assert!(fields.contains(&"iterations"));
    assert!(fields.contains(&"distribution_parameters.mode"));
    assert!(fields.contains(&"correlations"));
}

#[test]
fn test_every_distribution_parameter_is_checked() {
    let bad_distributions = [
        (
            ImpactDistribution::Normal {
                mean: 0.0,
                std_dev: 0.0,
            },
            "distribution_parameters.std_dev",
        ),
        (
            ImpactDistribution::Uniform {
                min: 10.0,
                max: 10.0,
            },
            "distribution_parameters.min",
        ),
        (
            ImpactDistribution::Beta {
                alpha: -1.0,
                beta: 2.0,
                scale: 100.0,
            },
            "distribution_parameters.alpha",
        ),
        (
            ImpactDistribution::Beta {
                alpha: 2.0,
                beta: 2.0,
                scale: 0.0,
            },
            "distribution_parameters.scale",
        ),
        (
            ImpactDistribution::LogNormal {
                mu: 1.0,
                sigma: -0.5,
            },
            "distribution_parameters.sigma",
        ),
        (
            ImpactDistribution::Normal {
                mean: f64::NAN,
                std_dev: 1.0,
            },
            "distribution_parameters.mean",
        ),
    ];

    for (distribution, expected_field) in bad_distributions {
        let mut request = valid_request();
        request.risks[0].distribution = distribution.clone();

        let report = validate_request(&request, &EngineConfig::default());
        assert!(!report.valid, "{distribution:?} should fail validation");
        assert!(
            report.errors.iter().any(|e| e.field == expected_field),
            "{distribution:?} should report {expected_field}, got {:?}",
            report.errors
        );
    }
}

#[test]
fn test_mitigation_effectiveness_bounds() {
    let mut request = valid_request();
    request.risks[0].mitigations.push(crate::model::Mitigation {
        id: crate::model::MitigationId(0),
        name: "overcorrection".to_string(),
        cost: 1_000.0,
        effectiveness: 1.5,
        implementation_days: 10.0,
        enabled: false,
    });

    let report = validate_request(&request, &EngineConfig::default());
    assert!(!report.valid);
    assert!(
        report
            .errors
            .iter()
            .any(|e| e.field == "mitigations.effectiveness")
    );
}

#[test]
fn test_empty_register_and_duplicate_ids() {
    let empty = SimulationRequest {
        risks: Vec::new(),
        correlations: Default::default(),
        iterations: 10_000,
        seed: None,
        baseline_cost: 0.0,
        baseline_schedule: 0.0,
    };
    let report = validate_request(&empty, &EngineConfig::default());
    assert!(report.errors.iter().any(|e| e.field == "risks"));

    let mut request = valid_request();
    let mut duplicate = request.risks[0].clone();
    duplicate.name = "same id again".to_string();
    request.risks.push(duplicate);

    let report = validate_request(&request, &EngineConfig::default());
    assert!(report.errors.iter().any(|e| e.field == "id"));
}

#[test]
fn test_correlation_referencing_unknown_risk() {
    let mut request = valid_request();
    request.correlations.set(RiskId(0), RiskId(42), 0.5);

    let report = validate_request(&request, &EngineConfig::default());
    assert!(!report.valid);
    assert!(report.errors.iter().any(|e| e.field == "correlations"));
}

#[test]
fn test_execution_time_estimate_scales_with_work() {
    let small = valid_request();
    let mut large = valid_request();
    large.iterations = 100_000;

    let small_estimate = estimate_execution_time(&small);
    let large_estimate = estimate_execution_time(&large);
    assert!(large_estimate > small_estimate);
    assert!(small_estimate > Duration::ZERO);

    // The estimate is part of the report without running anything
    let report = validate_request(&small, &EngineConfig::default());
    assert_eq!(report.estimated_execution_time, small_estimate);
}

#[test]
fn test_defaults_descriptor_lists_supported_enumerations() {
    let defaults = EngineConfig::default().defaults_descriptor();

    assert_eq!(defaults.default_iterations, 10_000);
    assert_eq!(defaults.supported_distributions.len(), 5);
    assert!(defaults.supported_distributions.contains(&"triangular".to_string()));
    assert_eq!(defaults.supported_categories.len(), 7);
    assert!(defaults.supported_impact_types.contains(&"both".to_string()));
}

#[test]
fn test_request_round_trips_through_json() {
    let request = RequestBuilder::new()
        .iterations(10_000)
        .seed(42)
        .baseline_cost(1_000_000.0)
        .baseline_schedule(365.0)
        .risk(
            RiskBuilder::cost("Vendor")
                .triangular(25_000.0, 75_000.0, 150_000.0)
                .baseline_impact(75_000.0)
                .mitigation("Second source", 15_000.0, 0.5, 30.0),
        )
        .risk(
            RiskBuilder::schedule("Slip")
                .lognormal(3.0, 0.5)
                .baseline_impact(20.0),
        )
        .correlation("Vendor", "Slip", 0.4)
        .build()
        .unwrap();

    let json = serde_json::to_string(&request).unwrap();
    let back: SimulationRequest = serde_json::from_str(&json).unwrap();
    assert_eq!(back, request);
}

#[test]
fn test_result_round_trips_through_json() {
    let request = valid_request();
    let config = EngineConfig::default();
    let run = crate::simulation::run(&request, &config).unwrap();
    let result = crate::analysis::analyze(&run, &request.risks, &config);

    let json = serde_json::to_string(&result).unwrap();
    let back: crate::model::SimulationResult = serde_json::from_str(&json).unwrap();
    assert_eq!(back, result);
}
