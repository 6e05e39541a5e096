//! Tests for the fluent request builder

use crate::config::{RequestBuilder, RiskBuilder};
use crate::model::{ImpactType, MitigationId, RiskCategory, RiskId};

#[test]
fn test_builder_assigns_sequential_ids() {
    let request = RequestBuilder::new()
        .iterations(10_000)
        .risk(RiskBuilder::cost("first").uniform(0.0, 1.0))
        .risk(RiskBuilder::schedule("second").uniform(0.0, 1.0))
        .risk(
            RiskBuilder::both("third")
                .uniform(0.0, 1.0)
                .mitigation("m1", 100.0, 0.5, 5.0)
                .mitigation("m2", 200.0, 0.25, 10.0),
        )
        .build()
        .unwrap();

    assert_eq!(request.risks.len(), 3);
    assert_eq!(request.risks[0].id, RiskId(0));
    assert_eq!(request.risks[1].id, RiskId(1));
    assert_eq!(request.risks[2].id, RiskId(2));
    assert_eq!(request.risks[2].mitigations[0].id, MitigationId(0));
    assert_eq!(request.risks[2].mitigations[1].id, MitigationId(1));
}

#[test]
fn test_builder_sets_impact_type_and_category() {
    let request = RequestBuilder::new()
        .iterations(10_000)
        .risk(
            RiskBuilder::cost("regulatory fine")
                .category(RiskCategory::Regulatory)
                .normal(10_000.0, 2_000.0)
                .baseline_impact(10_000.0),
        )
        .build()
        .unwrap();

    let risk = &request.risks[0];
    assert_eq!(risk.impact_type, ImpactType::Cost);
    assert_eq!(risk.category, RiskCategory::Regulatory);
    assert!(risk.impact_type.affects_cost());
    assert!(!risk.impact_type.affects_schedule());
}

#[test]
fn test_builder_resolves_correlations_by_name() {
    let request = RequestBuilder::new()
        .iterations(10_000)
        .risk(RiskBuilder::cost("alpha").uniform(0.0, 1.0))
        .risk(RiskBuilder::cost("beta").uniform(0.0, 1.0))
        .correlation("alpha", "beta", 0.8)
        .build()
        .unwrap();

    assert_eq!(request.correlations.coefficient(RiskId(0), RiskId(1)), 0.8);

    // Dependencies are recorded on both risks
    assert!(request.risks[0].correlation_dependencies.contains(&RiskId(1)));
    assert!(request.risks[1].correlation_dependencies.contains(&RiskId(0)));
}

#[test]
fn test_builder_rejects_unknown_correlation_names() {
    let err = RequestBuilder::new()
        .iterations(10_000)
        .risk(RiskBuilder::cost("alpha").uniform(0.0, 1.0))
        .correlation("alpha", "ghost", 0.5)
        .build()
        .unwrap_err();

    assert_eq!(err.issues.len(), 1);
    assert_eq!(err.issues[0].field, "correlations");
    assert!(err.issues[0].message.contains("ghost"));
}

#[test]
fn test_builder_rejects_missing_distribution() {
    let err = RequestBuilder::new()
        .iterations(10_000)
        .risk(RiskBuilder::cost("no distribution"))
        .build()
        .unwrap_err();

    assert_eq!(err.issues.len(), 1);
    assert_eq!(err.issues[0].field, "distribution_type");
}

#[test]
fn test_builder_rejects_duplicate_names() {
    let err = RequestBuilder::new()
        .iterations(10_000)
        .risk(RiskBuilder::cost("twin").uniform(0.0, 1.0))
        .risk(RiskBuilder::cost("twin").uniform(0.0, 1.0))
        .build()
        .unwrap_err();

    assert!(err.issues.iter().any(|i| i.field == "name"));
}

#[test]
fn test_active_mitigation_starts_enabled() {
    let request = RequestBuilder::new()
        .iterations(10_000)
        .risk(
            RiskBuilder::cost("covered")
                .uniform(0.0, 100.0)
                .active_mitigation("insurance", 500.0, 0.9, 0.0),
        )
        .build()
        .unwrap();

    let risk = &request.risks[0];
    assert!(risk.mitigations[0].enabled);
    assert!((risk.mitigation_factor() - 0.1).abs() < 1e-12);
}
