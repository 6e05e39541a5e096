//! Scenario generator
//!
//! Applies a scenario's parameter changes to a base risk register, producing
//! a derived register. The base register is never mutated; unmentioned risks
//! are cloned unchanged, so an empty change set yields a register equal in
//! value to the base (the identity scenario is the baseline).

use crate::error::{ValidationError, ValidationIssue};
use crate::model::{ParameterChange, Risk, Scenario, SimulationRequest};

/// Apply a scenario's changes to a base register.
///
/// Every change must reference an existing risk (and mitigation, where
/// applicable); unknown references are collected and reported together.
pub fn apply_scenario(base: &[Risk], scenario: &Scenario) -> Result<Vec<Risk>, ValidationError> {
    let mut derived: Vec<Risk> = base.to_vec();
    let mut issues = Vec::new();

    for change in &scenario.changes {
        let risk_id = change.risk_id();
        let Some(risk) = derived.iter_mut().find(|r| r.id == risk_id) else {
            issues.push(ValidationIssue::new(
                "parameter_changes.risk_id",
                format!("change references unknown risk {risk_id:?}"),
            ));
            continue;
        };

        match change {
            ParameterChange::ReplaceDistribution { distribution, .. } => {
                risk.distribution = distribution.clone();
            }
            ParameterChange::SetBaselineImpact {
                baseline_impact, ..
            } => {
                risk.baseline_impact = *baseline_impact;
            }
            ParameterChange::ActivateMitigation { mitigation_id, .. } => {
                match risk.mitigation_mut(*mitigation_id) {
                    Some(mitigation) => mitigation.enabled = true,
                    None => issues.push(ValidationIssue::for_risk(
                        risk_id,
                        "parameter_changes.mitigation_id",
                        format!("risk has no mitigation {mitigation_id:?}"),
                    )),
                }
            }
            ParameterChange::DeactivateMitigation { mitigation_id, .. } => {
                match risk.mitigation_mut(*mitigation_id) {
                    Some(mitigation) => mitigation.enabled = false,
                    None => issues.push(ValidationIssue::for_risk(
                        risk_id,
                        "parameter_changes.mitigation_id",
                        format!("risk has no mitigation {mitigation_id:?}"),
                    )),
                }
            }
        }
    }

    if issues.is_empty() {
        Ok(derived)
    } else {
        Err(ValidationError::new(issues))
    }
}

/// Apply a scenario to a whole request, keeping iterations, seed, baselines,
/// and the correlation matrix intact.
///
/// Running scenario variants with the same seed isolates the effect of the
/// parameter changes from sampling noise.
pub fn apply_to_request(
    base: &SimulationRequest,
    scenario: &Scenario,
) -> Result<SimulationRequest, ValidationError> {
    let risks = apply_scenario(&base.risks, scenario)?;
    Ok(SimulationRequest {
        risks,
        correlations: base.correlations.clone(),
        iterations: base.iterations,
        seed: base.seed,
        baseline_cost: base.baseline_cost,
        baseline_schedule: base.baseline_schedule,
    })
}
