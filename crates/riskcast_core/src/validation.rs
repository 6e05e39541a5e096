//! Exhaustive request validation
//!
//! Every problem in a request is collected — not just the first — so a
//! caller can fix all issues in one pass. Validation never runs the
//! simulation; the report includes an execution-time estimate so a transport
//! layer can answer "is this request viable" cheaply.
//!
//! The engine calls `validate_request` itself before every run, so bad
//! parameters are always rejected before the first iteration.

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::copula::CorrelationModel;
use crate::error::ValidationIssue;
use crate::model::{ImpactDistribution, Risk, RiskId, SimulationRequest, SimulationWarning};

/// Rough per-sample cost used for execution-time estimation. Calibrated
/// against release-mode runs of the iteration loop; deliberately pessimistic.
const NANOS_PER_SAMPLE: u64 = 150;

/// Outcome of validating a request: all errors, all warnings, and a runtime
/// estimate, without executing a single iteration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<SimulationWarning>,
    pub estimated_execution_time: Duration,
}

/// Validate a request against engine limits; collects every problem found.
#[must_use]
pub fn validate_request(request: &SimulationRequest, config: &EngineConfig) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if request.iterations < config.min_iterations {
        errors.push(ValidationIssue::new(
            "iterations",
            format!(
                "iteration count {} is below the minimum {}",
                request.iterations, config.min_iterations
            ),
        ));
    }
    if request.iterations > config.max_iterations {
        errors.push(ValidationIssue::new(
            "iterations",
            format!(
                "iteration count {} exceeds the maximum {}",
                request.iterations, config.max_iterations
            ),
        ));
    }

    if request.risks.is_empty() {
        errors.push(ValidationIssue::new("risks", "risk register is empty"));
    }
    if request.risks.len() > config.max_risks {
        errors.push(ValidationIssue::new(
            "risks",
            format!(
                "register has {} risks, exceeding the maximum {}",
                request.risks.len(),
                config.max_risks
            ),
        ));
    }

    if !request.baseline_cost.is_finite() {
        errors.push(ValidationIssue::new(
            "baseline_cost",
            "baseline cost must be finite",
        ));
    }
    if !request.baseline_schedule.is_finite() {
        errors.push(ValidationIssue::new(
            "baseline_schedule",
            "baseline schedule must be finite",
        ));
    }

    let mut seen_ids = HashSet::new();
    for risk in &request.risks {
        if !seen_ids.insert(risk.id) {
            errors.push(ValidationIssue::for_risk(
                risk.id,
                "id",
                "duplicate risk id",
            ));
        }
        validate_risk(risk, &mut errors);
    }

    let known_ids: HashSet<RiskId> = request.risks.iter().map(|r| r.id).collect();
    for risk in &request.risks {
        for dep in &risk.correlation_dependencies {
            if !known_ids.contains(dep) {
                errors.push(ValidationIssue::for_risk(
                    risk.id,
                    "correlation_dependencies",
                    format!("references unknown risk {dep:?}"),
                ));
            }
        }
    }

    validate_correlations(request, config, &known_ids, &mut errors, &mut warnings);

    let estimated_execution_time = estimate_execution_time(request);
    if estimated_execution_time > config.max_execution_time {
        warnings.push(SimulationWarning::EstimatedTimeExceedsLimit {
            estimated: estimated_execution_time,
            limit: config.max_execution_time,
        });
    }

    ValidationReport {
        valid: errors.is_empty(),
        errors,
        warnings,
        estimated_execution_time,
    }
}

fn validate_risk(risk: &Risk, errors: &mut Vec<ValidationIssue>) {
    validate_distribution(risk, errors);

    if !risk.baseline_impact.is_finite() || risk.baseline_impact < 0.0 {
        errors.push(ValidationIssue::for_risk(
            risk.id,
            "baseline_impact",
            "baseline impact must be finite and non-negative",
        ));
    }

    let mut mitigation_ids = HashSet::new();
    for mitigation in &risk.mitigations {
        if !mitigation_ids.insert(mitigation.id) {
            errors.push(ValidationIssue::for_risk(
                risk.id,
                "mitigations.id",
                "duplicate mitigation id",
            ));
        }
        if !(0.0..=1.0).contains(&mitigation.effectiveness) {
            errors.push(ValidationIssue::for_risk(
                risk.id,
                "mitigations.effectiveness",
                format!(
                    "effectiveness {} is outside [0, 1]",
                    mitigation.effectiveness
                ),
            ));
        }
        if !mitigation.cost.is_finite() || mitigation.cost < 0.0 {
            errors.push(ValidationIssue::for_risk(
                risk.id,
                "mitigations.cost",
                "mitigation cost must be finite and non-negative",
            ));
        }
        if !mitigation.implementation_days.is_finite() || mitigation.implementation_days < 0.0 {
            errors.push(ValidationIssue::for_risk(
                risk.id,
                "mitigations.implementation_days",
                "implementation time must be finite and non-negative",
            ));
        }
    }
}

fn validate_distribution(risk: &Risk, errors: &mut Vec<ValidationIssue>) {
    let mut issue = |field: &str, message: String| {
        errors.push(ValidationIssue::for_risk(risk.id, field, message));
    };

    match &risk.distribution {
        ImpactDistribution::Normal { mean, std_dev } => {
            if !mean.is_finite() {
                issue("distribution_parameters.mean", "mean must be finite".into());
            }
            if !std_dev.is_finite() || *std_dev <= 0.0 {
                issue(
                    "distribution_parameters.std_dev",
                    format!("std_dev {std_dev} must be positive and finite"),
                );
            }
        }
        ImpactDistribution::Triangular { min, mode, max } => {
            if !min.is_finite() || !mode.is_finite() || !max.is_finite() {
                issue(
                    "distribution_parameters",
                    "triangular parameters must be finite".into(),
                );
                return;
            }
            if min >= max {
                issue(
                    "distribution_parameters.min",
                    format!("min {min} must be less than max {max}"),
                );
            }
            if mode < min {
                issue(
                    "distribution_parameters.mode",
                    format!("mode {mode} must be at least min {min}"),
                );
            }
            if mode > max {
                issue(
                    "distribution_parameters.mode",
                    format!("mode {mode} must be at most max {max}"),
                );
            }
        }
        ImpactDistribution::Uniform { min, max } => {
            if !min.is_finite() || !max.is_finite() {
                issue(
                    "distribution_parameters",
                    "uniform parameters must be finite".into(),
                );
            } else if min >= max {
                issue(
                    "distribution_parameters.min",
                    format!("min {min} must be less than max {max}"),
                );
            }
        }
        ImpactDistribution::Beta { alpha, beta, scale } => {
            if !alpha.is_finite() || *alpha <= 0.0 {
                issue(
                    "distribution_parameters.alpha",
                    format!("alpha {alpha} must be positive and finite"),
                );
            }
            if !beta.is_finite() || *beta <= 0.0 {
                issue(
                    "distribution_parameters.beta",
                    format!("beta {beta} must be positive and finite"),
                );
            }
            if !scale.is_finite() || *scale <= 0.0 {
                issue(
                    "distribution_parameters.scale",
                    format!("scale {scale} must be positive and finite"),
                );
            }
        }
        ImpactDistribution::LogNormal { mu, sigma } => {
            if !mu.is_finite() {
                issue("distribution_parameters.mu", "mu must be finite".into());
            }
            if !sigma.is_finite() || *sigma <= 0.0 {
                issue(
                    "distribution_parameters.sigma",
                    format!("sigma {sigma} must be positive and finite"),
                );
            }
        }
    }
}

fn validate_correlations(
    request: &SimulationRequest,
    config: &EngineConfig,
    known_ids: &HashSet<RiskId>,
    errors: &mut Vec<ValidationIssue>,
    warnings: &mut Vec<SimulationWarning>,
) {
    let mut entries_ok = true;

    for entry in request.correlations.iter() {
        if entry.first == entry.second {
            errors.push(ValidationIssue::new(
                "correlations",
                format!("risk {:?} declares a correlation with itself", entry.first),
            ));
            entries_ok = false;
        }
        if !entry.coefficient.is_finite() || entry.coefficient.abs() > 1.0 {
            errors.push(ValidationIssue::new(
                "correlations",
                format!(
                    "coefficient {} for pair ({:?}, {:?}) is outside [-1, 1]",
                    entry.coefficient, entry.first, entry.second
                ),
            ));
            entries_ok = false;
        }
        for id in [entry.first, entry.second] {
            if !known_ids.contains(&id) {
                errors.push(ValidationIssue::new(
                    "correlations",
                    format!("correlation references unknown risk {id:?}"),
                ));
                entries_ok = false;
            }
        }
    }

    // Only attempt the structural check when individual entries are sane;
    // otherwise the dense matrix would be built from garbage.
    if entries_ok && !request.correlations.is_empty() {
        match CorrelationModel::build(
            &request.correlations,
            &request.risks,
            config.correlation_repair_tolerance,
        ) {
            Ok(model) => {
                if let Some(max_adjustment) = model.repair_adjustment() {
                    warnings.push(SimulationWarning::CorrelationRepaired { max_adjustment });
                }
            }
            Err(e) => {
                errors.push(ValidationIssue::new("correlations", e.to_string()));
            }
        }
    }
}

/// Estimate wall-clock time for a request without running it.
#[must_use]
pub fn estimate_execution_time(request: &SimulationRequest) -> Duration {
    let samples = request.risks.len() as u64 * request.iterations as u64;
    Duration::from_nanos(samples.saturating_mul(NANOS_PER_SAMPLE))
}
