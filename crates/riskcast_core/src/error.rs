//! Error types for the simulation engine
//!
//! Validation problems are collected exhaustively before a run starts so a
//! caller can fix every issue in one pass; execution errors carry enough
//! context (risk id, iteration index, elapsed time, completed count) to
//! diagnose without re-running.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::model::RiskId;

/// One structured validation problem: which field, on which risk, and why.
///
/// The boundary layer maps these directly to response detail objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Dotted field path, e.g. `distribution_parameters.mode`
    pub field: String,
    /// The offending risk, when the problem is risk-scoped
    pub risk_id: Option<RiskId>,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            risk_id: None,
            message: message.into(),
        }
    }

    pub fn for_risk(risk_id: RiskId, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            risk_id: Some(risk_id),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.risk_id {
            Some(id) => write!(f, "{}: {} (risk {:?})", self.field, self.message, id),
            None => write!(f, "{}: {}", self.field, self.message),
        }
    }
}

/// All validation problems found in a request, collected exhaustively
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationError {
    #[must_use]
    pub fn new(issues: Vec<ValidationIssue>) -> Self {
        Self { issues }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation issue(s)", self.issues.len())?;
        for issue in &self.issues {
            write!(f, "; {issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Errors from running a simulation
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// The request failed validation; no iteration ran
    Validation(ValidationError),
    /// A non-finite value appeared mid-run. Identifies the offending risk and
    /// iteration so aggregate statistics are never silently corrupted.
    NumericInstability {
        risk_id: RiskId,
        iteration: usize,
        value: f64,
    },
    /// The caller-supplied deadline passed; `completed` iterations finished
    Timeout { completed: usize, elapsed: Duration },
    /// The run was cancelled via its progress handle
    Cancelled { completed: usize },
    /// Unsupported option (distribution kind, statistical test, ...)
    Config(String),
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::Validation(e) => write!(f, "{e}"),
            SimulationError::NumericInstability {
                risk_id,
                iteration,
                value,
            } => write!(
                f,
                "non-finite value {value} produced by risk {risk_id:?} at iteration {iteration}"
            ),
            SimulationError::Timeout { completed, elapsed } => write!(
                f,
                "simulation exceeded deadline after {elapsed:?} ({completed} iterations completed)"
            ),
            SimulationError::Cancelled { completed } => {
                write!(f, "simulation cancelled ({completed} iterations completed)")
            }
            SimulationError::Config(msg) => write!(f, "configuration error: {msg}"),
        }
    }
}

impl std::error::Error for SimulationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimulationError::Validation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ValidationError> for SimulationError {
    fn from(e: ValidationError) -> Self {
        SimulationError::Validation(e)
    }
}

/// Errors building a correlation structure from a matrix
#[derive(Debug, Clone, PartialEq)]
pub enum CorrelationError {
    /// The matrix is not positive semi-definite and spectral repair would
    /// move at least one coefficient beyond the configured tolerance
    NotRepairable {
        max_adjustment: f64,
        tolerance: f64,
    },
}

impl fmt::Display for CorrelationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorrelationError::NotRepairable {
                max_adjustment,
                tolerance,
            } => write!(
                f,
                "correlation matrix is not positive semi-definite and cannot be repaired \
                 within tolerance (required adjustment {max_adjustment:.4} > {tolerance:.4})"
            ),
        }
    }
}

impl std::error::Error for CorrelationError {}
