//! Engine configuration
//!
//! `EngineConfig` carries the tunable limits and analysis settings for a
//! deployment: iteration bounds, convergence criteria, reported percentiles
//! and confidence levels, significance alpha. `EngineDefaults` is the static
//! descriptor a transport layer serves for its configuration endpoint.
//!
//! # Builder DSL
//!
//! For ergonomic register construction, use the builder DSL:
//!
//! ```ignore
//! use riskcast_core::config::{RequestBuilder, RiskBuilder};
//!
//! let request = RequestBuilder::new()
//!     .iterations(10_000)
//!     .seed(42)
//!     .baseline_cost(1_000_000.0)
//!     .baseline_schedule(365.0)
//!     .risk(RiskBuilder::cost("Vendor delay")
//!         .triangular(25_000.0, 75_000.0, 150_000.0)
//!         .baseline_impact(75_000.0))
//!     .risk(RiskBuilder::schedule("Integration slip")
//!         .normal(30.0, 10.0)
//!         .baseline_impact(30.0))
//!     .correlation("Vendor delay", "Integration slip", 0.6)
//!     .build()?;
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::model::{ImpactDistribution, ImpactType, RiskCategory};

pub mod builder;

pub use builder::{RequestBuilder, RiskBuilder};

fn default_top_contributions() -> usize {
    10
}

/// Tunable engine settings and hard limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Iteration count used when a caller does not specify one
    pub default_iterations: usize,
    /// Requests below this iteration count are rejected at validation time
    pub min_iterations: usize,
    pub max_iterations: usize,
    pub max_risks: usize,
    /// Runs estimated or measured to exceed this are flagged / aborted
    pub max_execution_time: Duration,
    /// Trailing window size for convergence checks, as a fraction of the run
    pub convergence_window_fraction: f64,
    /// Relative mean/variance change below which a run counts as converged
    pub convergence_threshold: f64,
    /// Largest coefficient change spectral repair may apply before the
    /// correlation matrix is rejected outright
    pub correlation_repair_tolerance: f64,
    /// Percentile fractions reported by the analyzer
    pub reported_percentiles: Vec<f64>,
    /// Confidence interval levels reported by the analyzer
    pub confidence_levels: Vec<f64>,
    /// Significance threshold for scenario comparisons
    pub significance_alpha: f64,
    /// Risk contributions reported individually; the rest aggregate as "other"
    #[serde(default = "default_top_contributions")]
    pub top_contributions: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_iterations: 10_000,
            min_iterations: 10_000,
            max_iterations: 1_000_000,
            max_risks: 200,
            max_execution_time: Duration::from_secs(30),
            convergence_window_fraction: 0.15,
            convergence_threshold: 0.01,
            correlation_repair_tolerance: 0.05,
            reported_percentiles: vec![0.10, 0.25, 0.50, 0.75, 0.90, 0.95, 0.99],
            confidence_levels: vec![0.80, 0.90, 0.95],
            significance_alpha: 0.05,
            top_contributions: 10,
        }
    }
}

impl EngineConfig {
    /// Permissive settings for exploratory / test use: no minimum iteration
    /// count and a generous time limit. Production deployments keep the
    /// defaults.
    #[must_use]
    pub fn permissive() -> Self {
        Self {
            min_iterations: 1,
            ..Self::default()
        }
    }

    /// Static descriptor for a configuration endpoint
    #[must_use]
    pub fn defaults_descriptor(&self) -> EngineDefaults {
        EngineDefaults {
            default_iterations: self.default_iterations,
            min_iterations: self.min_iterations,
            max_iterations: self.max_iterations,
            max_risks: self.max_risks,
            max_execution_time: self.max_execution_time,
            convergence_threshold: self.convergence_threshold,
            significance_alpha: self.significance_alpha,
            supported_distributions: ImpactDistribution::KINDS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            supported_categories: RiskCategory::ALL
                .iter()
                .map(|c| c.label().to_string())
                .collect(),
            supported_impact_types: ImpactType::ALL
                .iter()
                .map(|t| t.label().to_string())
                .collect(),
        }
    }
}

/// Static configuration summary served to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineDefaults {
    pub default_iterations: usize,
    pub min_iterations: usize,
    pub max_iterations: usize,
    pub max_risks: usize,
    pub max_execution_time: Duration,
    pub convergence_threshold: f64,
    pub significance_alpha: f64,
    pub supported_distributions: Vec<String>,
    pub supported_categories: Vec<String>,
    pub supported_impact_types: Vec<String>,
}
