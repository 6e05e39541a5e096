//! Monte Carlo risk simulation library
//!
//! This crate provides a probabilistic simulation engine for project risk
//! registers. It supports:
//! - Five impact distributions (normal, triangular, uniform, beta, lognormal)
//!   sampled deterministically from uniform draws
//! - Correlated sampling via a Gaussian copula with Cholesky factorization
//!   and reported spectral repair of near-valid matrices
//! - Mitigation modeling with fractional effectiveness
//! - Batched, reproducibly-seeded iteration (bit-identical results for any
//!   thread count), with progress, cancellation, and deadline support
//! - Percentile/confidence-interval analysis and per-risk variance attribution
//! - Scenario derivation and statistically-tested scenario comparison
//!
//! The crate is a pure computation core: every entry point is a function
//! over explicit values, so any transport layer (REST, RPC, CLI) can wrap it
//! without modification. Results are immutable values; nothing is persisted
//! or shared between calls.
//!
//! # Quick start
//!
//! ```ignore
//! use riskcast_core::config::{EngineConfig, RequestBuilder, RiskBuilder};
//!
//! let request = RequestBuilder::new()
//!     .iterations(10_000)
//!     .seed(42)
//!     .baseline_cost(1_000_000.0)
//!     .risk(RiskBuilder::cost("Vendor delay")
//!         .triangular(25_000.0, 75_000.0, 150_000.0)
//!         .baseline_impact(75_000.0))
//!     .build()?;
//!
//! let config = EngineConfig::default();
//! let run = riskcast_core::simulation::run(&request, &config)?;
//! let result = riskcast_core::analysis::analyze(&run, &request.risks, &config);
//! println!("p90 cost impact: {:?}", result.cost.percentile(0.90));
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod analysis;
pub mod comparison;
pub mod copula;
pub mod error;
pub mod impact;
pub mod scenario;
pub mod simulation;
pub mod stats;
pub mod validation;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod config;
pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use analysis::analyze;
pub use comparison::{compare, compare_all};
pub use config::{EngineConfig, EngineDefaults, RequestBuilder, RiskBuilder};
pub use error::{SimulationError, ValidationError, ValidationIssue};
pub use scenario::{apply_scenario, apply_to_request};
pub use simulation::{SimulationProgress, run, run_with_progress};
pub use validation::{ValidationReport, validate_request};
