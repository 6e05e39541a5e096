//! Integration tests for the risk simulation engine
//!
//! Tests are organized by topic:
//! - `distributions` - Inverse-CDF sampling for each distribution kind
//! - `correlation` - Copula behavior, matrix repair, correlated outcomes
//! - `simulation` - Engine determinism, convergence, failure modes
//! - `analysis` - Percentiles, confidence intervals, variance attribution
//! - `scenario` - Scenario derivation and statistical comparison
//! - `validation` - Exhaustive request validation and the data contract
//! - `builder_dsl` - Fluent register construction

mod builder_dsl;
mod scenario;
mod validation;
