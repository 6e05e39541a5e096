//! Monte Carlo simulation engine
//!
//! Each run validates its request, seeds its own RNG stream, and walks the
//! iteration loop in fixed-size batches. Batches are independently seeded
//! from the master seed, so results are bit-identical for any thread count
//! (and for the serial fallback when the `parallel` feature is off).
//!
//! The engine is stateless per invocation: it owns its buffers, returns a
//! fully-formed `SimulationRun`, and retains nothing between calls, so many
//! runs can execute concurrently.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};
use rand_distr::StandardNormal;

#[cfg(feature = "parallel")]
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::config::EngineConfig;
use crate::copula::CorrelationModel;
use crate::error::{SimulationError, ValidationError, ValidationIssue};
use crate::impact;
use crate::model::{
    ConvergenceMetrics, IterationOutcome, Risk, RunMetadata, SimulationRequest, SimulationRun,
    SimulationWarning,
};
use crate::validation::validate_request;

/// Iterations per batch. Fixed so that batching never affects results:
/// batch b always covers iterations [b * BATCH_SIZE, (b + 1) * BATCH_SIZE).
const BATCH_SIZE: usize = 256;

/// Progress tracking and cancellation for a running simulation.
///
/// Cloneable and cheap to share: hand one clone to the engine and keep
/// another to poll completion or cancel from a different thread.
#[derive(Debug, Clone)]
pub struct SimulationProgress {
    completed: Arc<AtomicUsize>,
    total: Arc<AtomicUsize>,
    cancelled: Arc<AtomicBool>,
}

impl SimulationProgress {
    /// Create a new progress tracker for `total` iterations
    #[must_use]
    pub fn new(total: usize) -> Self {
        Self {
            completed: Arc::new(AtomicUsize::new(0)),
            total: Arc::new(AtomicUsize::new(total)),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Iterations completed so far
    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    /// Total iterations expected
    #[must_use]
    pub fn total(&self) -> usize {
        self.total.load(Ordering::Relaxed)
    }

    /// Completion fraction in [0, 1]
    #[must_use]
    pub fn fraction(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.completed() as f64 / total as f64
    }

    /// Request cancellation; the engine checks between batches
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    fn add_completed(&self, count: usize) {
        self.completed.fetch_add(count, Ordering::Relaxed);
    }
}

/// Run a simulation with default progress tracking and no deadline.
pub fn run(
    request: &SimulationRequest,
    config: &EngineConfig,
) -> Result<SimulationRun, SimulationError> {
    let progress = SimulationProgress::new(request.iterations);
    run_with_progress(request, config, &progress, None)
}

/// Run a simulation with caller-visible progress, cancellation, and an
/// optional wall-clock deadline.
///
/// Validation failures are reported before any iteration executes. A
/// deadline overrun or cancellation aborts between batches and reports how
/// many iterations completed; it is a reported failure, not a panic.
pub fn run_with_progress(
    request: &SimulationRequest,
    config: &EngineConfig,
    progress: &SimulationProgress,
    deadline: Option<Duration>,
) -> Result<SimulationRun, SimulationError> {
    let report = validate_request(request, config);
    if !report.valid {
        return Err(ValidationError::new(report.errors).into());
    }
    let mut warnings = report.warnings;

    let model = CorrelationModel::build(
        &request.correlations,
        &request.risks,
        config.correlation_repair_tolerance,
    )
    .map_err(|e| ValidationError::new(vec![ValidationIssue::new("correlations", e.to_string())]))?;

    let master_seed = request.seed.unwrap_or_else(|| rand::rng().next_u64());
    let start = Instant::now();

    let num_batches = request.iterations.div_ceil(BATCH_SIZE);
    let run_batch = |batch: usize| -> Result<Vec<IterationOutcome>, SimulationError> {
        if progress.is_cancelled() {
            return Err(SimulationError::Cancelled {
                completed: progress.completed(),
            });
        }
        if let Some(limit) = deadline {
            let elapsed = start.elapsed();
            if elapsed > limit {
                return Err(SimulationError::Timeout {
                    completed: progress.completed(),
                    elapsed,
                });
            }
        }

        let first_iteration = batch * BATCH_SIZE;
        let batch_size = BATCH_SIZE.min(request.iterations - first_iteration);
        let mut rng = SmallRng::seed_from_u64(splitmix64(master_seed ^ batch as u64));

        let mut outcomes = Vec::with_capacity(batch_size);
        for i in 0..batch_size {
            let outcome = simulate_iteration(&mut rng, &request.risks, &model).map_err(
                |(risk_index, value)| SimulationError::NumericInstability {
                    risk_id: request.risks[risk_index].id,
                    iteration: first_iteration + i,
                    value,
                },
            )?;
            outcomes.push(outcome);
        }

        progress.add_completed(batch_size);
        Ok(outcomes)
    };

    #[cfg(feature = "parallel")]
    let batches: Result<Vec<_>, SimulationError> =
        (0..num_batches).into_par_iter().map(run_batch).collect();

    #[cfg(not(feature = "parallel"))]
    let batches: Result<Vec<_>, SimulationError> = (0..num_batches).map(run_batch).collect();

    let outcomes: Vec<IterationOutcome> = batches?.into_iter().flatten().collect();

    let convergence = convergence_metrics(&outcomes, config);
    if !convergence.converged {
        warnings.push(SimulationWarning::NotConverged {
            mean_delta: convergence.mean_delta,
            variance_delta: convergence.variance_delta,
        });
    }

    let execution_time = start.elapsed();
    tracing::debug!(
        iterations = request.iterations,
        risks = request.risks.len(),
        seed = master_seed,
        ?execution_time,
        converged = convergence.converged,
        "simulation run complete"
    );

    Ok(SimulationRun {
        outcomes,
        convergence,
        metadata: RunMetadata {
            seed: master_seed,
            iterations: request.iterations,
            execution_time,
            warnings,
        },
    })
}

/// One trial across all risks. Errors identify the offending risk index and
/// the non-finite value so the engine can attach iteration context.
fn simulate_iteration(
    rng: &mut SmallRng,
    risks: &[Risk],
    model: &CorrelationModel,
) -> Result<IterationOutcome, (usize, f64)> {
    let n = risks.len();

    let z: Vec<f64> = (0..n).map(|_| rng.sample(StandardNormal)).collect();
    let mut uniforms = vec![0.0; n];
    model.correlate_to_uniforms(&z, &mut uniforms);

    let mut total_cost = 0.0;
    let mut total_schedule = 0.0;
    let mut risk_costs = Vec::with_capacity(n);
    let mut risk_schedules = Vec::with_capacity(n);

    for (i, (risk, u)) in risks.iter().zip(uniforms.iter()).enumerate() {
        let value = risk.distribution.sample(*u);
        let realized = impact::realize(risk, value);

        if !realized.cost.is_finite() || !realized.schedule.is_finite() {
            let bad = if realized.cost.is_finite() {
                realized.schedule
            } else {
                realized.cost
            };
            return Err((i, bad));
        }

        total_cost += realized.cost;
        total_schedule += realized.schedule;
        risk_costs.push(realized.cost);
        risk_schedules.push(realized.schedule);
    }

    Ok(IterationOutcome {
        total_cost,
        total_schedule,
        risk_costs,
        risk_schedules,
    })
}

/// Stability check over trailing windows of the outcome series.
///
/// Cumulative mean and variance of both outcome dimensions are recorded at
/// every window boundary; the run is converged when the relative change
/// between the final pair of checkpoints is below the threshold on both
/// dimensions. `converged_at` is the earliest boundary from which stability
/// held through the end of the run. Needs at least two checkpoints; shorter
/// runs report not-converged.
fn convergence_metrics(outcomes: &[IterationOutcome], config: &EngineConfig) -> ConvergenceMetrics {
    let n = outcomes.len();
    let window = ((n as f64 * config.convergence_window_fraction) as usize).max(1);

    // Welford accumulators per dimension
    let mut count = 0usize;
    let mut mean_c = 0.0;
    let mut m2_c = 0.0;
    let mut mean_s = 0.0;
    let mut m2_s = 0.0;

    // (iteration, mean_c, var_c, mean_s, var_s) at each window boundary
    let mut checkpoints = Vec::new();

    for outcome in outcomes {
        count += 1;

        let delta = outcome.total_cost - mean_c;
        mean_c += delta / count as f64;
        m2_c += delta * (outcome.total_cost - mean_c);

        let delta = outcome.total_schedule - mean_s;
        mean_s += delta / count as f64;
        m2_s += delta * (outcome.total_schedule - mean_s);

        if count % window == 0 || count == n {
            let var_c = if count > 1 { m2_c / (count - 1) as f64 } else { 0.0 };
            let var_s = if count > 1 { m2_s / (count - 1) as f64 } else { 0.0 };
            checkpoints.push((count, mean_c, var_c, mean_s, var_s));
        }
    }

    if checkpoints.len() < 2 {
        return ConvergenceMetrics {
            converged: false,
            converged_at: None,
            mean_delta: 0.0,
            variance_delta: 0.0,
            window,
        };
    }

    let relative = |prev: f64, cur: f64| -> f64 {
        if prev == cur {
            0.0
        } else {
            (cur - prev).abs() / prev.abs().max(1e-12)
        }
    };

    // Per-checkpoint deltas against the previous checkpoint
    let deltas: Vec<(usize, f64, f64)> = checkpoints
        .windows(2)
        .map(|pair| {
            let (_, pm_c, pv_c, pm_s, pv_s) = pair[0];
            let (at, cm_c, cv_c, cm_s, cv_s) = pair[1];
            let mean_delta = relative(pm_c, cm_c).max(relative(pm_s, cm_s));
            let variance_delta = relative(pv_c, cv_c).max(relative(pv_s, cv_s));
            (at, mean_delta, variance_delta)
        })
        .collect();

    let stable = |(_, m, v): &(usize, f64, f64)| {
        *m < config.convergence_threshold && *v < config.convergence_threshold
    };

    let (_, mean_delta, variance_delta) = *deltas.last().unwrap();
    let converged = stable(deltas.last().unwrap());

    // Earliest boundary from which every later delta stayed stable
    let converged_at = if converged {
        let mut first = deltas.len() - 1;
        while first > 0 && stable(&deltas[first - 1]) {
            first -= 1;
        }
        Some(deltas[first].0)
    } else {
        None
    };

    ConvergenceMetrics {
        converged,
        converged_at,
        mean_delta,
        variance_delta,
        window,
    }
}

/// SplitMix64 finalizer: spreads batch indices across the seed space so
/// per-batch RNG streams are well separated.
fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
