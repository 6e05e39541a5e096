//! Gaussian copula over the risk register
//!
//! Correlated sampling works in three steps per iteration: draw independent
//! standard normals, multiply by the Cholesky factor of the correlation
//! matrix, then map each correlated normal through Φ to a uniform draw for
//! the per-risk inverse-CDF samplers.
//!
//! The factor is built once per run. A matrix that is not positive
//! semi-definite is repaired by spectral clipping (eigenvalues clamped to a
//! small floor, reconstruct, rescale to unit diagonal); the largest
//! coefficient adjustment is reported as a warning. A matrix whose repair
//! exceeds the configured tolerance is rejected before any iteration runs.

use crate::error::CorrelationError;
use crate::model::{CorrelationMatrix, Risk};
use crate::stats;

/// Eigenvalue floor applied during spectral clipping; keeps the repaired
/// matrix strictly positive definite so Cholesky cannot fail twice.
const EIGENVALUE_FLOOR: f64 = 1.0e-8;

/// Cholesky-based correlation structure for one simulation run
#[derive(Debug, Clone)]
pub struct CorrelationModel {
    n: usize,
    /// Lower-triangular factor, row-major; `None` means identity (all risks
    /// independent) and correlation is a plain copy.
    factor: Option<Vec<f64>>,
    /// Largest absolute coefficient change applied by spectral repair
    repair_adjustment: Option<f64>,
}

impl CorrelationModel {
    /// Build the model for a register and its correlation matrix.
    ///
    /// `repair_tolerance` bounds how far spectral repair may move any
    /// coefficient before the matrix is rejected.
    pub fn build(
        matrix: &CorrelationMatrix,
        risks: &[Risk],
        repair_tolerance: f64,
    ) -> Result<Self, CorrelationError> {
        let n = risks.len();
        if matrix.is_empty() {
            return Ok(Self {
                n,
                factor: None,
                repair_adjustment: None,
            });
        }

        let dense = matrix.to_dense(risks);
        if let Some(factor) = cholesky(&dense, n) {
            return Ok(Self {
                n,
                factor: Some(factor),
                repair_adjustment: None,
            });
        }

        let (repaired, max_adjustment) = nearest_correlation(&dense, n);
        if max_adjustment > repair_tolerance {
            return Err(CorrelationError::NotRepairable {
                max_adjustment,
                tolerance: repair_tolerance,
            });
        }

        let factor = cholesky(&repaired, n).ok_or(CorrelationError::NotRepairable {
            max_adjustment,
            tolerance: repair_tolerance,
        })?;

        tracing::warn!(
            max_adjustment,
            "correlation matrix repaired by spectral clipping"
        );

        Ok(Self {
            n,
            factor: Some(factor),
            repair_adjustment: Some(max_adjustment),
        })
    }

    /// Identity structure for `n` independent risks
    #[must_use]
    pub fn identity(n: usize) -> Self {
        Self {
            n,
            factor: None,
            repair_adjustment: None,
        }
    }

    /// Largest coefficient change applied by repair, if any
    #[must_use]
    pub fn repair_adjustment(&self) -> Option<f64> {
        self.repair_adjustment
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.n
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Transform independent standard normals into correlated uniform draws.
    ///
    /// `z` holds one independent standard normal per risk; `out` receives
    /// Φ(L·z) per risk. Both slices must have length `n`.
    pub fn correlate_to_uniforms(&self, z: &[f64], out: &mut [f64]) {
        debug_assert_eq!(z.len(), self.n);
        debug_assert_eq!(out.len(), self.n);

        match &self.factor {
            None => {
                for (o, zi) in out.iter_mut().zip(z.iter()) {
                    *o = stats::norm_cdf(*zi);
                }
            }
            Some(l) => {
                for i in 0..self.n {
                    let mut acc = 0.0;
                    for (j, zj) in z.iter().enumerate().take(i + 1) {
                        acc += l[i * self.n + j] * zj;
                    }
                    out[i] = stats::norm_cdf(acc);
                }
            }
        }
    }
}

/// Cholesky decomposition of a symmetric matrix (row-major, n×n).
///
/// Returns the lower-triangular factor, or `None` when the matrix is not
/// positive definite.
fn cholesky(a: &[f64], n: usize) -> Option<Vec<f64>> {
    let mut l = vec![0.0; n * n];

    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i * n + j];
            for k in 0..j {
                sum -= l[i * n + k] * l[j * n + k];
            }

            if i == j {
                if sum <= 0.0 {
                    return None;
                }
                l[i * n + i] = sum.sqrt();
            } else {
                l[i * n + j] = sum / l[j * n + j];
            }
        }
    }

    Some(l)
}

/// Eigendecomposition of a symmetric matrix via cyclic Jacobi rotations.
///
/// Returns (eigenvalues, eigenvectors column-major): `a ≈ V · diag(λ) · Vᵀ`.
fn jacobi_eigen(a: &[f64], n: usize) -> (Vec<f64>, Vec<f64>) {
    let mut m = a.to_vec();
    let mut v = vec![0.0; n * n];
    for i in 0..n {
        v[i * n + i] = 1.0;
    }

    const MAX_SWEEPS: usize = 50;
    for _ in 0..MAX_SWEEPS {
        let mut off_diag = 0.0;
        for i in 0..n {
            for j in (i + 1)..n {
                off_diag += m[i * n + j].abs();
            }
        }
        if off_diag < 1e-12 {
            break;
        }

        for p in 0..n {
            for q in (p + 1)..n {
                let apq = m[p * n + q];
                if apq.abs() < 1e-15 {
                    continue;
                }

                let app = m[p * n + p];
                let aqq = m[q * n + q];
                let theta = (aqq - app) / (2.0 * apq);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                // Rotate rows/columns p and q
                for k in 0..n {
                    let mkp = m[k * n + p];
                    let mkq = m[k * n + q];
                    m[k * n + p] = c * mkp - s * mkq;
                    m[k * n + q] = s * mkp + c * mkq;
                }
                for k in 0..n {
                    let mpk = m[p * n + k];
                    let mqk = m[q * n + k];
                    m[p * n + k] = c * mpk - s * mqk;
                    m[q * n + k] = s * mpk + c * mqk;
                }
                for k in 0..n {
                    let vkp = v[k * n + p];
                    let vkq = v[k * n + q];
                    v[k * n + p] = c * vkp - s * vkq;
                    v[k * n + q] = s * vkp + c * vkq;
                }
            }
        }
    }

    let eigenvalues = (0..n).map(|i| m[i * n + i]).collect();
    (eigenvalues, v)
}

/// Nearest usable correlation matrix by spectral clipping.
///
/// Clamps negative eigenvalues to a small floor, reconstructs, and rescales
/// to a unit diagonal. Returns the repaired matrix and the largest absolute
/// change applied to any coefficient.
fn nearest_correlation(a: &[f64], n: usize) -> (Vec<f64>, f64) {
    let (eigenvalues, v) = jacobi_eigen(a, n);
    let clipped: Vec<f64> = eigenvalues
        .iter()
        .map(|&l| l.max(EIGENVALUE_FLOOR))
        .collect();

    // Reconstruct V · diag(λ⁺) · Vᵀ
    let mut rebuilt = vec![0.0; n * n];
    for i in 0..n {
        for j in 0..n {
            let mut acc = 0.0;
            for (k, lk) in clipped.iter().enumerate() {
                acc += v[i * n + k] * lk * v[j * n + k];
            }
            rebuilt[i * n + j] = acc;
        }
    }

    // Rescale to unit diagonal and re-symmetrize
    let scale: Vec<f64> = (0..n)
        .map(|i| 1.0 / rebuilt[i * n + i].max(EIGENVALUE_FLOOR).sqrt())
        .collect();
    let mut repaired = vec![0.0; n * n];
    for i in 0..n {
        for j in 0..n {
            let value = rebuilt[i * n + j] * scale[i] * scale[j];
            repaired[i * n + j] = if i == j { 1.0 } else { value.clamp(-1.0, 1.0) };
        }
    }
    for i in 0..n {
        for j in (i + 1)..n {
            let avg = 0.5 * (repaired[i * n + j] + repaired[j * n + i]);
            repaired[i * n + j] = avg;
            repaired[j * n + i] = avg;
        }
    }

    let max_adjustment = a
        .iter()
        .zip(repaired.iter())
        .map(|(orig, fixed)| (orig - fixed).abs())
        .fold(0.0, f64::max);

    (repaired, max_adjustment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cholesky_identity() {
        let a = vec![1.0, 0.0, 0.0, 1.0];
        let l = cholesky(&a, 2).unwrap();
        assert_eq!(l, vec![1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_cholesky_known_factor() {
        // [[4, 2], [2, 3]] = L·Lᵀ with L = [[2, 0], [1, sqrt(2)]]
        let a = vec![4.0, 2.0, 2.0, 3.0];
        let l = cholesky(&a, 2).unwrap();
        assert!((l[0] - 2.0).abs() < 1e-12);
        assert!((l[2] - 1.0).abs() < 1e-12);
        assert!((l[3] - 2.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_cholesky_rejects_indefinite() {
        // Correlation of 1.5 is impossible; matrix is indefinite
        let a = vec![1.0, 1.5, 1.5, 1.0];
        assert!(cholesky(&a, 2).is_none());
    }

    #[test]
    fn test_jacobi_eigenvalues() {
        // [[2, 1], [1, 2]] has eigenvalues 1 and 3
        let a = vec![2.0, 1.0, 1.0, 2.0];
        let (mut eigenvalues, _) = jacobi_eigen(&a, 2);
        eigenvalues.sort_by(|x, y| x.partial_cmp(y).unwrap());
        assert!((eigenvalues[0] - 1.0).abs() < 1e-9);
        assert!((eigenvalues[1] - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_nearest_correlation_repairs() {
        // Contradictory structure: A~B and A~C strongly positive, B~C strongly
        // negative. Not PSD; repair must produce a factorizable matrix.
        let a = vec![
            1.0, 0.9, 0.9, //
            0.9, 1.0, -0.9, //
            0.9, -0.9, 1.0,
        ];
        assert!(cholesky(&a, 3).is_none());

        let (repaired, max_adjustment) = nearest_correlation(&a, 3);
        assert!(max_adjustment > 0.0);
        assert!(cholesky(&repaired, 3).is_some());
        for i in 0..3 {
            assert!((repaired[i * 3 + i] - 1.0).abs() < 1e-12);
        }
    }
}
