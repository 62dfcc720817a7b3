use crate::structs::observable::Observable;
use ndarray::{Array1, Array2, Axis};

pub mod oas;

/// Mean and covariance estimated from an ensemble
#[derive(Debug, Clone, PartialEq)]
pub struct ShrunkCovariance {
    pub mean: Array1<f64>,
    pub covariance: Array2<f64>,
    /// Weight given to the shrinkage target, 0 for the plain sample covariance
    pub shrinkage: f64,
}

/// Trait for ensemble covariance estimators
pub trait CovarianceEstimator: Sync {
    /// Estimate the mean and `p x p` covariance of an ensemble of realizations of length `p`
    fn estimate(&self, ensemble: &Observable) -> ShrunkCovariance;
}

/// The biased (divide by `n`) sample covariance, without any regularization
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SampleCovariance;

impl CovarianceEstimator for SampleCovariance {
    fn estimate(&self, ensemble: &Observable) -> ShrunkCovariance {
        let (mean, covariance) = sample_covariance(ensemble);
        ShrunkCovariance {
            mean,
            covariance,
            shrinkage: 0.0,
        }
    }
}

/// Ensemble mean and biased sample covariance `(1/n) Σ (xᵢ - μ)(xᵢ - μ)ᵗ`
///
/// Deviations are taken from the first realization `x₀`, with `μ = x₀ + δ̄` and
/// `xᵢ - μ = (xᵢ - x₀) - δ̄`. A single realization, or any number of identical ones, yields
/// exactly the zero matrix.
pub fn sample_covariance(ensemble: &Observable) -> (Array1<f64>, Array2<f64>) {
    let n = ensemble.ensemble_size() as f64;
    let (origin, deviations) = ensemble.deviations_from_first();
    let offset = deviations.sum_axis(Axis(0)) / n;
    let centered = &deviations - &offset.view().insert_axis(Axis(0));
    let covariance = centered.t().dot(&centered) / n;
    (origin + offset, covariance)
}
