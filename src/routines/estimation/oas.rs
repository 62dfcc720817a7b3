use crate::routines::estimation::{sample_covariance, CovarianceEstimator, ShrunkCovariance};
use crate::structs::observable::Observable;
use ndarray::Array2;

/// Oracle Approximating Shrinkage (Chen, Wiesel, Eldar & Hero, 2010)
///
/// Shrinks the biased sample covariance `S` of an ensemble of `n` realizations of length `p`
/// towards the isotropic target `F = tr(S)/p · I`:
///
/// ```text
/// Σ = (1 - ρ) S + ρ F
///
///          (1 - 2/p) tr(S²) + tr(S)²
/// ρ = ---------------------------------------
///     (n + 1 - 2/p) (tr(S²) - tr(S)²/p)
/// ```
///
/// `ρ` is clamped to `[0, 1]`. When the denominator vanishes, which happens for a single
/// realization or whenever `S` is already a multiple of the identity, `ρ = 1` is used. This
/// last rule is an inferred policy, the closed form itself is undefined there.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OracleApproximatingShrinkage;

impl CovarianceEstimator for OracleApproximatingShrinkage {
    fn estimate(&self, ensemble: &Observable) -> ShrunkCovariance {
        oas_mcov(ensemble)
    }
}

/// Compute the OAS mean and covariance of an ensemble
pub fn oas_mcov(ensemble: &Observable) -> ShrunkCovariance {
    let n = ensemble.ensemble_size() as f64;
    let p = ensemble.size() as f64;
    let (mean, sample) = sample_covariance(ensemble);

    let trace = sample.diag().sum();
    let trace_sq: f64 = sample.iter().map(|x| x * x).sum();
    let shrinkage = oas_coefficient(n, p, trace, trace_sq);

    let target = trace / p;
    let mut covariance = sample * (1.0 - shrinkage);
    covariance
        .diag_mut()
        .mapv_inplace(|x| x + shrinkage * target);

    tracing::trace!(
        "OAS estimate over {} realizations of {} pixels, shrinkage {}",
        n,
        p,
        shrinkage
    );

    ShrunkCovariance {
        mean,
        covariance,
        shrinkage,
    }
}

/// The OAS shrinkage coefficient for `n` realizations of length `p`, given `tr(S)` and `tr(S²)`
pub fn oas_coefficient(n: f64, p: f64, trace: f64, trace_sq: f64) -> f64 {
    let numerator = (1.0 - 2.0 / p) * trace_sq + trace * trace;
    let denominator = (n + 1.0 - 2.0 / p) * (trace_sq - trace * trace / p);
    if denominator == 0.0 {
        return 1.0;
    }
    let rho = numerator / denominator;
    if rho.is_nan() {
        1.0
    } else {
        rho.clamp(0.0, 1.0)
    }
}

/// The shrinkage target `tr(S)/p · I` for a sample covariance `S`
pub fn isotropic_target(sample: &Array2<f64>) -> Array2<f64> {
    let p = sample.nrows();
    Array2::eye(p) * (sample.diag().sum() / p as f64)
}
