use crate::error::{LikelihoodError, LikelihoodResult};
use crate::routines::linalg::gaussian_terms;
use crate::structs::key::ObservableKey;
use crate::structs::observable::Observable;
use crate::structs::observable_dict::{Covariances, Measurements, Simulations};
use ndarray::{Array1, Array2};
use rayon::prelude::*;
use serde_derive::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub mod ensemble;
pub mod simple;

pub use ensemble::EnsembleLikelihood;
pub use simple::SimpleLikelihood;

/// The available likelihood evaluators
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LikelihoodKind {
    /// Gaussian likelihood with the external covariance only
    Simple,
    /// Gaussian likelihood with the external covariance plus the shrunk ensemble covariance
    #[default]
    Ensemble,
}

/// Immutable options shared by the likelihood evaluators
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct EvaluatorConfig {
    /// A covariance is treated as singular when one of its LU pivots is smaller than this
    /// fraction of the largest pivot
    pub singular_tolerance: f64,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        EvaluatorConfig {
            singular_tolerance: 1e-12,
        }
    }
}

impl EvaluatorConfig {
    pub fn validate(&self) -> LikelihoodResult<()> {
        if !(0.0..1.0).contains(&self.singular_tolerance) {
            return Err(LikelihoodError::InvalidParameter(format!(
                "singular_tolerance must be in [0, 1), got {}",
                self.singular_tolerance
            )));
        }
        Ok(())
    }
}

/// A log-likelihood of simulated observables given fixed measurements
///
/// Implementors hold the measurements (and optionally their covariances) and are evaluated
/// against many different [Simulations]. The total is the sum of the per-key contributions
/// over every measured key, visited in key order.
pub trait Likelihood: Send + Sync {
    fn measurements(&self) -> &Measurements;

    fn covariances(&self) -> Option<&Covariances>;

    /// Contribution of a single key
    ///
    /// `measured` and `simulated` are guaranteed to have the same size and finite entries.
    fn contribution(
        &self,
        key: &ObservableKey,
        measured: &Observable,
        simulated: &Observable,
    ) -> LikelihoodResult<f64>;

    /// Per-key contributions for every measured key
    fn contributions(
        &self,
        simulations: &Simulations,
    ) -> LikelihoodResult<BTreeMap<ObservableKey, f64>> {
        let mut out = BTreeMap::new();
        for (key, measured) in self.measurements().iter() {
            let simulated = simulations.get(key)?;
            if simulated.size() != measured.size() {
                return Err(LikelihoodError::ShapeMismatch {
                    key: key.clone(),
                    expected: measured.size(),
                    found: simulated.size(),
                });
            }
            if !simulated.is_finite() || !measured.is_finite() {
                return Err(LikelihoodError::NonFinite { key: key.clone() });
            }
            let value = self.contribution(key, measured, simulated)?;
            if !value.is_finite() {
                return Err(LikelihoodError::NonFinite { key: key.clone() });
            }
            tracing::trace!("Likelihood contribution of {}: {}", key, value);
            out.insert(key.clone(), value);
        }
        Ok(out)
    }

    /// Total log-likelihood of `simulations`
    fn evaluate(&self, simulations: &Simulations) -> LikelihoodResult<f64> {
        let total: f64 = self.contributions(simulations)?.values().sum();
        Ok(total)
    }

    /// Evaluate several candidate simulations in parallel, results are in input order
    fn evaluate_batch(&self, batch: &[Simulations]) -> Vec<LikelihoodResult<f64>> {
        batch.par_iter().map(|sims| self.evaluate(sims)).collect()
    }
}

/// Build a boxed likelihood evaluator of the requested kind
pub fn build_likelihood(
    kind: LikelihoodKind,
    measurements: Measurements,
    covariances: Option<Covariances>,
    config: EvaluatorConfig,
) -> LikelihoodResult<Box<dyn Likelihood>> {
    match kind {
        LikelihoodKind::Simple => Ok(Box::new(SimpleLikelihood::with_config(
            measurements,
            covariances,
            config,
        )?)),
        LikelihoodKind::Ensemble => Ok(Box::new(EnsembleLikelihood::with_config(
            measurements,
            covariances,
            config,
        )?)),
    }
}

/// Check that measurements and covariances fit together
///
/// Every key flagged as having a covariance must have one, and every covariance of a measured
/// key must match the length of the measurement.
pub(crate) fn validate_inputs(
    measurements: &Measurements,
    covariances: Option<&Covariances>,
) -> LikelihoodResult<()> {
    for (key, measured) in measurements.iter() {
        let cov = covariances.and_then(|c| c.lookup(key));
        match cov {
            Some(cov) if cov.nrows() != measured.size() => {
                return Err(LikelihoodError::ShapeMismatch {
                    key: key.clone(),
                    expected: measured.size(),
                    found: cov.nrows(),
                });
            }
            Some(cov) if cov.iter().any(|x| !x.is_finite()) => {
                return Err(LikelihoodError::NonFinite { key: key.clone() });
            }
            None if measurements.has_covariance(key) => {
                return Err(LikelihoodError::KeyNotFound { key: key.clone() });
            }
            _ => {}
        }
    }
    Ok(())
}

/// Gaussian log-likelihood of a residual
///
/// Without a covariance this is `-0.5 dᵗd`, otherwise
/// `-0.5 (dᵗ C⁻¹ d + sign(det C) log|det(2π C)|)`.
pub(crate) fn gaussian_loglikelihood(
    key: &ObservableKey,
    diff: &Array1<f64>,
    covariance: Option<&Array2<f64>>,
    config: &EvaluatorConfig,
) -> LikelihoodResult<f64> {
    match covariance {
        None => Ok(-0.5 * diff.dot(diff)),
        Some(cov) => match gaussian_terms(cov, diff, config.singular_tolerance) {
            Some(terms) => Ok(-0.5 * (terms.mahalanobis + terms.log_det)),
            None => {
                tracing::warn!("Covariance of {} is singular", key);
                Err(LikelihoodError::SingularCovariance { key: key.clone() })
            }
        },
    }
}

/// Residual between the simulated ensemble mean and the measurement
pub(crate) fn residual(mean: &Array1<f64>, measured: &Observable) -> Array1<f64> {
    mean - &measured.data().row(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn key() -> ObservableKey {
        ObservableKey::quad("test", "nan", "3", "nan")
    }

    #[test]
    fn config_tolerance_is_checked() {
        assert!(EvaluatorConfig::default().validate().is_ok());
        let bad = EvaluatorConfig {
            singular_tolerance: -1.0,
        };
        assert!(matches!(
            bad.validate(),
            Err(LikelihoodError::InvalidParameter(_))
        ));
    }

    #[test]
    fn flagged_measurement_needs_covariance() {
        let mut meas = Measurements::new();
        meas.append(key(), Observable::from_rows(&[vec![1.0, 2.0, 3.0]]).unwrap(), true)
            .unwrap();
        assert_eq!(
            validate_inputs(&meas, None).unwrap_err(),
            LikelihoodError::KeyNotFound { key: key() }
        );

        let mut covs = Covariances::new();
        covs.append(key(), Array2::eye(2)).unwrap();
        assert!(matches!(
            validate_inputs(&meas, Some(&covs)),
            Err(LikelihoodError::ShapeMismatch { expected: 3, found: 2, .. })
        ));

        covs.append(key(), Array2::eye(3)).unwrap();
        assert!(validate_inputs(&meas, Some(&covs)).is_ok());
    }

    #[test]
    fn gaussian_without_covariance() {
        let ll = gaussian_loglikelihood(
            &key(),
            &array![0.0, 0.0, 1.0],
            None,
            &EvaluatorConfig::default(),
        )
        .unwrap();
        assert_eq!(ll, -0.5);
    }

    #[test]
    fn singular_covariance_is_an_error() {
        let err = gaussian_loglikelihood(
            &key(),
            &array![1.0, 1.0, 1.0],
            Some(&Array2::zeros((3, 3))),
            &EvaluatorConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err, LikelihoodError::SingularCovariance { key: key() });
    }
}
