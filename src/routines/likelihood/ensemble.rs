use super::{
    gaussian_loglikelihood, residual, validate_inputs, EvaluatorConfig, Likelihood,
};
use crate::error::LikelihoodResult;
use crate::routines::estimation::oas::oas_mcov;
use crate::structs::key::ObservableKey;
use crate::structs::observable::Observable;
use crate::structs::observable_dict::{Covariances, Measurements};
use ndarray::Array2;
use std::borrow::Cow;

/// Gaussian likelihood accounting for the Monte-Carlo noise of the simulated ensemble
///
/// The covariance of each key is the external (measurement noise) covariance, if any, plus
/// the OAS-shrunk covariance of the simulated realizations. When both are absent or zero the
/// residual is scored as `-0.5 dᵗd`, which makes a single-realization ensemble without
/// external covariance score exactly as [super::SimpleLikelihood].
#[derive(Debug, Clone)]
pub struct EnsembleLikelihood {
    measurements: Measurements,
    covariances: Option<Covariances>,
    config: EvaluatorConfig,
}

impl EnsembleLikelihood {
    pub fn new(
        measurements: Measurements,
        covariances: Option<Covariances>,
    ) -> LikelihoodResult<Self> {
        Self::with_config(measurements, covariances, EvaluatorConfig::default())
    }

    pub fn with_config(
        measurements: Measurements,
        covariances: Option<Covariances>,
        config: EvaluatorConfig,
    ) -> LikelihoodResult<Self> {
        config.validate()?;
        validate_inputs(&measurements, covariances.as_ref())?;
        tracing::debug!(
            "Ensemble likelihood over {} observables, {} covariances",
            measurements.len(),
            covariances.as_ref().map_or(0, |c| c.len())
        );
        Ok(EnsembleLikelihood {
            measurements,
            covariances,
            config,
        })
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }
}

impl Likelihood for EnsembleLikelihood {
    fn measurements(&self) -> &Measurements {
        &self.measurements
    }

    fn covariances(&self) -> Option<&Covariances> {
        self.covariances.as_ref()
    }

    fn contribution(
        &self,
        key: &ObservableKey,
        measured: &Observable,
        simulated: &Observable,
    ) -> LikelihoodResult<f64> {
        let estimate = oas_mcov(simulated);
        let diff = residual(&estimate.mean, measured);

        let sim_cov_is_zero = is_zero(&estimate.covariance);
        let external = self
            .covariances
            .as_ref()
            .and_then(|c| c.lookup(key))
            .filter(|ext| !is_zero(ext));
        let cov = match (external, sim_cov_is_zero) {
            (None, true) => None,
            (Some(ext), true) => Some(Cow::Borrowed(ext)),
            (None, false) => Some(Cow::Owned(estimate.covariance)),
            (Some(ext), false) => Some(Cow::Owned(ext + &estimate.covariance)),
        };

        gaussian_loglikelihood(key, &diff, cov.as_deref(), &self.config)
    }
}

fn is_zero(matrix: &Array2<f64>) -> bool {
    matrix.iter().all(|&x| x == 0.0)
}
