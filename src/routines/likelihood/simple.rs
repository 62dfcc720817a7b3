use super::{
    gaussian_loglikelihood, residual, validate_inputs, EvaluatorConfig, Likelihood,
};
use crate::error::LikelihoodResult;
use crate::structs::key::ObservableKey;
use crate::structs::observable::Observable;
use crate::structs::observable_dict::{Covariances, Measurements};

/// Gaussian likelihood of the simulated ensemble mean
///
/// For each measured key the residual `d = s̄ - m` between the ensemble mean and the
/// measurement is scored with the external covariance of that key when there is one,
/// otherwise as `-0.5 dᵗd`. The spread of the ensemble is ignored.
#[derive(Debug, Clone)]
pub struct SimpleLikelihood {
    measurements: Measurements,
    covariances: Option<Covariances>,
    config: EvaluatorConfig,
}

impl SimpleLikelihood {
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
            "Simple likelihood over {} observables, {} covariances",
            measurements.len(),
            covariances.as_ref().map_or(0, |c| c.len())
        );
        Ok(SimpleLikelihood {
            measurements,
            covariances,
            config,
        })
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }
}

impl Likelihood for SimpleLikelihood {
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
        let diff = residual(&simulated.ensemble_mean(), measured);
        let cov = self.covariances.as_ref().and_then(|c| c.lookup(key));
        gaussian_loglikelihood(key, &diff, cov, &self.config)
    }
}
