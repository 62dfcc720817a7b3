//! Building blocks to compare ensembles of simulated observables against measured data.
//!
//! Measured, simulated and covariance data are organized in keyed stores
//! ([structs::observable_dict]), which are consumed by the likelihood evaluators in
//! [routines::likelihood]. The ensemble evaluator regularizes the covariance of small
//! simulation ensembles with the Oracle Approximating Shrinkage estimator found in
//! [routines::estimation::oas].
//!
//! ```
//! use imcore::prelude::*;
//!
//! let key = ObservableKey::quad("test", "nan", "3", "nan");
//!
//! let mut measurements = Measurements::new();
//! measurements.append(key.clone(), Observable::from_rows(&[vec![1.0, 2.0, 3.0]])?, false)?;
//!
//! let mut simulations = Simulations::new();
//! simulations.append(key, Observable::from_rows(&[vec![1.0, 2.0, 4.0]])?)?;
//!
//! let likelihood = SimpleLikelihood::new(measurements, None)?;
//! assert_eq!(likelihood.evaluate(&simulations)?, -0.5);
//! # Ok::<(), LikelihoodError>(())
//! ```

pub mod error;
pub mod routines {
    pub mod estimation;
    pub mod likelihood;
    pub mod linalg;
    pub mod logger;
    pub mod settings;
}
pub mod structs {
    pub mod key;
    pub mod observable;
    pub mod observable_dict;
}

pub mod prelude {
    pub use crate::error::{LikelihoodError, LikelihoodResult};
    pub use crate::routines::estimation::oas::{oas_mcov, OracleApproximatingShrinkage};
    pub use crate::routines::estimation::{
        sample_covariance, CovarianceEstimator, SampleCovariance, ShrunkCovariance,
    };
    pub use crate::routines::likelihood::{
        build_likelihood, EnsembleLikelihood, EvaluatorConfig, Likelihood, LikelihoodKind,
        SimpleLikelihood,
    };
    pub use crate::routines::logger::setup_log;
    pub use crate::routines::settings::{read_settings, write_settings_to_file, Settings};
    pub use crate::structs::key::ObservableKey;
    pub use crate::structs::observable::Observable;
    pub use crate::structs::observable_dict::{
        AppendMode, Covariances, Measurements, ObservableDict, Simulations,
    };
}

//Tests
#[cfg(test)]
mod tests;
