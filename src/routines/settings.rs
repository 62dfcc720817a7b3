use crate::error::LikelihoodResult;
use crate::routines::likelihood::{build_likelihood, EvaluatorConfig, Likelihood, LikelihoodKind};
use crate::structs::observable_dict::{Covariances, Measurements};
use config::Config as eConfig;
use eyre::{Result, WrapErr};
use serde_derive::{Deserialize, Serialize};

/// Settings read from a TOML configuration file
///
/// Every section is optional, see the default functions at the bottom of this module.
#[derive(Debug, Deserialize, Clone, Serialize, PartialEq, Default)]
pub struct Settings {
    #[serde(default)]
    pub likelihood: LikelihoodSettings,
    #[serde(default)]
    pub log: Log,
}

#[derive(Debug, Deserialize, Clone, Serialize, PartialEq)]
pub struct LikelihoodSettings {
    #[serde(default)]
    pub kind: LikelihoodKind,
    #[serde(default = "default_singular_tolerance")]
    pub singular_tolerance: f64,
}

impl Default for LikelihoodSettings {
    fn default() -> Self {
        LikelihoodSettings {
            kind: LikelihoodKind::default(),
            singular_tolerance: default_singular_tolerance(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Serialize, PartialEq)]
pub struct Log {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Optional path of a log file, written in addition to stdout
    pub file: Option<String>,
}

impl Default for Log {
    fn default() -> Self {
        Log {
            level: default_log_level(),
            file: None,
        }
    }
}

impl Settings {
    /// The immutable evaluator options described by these settings
    pub fn evaluator(&self) -> EvaluatorConfig {
        EvaluatorConfig {
            singular_tolerance: self.likelihood.singular_tolerance,
        }
    }

    /// Build the configured likelihood evaluator
    pub fn build_likelihood(
        &self,
        measurements: Measurements,
        covariances: Option<Covariances>,
    ) -> LikelihoodResult<Box<dyn Likelihood>> {
        build_likelihood(
            self.likelihood.kind,
            measurements,
            covariances,
            self.evaluator(),
        )
    }
}

/// Read settings from a TOML file
///
/// Values can be overridden through environment variables prefixed with `IMCORE_`, using `__`
/// between nested keys, e.g. `IMCORE_LIKELIHOOD__KIND=simple`.
pub fn read_settings(path: &str) -> Result<Settings> {
    let parsed = eConfig::builder()
        .add_source(config::File::with_name(path).format(config::FileFormat::Toml))
        .add_source(
            config::Environment::with_prefix("IMCORE")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()
        .wrap_err_with(|| format!("Failed to read settings from {}", path))?;

    let settings: Settings = parsed.try_deserialize()?;
    settings
        .evaluator()
        .validate()
        .wrap_err("Invalid likelihood settings")?;

    Ok(settings)
}

/// Write the effective settings as pretty-printed JSON
pub fn write_settings_to_file(settings: &Settings, path: &str) -> Result<()> {
    let serialized = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, serialized)
        .wrap_err_with(|| format!("Could not write settings to {}", path))?;
    Ok(())
}

// *********************************
// Default values for deserializing
// *********************************
fn default_log_level() -> String {
    "info".to_string()
}

fn default_singular_tolerance() -> f64 {
    1e-12
}
