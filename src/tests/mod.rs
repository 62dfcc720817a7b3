#[cfg(test)]
use crate::prelude::*;

#[test]
fn read_likelihood_settings() {
    let settings = read_settings("src/tests/config.toml").unwrap();
    assert_eq!(settings.likelihood.kind, LikelihoodKind::Simple);
    assert_eq!(settings.likelihood.singular_tolerance, 1e-10);
    assert_eq!(settings.evaluator().singular_tolerance, 1e-10);
}

#[test]
fn read_log_settings() {
    let settings = read_settings("src/tests/config.toml").unwrap();
    assert_eq!(settings.log.level, "debug");
    assert_eq!(settings.log.file, None);
}

#[test]
fn missing_sections_use_defaults() {
    let settings = read_settings("src/tests/partial.toml").unwrap();
    assert_eq!(settings.likelihood.kind, LikelihoodKind::Ensemble);
    assert_eq!(settings.likelihood.singular_tolerance, 1e-12);
    assert_eq!(settings.log.level, "info");
    assert_eq!(settings.log.file.as_deref(), Some("imcore.log"));
}

#[test]
fn missing_file_is_an_error() {
    assert!(read_settings("src/tests/does_not_exist.toml").is_err());
}

#[test]
fn configured_kind_builds_matching_evaluator() {
    let settings = read_settings("src/tests/config.toml").unwrap();
    let key = ObservableKey::quad("test", "nan", "2", "nan");

    let mut measurements = Measurements::new();
    measurements
        .append(
            key.clone(),
            Observable::from_rows(&[vec![1.0, 2.0]]).unwrap(),
            false,
        )
        .unwrap();
    let mut simulations = Simulations::new();
    simulations
        .append(
            key,
            Observable::from_rows(&[vec![1.0, 0.0], vec![1.0, 2.0]]).unwrap(),
        )
        .unwrap();

    // The simple evaluator ignores the ensemble spread: mean [1, 1], residual [0, -1]
    let likelihood = settings.build_likelihood(measurements, None).unwrap();
    assert_eq!(likelihood.evaluate(&simulations).unwrap(), -0.5);
}
