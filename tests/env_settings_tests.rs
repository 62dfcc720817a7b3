use imcore::prelude::*;

/// Environment variables override nested keys, including names with underscores
#[test]
fn test_environment_overrides() -> eyre::Result<()> {
    std::env::set_var("IMCORE_LIKELIHOOD__KIND", "simple");
    std::env::set_var("IMCORE_LIKELIHOOD__SINGULAR_TOLERANCE", "1e-8");

    let settings = read_settings("src/tests/partial.toml")?;
    assert_eq!(settings.likelihood.kind, LikelihoodKind::Simple);
    assert_eq!(settings.likelihood.singular_tolerance, 1e-8);
    assert_eq!(settings.log.file.as_deref(), Some("imcore.log"));

    std::env::remove_var("IMCORE_LIKELIHOOD__KIND");
    std::env::remove_var("IMCORE_LIKELIHOOD__SINGULAR_TOLERANCE");
    Ok(())
}
