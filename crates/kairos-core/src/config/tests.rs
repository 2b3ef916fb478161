//! Tests for configuration module.

use super::*;

#[test_log::test]
fn test_default_limits() {
    let settings = Settings::default();

    assert_eq!(settings.expansion.max_invalid_passes, 50);
    assert_eq!(settings.expansion.max_occurrences, 1000);
    assert!(settings.expansion.validate().is_ok());
}

#[test]
fn test_zero_passes_rejected() {
    let expansion = ExpansionConfig {
        max_invalid_passes: 0,
        ..ExpansionConfig::default()
    };

    let err = expansion.validate().expect_err("zero passes must be rejected");
    assert!(matches!(
        err,
        CoreError::InvalidConfiguration {
            field: "expansion.max_invalid_passes",
            ..
        }
    ));
}

#[test]
fn test_zero_occurrences_rejected() {
    let expansion = ExpansionConfig {
        max_occurrences: 0,
        ..ExpansionConfig::default()
    };

    assert!(expansion.validate().is_err());
}

#[test_log::test]
fn test_load_uses_defaults_without_sources() {
    let settings = Settings::load().expect("defaults should deserialize");

    assert!(settings.expansion.max_invalid_passes > 0);
    assert!(settings.expansion.max_occurrences > 0);
}

#[test]
fn test_partial_source_keeps_defaults() {
    let settings: Settings = Config::builder()
        .add_source(config::File::from_str(
            "[expansion]\nmax_occurrences = 25\n",
            config::FileFormat::Toml,
        ))
        .build()
        .and_then(Config::try_deserialize)
        .expect("partial config should deserialize");

    assert_eq!(settings.expansion.max_occurrences, 25);
    assert_eq!(
        settings.expansion.max_invalid_passes,
        DEFAULT_MAX_INVALID_PASSES
    );
}

#[test]
fn test_error_display() {
    let err = CoreError::InvalidConfiguration {
        field: "expansion.max_occurrences",
        reason: "must be greater than zero",
    };

    assert_eq!(
        err.to_string(),
        "Invalid configuration: expansion.max_occurrences must be greater than zero"
    );
}
