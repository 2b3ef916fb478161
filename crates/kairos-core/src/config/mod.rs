use anyhow::Result;
use config::Config;
use serde::Deserialize;

use crate::error::{CoreError, CoreResult};

/// Default fuse for consecutive invalid passes while searching for one occurrence.
pub const DEFAULT_MAX_INVALID_PASSES: u32 = 50;

/// Default cap on eagerly collected occurrences of an infinite rule set.
pub const DEFAULT_MAX_OCCURRENCES: usize = 1000;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub expansion: ExpansionConfig,
}

/// Limits applied while expanding recurrence rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExpansionConfig {
    /// Consecutive invalid rule passes tolerated before iteration fails.
    pub max_invalid_passes: u32,
    /// Upper bound for eager collection of rule sets with no end and no count.
    pub max_occurrences: usize,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            max_invalid_passes: DEFAULT_MAX_INVALID_PASSES,
            max_occurrences: DEFAULT_MAX_OCCURRENCES,
        }
    }
}

impl ExpansionConfig {
    /// ## Summary
    /// Checks that every limit is usable.
    ///
    /// ## Errors
    /// Returns `CoreError::InvalidConfiguration` if a limit is zero.
    pub fn validate(&self) -> CoreResult<()> {
        if self.max_invalid_passes == 0 {
            return Err(CoreError::InvalidConfiguration {
                field: "expansion.max_invalid_passes",
                reason: "must be greater than zero",
            });
        }
        if self.max_occurrences == 0 {
            return Err(CoreError::InvalidConfiguration {
                field: "expansion.max_occurrences",
                reason: "must be greater than zero",
            });
        }
        Ok(())
    }
}

impl Settings {
    /// ## Summary
    /// Loads configuration from environment variables and an optional `kairos.toml`.
    /// Environment variables take precedence over file values.
    ///
    /// ## Errors
    /// Returns an error if building, deserializing or validating the configuration fails.
    pub fn load() -> Result<Self> {
        let settings = Config::builder()
            .set_default(
                "expansion.max_invalid_passes",
                i64::from(DEFAULT_MAX_INVALID_PASSES),
            )?
            .set_default(
                "expansion.max_occurrences",
                u64::try_from(DEFAULT_MAX_OCCURRENCES)?,
            )?
            // TOML file
            .add_source(config::File::with_name("kairos.toml").required(false))
            // Env, e.g. KAIROS_EXPANSION__MAX_OCCURRENCES
            .add_source(
                config::Environment::with_prefix("KAIROS")
                    .prefix_separator("_")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Settings>()?;

        settings.expansion.validate()?;
        tracing::debug!(settings = ?settings, "Configuration loaded");

        Ok(settings)
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    Settings::load()
}

#[cfg(test)]
mod tests;
