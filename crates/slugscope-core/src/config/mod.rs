use anyhow::Result;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder};
use serde::Deserialize;

use crate::constants::DEFAULT_MAX_ATTEMPTS;
use crate::error::{CoreError, CoreResult};

const ENV_PREFIX: &str = "SLUGSCOPE";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub resolver: ResolverConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub fixture: FixtureConfig,
}

/// Settings for the URL-key resolver.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Suffix appended to every path when no per-scope override applies.
    #[serde(default)]
    pub default_suffix: Option<String>,
    /// Config key holding a per-scope suffix override.
    #[serde(default)]
    pub suffix_config_path: Option<String>,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Return an error instead of the last candidate once attempts run out.
    #[serde(default)]
    pub fail_on_exhaustion: bool,
}

const fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            default_suffix: None,
            suffix_config_path: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            fail_on_exhaustion: false,
        }
    }
}

impl ResolverConfig {
    /// ## Summary
    /// Checks values that deserialize fine but cannot drive a resolver.
    ///
    /// ## Errors
    /// Returns `CoreError::ConfigError` if `max_attempts` is zero or the
    /// suffix config path is blank.
    pub fn validate(&self) -> CoreResult<()> {
        if self.max_attempts == 0 {
            return Err(CoreError::ConfigError(
                "resolver.max_attempts must be at least 1".to_string(),
            ));
        }

        if self
            .suffix_config_path
            .as_deref()
            .is_some_and(|path| path.trim().is_empty())
        {
            return Err(CoreError::ConfigError(
                "resolver.suffix_config_path must not be blank".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FixtureConfig {
    /// JSON file describing stores, existing paths and requests.
    pub path: Option<String>,
}

impl Settings {
    fn builder() -> Result<ConfigBuilder<DefaultState>> {
        Ok(Config::builder()
            .set_default("logging.level", "info")?
            .set_default("resolver.max_attempts", i64::from(DEFAULT_MAX_ATTEMPTS))?
            .set_default("resolver.fail_on_exhaustion", false)?)
    }

    /// ## Summary
    /// Loads configuration from `.env` file and environment variables into a `Settings`.
    /// Environment variables take precedence over `config.toml` values.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> Result<Self> {
        let settings = Self::builder()?
            // TOML file
            .add_source(config::File::with_name("config.toml").required(false))
            // Env, e.g. SLUGSCOPE_RESOLVER__DEFAULT_SUFFIX
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Settings>()?;

        settings.resolver.validate()?;
        Ok(settings)
    }

    /// ## Summary
    /// Builds `Settings` from an inline TOML document layered over the defaults.
    ///
    /// ## Errors
    /// Returns an error if the document does not parse or fails validation.
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let settings = Self::builder()?
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize::<Settings>()?;

        settings.resolver.validate()?;
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
