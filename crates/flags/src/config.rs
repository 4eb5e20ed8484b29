use crate::error::{FlagError, FlagErrorExt};
use config::{Config, Environment, File, Map};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment prefix of the device profile (`DEVCFG__FLAGS__CONNECTIVITY__...`).
pub const PROFILE_ENV_PREFIX: &str = "DEVCFG";
/// Environment prefix of the module policy (`DEVCFG_POLICY__APEX_ROOT`).
pub const POLICY_ENV_PREFIX: &str = "DEVCFG_POLICY";

/// Layered configuration loader: an optional file overlaid by prefixed environment variables.
///
/// Nested keys use a double underscore, so `DEVCFG__FLAGS__CONNECTIVITY__EXPERIMENT_FLAG=30`
/// maps to `flags.connectivity.experiment_flag`.
///
/// # Example
/// ```rust
/// use devcfg_flags::config::ConfigLoader;
/// use devcfg_flags::ModulePolicy;
///
/// let policy: ModulePolicy = ConfigLoader::new("DEVCFG_POLICY").load().unwrap();
/// assert!(policy.rule("com.android.tethering").is_some());
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    prefix: String,
    file: Option<PathBuf>,
    env: Option<Map<String, String>>,
}

impl ConfigLoader {
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into(), file: None, env: None }
    }

    /// Adds a required file source. The format follows the extension; without one, every
    /// supported extension is tried.
    #[must_use]
    pub fn file(mut self, path: impl AsRef<Path>) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Replaces the process environment with an explicit variable map.
    #[must_use]
    pub fn env_source(mut self, vars: Map<String, String>) -> Self {
        self.env = Some(vars);
        self
    }

    /// Reads every source once and merges them.
    ///
    /// # Errors
    /// Returns [`FlagError::Config`] if the file is missing or malformed.
    pub fn build(self) -> Result<ConfigSnapshot, FlagError> {
        let mut builder = Config::builder();

        if let Some(path) = &self.file {
            info!(path = %path.display(), "Loading configuration file");
            builder = builder.add_source(File::from(path.as_path()).required(true));
        }

        builder = builder
            .add_source(Environment::with_prefix(&self.prefix).separator("__").source(self.env));

        let config = builder.build().context("Failed to build config")?;
        Ok(ConfigSnapshot { config })
    }

    /// Builds the layered configuration and deserializes it into `T`.
    ///
    /// # Errors
    /// Returns [`FlagError::Config`] if the file is missing or malformed, or if the merged
    /// values do not match the shape of `T`.
    pub fn load<T: DeserializeOwned>(self) -> Result<T, FlagError> {
        self.build()?.deserialize()
    }
}

/// Merged configuration values, detached from their sources.
///
/// Several shapes can be read from one snapshot without touching the file or the environment
/// again.
#[derive(Debug, Clone)]
pub struct ConfigSnapshot {
    config: Config,
}

impl ConfigSnapshot {
    /// # Errors
    /// Returns [`FlagError::Config`] if the values do not match the shape of `T`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, FlagError> {
        self.config.clone().try_deserialize::<T>().context("Failed to deserialize config")
    }
}

/// Loads `T` from `path` (when given) with `prefix`-ed environment overrides.
///
/// # Errors
/// See [`ConfigLoader::load`].
pub fn load_config<T: DeserializeOwned>(
    path: Option<impl AsRef<Path>>,
    prefix: &str,
) -> Result<T, FlagError> {
    let loader = ConfigLoader::new(prefix);
    match path {
        Some(path) => loader.file(path).load(),
        None => loader.load(),
    }
}
