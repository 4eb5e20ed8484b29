use devcfg_flags::FlagError;
use devcfg_flags::config::{ConfigLoader, ConfigSnapshot, PROFILE_ENV_PREFIX};
use devcfg_logger::LogSettings;
use serde::Deserialize;
use std::path::Path;

/// Binary-only settings read from the profile file, next to the device description.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct CliSettings {
    pub(crate) log: LogSettings,
}

impl CliSettings {
    pub(crate) fn from_snapshot(profile: &ConfigSnapshot) -> Result<Self, FlagError> {
        profile.deserialize()
    }
}

/// Reads the profile file and the `DEVCFG__` environment once, for both the settings and the
/// device.
pub(crate) fn read_profile(path: Option<&Path>) -> Result<ConfigSnapshot, FlagError> {
    let loader = ConfigLoader::new(PROFILE_ENV_PREFIX);
    match path {
        Some(path) => loader.file(path).build(),
        None => loader.build(),
    }
}
