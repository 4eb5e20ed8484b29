use crate::error::{ProfileError, ProfileErrorExt};
use devcfg_flags::config::{ConfigLoader, ConfigSnapshot, PROFILE_ENV_PREFIX};
use fxhash::FxHashSet;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Description of a simulated device.
///
/// ```toml
/// package_name = "com.example.app"
///
/// [flags.connectivity]
/// experiment_flag = "28"
///
/// [[packages]]
/// name = "com.example.app"
/// version = 290000000
///
/// [[packages]]
/// name = "com.prefix.android.tethering"
/// version = 290000000
/// apex = true
///
/// [[activities]]
/// action = "com.android.server.connectivity.intent.action.SERVICE_CONNECTIVITY_RESOURCES_APK"
/// package_name = "com.prefix.android.connectivity.resources"
/// source_dir = "/apex/com.android.tethering/priv-app/ServiceConnectivityResources"
///
/// [[resources]]
/// id = 0x7f050001
/// boolean = true
/// ```
///
/// Flag namespaces and keys cannot contain `.`, which the config layer treats as a path
/// separator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DeviceProfile {
    pub package_name: String,
    pub flags: BTreeMap<String, BTreeMap<String, String>>,
    pub packages: Vec<PackageEntry>,
    pub activities: Vec<ActivityEntry>,
    pub resources: Vec<ResourceEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PackageEntry {
    pub name: String,
    pub version: i64,
    /// APEX packages are only visible to lookups that pass `MatchFlags::APEX`.
    #[serde(default)]
    pub apex: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ActivityEntry {
    pub action: String,
    pub package_name: String,
    pub source_dir: PathBuf,
    /// Installed on the system image.
    #[serde(default = "default_system")]
    pub system: bool,
}

/// A resource value; exactly one of `boolean` and `integer` must be set.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResourceEntry {
    pub id: u32,
    #[serde(default)]
    pub boolean: Option<bool>,
    #[serde(default)]
    pub integer: Option<i32>,
}

const fn default_system() -> bool {
    true
}

impl DeviceProfile {
    /// Loads a profile file (when given) with `DEVCFG__` environment overrides and validates it.
    ///
    /// # Errors
    /// Returns [`ProfileError::Config`] if the sources cannot be read or deserialized and
    /// [`ProfileError::InvalidProfile`] if validation fails.
    pub fn load(path: Option<impl AsRef<Path>>) -> Result<Self, ProfileError> {
        let loader = ConfigLoader::new(PROFILE_ENV_PREFIX);
        match path {
            Some(path) => Self::from_loader(loader.file(path)),
            None => Self::from_loader(loader),
        }
    }

    /// Loads and validates a profile from a prepared [`ConfigLoader`].
    ///
    /// # Errors
    /// See [`DeviceProfile::load`].
    pub fn from_loader(loader: ConfigLoader) -> Result<Self, ProfileError> {
        Self::from_snapshot(&loader.build().context("Reading device profile")?)
    }

    /// Deserializes and validates a profile from values that were already read, leaving any
    /// other tables in the snapshot to other readers.
    ///
    /// # Errors
    /// See [`DeviceProfile::load`].
    pub fn from_snapshot(snapshot: &ConfigSnapshot) -> Result<Self, ProfileError> {
        let profile = snapshot.deserialize::<Self>().context("Loading device profile")?;
        profile.validate()?;
        Ok(profile)
    }

    /// # Errors
    /// Returns [`ProfileError::InvalidProfile`] for duplicate packages or resource ids and for
    /// resources that carry no value or both values.
    pub fn validate(&self) -> Result<(), ProfileError> {
        let mut names = FxHashSet::default();
        if let Some(dup) = self.packages.iter().find(|p| !names.insert(p.name.as_str())) {
            return Err(invalid(format!("duplicate package '{}'", dup.name)));
        }

        let mut ids = FxHashSet::default();
        for resource in &self.resources {
            if !ids.insert(resource.id) {
                return Err(invalid(format!("duplicate resource {:#010x}", resource.id)));
            }
            match (resource.boolean, resource.integer) {
                (Some(_), None) | (None, Some(_)) => {},
                (None, None) => {
                    return Err(invalid(format!("resource {:#010x} has no value", resource.id)));
                },
                (Some(_), Some(_)) => {
                    return Err(invalid(format!(
                        "resource {:#010x} sets both boolean and integer",
                        resource.id
                    )));
                },
            }
        }

        Ok(())
    }
}

fn invalid(message: String) -> ProfileError {
    ProfileError::InvalidProfile { message: message.into(), context: None }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(id: u32, boolean: Option<bool>, integer: Option<i32>) -> ResourceEntry {
        ResourceEntry { id, boolean, integer }
    }

    #[test]
    fn empty_profile_is_valid() {
        assert!(DeviceProfile::default().validate().is_ok());
    }

    #[test]
    fn rejects_duplicates_and_ambiguous_resources() {
        let package = PackageEntry { name: "com.example.app".to_owned(), version: 1, apex: false };
        let profile =
            DeviceProfile { packages: vec![package.clone(), package], ..DeviceProfile::default() };
        assert!(matches!(profile.validate(), Err(ProfileError::InvalidProfile { .. })));

        for resources in [
            vec![resource(1, None, None)],
            vec![resource(1, Some(true), Some(1))],
            vec![resource(1, Some(true), None), resource(1, None, Some(2))],
        ] {
            let profile = DeviceProfile { resources, ..DeviceProfile::default() };
            assert!(matches!(profile.validate(), Err(ProfileError::InvalidProfile { .. })));
        }
    }
}
