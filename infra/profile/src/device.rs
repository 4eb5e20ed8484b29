use crate::error::ProfileError;
use crate::model::{ActivityEntry, DeviceProfile};
use devcfg_flags::{
    AppContext, ConfigStore, FlagError, MatchFlags, MemoryConfigStore, PackageInfo,
    PackageManager, ResolveInfo, ResourceId, Resources,
};
use fxhash::FxHashMap;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Copy)]
struct InstalledPackage {
    version: i64,
    apex: bool,
}

/// A simulated device built from a [`DeviceProfile`].
///
/// Serves as the application context, package manager, resource bundle and config store at
/// once.
#[derive(Debug, Clone)]
pub struct Device {
    package_name: String,
    store: MemoryConfigStore,
    packages: FxHashMap<String, InstalledPackage>,
    activities: Vec<ActivityEntry>,
    booleans: FxHashMap<ResourceId, bool>,
    integers: FxHashMap<ResourceId, i32>,
}

impl Device {
    /// # Errors
    /// Returns [`ProfileError::InvalidProfile`] if the profile fails validation.
    pub fn from_profile(profile: DeviceProfile) -> Result<Self, ProfileError> {
        profile.validate()?;

        let store = MemoryConfigStore::new();
        for (namespace, keys) in profile.flags {
            for (key, value) in keys {
                store.set(namespace.as_str(), key, value);
            }
        }

        let packages = profile
            .packages
            .into_iter()
            .map(|p| (p.name, InstalledPackage { version: p.version, apex: p.apex }))
            .collect::<FxHashMap<_, _>>();

        let mut booleans = FxHashMap::default();
        let mut integers = FxHashMap::default();
        for resource in profile.resources {
            let id = ResourceId(resource.id);
            if let Some(value) = resource.boolean {
                booleans.insert(id, value);
            }
            if let Some(value) = resource.integer {
                integers.insert(id, value);
            }
        }

        debug!(
            package = %profile.package_name,
            flags = store.len(),
            packages = packages.len(),
            activities = profile.activities.len(),
            "Device profile loaded"
        );

        Ok(Self {
            package_name: profile.package_name,
            store,
            packages,
            activities: profile.activities,
            booleans,
            integers,
        })
    }

    /// Loads a profile (see [`DeviceProfile::load`]) and builds the device from it.
    ///
    /// # Errors
    /// See [`DeviceProfile::load`].
    pub fn load(path: Option<impl AsRef<Path>>) -> Result<Self, ProfileError> {
        Self::from_profile(DeviceProfile::load(path)?)
    }

    /// Handle to the device's flag table. Clones share values with the device.
    #[must_use]
    pub fn store(&self) -> MemoryConfigStore {
        self.store.clone()
    }
}

impl ConfigStore for Device {
    fn property(&self, namespace: &str, key: &str) -> Option<String> {
        self.store.property(namespace, key)
    }
}

impl PackageManager for Device {
    fn package_info(&self, package_name: &str, flags: MatchFlags) -> Result<PackageInfo, FlagError> {
        self.packages
            .get(package_name)
            .filter(|p| !p.apex || flags.contains(MatchFlags::APEX))
            .map(|p| PackageInfo {
                package_name: package_name.to_owned(),
                long_version_code: p.version,
            })
            .ok_or_else(|| FlagError::package_not_found(package_name.to_owned()))
    }

    fn query_intent_activities(&self, action: &str, flags: MatchFlags) -> Vec<ResolveInfo> {
        let system_only = flags.contains(MatchFlags::SYSTEM_ONLY);
        self.activities
            .iter()
            .filter(|a| a.action == action && (a.system || !system_only))
            .map(|a| ResolveInfo {
                package_name: a.package_name.clone(),
                source_dir: a.source_dir.clone(),
            })
            .collect()
    }
}

impl Resources for Device {
    fn boolean(&self, id: ResourceId) -> Result<bool, FlagError> {
        self.booleans.get(&id).copied().ok_or_else(|| FlagError::resource_not_found(id))
    }

    fn integer(&self, id: ResourceId) -> Result<i32, FlagError> {
        self.integers.get(&id).copied().ok_or_else(|| FlagError::resource_not_found(id))
    }
}

impl AppContext for Device {
    fn package_name(&self) -> &str {
        &self.package_name
    }

    fn package_manager(&self) -> &dyn PackageManager {
        self
    }

    fn resources(&self) -> &dyn Resources {
        self
    }
}
