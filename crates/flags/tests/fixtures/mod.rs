use devcfg_flags::{
    AppContext, FlagError, FlagResolver, MatchFlags, MemoryConfigStore, PackageInfo,
    PackageManager, ResolveInfo, ResourceId, Resources,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const NAMESPACE: &str = "connectivity";
pub const FEATURE: &str = "experiment_flag";

pub const OWN_PACKAGE: &str = "test.package.name";
pub const OWN_VERSION: i64 = 290_000_000;
pub const TETHERING_PACKAGE: &str = "com.prefix.android.tethering";
pub const GO_TETHERING_PACKAGE: &str = "com.prefix.android.go.tethering";
pub const MODULE_VERSION: i64 = 290_000_000;
pub const RESOURCES_PACKAGE: &str = "com.prefix.android.connectivity.resources";
pub const RESOURCES_SOURCE_DIR: &str =
    "/apex/com.android.tethering/priv-app/ServiceConnectivityResources@version";

/// In-memory package manager that counts every call it receives.
#[derive(Debug, Default)]
pub struct FakePackageManager {
    packages: RwLock<HashMap<String, i64>>,
    activities: RwLock<Vec<ResolveInfo>>,
    info_calls: AtomicUsize,
    query_calls: AtomicUsize,
}

impl FakePackageManager {
    pub fn install(&self, package_name: &str, version: i64) {
        self.packages.write().insert(package_name.to_owned(), version);
    }

    pub fn uninstall(&self, package_name: &str) {
        self.packages.write().remove(package_name);
    }

    pub fn add_activity(&self, package_name: &str, source_dir: &str) {
        self.activities.write().push(ResolveInfo {
            package_name: package_name.to_owned(),
            source_dir: PathBuf::from(source_dir),
        });
    }

    pub fn info_calls(&self) -> usize {
        self.info_calls.load(Ordering::SeqCst)
    }

    pub fn query_calls(&self) -> usize {
        self.query_calls.load(Ordering::SeqCst)
    }
}

impl PackageManager for FakePackageManager {
    fn package_info(&self, package_name: &str, _: MatchFlags) -> Result<PackageInfo, FlagError> {
        self.info_calls.fetch_add(1, Ordering::SeqCst);
        self.packages
            .read()
            .get(package_name)
            .map(|&version| PackageInfo {
                package_name: package_name.to_owned(),
                long_version_code: version,
            })
            .ok_or_else(|| FlagError::package_not_found(package_name.to_owned()))
    }

    fn query_intent_activities(&self, _: &str, _: MatchFlags) -> Vec<ResolveInfo> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        self.activities.read().clone()
    }
}

#[derive(Debug, Default)]
pub struct FakeResources {
    pub booleans: HashMap<ResourceId, bool>,
    pub integers: HashMap<ResourceId, i32>,
}

impl Resources for FakeResources {
    fn boolean(&self, id: ResourceId) -> Result<bool, FlagError> {
        self.booleans.get(&id).copied().ok_or_else(|| FlagError::resource_not_found(id))
    }

    fn integer(&self, id: ResourceId) -> Result<i32, FlagError> {
        self.integers.get(&id).copied().ok_or_else(|| FlagError::resource_not_found(id))
    }
}

/// Application context that records how often its package manager and name are read.
#[derive(Debug, Default)]
pub struct FakeContext {
    pub package_name: String,
    pub packages: FakePackageManager,
    pub resources: FakeResources,
    package_manager_reads: AtomicUsize,
    package_name_reads: AtomicUsize,
}

impl FakeContext {
    pub fn new(package_name: &str) -> Self {
        Self { package_name: package_name.to_owned(), ..Self::default() }
    }

    pub fn package_manager_reads(&self) -> usize {
        self.package_manager_reads.load(Ordering::SeqCst)
    }

    pub fn package_name_reads(&self) -> usize {
        self.package_name_reads.load(Ordering::SeqCst)
    }
}

impl AppContext for FakeContext {
    fn package_name(&self) -> &str {
        self.package_name_reads.fetch_add(1, Ordering::SeqCst);
        &self.package_name
    }

    fn package_manager(&self) -> &dyn PackageManager {
        self.package_manager_reads.fetch_add(1, Ordering::SeqCst);
        &self.packages
    }

    fn resources(&self) -> &dyn Resources {
        &self.resources
    }
}

/// A device with the caller's package and the tethering module installed, and the
/// connectivity resources package mounted in the tethering APEX.
#[must_use]
pub fn setup_device() -> FakeContext {
    let ctx = FakeContext::new(OWN_PACKAGE);
    ctx.packages.install(OWN_PACKAGE, OWN_VERSION);
    ctx.packages.install(TETHERING_PACKAGE, MODULE_VERSION);
    ctx.packages.add_activity(RESOURCES_PACKAGE, RESOURCES_SOURCE_DIR);
    ctx
}

/// A resolver over a fresh store; the returned store handle shares its values.
/// # Panics
/// * If the default policy fails validation.
#[must_use]
pub fn setup_flags() -> (FlagResolver, MemoryConfigStore) {
    let store = MemoryConfigStore::new();
    let flags = FlagResolver::builder().store(store.clone()).build().expect("Resolver setup failed");
    (flags, store)
}
