use crate::error::FlagError;
use moka::sync::Cache;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// What a cached version code belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VersionKey {
    /// The calling application's own package.
    OwnPackage,
    /// The package backing a named module.
    Module(Arc<str>),
}

impl fmt::Display for VersionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OwnPackage => f.write_str("own package"),
            Self::Module(name) => write!(f, "module {name}"),
        }
    }
}

/// Resolved package version codes, populated on first use.
///
/// Concurrent first-time requests for one key are coalesced into a single resolution; later
/// requests are served from memory until [`VersionCache::clear`]. Failed resolutions are not
/// stored, so a package installed later is picked up on the next request.
///
/// The cache has no size bound and never evicts: keys are limited to the caller's own package
/// and the modules named by the policy.
#[derive(Debug, Clone)]
pub struct VersionCache {
    entries: Cache<VersionKey, i64>,
}

impl Default for VersionCache {
    fn default() -> Self {
        Self::new()
    }
}

impl VersionCache {
    #[must_use]
    pub fn new() -> Self {
        Self { entries: Cache::builder().build() }
    }

    /// Returns the cached version for `key`, running `resolve` only on a miss.
    ///
    /// # Errors
    /// Returns the error produced by `resolve`. Every caller that was waiting on the same
    /// in-flight resolution receives the same shared error.
    pub fn get_or_resolve(
        &self,
        key: VersionKey,
        resolve: impl FnOnce() -> Result<i64, FlagError>,
    ) -> Result<i64, Arc<FlagError>> {
        let mut resolved = false;
        let result = self.entries.try_get_with(key.clone(), || {
            resolved = true;
            resolve()
        });

        if !resolved {
            trace!(%key, "Version cache hit");
        }
        result
    }

    #[must_use]
    pub fn get(&self, key: &VersionKey) -> Option<i64> {
        self.entries.get(key)
    }

    #[must_use]
    pub fn contains(&self, key: &VersionKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Forgets every cached version.
    pub fn clear(&self) {
        self.entries.invalidate_all();
    }
}
