use crate::builder::{FlagResolverBuilder, NoStore};
use crate::cache::{VersionCache, VersionKey};
use crate::error::FlagError;
use crate::module::module_version;
use crate::platform::{AppContext, MatchFlags};
use crate::policy::ModulePolicy;
use crate::store::ConfigStore;
use std::fmt;
use std::ops::RangeInclusive;
use std::sync::Arc;
use tracing::{instrument, trace, warn};

/// Which package a feature gate compares against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureTarget<'a> {
    /// The calling application's own package.
    OwnPackage,
    /// The package backing the named module.
    Module(&'a str),
}

/// Reads typed flags from a [`ConfigStore`] and evaluates version feature gates.
///
/// Every read collapses failures (absent value, parse failure, out-of-range value, missing
/// package) into the caller's default. Package versions are cached per resolver; clones
/// share the cache.
///
/// A resolver serves a single application context. The own-package version is cached without
/// the context's package name, so a second context with a different package sees the first
/// one's version until [`FlagResolver::clear_version_cache`].
#[derive(Clone)]
pub struct FlagResolver {
    pub(crate) inner: Arc<ResolverInner>,
}

pub(crate) struct ResolverInner {
    pub(crate) store: Arc<dyn ConfigStore>,
    pub(crate) policy: ModulePolicy,
    pub(crate) versions: VersionCache,
}

impl fmt::Debug for FlagResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlagResolver")
            .field("policy", &self.inner.policy)
            .field("versions", &self.inner.versions)
            .finish_non_exhaustive()
    }
}

impl FlagResolver {
    #[must_use]
    pub fn builder() -> FlagResolverBuilder<NoStore> {
        FlagResolverBuilder::new()
    }

    /// Raw value of `namespace/key`.
    #[must_use]
    pub fn property(&self, namespace: &str, key: &str) -> Option<String> {
        self.inner.store.property(namespace, key)
    }

    #[must_use]
    pub fn property_or(&self, namespace: &str, key: &str, default: &str) -> String {
        self.property(namespace, key).unwrap_or_else(|| default.to_owned())
    }

    /// Integer value of `namespace/key`, or `default` if absent or not an `i32`.
    #[must_use]
    pub fn int(&self, namespace: &str, key: &str, default: i32) -> i32 {
        self.parse_int(namespace, key).unwrap_or(default)
    }

    /// Like [`FlagResolver::int`], but values outside `bounds` (inclusive) also yield `default`.
    #[must_use]
    pub fn int_in_range(
        &self,
        namespace: &str,
        key: &str,
        bounds: RangeInclusive<i32>,
        default: i32,
    ) -> i32 {
        match self.parse_int(namespace, key) {
            Some(value) if bounds.contains(&value) => value,
            Some(value) => {
                trace!(namespace, key, value, ?bounds, "Flag value out of range");
                default
            },
            None => default,
        }
    }

    /// Boolean value of `namespace/key`. Only `true` (any case) is truthy; an absent value
    /// yields `default`.
    #[must_use]
    pub fn boolean(&self, namespace: &str, key: &str, default: bool) -> bool {
        self.property(namespace, key).map_or(default, |raw| raw.eq_ignore_ascii_case("true"))
    }

    /// Evaluates a minimum-version feature gate.
    ///
    /// The flag holds the minimum version code of `target`. A missing or zero flag returns
    /// `default_enabled`; otherwise the feature is enabled when the installed version is at
    /// least the flag value. If the target's version cannot be resolved the feature is off,
    /// whatever the flag and default say.
    ///
    /// `ctx` must be the same application context on every call to this resolver.
    pub fn feature_enabled(
        &self,
        ctx: &dyn AppContext,
        namespace: &str,
        key: &str,
        target: FeatureTarget<'_>,
        default_enabled: bool,
    ) -> bool {
        let version = match self.package_version(ctx, target) {
            Ok(version) => version,
            Err(err) => {
                warn!(namespace, key, ?target, error = %err, "Feature disabled, version lookup failed");
                return false;
            },
        };

        match self.int(namespace, key, 0) {
            0 => default_enabled,
            min_version => version >= i64::from(min_version),
        }
    }

    /// Feature gate against the caller's own package, disabled by default.
    pub fn is_feature_enabled(&self, ctx: &dyn AppContext, namespace: &str, key: &str) -> bool {
        self.feature_enabled(ctx, namespace, key, FeatureTarget::OwnPackage, false)
    }

    /// Feature gate against the package backing `module`.
    pub fn is_module_feature_enabled(
        &self,
        ctx: &dyn AppContext,
        namespace: &str,
        key: &str,
        module: &str,
        default_enabled: bool,
    ) -> bool {
        self.feature_enabled(ctx, namespace, key, FeatureTarget::Module(module), default_enabled)
    }

    /// Drops every cached package version.
    pub fn clear_version_cache(&self) {
        self.inner.versions.clear();
    }

    #[must_use]
    pub fn version_cache(&self) -> &VersionCache {
        &self.inner.versions
    }

    #[must_use]
    pub fn policy(&self) -> &ModulePolicy {
        &self.inner.policy
    }

    fn parse_int(&self, namespace: &str, key: &str) -> Option<i32> {
        let raw = self.property(namespace, key)?;
        raw.parse::<i32>()
            .inspect_err(|_| trace!(namespace, key, %raw, "Flag value is not an integer"))
            .ok()
    }

    #[instrument(level = "debug", skip(self, ctx))]
    fn package_version(
        &self,
        ctx: &dyn AppContext,
        target: FeatureTarget<'_>,
    ) -> Result<i64, Arc<FlagError>> {
        match target {
            FeatureTarget::OwnPackage => {
                self.inner.versions.get_or_resolve(VersionKey::OwnPackage, || {
                    let packages = ctx.package_manager();
                    let name = ctx.package_name();
                    packages.package_info(name, MatchFlags::empty()).map(|p| p.long_version_code)
                })
            },
            FeatureTarget::Module(module) => {
                self.inner.versions.get_or_resolve(VersionKey::Module(Arc::from(module)), || {
                    module_version(ctx.package_manager(), &self.inner.policy, module)
                })
            },
        }
    }
}
