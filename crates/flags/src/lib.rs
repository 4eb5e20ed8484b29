//! Device flag resolver.
//!
//! Reads remotely configurable flags from a namespaced config store, falls back to resource
//! bundle values, and gates features on installed package versions. Platform services are
//! reached through narrow traits ([`ConfigStore`], [`PackageManager`], [`Resources`],
//! [`AppContext`]) so any backend, or a test fake, can be plugged in.
//!
//! # Core Features
//!
//! - **Typed reads**: integers (optionally bounded), booleans and raw strings, each with a
//!   caller-supplied default that absorbs every failure.
//! - **Version gates**: a flag holds the minimum version code of the caller's package or of a
//!   module package; absent or zero flags defer to a default, unresolvable packages fail closed.
//! - **Version cache**: each package version is resolved once per resolver, even under
//!   concurrent first use, until [`FlagResolver::clear_version_cache`].
//! - **Module policy**: how a module maps to its companion resources package and to the module
//!   package (including reduced-build variants) is data, not code ([`ModulePolicy`]).
//!
//! # Examples
//!
//! ```rust
//! use devcfg_flags::{FlagResolver, FlagError, MemoryConfigStore};
//!
//! # fn main() -> Result<(), FlagError> {
//! let store = MemoryConfigStore::new();
//! store.set("connectivity", "retry_count", "5");
//! store.set("connectivity", "probe_enabled", "TRUE");
//!
//! let flags = FlagResolver::builder().store(store.clone()).build()?;
//!
//! assert_eq!(flags.int_in_range("connectivity", "retry_count", 0..=3, 3), 3);
//! assert_eq!(flags.int("connectivity", "retry_count", 0), 5);
//! assert!(flags.boolean("connectivity", "probe_enabled", false));
//! assert!(!flags.boolean("connectivity", "missing", false));
//! # Ok(())
//! # }
//! ```

mod builder;
mod cache;
pub mod config;
mod error;
mod module;
mod platform;
mod policy;
mod resolver;
pub mod resources;
mod store;

pub use builder::{FlagResolverBuilder, NoStore, WithStore};
pub use cache::{VersionCache, VersionKey};
pub use error::{FlagError, FlagErrorExt};
pub use module::module_version;
pub use platform::{
    AppContext, MatchFlags, PackageInfo, PackageManager, ResolveInfo, ResourceId, Resources,
};
pub use policy::{
    ModulePolicy, ModuleRule, RESOURCES_APK_ACTION, RESOURCES_PACKAGE_SUFFIX, TETHERING_MODULE,
};
pub use resolver::{FeatureTarget, FlagResolver};
pub use store::{ConfigStore, MemoryConfigStore};
