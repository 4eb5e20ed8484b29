use crate::cache::VersionCache;
use crate::error::FlagError;
use crate::policy::ModulePolicy;
use crate::resolver::{FlagResolver, ResolverInner};
use crate::store::ConfigStore;
use private::Sealed;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Default)]
pub struct NoStore;
pub struct WithStore(Arc<dyn ConfigStore>);

impl fmt::Debug for WithStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WithStore(..)")
    }
}

mod private {
    pub(super) trait Sealed {}
}
impl Sealed for NoStore {}
impl Sealed for WithStore {}

/// Fluent builder for [`FlagResolver`]. A [`ConfigStore`] is mandatory; the module policy
/// defaults to tethering.
#[allow(private_bounds)]
#[derive(Debug, Default)]
pub struct FlagResolverBuilder<S: Sealed = NoStore> {
    state: S,
    policy: ModulePolicy,
}

#[allow(private_bounds)]
impl<S: Sealed> FlagResolverBuilder<S> {
    /// Replaces the default (tethering) module policy.
    #[must_use = "Sets the module policy used for module feature gates"]
    pub fn policy(mut self, policy: ModulePolicy) -> Self {
        self.policy = policy;
        self
    }
}

impl FlagResolverBuilder<NoStore> {
    #[must_use = "Creates a new resolver builder with default configuration"]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "Sets the config store that holds the flag values"]
    pub fn store(self, store: impl ConfigStore + 'static) -> FlagResolverBuilder<WithStore> {
        self.shared_store(Arc::new(store))
    }

    #[must_use = "Sets the config store that holds the flag values"]
    pub fn shared_store(self, store: Arc<dyn ConfigStore>) -> FlagResolverBuilder<WithStore> {
        FlagResolverBuilder { state: WithStore(store), policy: self.policy }
    }
}

impl FlagResolverBuilder<WithStore> {
    /// Validates the configuration and returns a ready resolver with an empty version cache.
    ///
    /// # Errors
    /// Returns [`FlagError::InvalidPolicy`] if the module policy fails validation.
    pub fn build(self) -> Result<FlagResolver, FlagError> {
        self.policy.validate()?;

        debug!(modules = self.policy.modules.len(), "Flag resolver ready");

        Ok(FlagResolver {
            inner: Arc::new(ResolverInner {
                store: self.state.0,
                policy: self.policy,
                versions: VersionCache::new(),
            }),
        })
    }
}
