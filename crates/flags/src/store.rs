use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::sync::Arc;

/// Namespaced key/value store holding the raw flag strings.
///
/// Absence (`None`) is distinct from an empty value.
pub trait ConfigStore: Send + Sync {
    fn property(&self, namespace: &str, key: &str) -> Option<String>;
}

impl<T: ConfigStore + ?Sized> ConfigStore for Arc<T> {
    fn property(&self, namespace: &str, key: &str) -> Option<String> {
        (**self).property(namespace, key)
    }
}

type Namespaces = FxHashMap<String, FxHashMap<String, String>>;

/// Thread-safe in-memory [`ConfigStore`].
///
/// Clones share the same table, so a test (or a config watcher) can keep a handle and
/// change values while a resolver reads them.
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigStore {
    namespaces: Arc<RwLock<Namespaces>>,
}

impl MemoryConfigStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `namespace/key`, returning the previous value.
    pub fn set(
        &self,
        namespace: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Option<String> {
        self.namespaces
            .write()
            .entry(namespace.into())
            .or_default()
            .insert(key.into(), value.into())
    }

    /// Removes `namespace/key`, returning the previous value.
    pub fn remove(&self, namespace: &str, key: &str) -> Option<String> {
        let mut namespaces = self.namespaces.write();
        let keys = namespaces.get_mut(namespace)?;
        let previous = keys.remove(key);
        if keys.is_empty() {
            namespaces.remove(namespace);
        }
        previous
    }

    pub fn clear(&self) {
        self.namespaces.write().clear();
    }

    /// Number of stored properties across all namespaces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.namespaces.read().values().map(FxHashMap::len).sum()
    }
}

impl ConfigStore for MemoryConfigStore {
    fn property(&self, namespace: &str, key: &str) -> Option<String> {
        self.namespaces.read().get(namespace)?.get(key).cloned()
    }
}

impl<N, K, V> FromIterator<(N, K, V)> for MemoryConfigStore
where
    N: Into<String>,
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (N, K, V)>>(iter: I) -> Self {
        let store = Self::new();
        for (namespace, key, value) in iter {
            store.set(namespace, key, value);
        }
        store
    }
}
