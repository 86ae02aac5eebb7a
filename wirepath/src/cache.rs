//! Memoizing cache of field path indexes.

use crate::errors::{SchemaError, SchemaResult};
use crate::index::{self, FieldPathIndex};
use crate::normalize;
use crate::registry::Registry;
use crate::types::{RecordKey, TypeRef};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

static GLOBAL: OnceLock<TypeCache> = OnceLock::new();

/// Record key -> built index, filled lazily on first request per key.
///
/// Every key is indexed at most once per cache; concurrent first callers all
/// receive the same `Arc`. Entries are never evicted.
#[derive(Debug)]
pub struct TypeCache {
    registry: Arc<Registry>,
    entries: RwLock<HashMap<RecordKey, Arc<FieldPathIndex>>>,
    builds: AtomicUsize,
}

impl TypeCache {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            entries: RwLock::new(HashMap::new()),
            builds: AtomicUsize::new(0),
        }
    }

    /// Process-wide cache over every derived model linked into the binary.
    pub fn global() -> &'static TypeCache {
        GLOBAL.get_or_init(|| TypeCache::new(Arc::new(Registry::from_inventory())))
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Index of `key`, building it on first access.
    pub fn get(&self, key: &RecordKey) -> SchemaResult<Arc<FieldPathIndex>> {
        if let Some(index) = self.lookup(key) {
            log::trace!("index cache hit for `{key}`");
            return Ok(index);
        }

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        // Another caller may have published while we waited for the write lock.
        if let Some(index) = entries.get(key) {
            return Ok(Arc::clone(index));
        }
        let index = Arc::new(index::build(&self.registry, key)?);
        self.builds.fetch_add(1, Ordering::Relaxed);
        entries.insert(key.clone(), Arc::clone(&index));
        Ok(index)
    }

    /// Index of the record underneath `ty`.
    pub fn index_of(&self, ty: &TypeRef) -> SchemaResult<Arc<FieldPathIndex>> {
        let key = normalize::record_key(ty).ok_or_else(|| SchemaError::InvalidModelKind {
            type_name: ty.to_string(),
        })?;
        self.get(key)
    }

    pub fn contains(&self, key: &RecordKey) -> bool {
        self.lookup(key).is_some()
    }

    /// Number of published indexes.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of indexes this cache has constructed.
    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::Relaxed)
    }

    fn lookup(&self, key: &RecordKey) -> Option<Arc<FieldPathIndex>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}
