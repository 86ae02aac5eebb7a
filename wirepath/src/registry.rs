//! Field-table registry.
//!
//! `#[derive(WireModel)]` submits a [`ModelRegistration`] to `inventory` for every
//! model, so [`Registry::from_inventory`] sees all derived models linked into the
//! binary. Descriptors can also be registered by hand at startup.

use crate::errors::{SchemaError, SchemaResult};
use crate::types::{RecordDescriptor, RecordKey, WireModel};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};

/// Link-time registration emitted by the derive macro.
pub struct ModelRegistration {
    pub key: fn() -> RecordKey,
    pub describe: fn() -> RecordDescriptor,
}

impl ModelRegistration {
    pub const fn new(key: fn() -> RecordKey, describe: fn() -> RecordDescriptor) -> Self {
        Self { key, describe }
    }
}

inventory::collect!(ModelRegistration);

/// All registrations submitted by `#[derive(WireModel)]`.
pub fn registered_models() -> impl Iterator<Item = &'static ModelRegistration> {
    inventory::iter::<ModelRegistration>()
}

#[derive(Debug, Default)]
pub struct Registry {
    records: RwLock<HashMap<RecordKey, Arc<RecordDescriptor>>>,
    /// Keys claimed by more than one distinct derived model.
    conflicts: RwLock<HashSet<RecordKey>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every derived model linked into the binary.
    pub fn from_inventory() -> Self {
        let registry = Self::from_registrations(registered_models());
        log::debug!("registry seeded with {} derived models", registry.len());
        registry
    }

    /// Registry over `registrations`.
    ///
    /// A key submitted twice with different descriptors is marked conflicting:
    /// [`lookup`](Self::lookup) reports it as an error instead of answering with
    /// either model's fields.
    pub fn from_registrations<'a>(registrations: impl IntoIterator<Item = &'a ModelRegistration>) -> Self {
        let registry = Self::new();
        for registration in registrations {
            let key = (registration.key)();
            let descriptor = (registration.describe)();
            if descriptor.key != key {
                log::warn!("registration `{key}` describes `{}`; registering under the described key", descriptor.key);
            }
            if let Some(existing) = registry.describe(&descriptor.key)
                && *existing != descriptor
            {
                log::error!("record `{}` is derived by two different models", descriptor.key);
                registry
                    .conflicts
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(descriptor.key.clone());
                continue;
            }
            registry.insert(descriptor);
        }
        registry
    }

    pub fn register<T: WireModel>(&self) -> bool {
        self.insert(T::record_descriptor())
    }

    /// Insert a descriptor. The first registration of a key wins; returns false
    /// when the key was already present.
    pub fn insert(&self, descriptor: RecordDescriptor) -> bool {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        if records.contains_key(&descriptor.key) {
            log::debug!("record `{}` already registered", descriptor.key);
            return false;
        }
        records.insert(descriptor.key.clone(), Arc::new(descriptor));
        true
    }

    pub fn describe(&self, key: &RecordKey) -> Option<Arc<RecordDescriptor>> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Descriptor of `key`, or why there is none.
    pub fn lookup(&self, key: &RecordKey) -> SchemaResult<Arc<RecordDescriptor>> {
        if self.is_conflicting(key) {
            return Err(SchemaError::ConflictingRecord { key: key.clone() });
        }
        self.describe(key)
            .ok_or_else(|| SchemaError::UnknownRecord { key: key.clone() })
    }

    pub fn is_conflicting(&self, key: &RecordKey) -> bool {
        self.conflicts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(key)
    }

    pub fn contains(&self, key: &RecordKey) -> bool {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.records.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registered keys, sorted.
    pub fn keys(&self) -> Vec<RecordKey> {
        let mut keys: Vec<_> = self
            .records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }
}
