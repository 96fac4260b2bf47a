use alloc::{
    collections::{btree_map::Entry, BTreeMap},
    string::String,
    vec::Vec,
};
use core::{
    any::type_name,
    fmt::{self, Debug, Formatter},
    mem,
};
use parking_lot::Mutex;
use tracing::{debug, error, info_span, warn};

use crate::{
    any::TypeInfo,
    config::Config,
    errors::{InstantiateErrorKind, RegistryErrorKind, ResolveErrorKind},
    factory::{Callback, Factory},
    key::Key,
    utils::thread_safety::{RcAnyThreadSafety, RcThreadSafety, SendSafety, SyncSafety},
};

#[derive(Clone)]
pub(crate) struct AccessorData {
    callback: Callback,
    config: Config,
    // Bumped on every registration, so a value produced for a forgotten entry
    // is never cached under a re-registered one.
    generation: u64,
}

#[derive(Default)]
struct RegistryInner {
    entries: BTreeMap<Key, AccessorData>,
    resolved: BTreeMap<Key, RcAnyThreadSafety>,
    generation: u64,
}

/// Container of named factories.
///
/// Registering an entry only stores its factory, nothing is called until the entry is looked up
/// with [`Self::get`] or [`Self::get_any`]. A factory that takes `&Registry` looks up other entries
/// when it's called, so entries can be registered in any order as long as everything a factory
/// needs is registered by the time the factory runs.
///
/// # Warning
/// Cycles aren't detected. If the factory of `a` looks up `b` and the factory of `b` looks up `a`,
/// the lookup recurses until the stack overflows.
///
/// # Concurrency
/// With the `thread_safe` feature the registry is `Send + Sync`. The lock is never held while a factory runs,
/// so two threads looking up the same singleton for the first time may both call its factory.
/// The first value stored wins and is returned to both.
#[derive(Default)]
pub struct Registry {
    inner: Mutex<RegistryInner>,
}

impl Registry {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(RegistryInner::default()),
        }
    }

    /// Creates a registry with a non-cached entry for each pair, in iteration order.
    ///
    /// # Errors
    /// Returns the first registration error, see [`Self::register_with_config`]
    pub fn with_map<I, K, C>(map: I) -> Result<Self, RegistryErrorKind>
    where
        I: IntoIterator<Item = (K, C)>,
        K: AsRef<str>,
        C: Into<Option<Callback>>,
    {
        Self::from_map(map, Config::transient())
    }

    /// Creates a registry with a cached entry for each pair, in iteration order.
    ///
    /// # Errors
    /// Returns the first registration error, see [`Self::register_with_config`]
    pub fn with_singleton_map<I, K, C>(map: I) -> Result<Self, RegistryErrorKind>
    where
        I: IntoIterator<Item = (K, C)>,
        K: AsRef<str>,
        C: Into<Option<Callback>>,
    {
        Self::from_map(map, Config::singleton())
    }

    fn from_map<I, K, C>(map: I, config: Config) -> Result<Self, RegistryErrorKind>
    where
        I: IntoIterator<Item = (K, C)>,
        K: AsRef<str>,
        C: Into<Option<Callback>>,
    {
        let registry = Self::new();
        for (key, callback) in map {
            registry.register_with_config(key, callback.into(), config)?;
        }
        Ok(registry)
    }

    /// Registers a factory whose value is produced anew on every lookup.
    ///
    /// # Errors
    /// - Returns [`RegistryErrorKind::InvalidKey`] if the key is malformed or reserved
    /// - Returns [`RegistryErrorKind::KeyAlreadyRegistered`] if the key is already in use
    #[inline]
    pub fn register<F, Args>(&self, key: impl AsRef<str>, factory: F) -> Result<(), RegistryErrorKind>
    where
        F: Factory<Args, Error = InstantiateErrorKind>,
    {
        self.register_with_config(key, Some(Callback::new(factory)), Config::transient())
    }

    /// Registers a factory that's called on the first lookup only, its value is cached for the following ones.
    ///
    /// # Errors
    /// - Returns [`RegistryErrorKind::InvalidKey`] if the key is malformed or reserved
    /// - Returns [`RegistryErrorKind::KeyAlreadyRegistered`] if the key is already in use
    #[inline]
    pub fn register_singleton<F, Args>(&self, key: impl AsRef<str>, factory: F) -> Result<(), RegistryErrorKind>
    where
        F: Factory<Args, Error = InstantiateErrorKind>,
    {
        self.register_with_config(key, Some(Callback::new(factory)), Config::singleton())
    }

    /// Alias of [`Self::register_singleton`]
    ///
    /// # Errors
    /// See [`Self::register_singleton`]
    #[inline]
    pub fn singleton<F, Args>(&self, key: impl AsRef<str>, factory: F) -> Result<(), RegistryErrorKind>
    where
        F: Factory<Args, Error = InstantiateErrorKind>,
    {
        self.register_singleton(key, factory)
    }

    /// Registers a type-erased callback with the given config.
    ///
    /// # Errors
    /// - Returns [`RegistryErrorKind::InvalidKey`] if the key is malformed or reserved
    /// - Returns [`RegistryErrorKind::KeyAlreadyRegistered`] if the key is already in use
    /// - Returns [`RegistryErrorKind::InvalidCallback`] if no callback is passed
    pub fn register_with_config(
        &self,
        key: impl AsRef<str>,
        callback: Option<Callback>,
        config: Config,
    ) -> Result<(), RegistryErrorKind> {
        let key = key.as_ref();

        let span = info_span!("register", key, cache_provides = config.cache_provides);
        let _guard = span.enter();

        let key = match Key::new(key) {
            Ok(key) => key,
            Err(err) => {
                error!("{}", err);
                return Err(err);
            }
        };

        let mut inner = self.inner.lock();
        if inner.entries.contains_key(&key) {
            let err = RegistryErrorKind::KeyAlreadyRegistered { key };
            error!("{}", err);
            return Err(err);
        }
        let Some(callback) = callback else {
            let err = RegistryErrorKind::InvalidCallback { key };
            error!("{}", err);
            return Err(err);
        };

        inner.generation += 1;
        let generation = inner.generation;
        debug!(arity = ?callback.arity(), "Registered");
        inner.entries.insert(
            key,
            AccessorData {
                callback,
                config,
                generation,
            },
        );
        Ok(())
    }

    /// Gets the value of an entry, calling its factory unless a cached value exists.
    ///
    /// Non-cached entries return a new pointer on each call, cached ones return the same pointer.
    ///
    /// # Errors
    /// - Returns [`ResolveErrorKind::UndefinedLookup`] if the key isn't registered
    /// - Returns [`ResolveErrorKind::IncorrectType`] if the entry holds a value of another type
    /// - Returns [`ResolveErrorKind::Factory`] if the factory fails, including failed lookups inside it
    pub fn get<Dep: SendSafety + SyncSafety + 'static>(&self, key: &str) -> Result<RcThreadSafety<Dep>, ResolveErrorKind> {
        let span = info_span!("get", key, dependency = type_name::<Dep>());
        let _guard = span.enter();

        let (key, value) = self.resolve(key)?;
        match value.downcast::<Dep>() {
            Ok(dependency) => Ok(dependency),
            Err(incorrect_type) => {
                let err = ResolveErrorKind::IncorrectType {
                    key,
                    expected: TypeInfo::of::<Dep>(),
                    actual: (*incorrect_type).type_id(),
                };
                error!("{}", err);
                Err(err)
            }
        }
    }

    /// Untyped version of [`Self::get`]
    ///
    /// # Errors
    /// - Returns [`ResolveErrorKind::UndefinedLookup`] if the key isn't registered
    /// - Returns [`ResolveErrorKind::Factory`] if the factory fails, including failed lookups inside it
    pub fn get_any(&self, key: &str) -> Result<RcAnyThreadSafety, ResolveErrorKind> {
        let span = info_span!("get_any", key);
        let _guard = span.enter();

        self.resolve(key).map(|(_, value)| value)
    }

    /// Removes an entry and its cached value. The key can be registered again afterwards.
    ///
    /// # Errors
    /// Returns [`RegistryErrorKind::KeyNotRegistered`] if the key isn't registered
    pub fn forget(&self, key: impl AsRef<str>) -> Result<(), RegistryErrorKind> {
        let key = key.as_ref();

        let span = info_span!("forget", key);
        let _guard = span.enter();

        // Removed values are dropped after the lock is released, their `Drop` may use the registry
        let (data, value) = {
            let mut inner = self.inner.lock();
            let Some(data) = inner.entries.remove(key) else {
                let err = RegistryErrorKind::KeyNotRegistered { key: String::from(key) };
                error!("{}", err);
                return Err(err);
            };
            (data, inner.resolved.remove(key))
        };
        drop(data);
        if let Some(value) = value {
            drop(value);
            debug!("Cached value dropped");
        }
        debug!("Forgotten");
        Ok(())
    }

    /// Removes all entries and cached values
    pub fn forget_all(&self) {
        let span = info_span!("forget_all");
        let _guard = span.enter();

        let (entries, resolved) = {
            let mut inner = self.inner.lock();
            (mem::take(&mut inner.entries), mem::take(&mut inner.resolved))
        };
        let count = entries.len();
        drop(resolved);
        drop(entries);
        debug!(count, "Forgotten");
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.inner.lock().entries.contains_key(key)
    }

    /// Returns `None` if the key isn't registered
    #[must_use]
    pub fn is_singleton(&self, key: &str) -> Option<bool> {
        self.inner.lock().entries.get(key).map(|data| data.config.cache_provides)
    }

    /// Checks whether a cached value exists for the key
    #[must_use]
    pub fn is_resolved(&self, key: &str) -> bool {
        self.inner.lock().resolved.contains_key(key)
    }

    /// Registered keys in lexicographic order
    #[must_use]
    pub fn keys(&self) -> Vec<Key> {
        self.inner.lock().entries.keys().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }
}

impl Debug for Registry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("Registry")
            .field("entries", &inner.entries.keys().collect::<Vec<_>>())
            .field("resolved", &inner.resolved.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Registry {
    fn resolve(&self, key: &str) -> Result<(Key, RcAnyThreadSafety), ResolveErrorKind> {
        let (key, data) = {
            let inner = self.inner.lock();
            if let Some((key, value)) = inner.resolved.get_key_value(key) {
                debug!("Found in cache");
                return Ok((key.clone(), value.clone()));
            }
            let Some((key, data)) = inner.entries.get_key_value(key) else {
                let err = ResolveErrorKind::UndefinedLookup { key: String::from(key) };
                error!("{}", err);
                return Err(err);
            };
            (key.clone(), data.clone())
        };
        debug!("Not found in cache");

        // The lock is released here, the factory is free to look up other entries
        let value = match data.callback.call(self) {
            Ok(value) => value,
            Err(source) => {
                let err = ResolveErrorKind::Factory { key, source };
                error!("{}", err);
                return Err(err);
            }
        };

        if !data.config.cache_provides {
            return Ok((key, value));
        }

        let mut inner = self.inner.lock();
        let is_current = inner
            .entries
            .get(&key)
            .is_some_and(|current| current.generation == data.generation);
        if !is_current {
            drop(inner);
            warn!("Entry was replaced during resolution, value isn't cached");
            return Ok((key, value));
        }
        let cached = match inner.resolved.entry(key.clone()) {
            Entry::Vacant(entry) => {
                entry.insert(value.clone());
                None
            }
            Entry::Occupied(entry) => Some(entry.get().clone()),
        };
        drop(inner);

        match cached {
            None => {
                debug!("Cached");
                Ok((key, value))
            }
            // The losing value is dropped here, after the lock is released
            Some(cached) => {
                debug!("Cached by a concurrent lookup");
                Ok((key, cached))
            }
        }
    }
}
