//! Serializer registry and process-wide resolution cache.
//!
//! Factories are registered at startup under `(namespace, type name)`. The
//! first lookup of a key instantiates its serializer and caches it; later
//! lookups share the cached instance. Lookups never fall back to a default
//! serializer or to the un-namespaced key.
//!
//! ```rust
//! use sideload_core::{Resource, SerializationContext, Serializer, SerializerRegistry};
//!
//! struct Tag {
//!     name: String,
//! }
//! impl Resource for Tag {}
//!
//! #[derive(Default)]
//! struct TagSerializer;
//! impl Serializer for TagSerializer {
//!     fn id(&self, object: &dyn Resource, _ctx: &SerializationContext) -> Option<String> {
//!         object.downcast_ref::<Tag>().map(|tag| tag.name.clone())
//!     }
//! }
//!
//! let registry = SerializerRegistry::new();
//! registry.register("Tag", TagSerializer::default);
//!
//! assert!(registry.lookup(None, "Tag").is_ok());
//! assert!(registry.lookup(Some("Admin"), "Tag").is_err());
//! assert_eq!(registry.stats().misses, 2);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use tracing::debug;

use crate::context::SerializationContext;
use crate::error::{SerializeError, SerializeResult};
use crate::resource::{Resource, short_type_name};
use crate::serializer::Serializer;

type SerializerFactory = Arc<dyn Fn() -> Arc<dyn Serializer> + Send + Sync>;

/// Registry key: optional namespace plus runtime type name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegistryKey {
    namespace: Option<String>,
    type_name: String,
}

impl RegistryKey {
    /// Create a new key.
    pub fn new(namespace: Option<&str>, type_name: &str) -> Self {
        Self {
            namespace: namespace.map(str::to_string),
            type_name: type_name.to_string(),
        }
    }

    /// Get the namespace.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Get the runtime type name.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }
}

impl fmt::Display for RegistryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{}::{}", ns, self.type_name),
            None => write!(f, "{}", self.type_name),
        }
    }
}

/// Statistics for the resolution cache.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses (including unregistered keys).
    pub misses: u64,
    /// Number of serializers currently cached.
    pub cached_count: usize,
}

impl CacheStats {
    /// Get the cache hit rate.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Maps `(namespace, type name)` to serializers.
///
/// Safe to share across threads; concurrent first lookups of the same key
/// all observe one cached instance.
#[derive(Default)]
pub struct SerializerRegistry {
    factories: RwLock<HashMap<RegistryKey, SerializerFactory>>,
    cache: RwLock<HashMap<RegistryKey, Arc<dyn Serializer>>>,
    stats: RwLock<CacheStats>,
}

static GLOBAL_REGISTRY: OnceLock<Arc<SerializerRegistry>> = OnceLock::new();

impl SerializerRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry used when options name no other.
    pub fn global() -> Arc<SerializerRegistry> {
        Arc::clone(GLOBAL_REGISTRY.get_or_init(|| Arc::new(SerializerRegistry::new())))
    }

    /// Register a serializer factory for a runtime type name.
    pub fn register<S, F>(&self, type_name: impl Into<String>, factory: F) -> &Self
    where
        S: Serializer,
        F: Fn() -> S + Send + Sync + 'static,
    {
        let type_name = type_name.into();
        self.register_key(RegistryKey::new(None, &type_name), factory)
    }

    /// Register a serializer factory for a runtime type name under a namespace.
    pub fn register_namespaced<S, F>(
        &self,
        namespace: impl Into<String>,
        type_name: impl Into<String>,
        factory: F,
    ) -> &Self
    where
        S: Serializer,
        F: Fn() -> S + Send + Sync + 'static,
    {
        let namespace = namespace.into();
        let type_name = type_name.into();
        self.register_key(RegistryKey::new(Some(&namespace), &type_name), factory)
    }

    /// Register a serializer factory keyed by `T`'s default type name.
    ///
    /// Types overriding [`Resource::type_name`] must use [`register`](Self::register).
    pub fn register_resource<T, S, F>(&self, factory: F) -> &Self
    where
        T: Resource,
        S: Serializer,
        F: Fn() -> S + Send + Sync + 'static,
    {
        let type_name = short_type_name(std::any::type_name::<T>());
        self.register_key(RegistryKey::new(None, type_name), factory)
    }

    fn register_key<S, F>(&self, key: RegistryKey, factory: F) -> &Self
    where
        S: Serializer,
        F: Fn() -> S + Send + Sync + 'static,
    {
        debug!(key = %key, "serializer registered");
        let factory: SerializerFactory = Arc::new(move || Arc::new(factory()) as Arc<dyn Serializer>);
        self.factories.write().insert(key.clone(), factory);
        // A replaced factory must not be shadowed by its old instance.
        let mut cache = self.cache.write();
        if cache.remove(&key).is_some() {
            self.stats.write().cached_count = cache.len();
        }
        self
    }

    /// Check if a factory is registered.
    pub fn is_registered(&self, namespace: Option<&str>, type_name: &str) -> bool {
        self.factories
            .read()
            .contains_key(&RegistryKey::new(namespace, type_name))
    }

    /// Look up (and on first use instantiate and cache) a serializer.
    pub fn lookup(
        &self,
        namespace: Option<&str>,
        type_name: &str,
    ) -> SerializeResult<Arc<dyn Serializer>> {
        let key = RegistryKey::new(namespace, type_name);

        let cached = self.cache.read().get(&key).cloned();
        if let Some(serializer) = cached {
            self.stats.write().hits += 1;
            return Ok(serializer);
        }
        self.stats.write().misses += 1;

        let factory = self.factories.read().get(&key).cloned();
        let Some(factory) = factory else {
            debug!(key = %key, "no serializer registered");
            return Err(SerializeError::serializer_not_found(namespace, type_name));
        };

        let created = factory();
        let mut cache = self.cache.write();
        let serializer = Arc::clone(cache.entry(key.clone()).or_insert(created));
        self.stats.write().cached_count = cache.len();
        debug!(key = %key, "serializer resolved and cached");
        Ok(serializer)
    }

    /// Resolve the serializer for `object`.
    ///
    /// The context's serializer override wins; otherwise the object's runtime
    /// type name is looked up under the context's namespace.
    pub fn resolve(
        &self,
        object: &dyn Resource,
        ctx: &SerializationContext,
    ) -> SerializeResult<Arc<dyn Serializer>> {
        if let Some(serializer) = ctx.serializer_override() {
            return Ok(Arc::clone(serializer));
        }
        self.lookup(ctx.namespace(), object.type_name())
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.read().clone()
    }

    /// Get the number of cached serializers.
    pub fn cached_count(&self) -> usize {
        self.cache.read().len()
    }
}

impl fmt::Debug for SerializerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<String> = self.factories.read().keys().map(ToString::to_string).collect();
        keys.sort();
        f.debug_struct("SerializerRegistry")
            .field("registered", &keys)
            .field("stats", &self.stats())
            .finish()
    }
}
