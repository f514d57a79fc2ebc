//! Relationship graph traversal.
//!
//! The walker follows an [`InclusionNode`] tree across the live object graph.
//! Only explicitly named relationships are followed, so traversal depth is
//! bounded by the requested paths even when the object graph is cyclic.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use super::descriptor::RelationshipDescriptor;
use super::include::InclusionNode;
use crate::context::{SerializationContext, SerializerPins};
use crate::error::{SerializeError, SerializeResult};
use crate::resource::{Resource, ResourceRef};
use crate::serializer::Serializer;
use crate::sideload_trace;

/// Deduplication key of a discovered resource.
///
/// Resources without an id share one key per type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceKey {
    /// Resource type.
    pub resource_type: String,
    /// Resource id, `None` when blank.
    pub id: Option<String>,
}

impl ResourceKey {
    /// Create a new key. A blank id is stored as `None`.
    pub fn new(resource_type: impl Into<String>, id: Option<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: id.filter(|id| !id.trim().is_empty()),
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            Some(id) => write!(f, "{}:{}", self.resource_type, id),
            None => write!(f, "{}:<new>", self.resource_type),
        }
    }
}

/// A resource found while walking, with what it needs to be formatted.
#[derive(Clone)]
pub struct Discovered {
    /// The domain object.
    pub object: ResourceRef,
    /// The serializer chosen for it.
    pub serializer: Arc<dyn Serializer>,
    /// Relationship names that carry linkage on this resource.
    pub include_linkages: Vec<String>,
    /// Context narrowed for the relationship it was reached through.
    pub context: SerializationContext,
}

impl Discovered {
    /// The context to format this resource with.
    pub fn format_context(&self) -> SerializationContext {
        self.context
            .clone()
            .with_include_linkages(self.include_linkages.clone())
    }
}

impl fmt::Debug for Discovered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Discovered")
            .field("object", &self.object)
            .field("include_linkages", &self.include_linkages)
            .finish_non_exhaustive()
    }
}

/// Insertion-ordered map of discovered resources keyed by `(type, id)`.
///
/// The first discovery of a key wins: later discoveries only add linkage
/// names. This matches the walker's pins, which are also fixed by the first
/// included resource of each runtime type.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryAccumulator {
    entries: IndexMap<ResourceKey, Discovered>,
}

impl DiscoveryAccumulator {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a resource, or union its linkage names into an existing entry.
    pub fn upsert(&mut self, key: ResourceKey, discovered: Discovered) {
        match self.entries.get_mut(&key) {
            Some(existing) => {
                for name in discovered.include_linkages {
                    if !existing.include_linkages.contains(&name) {
                        existing.include_linkages.push(name);
                    }
                }
            }
            None => {
                self.entries.insert(key, discovered);
            }
        }
    }

    /// Get the number of distinct resources.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing was discovered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get a discovered resource.
    pub fn get(&self, key: &ResourceKey) -> Option<&Discovered> {
        self.entries.get(key)
    }

    /// Check if a resource was discovered.
    pub fn contains(&self, key: &ResourceKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterate in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = (&ResourceKey, &Discovered)> {
        self.entries.iter()
    }

    /// Consume into entries in discovery order.
    pub fn into_entries(self) -> impl Iterator<Item = (ResourceKey, Discovered)> {
        self.entries.into_iter()
    }
}

/// Walks one top-level call's inclusion tree.
///
/// Holds the call-scoped state: the accumulator and the serializer pinned
/// for each runtime type. A walker must not be reused across calls.
///
/// A runtime type is pinned to the serializer of its first included
/// resource. Later resources of that type without a relationship override
/// reuse the pin, so every key they produce agrees with the linkage
/// formatted through [`SerializationContext::resolve_pinned`].
#[derive(Default)]
pub struct GraphWalker {
    accumulator: DiscoveryAccumulator,
    pins: SerializerPins,
}

impl GraphWalker {
    /// Create a walker with empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Walk `level` starting from a primary object.
    ///
    /// The root's serializer is the context override, else the registry's,
    /// the same one the primary data is formatted with.
    pub fn walk(
        &mut self,
        root: &dyn Resource,
        level: &InclusionNode,
        ctx: &SerializationContext,
    ) -> SerializeResult<()> {
        let serializer = ctx.resolve_serializer(root)?;
        self.walk_with(root, serializer, level, ctx)
    }

    /// The serializer pinned for a runtime type in this call.
    pub fn pinned(&self, type_name: &str) -> Option<&Arc<dyn Serializer>> {
        self.pins.get(type_name)
    }

    /// Resources discovered so far.
    pub fn accumulator(&self) -> &DiscoveryAccumulator {
        &self.accumulator
    }

    /// Finish the walk and take the discovered resources.
    pub fn finish(self) -> DiscoveryAccumulator {
        self.accumulator
    }

    /// Finish the walk and take the discovered resources with the pins.
    pub fn into_parts(self) -> (DiscoveryAccumulator, SerializerPins) {
        (self.accumulator, self.pins)
    }

    fn pinned_or_resolve(
        &self,
        object: &dyn Resource,
        ctx: &SerializationContext,
    ) -> SerializeResult<Arc<dyn Serializer>> {
        match self.pins.get(object.type_name()) {
            Some(serializer) => Ok(Arc::clone(serializer)),
            None => ctx.resolve_serializer(object),
        }
    }

    fn walk_with(
        &mut self,
        root: &dyn Resource,
        serializer: Arc<dyn Serializer>,
        level: &InclusionNode,
        ctx: &SerializationContext,
    ) -> SerializeResult<()> {
        let has_one = serializer.has_one_relationships();
        let has_many = serializer.has_many_relationships();

        for (name, child) in level.children() {
            let descriptor = find_descriptor(serializer.as_ref(), root, ctx, name, &has_one, &has_many)?;

            let related = descriptor.resolve(root, ctx).into_vec();
            if related.is_empty() {
                sideload_trace!(field = name, "relationship empty, branch stops");
                continue;
            }

            let child_ctx = ctx.narrow(descriptor.options());
            let mut resolved = Vec::with_capacity(related.len());
            for object in related {
                let object_serializer = match &descriptor.options().serializer {
                    Some(serializer) => Arc::clone(serializer),
                    None => self.pinned_or_resolve(object.as_ref(), &child_ctx)?,
                };

                if child.is_included() {
                    self.pins
                        .entry(object.type_name().to_string())
                        .or_insert_with(|| Arc::clone(&object_serializer));
                    let key = ResourceKey::new(
                        object_serializer.resource_type(object.as_ref(), &child_ctx),
                        object_serializer.id(object.as_ref(), &child_ctx),
                    );
                    sideload_trace!(key = %key, field = name, "resource discovered");
                    self.accumulator.upsert(
                        key,
                        Discovered {
                            object: Arc::clone(&object),
                            serializer: Arc::clone(&object_serializer),
                            include_linkages: child.linkage_names(),
                            context: child_ctx.clone(),
                        },
                    );
                }
                resolved.push((object, object_serializer));
            }

            if child.has_children() {
                for (object, object_serializer) in resolved {
                    self.walk_with(object.as_ref(), object_serializer, child, &child_ctx)?;
                }
            }
        }
        Ok(())
    }
}

/// Map a requested external name to its declared relationship.
fn find_descriptor<'a>(
    serializer: &dyn Serializer,
    root: &dyn Resource,
    ctx: &SerializationContext,
    name: &str,
    has_one: &'a IndexMap<String, RelationshipDescriptor>,
    has_many: &'a IndexMap<String, RelationshipDescriptor>,
) -> SerializeResult<&'a RelationshipDescriptor> {
    let internal = serializer.unformat_name(name);
    let Some(descriptor) = has_one.get(&internal).or_else(|| has_many.get(&internal)) else {
        let resource_type = serializer.resource_type(root, ctx);
        debug!(field = name, resource_type = %resource_type, "invalid include");
        return Err(SerializeError::invalid_include(name, resource_type));
    };

    let expected = serializer.format_name(&internal);
    if expected != name {
        debug!(field = name, expected = %expected, "include not in external casing");
        return Err(SerializeError::include_casing(name, expected)
            .with_resource_type(serializer.resource_type(root, ctx)));
    }
    Ok(descriptor)
}

impl fmt::Debug for GraphWalker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut pinned: Vec<&String> = self.pins.keys().collect();
        pinned.sort();
        f.debug_struct("GraphWalker")
            .field("accumulator", &self.accumulator)
            .field("pinned", &pinned)
            .finish()
    }
}
