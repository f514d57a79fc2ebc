//! Call-scoped serialization context.
//!
//! A [`SerializationContext`] is handed to every serializer and relationship
//! resolver. It is immutable; recursion into a relationship produces a
//! narrowed copy rather than mutating the parent's.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::SerializeResult;
use crate::options::SerializeOptions;
use crate::registry::SerializerRegistry;
use crate::relations::RelationshipOptions;
use crate::resource::Resource;
use crate::serializer::Serializer;

/// Field whitelist: resource type to allowed external field names.
pub type FieldWhitelist = IndexMap<String, Vec<String>>;

/// Serializers pinned per runtime type name during one top-level call.
pub type SerializerPins = HashMap<String, Arc<dyn Serializer>>;

/// Read-mostly bundle threaded through every serializer call.
#[derive(Clone)]
pub struct SerializationContext {
    registry: Arc<SerializerRegistry>,
    context: Option<Arc<dyn Any + Send + Sync>>,
    namespace: Option<String>,
    serializer: Option<Arc<dyn Serializer>>,
    fields: Arc<FieldWhitelist>,
    base_url: Option<String>,
    include_linkages: Vec<String>,
    pins: Arc<SerializerPins>,
}

impl SerializationContext {
    /// Create an empty context resolving through `registry`.
    pub fn new(registry: Arc<SerializerRegistry>) -> Self {
        Self {
            registry,
            context: None,
            namespace: None,
            serializer: None,
            fields: Arc::new(FieldWhitelist::new()),
            base_url: None,
            include_linkages: Vec::new(),
            pins: Arc::new(SerializerPins::new()),
        }
    }

    /// Build the root context of a top-level call.
    pub fn from_options(options: &SerializeOptions) -> Self {
        Self {
            registry: options.registry_handle(),
            context: options.context.clone(),
            namespace: options.namespace.clone(),
            serializer: options.serializer.clone(),
            fields: Arc::new(options.fields.clone()),
            base_url: options.base_url.clone(),
            include_linkages: Vec::new(),
            pins: Arc::new(SerializerPins::new()),
        }
    }

    /// Set the caller context value.
    pub fn with_context<C: Any + Send + Sync>(mut self, context: C) -> Self {
        self.context = Some(Arc::new(context));
        self
    }

    /// Set the serializer namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Set or clear the serializer override.
    pub fn with_serializer(mut self, serializer: Option<Arc<dyn Serializer>>) -> Self {
        self.serializer = serializer;
        self
    }

    /// Set the field whitelist.
    pub fn with_fields(mut self, fields: FieldWhitelist) -> Self {
        self.fields = Arc::new(fields);
        self
    }

    /// Set the base URL used for links.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the relationship names that carry resource linkage.
    pub fn with_include_linkages(mut self, linkages: Vec<String>) -> Self {
        self.include_linkages = linkages;
        self
    }

    /// Set the serializers pinned by a finished walk.
    pub fn with_pins(mut self, pins: Arc<SerializerPins>) -> Self {
        self.pins = pins;
        self
    }

    /// Copy for the resources behind a relationship.
    ///
    /// The serializer override and linkage list belong to the parent and are
    /// dropped; a relationship-scoped context replaces the caller context.
    pub fn narrow(&self, options: &RelationshipOptions) -> Self {
        let mut child = self.clone();
        child.serializer = None;
        child.include_linkages = Vec::new();
        if let Some(context) = &options.context {
            child.context = Some(Arc::clone(context));
        }
        child
    }

    /// Get the serializer registry.
    pub fn registry(&self) -> &Arc<SerializerRegistry> {
        &self.registry
    }

    /// Get the caller context as a `C`.
    pub fn context<C: Any>(&self) -> Option<&C> {
        self.context.as_deref()?.downcast_ref::<C>()
    }

    /// Get the serializer namespace.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Get the serializer override.
    pub fn serializer_override(&self) -> Option<&Arc<dyn Serializer>> {
        self.serializer.as_ref()
    }

    /// Get the whole field whitelist.
    pub fn fields(&self) -> &FieldWhitelist {
        &self.fields
    }

    /// Get the whitelisted fields of a resource type, if restricted.
    pub fn fields_for(&self, resource_type: &str) -> Option<&[String]> {
        self.fields.get(resource_type).map(Vec::as_slice)
    }

    /// Check whether a field of a resource type passes the whitelist.
    pub fn is_field_allowed(&self, resource_type: &str, field: &str) -> bool {
        self.fields_for(resource_type)
            .is_none_or(|allowed| allowed.iter().any(|f| f == field))
    }

    /// Get the base URL.
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Get the relationship names that carry resource linkage.
    pub fn include_linkages(&self) -> &[String] {
        &self.include_linkages
    }

    /// Check whether a relationship carries resource linkage.
    pub fn includes_linkage(&self, name: &str) -> bool {
        self.include_linkages.iter().any(|n| n == name)
    }

    /// Get the serializer pinned for a runtime type name.
    pub fn pinned(&self, type_name: &str) -> Option<&Arc<dyn Serializer>> {
        self.pins.get(type_name)
    }

    /// Resolve the serializer for `object` through the override or the registry.
    pub fn resolve_serializer(&self, object: &dyn Resource) -> SerializeResult<Arc<dyn Serializer>> {
        self.registry.resolve(object, self)
    }

    /// Resolve the serializer for `object` through its pin, else the override
    /// or the registry.
    pub fn resolve_pinned(&self, object: &dyn Resource) -> SerializeResult<Arc<dyn Serializer>> {
        match self.pinned(object.type_name()) {
            Some(serializer) => Ok(Arc::clone(serializer)),
            None => self.resolve_serializer(object),
        }
    }
}

impl fmt::Debug for SerializationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerializationContext")
            .field("context", &self.context.is_some())
            .field("namespace", &self.namespace)
            .field("serializer", &self.serializer.is_some())
            .field("fields", &self.fields)
            .field("base_url", &self.base_url)
            .field("include_linkages", &self.include_linkages)
            .field("pinned", &self.pins.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[derive(Debug, PartialEq)]
    struct CurrentUser(u64);

    #[test]
    fn test_typed_context_access() {
        let ctx = fixtures::context().with_context(CurrentUser(3));
        assert_eq!(ctx.context::<CurrentUser>(), Some(&CurrentUser(3)));
        assert_eq!(ctx.context::<String>(), None);
    }

    #[test]
    fn test_field_whitelist() {
        let ctx = fixtures::context().with_fields(FieldWhitelist::from([(
            "posts".to_string(),
            vec!["title".to_string()],
        )]));

        assert!(ctx.is_field_allowed("posts", "title"));
        assert!(!ctx.is_field_allowed("posts", "body"));
        assert!(ctx.is_field_allowed("users", "name"));
    }

    #[test]
    fn test_narrow_drops_parent_state() {
        let ctx = fixtures::context()
            .with_context(CurrentUser(1))
            .with_include_linkages(vec!["comments".to_string()])
            .with_serializer(Some(Arc::new(fixtures::UserSerializer)));

        let plain = ctx.narrow(&RelationshipOptions::default());
        assert!(plain.serializer_override().is_none());
        assert!(plain.include_linkages().is_empty());
        assert_eq!(plain.context::<CurrentUser>(), Some(&CurrentUser(1)));

        let scoped = ctx.narrow(&RelationshipOptions {
            context: Some(Arc::new(CurrentUser(2))),
            ..RelationshipOptions::default()
        });
        assert_eq!(scoped.context::<CurrentUser>(), Some(&CurrentUser(2)));
    }

    #[test]
    fn test_pins_survive_narrowing() {
        let user = fixtures::user(1, "Ada");
        let pinned: Arc<dyn Serializer> = Arc::new(fixtures::CommentSerializer);
        let pins = SerializerPins::from([("User".to_string(), Arc::clone(&pinned))]);

        let ctx = fixtures::context().with_pins(Arc::new(pins));
        let child = ctx.narrow(&RelationshipOptions::default());

        let resolved = child.resolve_pinned(user.as_ref()).unwrap();
        assert!(Arc::ptr_eq(&resolved, &pinned));
        assert!(fixtures::context().pinned("User").is_none());
    }
}
