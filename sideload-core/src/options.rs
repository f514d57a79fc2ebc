//! Options for a top-level serialization call.
//!
//! [`SerializeOptions`] is built in code, or its declarative members are
//! loaded from JSON:
//!
//! ```rust
//! use serde_json::json;
//! use sideload_core::SerializeOptions;
//!
//! let options: SerializeOptions = serde_json::from_value(json!({
//!     "is_collection": true,
//!     "include": "comments,comments.author",
//!     "fields": {"posts": "title,body"},
//!     "base_url": "https://api.example.com"
//! }))
//! .unwrap();
//!
//! assert_eq!(options.is_collection, Some(true));
//! assert_eq!(options.include_paths(), ["comments", "comments.author"]);
//! assert_eq!(options.fields["posts"], ["title", "body"]);
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::context::FieldWhitelist;
use crate::registry::SerializerRegistry;
use crate::relations::normalize_paths;
use crate::serializer::Serializer;

/// Options for [`serialize`](crate::serialize()) and
/// [`serialize_errors`](crate::serialize_errors()).
#[derive(Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SerializeOptions {
    /// Whether the primary data is a collection. Must be stated for collections.
    pub is_collection: Option<bool>,
    /// Skip the collection flag check and infer the shape from the input.
    pub skip_collection_check: bool,
    /// Include paths. `None` means no `included` member.
    #[serde(deserialize_with = "deserialize_include")]
    pub include: Option<Vec<String>>,
    /// Sparse fieldsets: resource type to allowed external field names.
    #[serde(deserialize_with = "deserialize_fields")]
    pub fields: FieldWhitelist,
    /// Serializer namespace used for every lookup.
    pub namespace: Option<String>,
    /// Base URL for `self` and relationship links.
    pub base_url: Option<String>,
    /// Top-level `jsonapi` member.
    pub jsonapi: Option<Value>,
    /// Top-level `meta` member.
    pub meta: Option<Value>,
    /// Top-level `links` member.
    pub links: Option<Value>,
    /// Caller context handed to every serializer.
    #[serde(skip)]
    pub context: Option<Arc<dyn Any + Send + Sync>>,
    /// Serializer for the primary data instead of registry lookup.
    #[serde(skip)]
    pub serializer: Option<Arc<dyn Serializer>>,
    /// Registry to resolve through; the global registry when unset.
    #[serde(skip)]
    pub registry: Option<Arc<SerializerRegistry>>,
}

impl SerializeOptions {
    /// Create empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for a single resource (or `None`).
    pub fn single() -> Self {
        Self::new().is_collection(false)
    }

    /// Options for a collection.
    pub fn collection() -> Self {
        Self::new().is_collection(true)
    }

    /// Set the collection flag.
    pub fn is_collection(mut self, is_collection: bool) -> Self {
        self.is_collection = Some(is_collection);
        self
    }

    /// Toggle the collection flag check.
    pub fn skip_collection_check(mut self, skip: bool) -> Self {
        self.skip_collection_check = skip;
        self
    }

    /// Add include paths. Entries may be comma-separated; blanks and
    /// duplicates are dropped.
    pub fn include<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let existing = self.include.take().unwrap_or_default();
        let added: Vec<String> = paths.into_iter().map(|p| p.as_ref().to_string()).collect();
        self.include = Some(normalize_paths(existing.into_iter().chain(added)));
        self
    }

    /// Restrict the fields of a resource type. Entries may be comma-separated.
    pub fn fields<I, S>(mut self, resource_type: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.fields
            .insert(resource_type.into(), normalize_paths(fields));
        self
    }

    /// Set the caller context.
    pub fn context<C: Any + Send + Sync>(mut self, context: C) -> Self {
        self.context = Some(Arc::new(context));
        self
    }

    /// Serialize the primary data with `serializer`.
    pub fn serializer<S: Serializer>(self, serializer: S) -> Self {
        self.serializer_arc(Arc::new(serializer))
    }

    /// Serialize the primary data with a shared serializer.
    pub fn serializer_arc(mut self, serializer: Arc<dyn Serializer>) -> Self {
        self.serializer = Some(serializer);
        self
    }

    /// Set the serializer namespace.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Set the base URL for links.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the top-level `jsonapi` member.
    pub fn jsonapi(mut self, jsonapi: Value) -> Self {
        self.jsonapi = Some(jsonapi);
        self
    }

    /// Set the top-level `meta` member.
    pub fn meta(mut self, meta: Value) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Set the top-level `links` member.
    pub fn links(mut self, links: Value) -> Self {
        self.links = Some(links);
        self
    }

    /// Resolve through `registry` instead of the global one.
    pub fn registry(mut self, registry: Arc<SerializerRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// The include paths, empty when none were given.
    pub fn include_paths(&self) -> &[String] {
        self.include.as_deref().unwrap_or_default()
    }

    /// The registry this call resolves through.
    pub fn registry_handle(&self) -> Arc<SerializerRegistry> {
        match &self.registry {
            Some(registry) => Arc::clone(registry),
            None => SerializerRegistry::global(),
        }
    }
}

impl fmt::Debug for SerializeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerializeOptions")
            .field("is_collection", &self.is_collection)
            .field("skip_collection_check", &self.skip_collection_check)
            .field("include", &self.include)
            .field("fields", &self.fields)
            .field("namespace", &self.namespace)
            .field("base_url", &self.base_url)
            .field("jsonapi", &self.jsonapi)
            .field("meta", &self.meta)
            .field("links", &self.links)
            .field("context", &self.context.is_some())
            .field("serializer", &self.serializer.is_some())
            .field("registry", &self.registry.is_some())
            .finish()
    }
}

/// A comma-separated string or a list of strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrList {
    One(String),
    Many(Vec<String>),
}

impl StringOrList {
    fn normalize(self) -> Vec<String> {
        match self {
            Self::One(one) => normalize_paths([one]),
            Self::Many(many) => normalize_paths(many),
        }
    }
}

fn deserialize_include<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<StringOrList>::deserialize(deserializer)?;
    Ok(raw.map(StringOrList::normalize))
}

fn deserialize_fields<'de, D>(deserializer: D) -> Result<FieldWhitelist, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = IndexMap::<String, StringOrList>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(resource_type, fields)| (resource_type, fields.normalize()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_builder() {
        let options = SerializeOptions::collection()
            .include(["comments.author, author", "comments.author"])
            .fields("posts", ["title"])
            .namespace("Api")
            .base_url("/api")
            .meta(json!({"total": 2}));

        assert_eq!(options.is_collection, Some(true));
        assert_eq!(options.include_paths(), ["comments.author", "author"]);
        assert_eq!(options.fields["posts"], ["title"]);
        assert_eq!(options.namespace.as_deref(), Some("Api"));
        assert_eq!(options.base_url.as_deref(), Some("/api"));
        assert_eq!(options.meta, Some(json!({"total": 2})));
    }

    #[test]
    fn test_include_accumulates() {
        let options = SerializeOptions::single()
            .include(["author"])
            .include(["comments", "author"]);
        assert_eq!(options.include_paths(), ["author", "comments"]);
    }

    #[test]
    fn test_no_include_is_distinct_from_empty() {
        assert!(SerializeOptions::single().include.is_none());

        let empty = SerializeOptions::single().include(Vec::<String>::new());
        assert_eq!(empty.include, Some(Vec::new()));
    }

    #[test]
    fn test_deserialize_lists() {
        let options: SerializeOptions = serde_json::from_value(json!({
            "include": ["author", " comments "],
            "fields": {"users": ["name"]},
            "skip_collection_check": true
        }))
        .unwrap();

        assert_eq!(options.include_paths(), ["author", "comments"]);
        assert_eq!(options.fields["users"], ["name"]);
        assert!(options.skip_collection_check);
        assert_eq!(options.is_collection, None);
    }

    #[test]
    fn test_deserialize_rejects_unknown_members() {
        let result = serde_json::from_value::<SerializeOptions>(json!({"includes": "author"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_registry_handle_defaults_to_global() {
        let options = SerializeOptions::new();
        assert!(Arc::ptr_eq(
            &options.registry_handle(),
            &SerializerRegistry::global()
        ));

        let own = Arc::new(SerializerRegistry::new());
        let options = SerializeOptions::new().registry(Arc::clone(&own));
        assert!(Arc::ptr_eq(&options.registry_handle(), &own));
    }
}
