//! # sideload-core
//!
//! Compound-document serialization for JSON:API.
//!
//! This crate turns domain objects into JSON:API documents, including:
//! - Per-type serializers resolved through a registry
//! - Resource objects with attributes, links, relationships, and meta
//! - Include paths (`comments.author`) resolved into a deduplicated `included` array
//! - Errors documents built from validation messages
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use serde_json::json;
//! use sideload_core::prelude::*;
//!
//! struct Post {
//!     id: u64,
//!     title: String,
//! }
//! impl Resource for Post {}
//!
//! #[derive(Default)]
//! struct PostSerializer;
//!
//! impl Serializer for PostSerializer {
//!     fn id(&self, object: &dyn Resource, _ctx: &SerializationContext) -> Option<String> {
//!         object.downcast_ref::<Post>().map(|post| post.id.to_string())
//!     }
//!
//!     fn attributes(&self, object: &dyn Resource, _ctx: &SerializationContext) -> Attributes {
//!         let mut attributes = Attributes::new();
//!         if let Some(post) = object.downcast_ref::<Post>() {
//!             attributes.insert("title".into(), json!(post.title));
//!         }
//!         attributes
//!     }
//! }
//!
//! let registry = Arc::new(SerializerRegistry::new());
//! registry.register("Post", PostSerializer::default);
//!
//! let post = Arc::new(Post { id: 1, title: "Hello".into() });
//! let document = serialize(post, &SerializeOptions::single().registry(registry)).unwrap();
//!
//! assert_eq!(
//!     document.to_value().unwrap(),
//!     json!({"data": {"type": "posts", "id": "1", "attributes": {"title": "Hello"}}})
//! );
//! ```
//!
//! ## Collections
//!
//! The collection shape is never inferred; sequences need
//! [`SerializeOptions::collection`]:
//!
//! ```rust
//! use std::sync::Arc;
//! use serde_json::json;
//! use sideload_core::{ErrorCode, Resource, SerializeOptions, serialize};
//!
//! struct Tag;
//! impl Resource for Tag {}
//!
//! let tags: Vec<Arc<Tag>> = Vec::new();
//!
//! let err = serialize(tags.clone(), &SerializeOptions::new()).unwrap_err();
//! assert_eq!(err.code, ErrorCode::AmbiguousCollection);
//!
//! let document = serialize(tags, &SerializeOptions::collection()).unwrap();
//! assert_eq!(document.to_value().unwrap(), json!({"data": []}));
//! ```
//!
//! ## Include Paths
//!
//! ```rust
//! use sideload_core::InclusionTree;
//!
//! let tree = InclusionTree::parse(["comments.author"]);
//! assert!(tree.get("comments").is_some_and(|node| node.is_included()));
//! assert!(tree.contains("comments.author"));
//! ```

pub mod context;
pub mod document;
pub mod error;
pub mod format;
pub mod logging;
pub mod options;
pub mod registry;
pub mod relations;
pub mod resource;
pub mod serialize;
pub mod serializer;

#[cfg(test)]
mod fixtures;

pub use context::{FieldWhitelist, SerializationContext, SerializerPins};
pub use document::{
    Attributes, Document, ErrorDocument, Links, PrimaryData, RelationshipObject, Relationships,
    ResourceIdentifier, ResourceLinkage, ResourceObject,
};
pub use error::{ErrorCode, ErrorContext, SerializeError, SerializeResult, Suggestion};
pub use format::{format_many, format_one, format_with};
pub use options::SerializeOptions;
pub use registry::{CacheStats, RegistryKey, SerializerRegistry};
pub use relations::{
    Cardinality, Discovered, DiscoveryAccumulator, GraphWalker, InclusionNode, InclusionTree,
    Related, RelationshipDescriptor, RelationshipMap, RelationshipOptions, ResourceKey,
    normalize_paths,
};
pub use resource::{Resource, ResourceRef};
pub use serialize::{Data, RawErrors, serialize, serialize_errors};
pub use serializer::Serializer;

// Re-export logging utilities
pub use logging::{get_log_format, get_log_level, init as init_logging, init_with_level, is_debug_enabled};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::context::SerializationContext;
    pub use crate::document::{Attributes, Document, Links, ResourceObject};
    pub use crate::error::{SerializeError, SerializeResult};
    pub use crate::options::SerializeOptions;
    pub use crate::registry::SerializerRegistry;
    pub use crate::relations::{RelationshipDescriptor, RelationshipMap};
    pub use crate::resource::{Resource, ResourceRef};
    pub use crate::serialize::{Data, serialize, serialize_errors};
    pub use crate::serializer::Serializer;
}
