//! # Sideload
//!
//! JSON:API compound documents for Rust domain objects.
//!
//! Sideload provides:
//! - Per-type serializers registered once and resolved by runtime type
//! - Include paths with full linkage: `comments.author` includes the comments too
//! - Deduplicated `included` arrays, even across cyclic object graphs
//! - Explicit single-versus-collection intent, never inferred from input shape
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use serde_json::json;
//! use sideload::prelude::*;
//!
//! struct User {
//!     id: u64,
//! }
//! impl Resource for User {}
//!
//! struct Post {
//!     id: u64,
//!     author: Arc<User>,
//! }
//! impl Resource for Post {}
//!
//! #[derive(Default)]
//! struct UserSerializer;
//! impl Serializer for UserSerializer {
//!     fn id(&self, object: &dyn Resource, _ctx: &SerializationContext) -> Option<String> {
//!         object.downcast_ref::<User>().map(|user| user.id.to_string())
//!     }
//! }
//!
//! #[derive(Default)]
//! struct PostSerializer;
//! impl Serializer for PostSerializer {
//!     fn id(&self, object: &dyn Resource, _ctx: &SerializationContext) -> Option<String> {
//!         object.downcast_ref::<Post>().map(|post| post.id.to_string())
//!     }
//!
//!     fn has_one_relationships(&self) -> RelationshipMap {
//!         RelationshipMap::from([(
//!             "author".to_string(),
//!             RelationshipDescriptor::has_one(|post: &Post, _| {
//!                 Some(post.author.clone() as ResourceRef)
//!             }),
//!         )])
//!     }
//! }
//!
//! let registry = Arc::new(SerializerRegistry::new());
//! registry
//!     .register("Post", PostSerializer::default)
//!     .register("User", UserSerializer::default);
//!
//! let post = Arc::new(Post { id: 1, author: Arc::new(User { id: 7 }) });
//! let options = SerializeOptions::single().include(["author"]).registry(registry);
//! let document = serialize(post, &options).unwrap();
//!
//! assert_eq!(
//!     document.to_value().unwrap(),
//!     json!({
//!         "data": {
//!             "type": "posts",
//!             "id": "1",
//!             "relationships": {"author": {"data": {"type": "users", "id": "7"}}}
//!         },
//!         "included": [{"type": "users", "id": "7"}]
//!     })
//! );
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub use sideload_core::*;
