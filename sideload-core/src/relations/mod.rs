//! Relationship declarations, include parsing, and graph traversal.
//!
//! - [`RelationshipDescriptor`] declares how a serializer reaches related resources
//! - [`InclusionTree`] parses dot-separated include paths
//! - [`GraphWalker`] follows the tree across the object graph and collects
//!   the resources that belong in `included`
//!
//! ## Example
//!
//! ```rust
//! use sideload_core::InclusionTree;
//!
//! let tree: InclusionTree = "comments.author,author".parse().unwrap();
//! assert!(tree.contains("comments"));
//! assert_eq!(tree.linkage_names(), vec!["comments", "author"]);
//! ```

mod descriptor;
mod include;
mod walker;

pub use descriptor::{Cardinality, Related, RelationshipDescriptor, RelationshipMap, RelationshipOptions};
pub use include::{InclusionNode, InclusionTree, normalize_paths};
pub use walker::{Discovered, DiscoveryAccumulator, GraphWalker, ResourceKey};
