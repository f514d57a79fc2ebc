//! Domain object handles.
//!
//! Any `'static` type becomes serializable by implementing [`Resource`]; the
//! implementation is usually empty:
//!
//! ```rust
//! use std::sync::Arc;
//! use sideload_core::{Resource, ResourceRef};
//!
//! struct Post {
//!     id: u64,
//! }
//!
//! impl Resource for Post {}
//!
//! let post: ResourceRef = Arc::new(Post { id: 1 });
//! assert_eq!(post.type_name(), "Post");
//! assert_eq!(post.downcast_ref::<Post>().map(|p| p.id), Some(1));
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Shared, type-erased handle to a domain object.
pub type ResourceRef = Arc<dyn Resource>;

/// Upcast helper so trait objects can be downcast to their concrete type.
#[doc(hidden)]
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A domain object that can be rendered through a [`Serializer`](crate::Serializer).
pub trait Resource: AsAny + Send + Sync + 'static {
    /// Runtime type identifier used as the serializer registry key.
    ///
    /// Defaults to the unqualified Rust type name (`Post` for `blog::Post`).
    fn type_name(&self) -> &str {
        short_type_name(std::any::type_name::<Self>())
    }
}

impl dyn Resource {
    /// Borrow the concrete object if it is a `T`.
    pub fn downcast_ref<T: Resource>(&self) -> Option<&T> {
        AsAny::as_any(self).downcast_ref::<T>()
    }

    /// Check whether the concrete object is a `T`.
    pub fn is<T: Resource>(&self) -> bool {
        AsAny::as_any(self).is::<T>()
    }
}

impl fmt::Debug for dyn Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Resource").field(&self.type_name()).finish()
    }
}

/// Strip the module path and generic arguments from a Rust type name.
pub fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
