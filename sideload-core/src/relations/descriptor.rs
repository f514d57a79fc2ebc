//! Relationship descriptors declared by serializers.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::context::SerializationContext;
use crate::resource::{Resource, ResourceRef};
use crate::serializer::Serializer;

/// Cardinality of a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    /// To-one relationship (e.g., Comment has one author).
    One,
    /// To-many relationship (e.g., Post has many comments).
    Many,
}

impl Cardinality {
    /// Check if this relationship yields a single resource.
    pub fn is_one(&self) -> bool {
        matches!(self, Self::One)
    }

    /// Check if this relationship yields a sequence of resources.
    pub fn is_many(&self) -> bool {
        matches!(self, Self::Many)
    }
}

/// Relationship-scoped options threaded through recursion.
#[derive(Clone)]
pub struct RelationshipOptions {
    /// Serializer used for the related resources instead of registry lookup.
    pub serializer: Option<Arc<dyn Serializer>>,
    /// Caller context handed to the related resources in place of the parent's.
    pub context: Option<Arc<dyn Any + Send + Sync>>,
    /// Emit `self`/`related` relationship links (when a base URL is set).
    pub include_links: bool,
    /// Always emit resource linkage, even when the relationship is not included.
    pub include_data: bool,
}

impl Default for RelationshipOptions {
    fn default() -> Self {
        Self {
            serializer: None,
            context: None,
            include_links: true,
            include_data: false,
        }
    }
}

impl fmt::Debug for RelationshipOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelationshipOptions")
            .field("serializer", &self.serializer.is_some())
            .field("context", &self.context.is_some())
            .field("include_links", &self.include_links)
            .field("include_data", &self.include_data)
            .finish()
    }
}

type HasOneFn = dyn Fn(&dyn Resource, &SerializationContext) -> Option<ResourceRef> + Send + Sync;
type HasManyFn = dyn Fn(&dyn Resource, &SerializationContext) -> Vec<ResourceRef> + Send + Sync;

#[derive(Clone)]
enum Resolver {
    One(Arc<HasOneFn>),
    Many(Arc<HasManyFn>),
}

/// Related resources returned by a descriptor.
#[derive(Debug, Clone)]
pub enum Related {
    /// Result of a to-one relationship.
    One(Option<ResourceRef>),
    /// Result of a to-many relationship.
    Many(Vec<ResourceRef>),
}

impl Related {
    /// Check if nothing is related.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::One(one) => one.is_none(),
            Self::Many(many) => many.is_empty(),
        }
    }

    /// Flatten into an ordered sequence.
    pub fn into_vec(self) -> Vec<ResourceRef> {
        match self {
            Self::One(one) => one.into_iter().collect(),
            Self::Many(many) => many,
        }
    }
}

/// A declared relationship: cardinality, resolver, and options.
///
/// ```rust
/// use std::sync::Arc;
/// use sideload_core::{Cardinality, RelationshipDescriptor, Resource, ResourceRef};
///
/// struct User;
/// impl Resource for User {}
///
/// struct Post {
///     author: Option<Arc<User>>,
/// }
/// impl Resource for Post {}
///
/// let author = RelationshipDescriptor::has_one(|post: &Post, _| {
///     post.author.clone().map(|user| user as ResourceRef)
/// });
/// assert_eq!(author.cardinality(), Cardinality::One);
/// ```
#[derive(Clone)]
pub struct RelationshipDescriptor {
    resolver: Resolver,
    options: RelationshipOptions,
}

impl RelationshipDescriptor {
    /// Declare a to-one relationship on parents of type `T`.
    pub fn has_one<T, F>(resolve: F) -> Self
    where
        T: Resource,
        F: Fn(&T, &SerializationContext) -> Option<ResourceRef> + Send + Sync + 'static,
    {
        let resolver = move |parent: &dyn Resource, ctx: &SerializationContext| {
            parent
                .downcast_ref::<T>()
                .and_then(|parent| resolve(parent, ctx))
        };
        Self {
            resolver: Resolver::One(Arc::new(resolver)),
            options: RelationshipOptions::default(),
        }
    }

    /// Declare a to-many relationship on parents of type `T`.
    pub fn has_many<T, F>(resolve: F) -> Self
    where
        T: Resource,
        F: Fn(&T, &SerializationContext) -> Vec<ResourceRef> + Send + Sync + 'static,
    {
        let resolver = move |parent: &dyn Resource, ctx: &SerializationContext| {
            parent
                .downcast_ref::<T>()
                .map(|parent| resolve(parent, ctx))
                .unwrap_or_default()
        };
        Self {
            resolver: Resolver::Many(Arc::new(resolver)),
            options: RelationshipOptions::default(),
        }
    }

    /// Replace all options.
    pub fn with_options(mut self, options: RelationshipOptions) -> Self {
        self.options = options;
        self
    }

    /// Serialize the related resources with `serializer`.
    pub fn serializer<S: Serializer>(mut self, serializer: S) -> Self {
        self.options.serializer = Some(Arc::new(serializer));
        self
    }

    /// Hand the related resources a different caller context.
    pub fn context<C: Any + Send + Sync>(mut self, context: C) -> Self {
        self.options.context = Some(Arc::new(context));
        self
    }

    /// Toggle relationship links.
    pub fn include_links(mut self, include: bool) -> Self {
        self.options.include_links = include;
        self
    }

    /// Toggle unconditional resource linkage.
    pub fn include_data(mut self, include: bool) -> Self {
        self.options.include_data = include;
        self
    }

    /// Get the cardinality.
    pub fn cardinality(&self) -> Cardinality {
        match self.resolver {
            Resolver::One(_) => Cardinality::One,
            Resolver::Many(_) => Cardinality::Many,
        }
    }

    /// Get the options.
    pub fn options(&self) -> &RelationshipOptions {
        &self.options
    }

    /// Resolve the related resources of `parent`.
    ///
    /// A parent of an unexpected concrete type resolves to nothing.
    pub fn resolve(&self, parent: &dyn Resource, ctx: &SerializationContext) -> Related {
        match &self.resolver {
            Resolver::One(resolve) => Related::One(resolve(parent, ctx)),
            Resolver::Many(resolve) => Related::Many(resolve(parent, ctx)),
        }
    }
}

impl fmt::Debug for RelationshipDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelationshipDescriptor")
            .field("cardinality", &self.cardinality())
            .field("options", &self.options)
            .finish()
    }
}

/// Declared relationships of a serializer, keyed by internal field name.
pub type RelationshipMap = IndexMap<String, RelationshipDescriptor>;
