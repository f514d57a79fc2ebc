//! The per-type serializer capability set.
//!
//! A serializer only has to say how to read an id; everything else has a
//! default. Relationship declarations drive both the default
//! `relationships` member and include validation.
//!
//! ```rust
//! use std::sync::Arc;
//! use serde_json::json;
//! use sideload_core::{Attributes, Resource, SerializationContext, Serializer};
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
//! ```

use convert_case::{Case, Casing};
use serde_json::Value;

use crate::context::SerializationContext;
use crate::document::{
    Attributes, Links, RelationshipObject, Relationships, ResourceIdentifier, ResourceLinkage,
};
use crate::error::SerializeResult;
use crate::relations::{Related, RelationshipDescriptor, RelationshipMap};
use crate::resource::Resource;

/// Capabilities a domain type's serializer exposes.
pub trait Serializer: Send + Sync + 'static {
    /// Resource id; `None` or blank marks a resource not yet persisted.
    fn id(&self, object: &dyn Resource, ctx: &SerializationContext) -> Option<String>;

    /// Resource type. Defaults to the pluralized kebab-case type name.
    fn resource_type(&self, object: &dyn Resource, _ctx: &SerializationContext) -> String {
        pluralize(&object.type_name().to_case(Case::Kebab))
    }

    /// Attribute members.
    fn attributes(&self, _object: &dyn Resource, _ctx: &SerializationContext) -> Attributes {
        Attributes::new()
    }

    /// Link members. Defaults to a `self` link under the configured base URL.
    fn links(&self, object: &dyn Resource, ctx: &SerializationContext) -> Links {
        let mut links = Links::new();
        if let Some(link) = self_link(self, object, ctx) {
            links.insert("self".to_string(), Value::String(link));
        }
        links
    }

    /// Relationship members. Defaults to links and linkage built from the
    /// declared relationships.
    fn relationships(
        &self,
        object: &dyn Resource,
        ctx: &SerializationContext,
    ) -> SerializeResult<Relationships> {
        default_relationships(self, object, ctx)
    }

    /// Per-resource `meta` member.
    fn meta(&self, _object: &dyn Resource, _ctx: &SerializationContext) -> Option<Value> {
        None
    }

    /// Per-resource `jsonapi` member.
    fn jsonapi(&self, _object: &dyn Resource, _ctx: &SerializationContext) -> Option<Value> {
        None
    }

    /// To-one relationships keyed by internal field name.
    fn has_one_relationships(&self) -> RelationshipMap {
        RelationshipMap::new()
    }

    /// To-many relationships keyed by internal field name.
    fn has_many_relationships(&self) -> RelationshipMap {
        RelationshipMap::new()
    }

    /// Internal field name to external name (`author_name` → `author-name`).
    ///
    /// Only underscores separate words, so `editor2` stays `editor2`.
    fn format_name(&self, raw: &str) -> String {
        raw.from_case(Case::Snake).to_case(Case::Kebab)
    }

    /// External name back to the internal field name (`author-name` → `author_name`).
    fn unformat_name(&self, external: &str) -> String {
        external.from_case(Case::Kebab).to_case(Case::Snake)
    }
}

/// `"<base_url>/<type>/<id>"`, when a base URL is configured and the resource has an id.
pub fn self_link<S>(serializer: &S, object: &dyn Resource, ctx: &SerializationContext) -> Option<String>
where
    S: Serializer + ?Sized,
{
    let base_url = ctx.base_url()?;
    let id = serializer.id(object, ctx).filter(|id| !id.is_empty())?;
    Some(format!(
        "{}/{}/{}",
        base_url.trim_end_matches('/'),
        serializer.resource_type(object, ctx),
        id
    ))
}

/// Relationship members built from a serializer's declarations.
///
/// Each declared relationship that passes the field whitelist gets
/// `links.self`/`links.related` when links are enabled and a self link
/// exists, and `data` when its external name is in the context's linkage
/// list or it always includes data. Relationships with neither are skipped.
pub fn default_relationships<S>(
    serializer: &S,
    object: &dyn Resource,
    ctx: &SerializationContext,
) -> SerializeResult<Relationships>
where
    S: Serializer + ?Sized,
{
    let resource_type = serializer.resource_type(object, ctx);
    let link_base = self_link(serializer, object, ctx);
    let declared = serializer
        .has_one_relationships()
        .into_iter()
        .chain(serializer.has_many_relationships());

    let mut relationships = Relationships::new();
    for (name, descriptor) in declared {
        let formatted = serializer.format_name(&name);
        if !ctx.is_field_allowed(&resource_type, &formatted) {
            continue;
        }

        let mut relationship = RelationshipObject::default();
        if let (true, Some(base)) = (descriptor.options().include_links, &link_base) {
            relationship.links.insert(
                "self".to_string(),
                Value::String(format!("{}/relationships/{}", base, formatted)),
            );
            relationship.links.insert(
                "related".to_string(),
                Value::String(format!("{}/{}", base, formatted)),
            );
        }
        if ctx.includes_linkage(&formatted) || descriptor.options().include_data {
            relationship.data = Some(linkage(&descriptor, object, ctx)?);
        }

        if !relationship.is_empty() {
            relationships.insert(formatted, relationship);
        }
    }
    Ok(relationships)
}

/// Resource linkage of one relationship of `object`.
///
/// Related serializers resolve like the walker's: the relationship override,
/// else the serializer pinned for the related type, else the registry.
/// Related resources without an id have no identifier: a to-one renders as
/// `null` and a to-many skips them.
pub fn linkage(
    descriptor: &RelationshipDescriptor,
    object: &dyn Resource,
    ctx: &SerializationContext,
) -> SerializeResult<ResourceLinkage> {
    let child_ctx = ctx.narrow(descriptor.options());
    let identify = |related: &dyn Resource| -> SerializeResult<Option<ResourceIdentifier>> {
        let serializer = match &descriptor.options().serializer {
            Some(serializer) => serializer.clone(),
            None => child_ctx.resolve_pinned(related)?,
        };
        let id = serializer
            .id(related, &child_ctx)
            .filter(|id| !id.trim().is_empty());
        Ok(id.map(|id| ResourceIdentifier::new(serializer.resource_type(related, &child_ctx), id)))
    };

    Ok(match descriptor.resolve(object, ctx) {
        Related::One(None) => ResourceLinkage::ToOne(None),
        Related::One(Some(related)) => ResourceLinkage::ToOne(identify(related.as_ref())?),
        Related::Many(many) => {
            let mut identifiers = Vec::with_capacity(many.len());
            for related in &many {
                identifiers.extend(identify(related.as_ref())?);
            }
            ResourceLinkage::ToMany(identifiers)
        }
    })
}

/// Naive English pluralization for default resource types.
pub fn pluralize(word: &str) -> String {
    let consonant_y = word.ends_with('y')
        && !word.ends_with("ay")
        && !word.ends_with("ey")
        && !word.ends_with("oy")
        && !word.ends_with("uy");
    if consonant_y {
        format!("{}ies", &word[..word.len() - 1])
    } else if ["s", "x", "z", "ch", "sh"].iter().any(|end| word.ends_with(end)) {
        format!("{}es", word)
    } else {
        format!("{}s", word)
    }
}
