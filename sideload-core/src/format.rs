//! Resource formatting.
//!
//! Turns one domain object into a [`ResourceObject`] by reading each
//! serializer member once and dropping the empty ones.

use crate::context::SerializationContext;
use crate::document::ResourceObject;
use crate::error::SerializeResult;
use crate::resource::{Resource, ResourceRef};
use crate::serializer::Serializer;

/// Format one optional object, resolving its serializer through the context.
pub fn format_one(
    object: Option<&dyn Resource>,
    ctx: &SerializationContext,
) -> SerializeResult<Option<ResourceObject>> {
    let Some(object) = object else {
        return Ok(None);
    };
    let serializer = ctx.resolve_serializer(object)?;
    format_with(serializer.as_ref(), object, ctx).map(Some)
}

/// Format a sequence of objects, preserving order.
pub fn format_many(
    objects: &[ResourceRef],
    ctx: &SerializationContext,
) -> SerializeResult<Vec<ResourceObject>> {
    objects
        .iter()
        .map(|object| {
            let serializer = ctx.resolve_serializer(object.as_ref())?;
            format_with(serializer.as_ref(), object.as_ref(), ctx)
        })
        .collect()
}

/// Format one object with a known serializer.
///
/// A blank id is omitted; empty attribute, link, and relationship maps are
/// omitted when rendered; a `null` meta or jsonapi member is dropped.
pub fn format_with(
    serializer: &dyn Serializer,
    object: &dyn Resource,
    ctx: &SerializationContext,
) -> SerializeResult<ResourceObject> {
    let resource_type = serializer.resource_type(object, ctx);
    let id = serializer.id(object, ctx).filter(|id| !id.trim().is_empty());

    let mut attributes = serializer.attributes(object, ctx);
    if let Some(allowed) = ctx.fields_for(&resource_type) {
        attributes.retain(|name, _| allowed.iter().any(|field| field == name));
    }

    Ok(ResourceObject {
        id,
        attributes,
        links: serializer.links(object, ctx),
        relationships: serializer.relationships(object, ctx)?,
        jsonapi: serializer.jsonapi(object, ctx).filter(|v| !v.is_null()),
        meta: serializer.meta(object, ctx).filter(|v| !v.is_null()),
        resource_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{self, PostSerializer};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_format_post_without_relationships() {
        let ctx = fixtures::context();
        let post = fixtures::post(1, "Hello", None, Vec::new());

        let formatted = format_one(Some(post.as_ref()), &ctx).unwrap().unwrap();
        assert_eq!(
            serde_json::to_value(&formatted).unwrap(),
            json!({"type": "posts", "id": "1", "attributes": {"title": "Hello"}})
        );
    }

    #[test]
    fn test_format_none() {
        let ctx = fixtures::context();
        assert_eq!(format_one(None, &ctx).unwrap(), None);
    }

    #[test]
    fn test_blank_id_is_omitted() {
        struct Draft;
        impl Resource for Draft {}

        struct DraftSerializer;
        impl Serializer for DraftSerializer {
            fn id(&self, _: &dyn Resource, _: &SerializationContext) -> Option<String> {
                Some("  ".to_string())
            }
        }

        let ctx = fixtures::context();
        let formatted = format_with(&DraftSerializer, &Draft, &ctx).unwrap();
        assert_eq!(formatted.resource_type, "drafts");
        assert_eq!(formatted.id, None);
        assert!(serde_json::to_value(&formatted).unwrap().get("id").is_none());
    }

    #[test]
    fn test_attribute_whitelist() {
        let ctx = fixtures::context().with_fields(crate::FieldWhitelist::from([(
            "posts".to_string(),
            vec!["body".to_string()],
        )]));
        let post = fixtures::post(1, "Hello", None, Vec::new());

        let formatted = format_with(&PostSerializer, post.as_ref(), &ctx).unwrap();
        assert!(formatted.attributes.is_empty());
    }

    #[test]
    fn test_format_many_keeps_order() {
        let ctx = fixtures::context();
        let users: Vec<ResourceRef> = vec![
            fixtures::user(2, "B") as ResourceRef,
            fixtures::user(1, "A") as ResourceRef,
        ];

        let formatted = format_many(&users, &ctx).unwrap();
        let ids: Vec<_> = formatted.iter().filter_map(|r| r.id.clone()).collect();
        assert_eq!(ids, ["2", "1"]);
    }

    #[test]
    fn test_unregistered_type_fails() {
        struct Stray;
        impl Resource for Stray {}

        let ctx = fixtures::context();
        let stray: &dyn Resource = &Stray;
        let err = format_one(Some(stray), &ctx).unwrap_err();
        assert!(err.is_serializer_not_found());
    }
}
