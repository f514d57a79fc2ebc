//! Top-level document assembly.
//!
//! [`serialize`] walks the include paths from every primary object, then
//! formats the primary data and what the walk discovered into `included`. [`serialize_errors`] builds an errors document.

use std::sync::Arc;

use convert_case::{Case, Casing};
use indexmap::IndexMap;
use serde_json::{Value, json};
use tracing::debug;

use crate::context::{SerializationContext, SerializerPins};
use crate::document::{Document, ErrorDocument, PrimaryData, ResourceObject};
use crate::error::{SerializeError, SerializeResult};
use crate::format::{format_many, format_one, format_with};
use crate::options::SerializeOptions;
use crate::relations::{DiscoveryAccumulator, GraphWalker, InclusionTree};
use crate::resource::{Resource, ResourceRef};

/// Primary data handed to [`serialize`].
///
/// Typed handles convert with `into()`; type-erased handles are wrapped in
/// a variant directly. The variant says what was passed; whether it is
/// rendered as a collection is still decided by
/// [`SerializeOptions::is_collection`].
#[derive(Debug, Clone, Default)]
pub enum Data {
    /// No resource.
    #[default]
    Null,
    /// One resource.
    One(ResourceRef),
    /// An ordered sequence of resources.
    Many(Vec<ResourceRef>),
}

impl Data {
    /// Check if this is a sequence.
    pub fn is_many(&self) -> bool {
        matches!(self, Self::Many(_))
    }

    /// The primary objects, in order, without the absent one.
    pub fn objects(&self) -> Vec<ResourceRef> {
        match self {
            Self::Null => Vec::new(),
            Self::One(one) => vec![Arc::clone(one)],
            Self::Many(many) => many.clone(),
        }
    }
}

impl<T: Resource> From<Arc<T>> for Data {
    fn from(object: Arc<T>) -> Self {
        Self::One(object)
    }
}

impl<T: Resource> From<Option<Arc<T>>> for Data {
    fn from(object: Option<Arc<T>>) -> Self {
        object.map_or(Self::Null, |object| Self::One(object))
    }
}

impl<T: Resource> From<Vec<Arc<T>>> for Data {
    fn from(objects: Vec<Arc<T>>) -> Self {
        Self::Many(objects.into_iter().map(|object| object as ResourceRef).collect())
    }
}

/// Serialize primary data into a compound document.
///
/// # Errors
///
/// - [`ErrorCode::AmbiguousCollection`](crate::ErrorCode::AmbiguousCollection)
///   when the collection flag is missing for a sequence or set for a single object
/// - [`ErrorCode::InvalidInclude`](crate::ErrorCode::InvalidInclude) for an
///   include segment that is not a declared relationship in external casing
/// - [`ErrorCode::SerializerNotFound`](crate::ErrorCode::SerializerNotFound)
///   when an object's type has no registered serializer
///
/// No partial document is returned on error.
pub fn serialize(data: impl Into<Data>, options: &SerializeOptions) -> SerializeResult<Document> {
    let data = data.into();
    let is_collection = check_collection(&data, options)?;

    let tree = options.include.as_ref().map(InclusionTree::parse);
    let mut ctx = SerializationContext::from_options(options);
    if let Some(tree) = &tree {
        ctx = ctx.with_include_linkages(tree.linkage_names());
    }
    debug!(
        is_collection,
        include_paths = options.include_paths().len(),
        namespace = ?options.namespace,
        "serialize()"
    );

    let objects = data.objects();
    // Walk before formatting so linkage resolves through the walk's pins.
    let included = match &tree {
        Some(tree) => {
            let (discovered, pins) = walk_included(&objects, tree, &ctx)?;
            ctx = ctx.with_pins(Arc::clone(&pins));
            Some(format_included(discovered, &pins)?)
        }
        None => None,
    };

    let primary = if is_collection {
        PrimaryData::Collection(format_many(&objects, &ctx)?)
    } else {
        match format_one(objects.first().map(|object| object.as_ref()), &ctx)? {
            Some(resource) => PrimaryData::Single(Box::new(resource)),
            None => PrimaryData::Null,
        }
    };

    Ok(Document {
        data: primary,
        included,
        jsonapi: options.jsonapi.clone(),
        meta: options.meta.clone(),
        links: options.links.clone(),
    })
}

/// Decide whether the primary data renders as a collection.
fn check_collection(data: &Data, options: &SerializeOptions) -> SerializeResult<bool> {
    if options.skip_collection_check {
        return Ok(data.is_many() || options.is_collection == Some(true));
    }
    match (data, options.is_collection) {
        (Data::Many(_), Some(true)) => Ok(true),
        (Data::Many(_), _) => Err(SerializeError::missing_collection_flag().with_context("serialize")),
        (_, Some(true)) => Err(SerializeError::single_as_collection().with_context("serialize")),
        (_, _) => Ok(false),
    }
}

fn walk_included(
    objects: &[ResourceRef],
    tree: &InclusionTree,
    ctx: &SerializationContext,
) -> SerializeResult<(DiscoveryAccumulator, Arc<SerializerPins>)> {
    let mut walker = GraphWalker::new();
    for object in objects {
        walker.walk(object.as_ref(), tree.root(), ctx)?;
    }
    let (discovered, pins) = walker.into_parts();
    debug!(
        count = discovered.len(),
        pinned = pins.len(),
        "included resources discovered"
    );
    Ok((discovered, Arc::new(pins)))
}

fn format_included(
    discovered: DiscoveryAccumulator,
    pins: &Arc<SerializerPins>,
) -> SerializeResult<Vec<ResourceObject>> {
    discovered
        .into_entries()
        .map(|(_, entry)| {
            let ctx = entry.format_context().with_pins(Arc::clone(pins));
            format_with(entry.serializer.as_ref(), entry.object.as_ref(), &ctx)
        })
        .collect()
}

/// Errors to render into an errors document.
#[derive(Debug, Clone)]
pub enum RawErrors {
    /// Validation messages keyed by internal attribute name.
    Fields(IndexMap<String, Vec<String>>),
    /// Ready-made error objects, passed through as-is.
    Raw(Vec<Value>),
}

impl From<IndexMap<String, Vec<String>>> for RawErrors {
    fn from(fields: IndexMap<String, Vec<String>>) -> Self {
        Self::Fields(fields)
    }
}

impl From<Vec<Value>> for RawErrors {
    fn from(errors: Vec<Value>) -> Self {
        Self::Raw(errors)
    }
}

/// Build an errors document.
///
/// Field messages become `{source: {pointer}, detail}` objects pointing at
/// the dasherized attribute; raw error objects are passed through.
///
/// ```rust
/// use indexmap::IndexMap;
/// use serde_json::json;
/// use sideload_core::{SerializeOptions, serialize_errors};
///
/// let mut fields = IndexMap::new();
/// fields.insert("first_name".to_string(), vec!["can't be blank".to_string()]);
///
/// let document = serialize_errors(fields, &SerializeOptions::new());
/// assert_eq!(
///     document.to_value().unwrap(),
///     json!({"errors": [{
///         "source": {"pointer": "/data/attributes/first-name"},
///         "detail": "can't be blank"
///     }]})
/// );
/// ```
pub fn serialize_errors(raw: impl Into<RawErrors>, options: &SerializeOptions) -> ErrorDocument {
    let errors = match raw.into() {
        RawErrors::Fields(fields) => fields
            .iter()
            .flat_map(|(field, messages)| {
                let attribute = field.from_case(Case::Snake).to_case(Case::Kebab);
                let pointer = format!("/data/attributes/{}", attribute);
                messages.iter().map(move |message| {
                    json!({
                        "source": {"pointer": pointer},
                        "detail": message,
                    })
                })
            })
            .collect(),
        RawErrors::Raw(errors) => errors,
    };
    debug!(count = errors.len(), "serialize_errors()");

    ErrorDocument {
        errors,
        jsonapi: options.jsonapi.clone(),
        meta: options.meta.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{self, Post, User};
    use pretty_assertions::assert_eq;

    fn options() -> SerializeOptions {
        SerializeOptions::new().registry(fixtures::registry())
    }

    #[test]
    fn test_single_without_relationships() {
        let post = fixtures::post(1, "Hello", None, Vec::new());
        let document = serialize(post, &options().is_collection(false)).unwrap();

        assert_eq!(
            document.to_value().unwrap(),
            json!({"data": {"type": "posts", "id": "1", "attributes": {"title": "Hello"}}})
        );
    }

    #[test]
    fn test_null_single() {
        let document = serialize(None::<Arc<Post>>, &options()).unwrap();
        assert_eq!(document.to_value().unwrap(), json!({"data": null}));
    }

    #[test]
    fn test_empty_collection() {
        let document = serialize(Vec::<Arc<Post>>::new(), &options().is_collection(true)).unwrap();
        assert_eq!(document.to_value().unwrap(), json!({"data": []}));
    }

    #[test]
    fn test_collection_requires_flag() {
        let users = vec![fixtures::user(1, "Ada")];
        let err = serialize(users.clone(), &options()).unwrap_err();
        assert!(err.is_ambiguous_collection());

        let err = serialize(users, &options().is_collection(false)).unwrap_err();
        assert!(err.is_ambiguous_collection());
    }

    #[test]
    fn test_single_rejects_collection_flag() {
        let err = serialize(fixtures::user(1, "Ada"), &options().is_collection(true)).unwrap_err();
        assert!(err.is_ambiguous_collection());

        let err = serialize(None::<Arc<User>>, &options().is_collection(true)).unwrap_err();
        assert!(err.is_ambiguous_collection());
    }

    #[test]
    fn test_skip_collection_check() {
        let skip = options().skip_collection_check(true);

        let document = serialize(vec![fixtures::user(1, "Ada")], &skip).unwrap();
        assert!(document.data.as_collection().is_some());

        let document = serialize(fixtures::user(1, "Ada"), &skip.clone().is_collection(true)).unwrap();
        assert_eq!(document.data.as_collection().map(<[_]>::len), Some(1));

        let document = serialize(None::<Arc<User>>, &skip.is_collection(true)).unwrap();
        assert_eq!(document.to_value().unwrap(), json!({"data": []}));
    }

    #[test]
    fn test_compound_document() {
        let author = fixtures::user(9, "Bo");
        let post = fixtures::post(
            1,
            "Hello",
            None,
            vec![
                fixtures::comment(1, "First", Some(author.clone())),
                fixtures::comment(2, "Second", Some(author)),
            ],
        );

        let document = serialize(
            post,
            &options().include(["comments", "comments.author"]),
        )
        .unwrap();
        let value = document.to_value().unwrap();

        assert_eq!(
            value["data"]["relationships"],
            json!({"comments": {"data": [
                {"type": "comments", "id": "1"},
                {"type": "comments", "id": "2"}
            ]}})
        );
        assert_eq!(
            value["included"],
            json!([
                {
                    "type": "comments",
                    "id": "1",
                    "attributes": {"body": "First"},
                    "relationships": {"author": {"data": {"type": "users", "id": "9"}}}
                },
                {
                    "type": "comments",
                    "id": "2",
                    "attributes": {"body": "Second"},
                    "relationships": {"author": {"data": {"type": "users", "id": "9"}}}
                },
                {"type": "users", "id": "9", "attributes": {"name": "Bo"}}
            ])
        );
    }

    #[test]
    fn test_included_shared_across_primary_collection() {
        let author = fixtures::user(9, "Bo");
        let posts = vec![
            fixtures::post(1, "One", Some(author.clone()), Vec::new()),
            fixtures::post(2, "Two", Some(author), Vec::new()),
        ];

        let document = serialize(posts, &options().is_collection(true).include(["author"])).unwrap();

        assert_eq!(document.included.as_ref().map(Vec::len), Some(1));
        assert!(document.find_included("users", "9").is_some());
    }

    #[test]
    fn test_empty_include_list_yields_empty_included() {
        let post = fixtures::post(1, "Hello", None, Vec::new());
        let document = serialize(post, &options().include(Vec::<String>::new())).unwrap();
        assert_eq!(document.included, Some(Vec::new()));
    }

    #[test]
    fn test_invalid_include_aborts() {
        let post = fixtures::post(1, "Hello", None, Vec::new());
        let err = serialize(post, &options().include(["tags"])).unwrap_err();
        assert!(err.is_invalid_include());
    }

    #[test]
    fn test_top_level_members() {
        let document = serialize(
            None::<Arc<Post>>,
            &options()
                .jsonapi(json!({"version": "1.0"}))
                .meta(json!({"total": 0}))
                .links(json!({"self": "/posts"})),
        )
        .unwrap();

        assert_eq!(
            document.to_value().unwrap(),
            json!({
                "data": null,
                "jsonapi": {"version": "1.0"},
                "meta": {"total": 0},
                "links": {"self": "/posts"}
            })
        );
    }

    #[test]
    fn test_serialize_errors_passthrough() {
        let raw = vec![json!({"status": "422", "title": "Invalid"})];
        let document = serialize_errors(raw, &SerializeOptions::new().meta(json!({"count": 1})));

        assert_eq!(
            document.to_value().unwrap(),
            json!({"errors": [{"status": "422", "title": "Invalid"}], "meta": {"count": 1}})
        );
    }

    #[test]
    fn test_serialize_errors_one_object_per_message() {
        let fields = IndexMap::from([(
            "title".to_string(),
            vec!["is too short".to_string(), "is reserved".to_string()],
        )]);
        let document = serialize_errors(fields, &SerializeOptions::new());

        assert_eq!(document.errors.len(), 2);
        assert_eq!(document.errors[1]["detail"], json!("is reserved"));
        assert_eq!(
            document.errors[0]["source"]["pointer"],
            json!("/data/attributes/title")
        );
    }

    #[test]
    fn test_serialize_errors_keeps_digits_in_pointer() {
        let fields = IndexMap::from([("address2_line".to_string(), vec!["is blank".to_string()])]);
        let document = serialize_errors(fields, &SerializeOptions::new());

        assert_eq!(
            document.errors[0]["source"]["pointer"],
            json!("/data/attributes/address2-line")
        );
    }
}
