//! Document model.
//!
//! These types mirror the JSON:API top-level and resource object shapes.
//! Optional members are skipped when empty or absent, so a serialized
//! resource never carries `"relationships": {}` or `"meta": null`.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// Attribute members of a resource object, in declaration order.
pub type Attributes = IndexMap<String, Value>;

/// Link members (`self`, `related`, ...).
pub type Links = IndexMap<String, Value>;

/// Relationship members of a resource object, keyed by external name.
pub type Relationships = IndexMap<String, RelationshipObject>;

/// Minimal `{type, id}` reference to a resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResourceIdentifier {
    /// Resource type.
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Resource id.
    pub id: String,
}

impl ResourceIdentifier {
    /// Create a new identifier.
    pub fn new(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }
}

/// Resource linkage of a relationship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ResourceLinkage {
    /// To-one linkage; `None` renders as `null`.
    ToOne(Option<ResourceIdentifier>),
    /// To-many linkage; empty renders as `[]`.
    ToMany(Vec<ResourceIdentifier>),
}

impl ResourceLinkage {
    /// Iterate over the linked identifiers.
    pub fn identifiers(&self) -> impl Iterator<Item = &ResourceIdentifier> {
        let (one, many) = match self {
            Self::ToOne(one) => (one.as_ref(), &[][..]),
            Self::ToMany(many) => (None, many.as_slice()),
        };
        one.into_iter().chain(many.iter())
    }
}

/// A relationship member: `{links?, data?}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RelationshipObject {
    /// Relationship links.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub links: Links,
    /// Resource linkage, present only when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResourceLinkage>,
}

impl RelationshipObject {
    /// Check if neither links nor linkage is present.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty() && self.data.is_none()
    }
}

/// A resource object: `{type, id?, attributes?, links?, relationships?, jsonapi?, meta?}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceObject {
    /// Resource type.
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Resource id; absent for resources not yet persisted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Attribute members.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: Attributes,
    /// Link members.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub links: Links,
    /// Relationship members.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub relationships: Relationships,
    /// Per-resource `jsonapi` member.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jsonapi: Option<Value>,
    /// Per-resource `meta` member.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl ResourceObject {
    /// The `{type, id}` identifier of this resource, if it has an id.
    pub fn identifier(&self) -> Option<ResourceIdentifier> {
        self.id
            .as_ref()
            .map(|id| ResourceIdentifier::new(&self.resource_type, id))
    }

    /// Look up a relationship member by external name.
    pub fn relationship(&self, name: &str) -> Option<&RelationshipObject> {
        self.relationships.get(name)
    }
}

/// Primary data: `null`, one resource object, or an array of them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PrimaryData {
    /// No resource (`null`).
    Null,
    /// A single resource.
    Single(Box<ResourceObject>),
    /// A collection; empty renders as `[]`.
    Collection(Vec<ResourceObject>),
}

impl PrimaryData {
    /// Check if the primary data is `null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Get the single resource, if any.
    pub fn as_single(&self) -> Option<&ResourceObject> {
        match self {
            Self::Single(resource) => Some(resource),
            _ => None,
        }
    }

    /// Get the collection, if any.
    pub fn as_collection(&self) -> Option<&[ResourceObject]> {
        match self {
            Self::Collection(resources) => Some(resources),
            _ => None,
        }
    }
}

/// A top-level document: `{data, included?, jsonapi?, meta?, links?}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    /// Primary data.
    pub data: PrimaryData,
    /// Related resources, present whenever include paths were requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub included: Option<Vec<ResourceObject>>,
    /// Top-level `jsonapi` member.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jsonapi: Option<Value>,
    /// Top-level `meta` member.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
    /// Top-level `links` member.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<Value>,
}

impl Document {
    /// Convert to a JSON value.
    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }

    /// Render as a JSON string.
    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Find an included resource by type and id.
    pub fn find_included(&self, resource_type: &str, id: &str) -> Option<&ResourceObject> {
        self.included.as_deref()?.iter().find(|resource| {
            resource.resource_type == resource_type && resource.id.as_deref() == Some(id)
        })
    }
}

/// An errors document: `{errors, jsonapi?, meta?}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorDocument {
    /// Error objects.
    pub errors: Vec<Value>,
    /// Top-level `jsonapi` member.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jsonapi: Option<Value>,
    /// Top-level `meta` member.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl ErrorDocument {
    /// Convert to a JSON value.
    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}
