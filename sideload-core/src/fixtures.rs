//! Blog domain shared by unit tests.

use std::sync::Arc;

use serde_json::json;

use crate::context::SerializationContext;
use crate::document::Attributes;
use crate::registry::SerializerRegistry;
use crate::relations::{RelationshipDescriptor, RelationshipMap};
use crate::resource::{Resource, ResourceRef};
use crate::serializer::Serializer;

pub struct User {
    pub id: u64,
    pub name: String,
}

impl Resource for User {}

pub struct Comment {
    pub id: u64,
    pub body: String,
    pub author: Option<Arc<User>>,
}

impl Resource for Comment {}

pub struct Post {
    pub id: u64,
    pub title: String,
    pub author: Option<Arc<User>>,
    pub comments: Vec<Arc<Comment>>,
}

impl Resource for Post {}

pub fn user(id: u64, name: &str) -> Arc<User> {
    Arc::new(User {
        id,
        name: name.to_string(),
    })
}

pub fn comment(id: u64, body: &str, author: Option<Arc<User>>) -> Arc<Comment> {
    Arc::new(Comment {
        id,
        body: body.to_string(),
        author,
    })
}

pub fn post(id: u64, title: &str, author: Option<Arc<User>>, comments: Vec<Arc<Comment>>) -> Arc<Post> {
    Arc::new(Post {
        id,
        title: title.to_string(),
        author,
        comments,
    })
}

#[derive(Default)]
pub struct UserSerializer;

impl Serializer for UserSerializer {
    fn id(&self, object: &dyn Resource, _ctx: &SerializationContext) -> Option<String> {
        object.downcast_ref::<User>().map(|user| user.id.to_string())
    }

    fn attributes(&self, object: &dyn Resource, _ctx: &SerializationContext) -> Attributes {
        let mut attributes = Attributes::new();
        if let Some(user) = object.downcast_ref::<User>() {
            attributes.insert("name".to_string(), json!(user.name));
        }
        attributes
    }
}

#[derive(Default)]
pub struct CommentSerializer;

impl Serializer for CommentSerializer {
    fn id(&self, object: &dyn Resource, _ctx: &SerializationContext) -> Option<String> {
        object.downcast_ref::<Comment>().map(|comment| comment.id.to_string())
    }

    fn attributes(&self, object: &dyn Resource, _ctx: &SerializationContext) -> Attributes {
        let mut attributes = Attributes::new();
        if let Some(comment) = object.downcast_ref::<Comment>() {
            attributes.insert("body".to_string(), json!(comment.body));
        }
        attributes
    }

    fn has_one_relationships(&self) -> RelationshipMap {
        RelationshipMap::from([(
            "author".to_string(),
            RelationshipDescriptor::has_one(|comment: &Comment, _| {
                comment.author.clone().map(|user| user as ResourceRef)
            }),
        )])
    }
}

#[derive(Default)]
pub struct PostSerializer;

impl Serializer for PostSerializer {
    fn id(&self, object: &dyn Resource, _ctx: &SerializationContext) -> Option<String> {
        object.downcast_ref::<Post>().map(|post| post.id.to_string())
    }

    fn attributes(&self, object: &dyn Resource, _ctx: &SerializationContext) -> Attributes {
        let mut attributes = Attributes::new();
        if let Some(post) = object.downcast_ref::<Post>() {
            attributes.insert("title".to_string(), json!(post.title));
        }
        attributes
    }

    fn has_one_relationships(&self) -> RelationshipMap {
        RelationshipMap::from([(
            "author".to_string(),
            RelationshipDescriptor::has_one(|post: &Post, _| {
                post.author.clone().map(|user| user as ResourceRef)
            }),
        )])
    }

    fn has_many_relationships(&self) -> RelationshipMap {
        let comments = |post: &Post, _: &SerializationContext| -> Vec<ResourceRef> {
            post.comments
                .iter()
                .map(|comment| Arc::clone(comment) as ResourceRef)
                .collect()
        };
        RelationshipMap::from([
            ("comments".to_string(), RelationshipDescriptor::has_many(comments)),
            ("featured_comments".to_string(), RelationshipDescriptor::has_many(comments)),
        ])
    }
}

pub fn registry() -> Arc<SerializerRegistry> {
    let registry = SerializerRegistry::new();
    registry
        .register("Post", PostSerializer::default)
        .register("Comment", CommentSerializer::default)
        .register("User", UserSerializer::default);
    Arc::new(registry)
}

pub fn context() -> SerializationContext {
    SerializationContext::new(registry())
}
