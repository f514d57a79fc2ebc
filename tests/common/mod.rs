//! Blog domain shared by the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::json;
use sideload::prelude::*;

pub struct User {
    pub id: u64,
    pub first_name: String,
}

impl Resource for User {}

pub struct Comment {
    pub id: u64,
    pub body: String,
    pub author: Option<Arc<User>>,
    pub post: Mutex<Option<Arc<Post>>>,
}

impl Resource for Comment {}

pub struct Post {
    pub id: u64,
    pub title: String,
    pub author: Option<Arc<User>>,
    pub comments: Vec<Arc<Comment>>,
}

impl Resource for Post {}

pub fn user(id: u64, first_name: &str) -> Arc<User> {
    Arc::new(User {
        id,
        first_name: first_name.to_string(),
    })
}

pub fn comment(id: u64, body: &str, author: Option<Arc<User>>) -> Arc<Comment> {
    Arc::new(Comment {
        id,
        body: body.to_string(),
        author,
        post: Mutex::new(None),
    })
}

/// A post whose comments point back at it.
pub fn post(id: u64, title: &str, author: Option<Arc<User>>, comments: Vec<Arc<Comment>>) -> Arc<Post> {
    let post = Arc::new(Post {
        id,
        title: title.to_string(),
        author,
        comments,
    });
    for comment in &post.comments {
        *comment.post.lock() = Some(Arc::clone(&post));
    }
    post
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
            attributes.insert(self.format_name("first_name"), json!(user.first_name));
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
        RelationshipMap::from([
            (
                "author".to_string(),
                RelationshipDescriptor::has_one(|comment: &Comment, _| {
                    comment.author.clone().map(|user| user as ResourceRef)
                }),
            ),
            (
                "post".to_string(),
                RelationshipDescriptor::has_one(|comment: &Comment, _| {
                    comment.post.lock().clone().map(|post| post as ResourceRef)
                }),
            ),
        ])
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
        RelationshipMap::from([(
            "comments".to_string(),
            RelationshipDescriptor::has_many(|post: &Post, _| {
                post.comments
                    .iter()
                    .map(|comment| Arc::clone(comment) as ResourceRef)
                    .collect()
            }),
        )])
    }
}

/// A fresh registry with the blog serializers.
pub fn registry() -> Arc<SerializerRegistry> {
    let registry = SerializerRegistry::new();
    registry
        .register("Post", PostSerializer::default)
        .register("Comment", CommentSerializer::default)
        .register("User", UserSerializer::default);
    Arc::new(registry)
}

/// Options resolving through a fresh blog registry.
pub fn options() -> SerializeOptions {
    SerializeOptions::new().registry(registry())
}
