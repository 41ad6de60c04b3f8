//! json seed data for the in-memory backend.
//!
//! ```json
//! {
//!   "users": [{ "id": "u1", "name": "One", "username": "one" }],
//!   "posts": [{
//!     "id": "p1", "creator": "u1", "caption": "hello",
//!     "image": { "id": "img1", "url": "https://..." },
//!     "likers": ["u2"], "created": "2024-05-01T10:00:00Z"
//!   }],
//!   "saves": [{ "id": "s1", "user": "u1", "post": "p1" }]
//! }
//! ```

use std::path::Path;

use anyhow::{Context as _, Result};
use chrono::Utc;
use serde::Deserialize;

use crate::entities::{
    likers_from_vec, Date, ImageRef, Post, PostId, SavedRecord, SavedRecordId, User, UserId,
};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Fixture {
    #[serde(default)]
    pub users: Vec<FixtureUser>,
    #[serde(default)]
    pub posts: Vec<FixturePost>,
    #[serde(default)]
    pub saves: Vec<FixtureSave>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixtureUser {
    pub id: UserId,
    pub name: String,
    pub username: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixturePost {
    pub id: PostId,
    pub creator: UserId,
    pub caption: String,
    pub image: ImageRef,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub likers: Vec<UserId>,
    pub created: Option<Date>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixtureSave {
    pub id: Option<SavedRecordId>,
    pub user: UserId,
    pub post: PostId,
    pub created: Option<Date>,
}

impl Fixture {
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("malformed fixture")
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read fixture {}", path.display()))?;

        Self::from_json(&raw)
    }

    /// converts to entities. duplicated likers on a post are rejected here.
    pub fn into_entities(self) -> Result<(Vec<User>, Vec<Post>, Vec<SavedRecord>)> {
        let Self {
            users,
            posts,
            saves,
        } = self;

        let users = users
            .into_iter()
            .map(|FixtureUser { id, name, username }| User { id, name, username })
            .collect();

        let posts = posts
            .into_iter()
            .map(|p| -> Result<Post> {
                let likers = likers_from_vec(p.likers)
                    .with_context(|| format!("fixture post {}", p.id))?;

                Ok(Post {
                    id: p.id,
                    creator: p.creator,
                    caption: p.caption,
                    image: p.image,
                    location: p.location,
                    tags: p.tags,
                    likers,
                    created: p.created.unwrap_or_else(Utc::now),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let saves = saves
            .into_iter()
            .map(|s| SavedRecord {
                id: s.id.unwrap_or_else(SavedRecordId::new_v4),
                user: s.user,
                post: s.post,
                created: s.created.unwrap_or_else(Utc::now),
            })
            .collect();

        Ok((users, posts, saves))
    }
}
