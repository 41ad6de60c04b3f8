use std::collections::HashSet;

use async_trait::async_trait;

use crate::entities::{Post, PostId, SavedRecord, SavedRecordId, User, UserId};

pub mod mock;
pub mod mongo;

pub(crate) type StdResult<T, E> = ::std::result::Result<T, E>;
pub type Result<T> = ::std::result::Result<T, RepositoryError>;

#[async_trait]
pub trait UserRepository {
    async fn insert(&self, item: User) -> Result<bool>;
    async fn find(&self, id: &UserId) -> Result<User>;
}

#[async_trait]
pub trait PostRepository {
    async fn insert(&self, item: Post) -> Result<bool>;
    async fn find(&self, id: &PostId) -> Result<Post>;

    /// overwrites the whole liker set.
    async fn update_likers(&self, id: &PostId, likers: HashSet<UserId>) -> Result<Post>;
}

/// saved records are not unique per (user, post); nothing here enforces it.
#[async_trait]
pub trait SaveRepository {
    async fn insert(&self, item: SavedRecord) -> Result<bool>;
    async fn finds_by_user(&self, user_id: &UserId) -> Result<Vec<SavedRecord>>;
    async fn delete(&self, id: &SavedRecordId) -> Result<SavedRecord>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("cannot find object.")]
    NotFound,
    #[error("expected unique object, found non-unique objects (matched: {matched})")]
    NoUnique { matched: u32 },
    #[error("invalid object: {0}")]
    Invalid(String),
    #[error("internal error: {0}")]
    Internal(anyhow::Error),
}
