use anyhow::anyhow;
use chrono::{DateTime, Utc};
use mongodb::error::{ErrorKind, Result as MongoResult, WriteFailure};

use super::models::{MongoPostImageModel, MongoPostModel, MongoSaveModel, MongoUserModel};
use super::{RepositoryError, Result as RepoResult, StdResult};
use crate::entities::{likers_from_vec, Date, ImageRef, Post, SavedRecord, User};

pub fn convert_repo_err<T, E>(result: StdResult<T, E>) -> RepoResult<T>
where E: Sync + Send + ::std::error::Error + 'static {
    result.map_err(|e| RepositoryError::Internal(anyhow!(e)))
}

/// `Ok(false)` on a duplicate key, the same answer the in-memory insert gives.
pub fn try_unique_check<T>(result: MongoResult<T>) -> RepoResult<bool> {
    let e = match result {
        Ok(_) => return Ok(true),
        Err(e) => e,
    };

    match e.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(we)) if we.code == 11000 => Ok(false),
        _ => Err(RepositoryError::Internal(anyhow!(e))),
    }
}

pub fn convert_404_or<T>(option: Option<T>) -> RepoResult<T> {
    match option {
        Some(t) => Ok(t),
        None => Err(RepositoryError::NotFound),
    }
}

fn parse_date(raw: &str) -> RepoResult<Date> {
    DateTime::parse_from_rfc3339(raw)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Invalid(format!("bad date {:?}: {}", raw, e)))
}

impl From<User> for MongoUserModel {
    fn from(User { id, name, username }: User) -> Self {
        Self {
            id: id.0,
            name,
            username,
        }
    }
}

impl From<MongoUserModel> for User {
    fn from(MongoUserModel { id, name, username }: MongoUserModel) -> Self {
        Self {
            id: id.into(),
            name,
            username,
        }
    }
}

impl From<Post> for MongoPostModel {
    fn from(
        Post {
            id,
            creator,
            caption,
            image,
            location,
            tags,
            likers,
            created,
        }: Post,
    ) -> Self {
        let likers = likers.into_iter().map(|u| u.0).collect::<Vec<_>>();

        Self {
            id: id.0,
            creator: creator.0,
            caption,
            image: MongoPostImageModel {
                id: image.id,
                url: image.url,
            },
            location,
            tags,
            likers_size: likers.len() as i64,
            likers,
            created: created.to_rfc3339(),
        }
    }
}

impl TryFrom<MongoPostModel> for Post {
    type Error = RepositoryError;

    fn try_from(
        MongoPostModel {
            id,
            creator,
            caption,
            image,
            location,
            tags,
            likers,
            likers_size,
            created,
        }: MongoPostModel,
    ) -> RepoResult<Self> {
        if likers.len() as i64 != likers_size {
            return Err(RepositoryError::Invalid(format!(
                "post {}: likers_size {} does not match {} likers",
                id,
                likers_size,
                likers.len()
            )));
        }

        let likers = likers_from_vec(likers.into_iter().map(Into::into))
            .map_err(|e| RepositoryError::Invalid(format!("post {}: {}", id, e)))?;

        Ok(Self {
            created: parse_date(&created)?,
            id: id.into(),
            creator: creator.into(),
            caption,
            image: ImageRef {
                id: image.id,
                url: image.url,
            },
            location,
            tags,
            likers,
        })
    }
}

impl From<SavedRecord> for MongoSaveModel {
    fn from(
        SavedRecord {
            id,
            user,
            post,
            created,
        }: SavedRecord,
    ) -> Self {
        Self {
            id: id.0,
            user: user.0,
            post: post.0,
            created: created.to_rfc3339(),
        }
    }
}

impl TryFrom<MongoSaveModel> for SavedRecord {
    type Error = RepositoryError;

    fn try_from(
        MongoSaveModel {
            id,
            user,
            post,
            created,
        }: MongoSaveModel,
    ) -> RepoResult<Self> {
        Ok(Self {
            created: parse_date(&created)?,
            id: id.into(),
            user: user.into(),
            post: post.into(),
        })
    }
}
