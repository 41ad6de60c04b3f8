use std::collections::HashSet;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};
use mongodb::{Collection, Database};
use tracing::Instrument;

use super::{
    PostRepository, RepositoryError, Result, SaveRepository, StdResult, UserRepository,
};
use crate::entities::{Post, PostId, SavedRecord, SavedRecordId, User, UserId};
use crate::utils::LetChain;

mod converters;
mod helpers;
mod models;

use converters::{convert_404_or, convert_repo_err, try_unique_check};
use helpers::{get_one, initialize_coll};
use models::{MongoPostModel, MongoSaveModel, MongoUserModel};

pub struct MongoUserRepository {
    coll: Collection<MongoUserModel>,
}

impl MongoUserRepository {
    pub async fn new_with(db: Database, coll_name: &str) -> ::anyhow::Result<Self> {
        initialize_coll(coll_name, &db).await?;

        Ok(Self {
            coll: db.collection(coll_name),
        })
    }
}

pub struct MongoPostRepository {
    coll: Collection<MongoPostModel>,
}

impl MongoPostRepository {
    pub async fn new_with(db: Database, coll_name: &str) -> ::anyhow::Result<Self> {
        initialize_coll(coll_name, &db).await?;

        Ok(Self {
            coll: db.collection(coll_name),
        })
    }
}

pub struct MongoSaveRepository {
    coll: Collection<MongoSaveModel>,
}

impl MongoSaveRepository {
    pub async fn new_with(db: Database, coll_name: &str) -> ::anyhow::Result<Self> {
        initialize_coll(coll_name, &db).await?;

        Ok(Self {
            coll: db.collection(coll_name),
        })
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn insert(&self, item: User) -> Result<bool> {
        let model: MongoUserModel = item.into();

        self.coll
            .insert_one(model, None)
            .instrument(tracing::trace_span!("insert_one"))
            .await
            .let_(try_unique_check)
    }

    async fn find(&self, id: &UserId) -> Result<User> {
        let user: User = get_one(&self.coll, doc! { "id": id.as_str() }).await?.into();

        Ok(user)
    }
}

#[async_trait]
impl PostRepository for MongoPostRepository {
    async fn insert(&self, item: Post) -> Result<bool> {
        let model: MongoPostModel = item.into();

        self.coll
            .insert_one(model, None)
            .instrument(tracing::trace_span!("insert_one"))
            .await
            .let_(try_unique_check)
    }

    async fn find(&self, id: &PostId) -> Result<Post> {
        get_one(&self.coll, doc! { "id": id.as_str() })
            .await?
            .let_(Post::try_from)
    }

    async fn update_likers(&self, id: &PostId, likers: HashSet<UserId>) -> Result<Post> {
        let likers = likers.into_iter().map(|u| u.0).collect::<Vec<_>>();
        let likers_size = likers.len() as i64;

        let opts = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.coll
            .find_one_and_update(
                doc! { "id": id.as_str() },
                doc! { "$set": { "likers": likers, "likers_size": likers_size } },
                opts,
            )
            .instrument(tracing::trace_span!("find_one_and_update"))
            .await
            .let_(convert_repo_err)?
            .let_(convert_404_or)?
            .let_(Post::try_from)
    }
}

#[async_trait]
impl SaveRepository for MongoSaveRepository {
    async fn insert(&self, item: SavedRecord) -> Result<bool> {
        let model: MongoSaveModel = item.into();

        self.coll
            .insert_one(model, None)
            .instrument(tracing::trace_span!("insert_one"))
            .await
            .let_(try_unique_check)
    }

    async fn finds_by_user(&self, user_id: &UserId) -> Result<Vec<SavedRecord>> {
        self.coll
            .find(doc! { "user": user_id.as_str() }, None)
            .instrument(tracing::trace_span!("find"))
            .await
            .let_(convert_repo_err)?
            .try_collect::<Vec<_>>()
            .await
            .let_(convert_repo_err)?
            .into_iter()
            .map(SavedRecord::try_from)
            .collect::<StdResult<Vec<_>, RepositoryError>>()
    }

    async fn delete(&self, id: &SavedRecordId) -> Result<SavedRecord> {
        self.coll
            .find_one_and_delete(doc! { "id": id.as_str() }, None)
            .instrument(tracing::trace_span!("find_one_and_delete"))
            .await
            .let_(convert_repo_err)?
            .let_(convert_404_or)?
            .let_(SavedRecord::try_from)
    }
}
