use std::sync::Arc;

use anyhow::Context as _;

use crate::config::Collections;
use crate::entities::{Post, SavedRecord, User};
use crate::fixtures::Fixture;
use crate::interactors::post::{PostGetInteractor, PostLikeInteractor};
use crate::interactors::user::{UserCurrentInteractor, UserSaveInteractor, UserUnsaveInteractor};
use crate::repositories::mock::InMemoryRepository;
use crate::repositories::mongo::{MongoPostRepository, MongoSaveRepository, MongoUserRepository};
use crate::repositories::{PostRepository, SaveRepository, UserRepository};
use crate::usecases::{post, user};

/// the service-client context. constructed once, cloned into whoever needs it.
#[derive(Clone)]
pub struct Services {
    pub post_get: Arc<dyn post::get::Usecase + Sync + Send>,
    pub post_like: Arc<dyn post::like::Usecase + Sync + Send>,
    pub user_current: Arc<dyn user::current::Usecase + Sync + Send>,
    pub user_save: Arc<dyn user::save::Usecase + Sync + Send>,
    pub user_unsave: Arc<dyn user::unsave::Usecase + Sync + Send>,
}

impl Services {
    pub fn with_repositories(
        user_repository: Arc<dyn UserRepository + Sync + Send>,
        post_repository: Arc<dyn PostRepository + Sync + Send>,
        save_repository: Arc<dyn SaveRepository + Sync + Send>,
    ) -> Self {
        Self {
            post_get: Arc::new(PostGetInteractor {
                post_repository: post_repository.clone(),
            }),
            post_like: Arc::new(PostLikeInteractor { post_repository }),
            user_current: Arc::new(UserCurrentInteractor {
                user_repository,
                save_repository: save_repository.clone(),
            }),
            user_save: Arc::new(UserSaveInteractor {
                save_repository: save_repository.clone(),
            }),
            user_unsave: Arc::new(UserUnsaveInteractor { save_repository }),
        }
    }
}

/// in-memory store; the repositories stay reachable for seeding and inspection.
pub struct InMemoryBackend {
    pub users: Arc<InMemoryRepository<User>>,
    pub posts: Arc<InMemoryRepository<Post>>,
    pub saves: Arc<InMemoryRepository<SavedRecord>>,
}

impl InMemoryBackend {
    pub fn services(&self) -> Services {
        Services::with_repositories(self.users.clone(), self.posts.clone(), self.saves.clone())
    }

    pub async fn load(&self, fixture: Fixture) -> ::anyhow::Result<()> {
        let (users, posts, saves) = fixture.into_entities()?;

        for u in users {
            let id = u.id.clone();
            if !self.users.insert(u).await? {
                ::anyhow::bail!("fixture: duplicated user {}", id);
            }
        }
        for p in posts {
            let id = p.id.clone();
            if !self.posts.insert(p).await? {
                ::anyhow::bail!("fixture: duplicated post {}", id);
            }
        }
        for s in saves {
            let id = s.id.clone();
            if !self.saves.insert(s).await? {
                ::anyhow::bail!("fixture: duplicated saved record {}", id);
            }
        }

        Ok(())
    }
}

pub fn in_memory() -> InMemoryBackend {
    InMemoryBackend {
        users: Arc::new(InMemoryRepository::new()),
        posts: Arc::new(InMemoryRepository::new()),
        saves: Arc::new(InMemoryRepository::new()),
    }
}

pub async fn mongo(
    uri_str: impl AsRef<str>,
    db_name: impl AsRef<str>,
    collections: &Collections,
) -> ::anyhow::Result<Services> {
    let c = ::mongodb::Client::with_uri_str(uri_str)
        .await
        .context("cannot connect to mongodb")?;
    let db = c.database(db_name.as_ref());

    let users = MongoUserRepository::new_with(db.clone(), &collections.users).await?;
    let posts = MongoPostRepository::new_with(db.clone(), &collections.posts).await?;
    let saves = MongoSaveRepository::new_with(db, &collections.saves).await?;

    Ok(Services::with_repositories(
        Arc::new(users),
        Arc::new(posts),
        Arc::new(saves),
    ))
}
