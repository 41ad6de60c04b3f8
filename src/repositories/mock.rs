use std::collections::HashSet;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{PostRepository, RepositoryError, Result, SaveRepository, UserRepository};
use crate::entities::{Post, PostId, SavedRecord, SavedRecordId, User, UserId};

mod helpers;

use helpers::{find_mut, find_ref, remove_one};

pub struct InMemoryRepository<T>(Mutex<Vec<T>>);

impl<T> InMemoryRepository<T> {
    pub fn new() -> Self { Self(Mutex::new(vec![])) }
}
impl<T> Default for InMemoryRepository<T> {
    fn default() -> Self { Self::new() }
}

#[async_trait]
impl UserRepository for InMemoryRepository<User> {
    async fn insert(&self, item: User) -> Result<bool> {
        let mut guard = self.0.lock().await;

        match find_ref(&guard, |v| v.id == item.id) {
            Ok(_) => return Ok(false),
            Err(RepositoryError::NotFound) => (),
            Err(e) => return Err(e),
        }

        guard.push(item);
        Ok(true)
    }

    async fn find(&self, id: &UserId) -> Result<User> {
        let guard = self.0.lock().await;

        Ok(find_ref(&guard, |v| &v.id == id)?.clone())
    }
}

#[async_trait]
impl PostRepository for InMemoryRepository<Post> {
    async fn insert(&self, item: Post) -> Result<bool> {
        let mut guard = self.0.lock().await;

        match find_ref(&guard, |v| v.id == item.id) {
            Ok(_) => return Ok(false),
            Err(RepositoryError::NotFound) => (),
            Err(e) => return Err(e),
        }

        guard.push(item);
        Ok(true)
    }

    async fn find(&self, id: &PostId) -> Result<Post> {
        let guard = self.0.lock().await;

        Ok(find_ref(&guard, |v| &v.id == id)?.clone())
    }

    async fn update_likers(&self, id: &PostId, likers: HashSet<UserId>) -> Result<Post> {
        let mut guard = self.0.lock().await;
        let item = find_mut(&mut guard, |v| &v.id == id)?;

        item.likers = likers;

        Ok(item.clone())
    }
}

#[async_trait]
impl SaveRepository for InMemoryRepository<SavedRecord> {
    async fn insert(&self, item: SavedRecord) -> Result<bool> {
        let mut guard = self.0.lock().await;

        match find_ref(&guard, |v| v.id == item.id) {
            Ok(_) => return Ok(false),
            Err(RepositoryError::NotFound) => (),
            Err(e) => return Err(e),
        }

        guard.push(item);
        Ok(true)
    }

    async fn finds_by_user(&self, user_id: &UserId) -> Result<Vec<SavedRecord>> {
        Ok(self
            .0
            .lock()
            .await
            .iter()
            .filter(|r| &r.user == user_id)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: &SavedRecordId) -> Result<SavedRecord> {
        let mut guard = self.0.lock().await;

        remove_one(&mut guard, |r| &r.id == id)
    }
}
