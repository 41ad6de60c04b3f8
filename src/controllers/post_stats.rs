use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::constructors::Services;
use crate::entities::{CurrentUser, Post, PostId, SavedRecordId, UserId};
use crate::session::Session;
use crate::usecases::post::like;
use crate::usecases::user::save;
use crate::usecases::user::unsave;
use crate::utils::SwallowErr;

/// like/save state of one displayed post.
///
/// Every toggle mutates the local copy first and then spawns the remote write
/// without waiting for it. Remote failures are logged and dropped; the local
/// copy is never rolled back, so it may diverge from the store until the post
/// is mounted again.
///
/// Must be used inside a tokio runtime.
pub struct PostStatsController {
    post_id: PostId,
    likers: HashSet<UserId>,
    is_saved: bool,

    services: Services,
    session: Arc<Session>,
    current_user: watch::Receiver<Option<CurrentUser>>,

    saving: Arc<AtomicUsize>,
    unsaving: Arc<AtomicUsize>,

    // tags spans only, never sent to the store
    seq: u64,
}

impl PostStatsController {
    pub fn mount(post: &Post, services: Services, session: Arc<Session>) -> Self {
        let mut current_user = session.subscribe();
        let is_saved = saved_in(current_user.borrow_and_update().as_ref(), &post.id);

        Self {
            post_id: post.id.clone(),
            likers: post.likers.clone(),
            is_saved,
            services,
            session,
            current_user,
            saving: Arc::new(AtomicUsize::new(0)),
            unsaving: Arc::new(AtomicUsize::new(0)),
            seq: 0,
        }
    }

    pub fn post_id(&self) -> &PostId { &self.post_id }

    pub fn likers(&self) -> &HashSet<UserId> { &self.likers }

    pub fn is_liked_by(&self, user: &UserId) -> bool { self.likers.contains(user) }

    pub fn like_count(&self) -> usize { self.likers.len() }

    pub fn is_saved(&self) -> bool { self.is_saved }

    /// a save or unsave request is in flight.
    pub fn is_busy(&self) -> bool {
        self.saving.load(Ordering::SeqCst) + self.unsaving.load(Ordering::SeqCst) > 0
    }

    /// re-derives the saved flag when the session published a new current user.
    /// returns whether anything was re-derived.
    pub fn sync(&mut self) -> bool {
        match self.current_user.has_changed() {
            Ok(true) => (),
            _ => return false,
        }

        let saved = match self.current_user.borrow_and_update().as_ref() {
            Some(user) => user.saved_record_for(&self.post_id).is_some(),
            None => return false,
        };
        self.is_saved = saved;

        true
    }

    /// flips `acting` in the liker set, then persists the whole new set.
    pub fn toggle_like(&mut self, acting: &UserId) -> JoinHandle<()> {
        if !self.likers.remove(acting) {
            self.likers.insert(acting.clone());
        }
        self.seq += 1;

        let input = like::Input {
            post_id: self.post_id.clone(),
            likers: self.likers.clone(),
        };
        let span = tracing::debug_span!(
            "like",
            post_id = %self.post_id,
            seq = self.seq,
            likers = input.likers.len()
        );
        let usecase = self.services.post_like.clone();

        tokio::spawn(
            async move {
                usecase.handle(input).await.swallow("like");
            }
            .instrument(span),
        )
    }

    /// `None` when an unsave found no saved record to delete; the flag still flips.
    pub fn toggle_save(&mut self, acting: &UserId) -> Option<JoinHandle<()>> {
        self.seq += 1;

        if self.is_saved {
            let record_id = self
                .current_user
                .borrow()
                .as_ref()
                .and_then(|u| u.saved_record_for(&self.post_id))
                .map(|r| r.id.clone());
            self.is_saved = false;

            match record_id {
                Some(record_id) => Some(self.dispatch_unsave(record_id)),
                None => {
                    tracing::debug!(
                        post_id = %self.post_id,
                        seq = self.seq,
                        "no known saved record, nothing to delete"
                    );
                    None
                },
            }
        } else {
            self.is_saved = true;

            Some(self.dispatch_save(acting.clone()))
        }
    }

    fn dispatch_save(&self, user_id: UserId) -> JoinHandle<()> {
        let pending = Pending::enter(&self.saving);
        let input = save::Input {
            user_id,
            post_id: self.post_id.clone(),
        };
        let span = tracing::debug_span!("save", post_id = %self.post_id, seq = self.seq);
        let usecase = self.services.user_save.clone();
        let session = self.session.clone();

        tokio::spawn(
            async move {
                let res = usecase.handle(input).await.swallow("save");
                drop(pending);

                if res.is_some() {
                    session.refresh().await.swallow("current user refetch");
                }
            }
            .instrument(span),
        )
    }

    fn dispatch_unsave(&self, record_id: SavedRecordId) -> JoinHandle<()> {
        let pending = Pending::enter(&self.unsaving);
        let span = tracing::debug_span!(
            "unsave",
            post_id = %self.post_id,
            record_id = %record_id,
            seq = self.seq
        );
        let input = unsave::Input { record_id };
        let usecase = self.services.user_unsave.clone();
        let session = self.session.clone();

        tokio::spawn(
            async move {
                let res = usecase.handle(input).await.swallow("unsave");
                drop(pending);

                if res.is_some() {
                    session.refresh().await.swallow("current user refetch");
                }
            }
            .instrument(span),
        )
    }
}

fn saved_in(user: Option<&CurrentUser>, post_id: &PostId) -> bool {
    user.map(|u| u.saved_record_for(post_id).is_some())
        .unwrap_or(false)
}

/// in-flight counter slot, released on drop even if the request task is torn down.
struct Pending(Arc<AtomicUsize>);

impl Pending {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter.clone())
    }
}

impl Drop for Pending {
    fn drop(&mut self) { self.0.fetch_sub(1, Ordering::SeqCst); }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use anyhow::{bail, Result};
    use async_trait::async_trait;
    use chrono::Utc;
    use tokio::sync::Notify;

    use super::*;
    use crate::constructors::{in_memory, InMemoryBackend};
    use crate::entities::{ImageRef, SavedRecord, User};
    use crate::repositories::{PostRepository, SaveRepository, UserRepository};

    fn set(ids: &[&str]) -> HashSet<UserId> { ids.iter().map(|&s| UserId::from(s)).collect() }

    fn post(id: &str, likers: &[&str]) -> Post {
        Post {
            id: id.into(),
            creator: "u9".into(),
            caption: "caption".to_string(),
            image: ImageRef {
                id: format!("img-{}", id),
                url: format!("https://example.invalid/{}.jpg", id),
            },
            location: String::new(),
            tags: vec![],
            likers: set(likers),
            created: Utc::now(),
        }
    }

    async fn backend_with(posts: Vec<Post>) -> InMemoryBackend {
        let backend = in_memory();
        backend
            .users
            .insert(User {
                id: "u1".into(),
                name: "One".to_string(),
                username: "one".to_string(),
            })
            .await
            .unwrap();
        for p in posts {
            backend.posts.insert(p).await.unwrap();
        }
        backend
    }

    fn session_for(services: &Services) -> Arc<Session> {
        Arc::new(Session::new("u1".into(), services.user_current.clone()))
    }

    #[derive(Default)]
    struct LikeRecorder(Mutex<Vec<HashSet<UserId>>>);
    #[async_trait]
    impl like::Usecase for LikeRecorder {
        async fn handle(&self, data: like::Input) -> Result<like::Output> {
            self.0.lock().unwrap().push(data.likers.clone());
            let mut p = post(data.post_id.as_str(), &[]);
            p.likers = data.likers;
            Ok(like::Output { post: p })
        }
    }

    struct FailingLike;
    #[async_trait]
    impl like::Usecase for FailingLike {
        async fn handle(&self, _: like::Input) -> Result<like::Output> { bail!("network down") }
    }

    struct FailingSave;
    #[async_trait]
    impl save::Usecase for FailingSave {
        async fn handle(&self, _: save::Input) -> Result<save::Output> { bail!("network down") }
    }

    struct FailingUnsave;
    #[async_trait]
    impl unsave::Usecase for FailingUnsave {
        async fn handle(&self, _: unsave::Input) -> Result<unsave::Output> { bail!("network down") }
    }

    #[derive(Default)]
    struct UnsaveCounter(Mutex<usize>);
    #[async_trait]
    impl unsave::Usecase for UnsaveCounter {
        async fn handle(&self, _: unsave::Input) -> Result<unsave::Output> {
            *self.0.lock().unwrap() += 1;
            bail!("not expected to be called")
        }
    }

    #[derive(Default)]
    struct GatedSave(Notify);
    #[async_trait]
    impl save::Usecase for GatedSave {
        async fn handle(&self, data: save::Input) -> Result<save::Output> {
            self.0.notified().await;
            Ok(save::Output {
                record: SavedRecord::new(data.user_id, data.post_id),
            })
        }
    }

    #[tokio::test]
    async fn like_from_empty_set() {
        let p = post("p1", &[]);
        let backend = backend_with(vec![p.clone()]).await;
        let services = backend.services();
        let mut c = PostStatsController::mount(&p, services.clone(), session_for(&services));

        let handle = c.toggle_like(&"u1".into());

        assert_eq!(c.likers(), &set(&["u1"]));
        assert_eq!(c.like_count(), 1);
        assert!(c.is_liked_by(&"u1".into()));

        handle.await.unwrap();
        let stored = backend.posts.find(&"p1".into()).await.unwrap();
        assert_eq!(stored.likers, set(&["u1"]));
    }

    #[tokio::test]
    async fn unlike_keeps_other_likers() {
        let p = post("p1", &["u1", "u2"]);
        let backend = backend_with(vec![p.clone()]).await;
        let services = backend.services();
        let mut c = PostStatsController::mount(&p, services.clone(), session_for(&services));

        c.toggle_like(&"u1".into()).await.unwrap();

        assert_eq!(c.likers(), &set(&["u2"]));
        assert_eq!(c.like_count(), 1);
        assert!(!c.is_liked_by(&"u1".into()));
        assert!(!c.is_busy());
    }

    #[tokio::test]
    async fn double_toggle_restores_and_writes_twice() {
        let p = post("p1", &["u2"]);
        let backend = backend_with(vec![p.clone()]).await;
        let recorder = Arc::new(LikeRecorder::default());
        let mut services = backend.services();
        services.post_like = recorder.clone();
        let mut c = PostStatsController::mount(&p, services.clone(), session_for(&services));

        let first = c.toggle_like(&"u1".into());
        let second = c.toggle_like(&"u1".into());
        assert_eq!(c.likers(), &set(&["u2"]));
        assert_eq!(c.like_count(), c.likers().len());

        first.await.unwrap();
        second.await.unwrap();
        let writes = recorder.0.lock().unwrap().clone();
        assert_eq!(writes, vec![set(&["u1", "u2"]), set(&["u2"])]);
    }

    #[tokio::test]
    async fn failed_like_is_not_rolled_back() {
        let p = post("p1", &[]);
        let backend = backend_with(vec![p.clone()]).await;
        let mut services = backend.services();
        services.post_like = Arc::new(FailingLike);
        let mut c = PostStatsController::mount(&p, services.clone(), session_for(&services));

        c.toggle_like(&"u1".into()).await.unwrap();

        assert!(c.is_liked_by(&"u1".into()));
        let stored = backend.posts.find(&"p1".into()).await.unwrap();
        assert!(stored.likers.is_empty());
    }

    #[tokio::test]
    async fn save_flips_before_the_request_completes() {
        let p = post("p1", &[]);
        let backend = backend_with(vec![p.clone()]).await;
        let gate = Arc::new(GatedSave::default());
        let mut services = backend.services();
        services.user_save = gate.clone();
        let mut c = PostStatsController::mount(&p, services.clone(), session_for(&services));
        assert!(!c.is_saved());

        let handle = c.toggle_save(&"u1".into()).unwrap();
        assert!(c.is_saved());
        assert!(c.is_busy());

        tokio::task::yield_now().await;
        assert!(c.is_saved());
        assert!(c.is_busy());

        gate.0.notify_one();
        handle.await.unwrap();
        assert!(!c.is_busy());
    }

    #[tokio::test]
    async fn save_creates_record_and_refetches() {
        let p = post("p1", &[]);
        let backend = backend_with(vec![p.clone()]).await;
        let services = backend.services();
        let session = session_for(&services);
        let mut c = PostStatsController::mount(&p, services.clone(), session.clone());

        c.toggle_save(&"u1".into()).unwrap().await.unwrap();

        let saves = backend.saves.finds_by_user(&"u1".into()).await.unwrap();
        assert_eq!(saves.len(), 1);
        assert_eq!(saves[0].post, PostId::from("p1"));
        assert_eq!(session.current().unwrap().saves, saves);
        assert!(c.sync());
        assert!(c.is_saved());
    }

    #[tokio::test]
    async fn unsave_deletes_known_record() {
        let p = post("p1", &[]);
        let backend = backend_with(vec![p.clone()]).await;
        let record = SavedRecord::new("u1".into(), "p1".into());
        backend.saves.insert(record).await.unwrap();
        let services = backend.services();
        let session = session_for(&services);
        session.refresh().await.unwrap();
        let mut c = PostStatsController::mount(&p, services.clone(), session.clone());
        assert!(c.is_saved());

        let handle = c.toggle_save(&"u1".into()).unwrap();
        assert!(!c.is_saved());
        assert!(c.is_busy());

        handle.await.unwrap();
        assert!(!c.is_busy());
        assert!(backend.saves.finds_by_user(&"u1".into()).await.unwrap().is_empty());
        assert!(session.current().unwrap().saves.is_empty());
    }

    #[tokio::test]
    async fn failed_unsave_keeps_flag_cleared() {
        let p = post("p1", &[]);
        let backend = backend_with(vec![p.clone()]).await;
        let record = SavedRecord::new("u1".into(), "p1".into());
        backend.saves.insert(record.clone()).await.unwrap();
        let mut services = backend.services();
        services.user_unsave = Arc::new(FailingUnsave);
        let session = session_for(&services);
        session.refresh().await.unwrap();
        let mut c = PostStatsController::mount(&p, services.clone(), session.clone());
        let mut published = session.subscribe();
        published.borrow_and_update();
        assert!(c.is_saved());

        let handle = c.toggle_save(&"u1".into()).unwrap();
        assert!(!c.is_saved());

        handle.await.unwrap();
        assert!(!c.is_saved());
        assert!(!c.is_busy());
        assert!(!c.sync());
        assert!(!published.has_changed().unwrap());
        assert_eq!(session.current().unwrap().saves, vec![record.clone()]);
        assert_eq!(
            backend.saves.finds_by_user(&"u1".into()).await.unwrap(),
            vec![record]
        );
    }

    #[tokio::test]
    async fn unsave_without_known_record_only_flips() {
        let p = post("p1", &[]);
        let backend = backend_with(vec![p.clone()]).await;
        let counter = Arc::new(UnsaveCounter::default());
        let mut services = backend.services();
        services.user_save = Arc::new(FailingSave);
        services.user_unsave = counter.clone();
        let mut c = PostStatsController::mount(&p, services.clone(), session_for(&services));

        // the failed save leaves the flag set with no record behind it
        c.toggle_save(&"u1".into()).unwrap().await.unwrap();
        assert!(c.is_saved());

        assert!(c.toggle_save(&"u1".into()).is_none());
        assert!(!c.is_saved());
        assert!(!c.is_busy());
        assert_eq!(*counter.0.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn two_surfaces_may_duplicate_saves() {
        let p = post("p1", &[]);
        let backend = backend_with(vec![p.clone()]).await;
        let services = backend.services();
        let session = session_for(&services);
        let mut feed = PostStatsController::mount(&p, services.clone(), session.clone());
        let mut profile = PostStatsController::mount(&p, services.clone(), session.clone());

        let a = feed.toggle_save(&"u1".into()).unwrap();
        let b = profile.toggle_save(&"u1".into()).unwrap();
        a.await.unwrap();
        b.await.unwrap();

        assert_eq!(backend.saves.finds_by_user(&"u1".into()).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn other_mounts_pick_up_refetched_user() {
        let p = post("p1", &[]);
        let backend = backend_with(vec![p.clone()]).await;
        let services = backend.services();
        let session = session_for(&services);
        let mut feed = PostStatsController::mount(&p, services.clone(), session.clone());
        let mut detail = PostStatsController::mount(&p, services.clone(), session.clone());
        assert!(!detail.sync());

        feed.toggle_save(&"u1".into()).unwrap().await.unwrap();

        assert!(!detail.is_saved());
        assert!(detail.sync());
        assert!(detail.is_saved());
        assert!(!detail.sync());
    }

    #[tokio::test]
    async fn dropped_controller_orphans_the_request() {
        let p = post("p1", &[]);
        let backend = backend_with(vec![p.clone()]).await;
        let services = backend.services();
        let mut c = PostStatsController::mount(&p, services.clone(), session_for(&services));

        let handle = c.toggle_like(&"u1".into());
        drop(c);
        handle.await.unwrap();

        let stored = backend.posts.find(&"p1".into()).await.unwrap();
        assert_eq!(stored.likers, set(&["u1"]));
    }
}
