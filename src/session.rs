use std::sync::Arc;

use anyhow::Result;
use tokio::sync::watch;

use crate::entities::{CurrentUser, UserId};
use crate::usecases::user::current;

/// cached profile of the acting user.
///
/// every successful refetch is published; subscribers compare versions through
/// [`watch::Receiver::has_changed`]. a failed refetch keeps the last known value.
pub struct Session {
    user_id: UserId,
    current_user: Arc<dyn current::Usecase + Sync + Send>,
    tx: watch::Sender<Option<CurrentUser>>,
}

impl Session {
    pub fn new(user_id: UserId, current_user: Arc<dyn current::Usecase + Sync + Send>) -> Self {
        let (tx, _) = watch::channel(None);

        Self {
            user_id,
            current_user,
            tx,
        }
    }

    pub fn user_id(&self) -> &UserId { &self.user_id }

    /// last fetched profile, `None` until a fetch succeeded.
    pub fn current(&self) -> Option<CurrentUser> { self.tx.borrow().clone() }

    pub fn subscribe(&self) -> watch::Receiver<Option<CurrentUser>> { self.tx.subscribe() }

    #[tracing::instrument(skip(self), fields(user_id = %self.user_id))]
    pub async fn refresh(&self) -> Result<CurrentUser> {
        let current::Output { user } = self
            .current_user
            .handle(current::Input {
                user_id: self.user_id.clone(),
            })
            .await?;

        tracing::debug!("current user has {} saved records", user.saves.len());
        self.tx.send_replace(Some(user.clone()));

        Ok(user)
    }
}
