use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;

use super::{save_err_fmt, user_err_fmt};
use crate::entities::{CurrentUser, SavedRecord};
use crate::repositories::{SaveRepository, UserRepository};
use crate::usecases::user::{current, save, unsave};
use crate::utils::{AlsoChain, LetChain};

pub struct UserCurrentInteractor {
    pub user_repository: Arc<dyn UserRepository + Sync + Send>,
    pub save_repository: Arc<dyn SaveRepository + Sync + Send>,
}
#[async_trait]
impl current::Usecase for UserCurrentInteractor {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, data: current::Input) -> Result<current::Output> {
        tracing::trace!("input - {:?}", data);

        let current::Input { user_id } = data;

        let user = self
            .user_repository
            .find(&user_id)
            .await
            .map_err(user_err_fmt)?;
        let saves = self
            .save_repository
            .finds_by_user(&user_id)
            .await
            .map_err(save_err_fmt)?;

        CurrentUser::from_parts(user, saves)
            .let_(|user| current::Output { user })
            .also_(|o| tracing::trace!("output - {:?}", o))
            .let_(Ok)
    }
}

pub struct UserSaveInteractor {
    pub save_repository: Arc<dyn SaveRepository + Sync + Send>,
}
#[async_trait]
impl save::Usecase for UserSaveInteractor {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, data: save::Input) -> Result<save::Output> {
        tracing::trace!("input - {:?}", data);

        let save::Input { user_id, post_id } = data;

        let new_record = SavedRecord::new(user_id, post_id);

        let can_insert = self
            .save_repository
            .insert(new_record.clone())
            .await
            .map_err(save_err_fmt)?;

        if !can_insert {
            bail!("saved record id duplicated: {}", new_record.id);
        }

        save::Output { record: new_record }
            .also_(|o| tracing::trace!("output - {:?}", o))
            .let_(Ok)
    }
}

pub struct UserUnsaveInteractor {
    pub save_repository: Arc<dyn SaveRepository + Sync + Send>,
}
#[async_trait]
impl unsave::Usecase for UserUnsaveInteractor {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, data: unsave::Input) -> Result<unsave::Output> {
        tracing::trace!("input - {:?}", data);

        let unsave::Input { record_id } = data;

        self.save_repository
            .delete(&record_id)
            .await
            .map_err(save_err_fmt)?
            .let_(|record| unsave::Output { record })
            .also_(|o| tracing::trace!("output - {:?}", o))
            .let_(Ok)
    }
}
