use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use super::post_err_fmt;
use crate::repositories::PostRepository;
use crate::usecases::post::{get, like};
use crate::utils::{AlsoChain, LetChain};

pub struct PostGetInteractor {
    pub post_repository: Arc<dyn PostRepository + Sync + Send>,
}
#[async_trait]
impl get::Usecase for PostGetInteractor {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, data: get::Input) -> Result<get::Output> {
        tracing::trace!("input - {:?}", data);

        let get::Input { post_id } = data;

        self.post_repository
            .find(&post_id)
            .await
            .map_err(post_err_fmt)?
            .let_(|post| get::Output { post })
            .also_(|o| tracing::trace!("output - {:?}", o))
            .let_(Ok)
    }
}

pub struct PostLikeInteractor {
    pub post_repository: Arc<dyn PostRepository + Sync + Send>,
}
#[async_trait]
impl like::Usecase for PostLikeInteractor {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, data: like::Input) -> Result<like::Output> {
        tracing::trace!("input - {:?}", data);

        let like::Input { post_id, likers } = data;

        self.post_repository
            .update_likers(&post_id, likers)
            .await
            .map_err(post_err_fmt)?
            .let_(|post| like::Output { post })
            .also_(|o| tracing::trace!("output - {:?}", o))
            .let_(Ok)
    }
}
