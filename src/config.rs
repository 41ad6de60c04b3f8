use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::entities::UserId;

/// interactive post stats client.
#[derive(Debug, Clone, Parser)]
#[clap(author, version)]
pub struct Config {
    /// id of the acting user.
    #[clap(long, env = "POST_STATS_USER_ID")]
    pub user_id: UserId,

    #[clap(long, env = "POST_STATS_BACKEND", value_enum, default_value = "memory")]
    pub backend: Backend,

    /// required with `--backend mongo`.
    #[clap(long, env = "POST_STATS_MONGO_URI")]
    pub mongo_uri: Option<String>,

    #[clap(long, env = "POST_STATS_DATABASE", default_value = "post_stats")]
    pub database: String,

    #[clap(flatten)]
    pub collections: Collections,

    /// json seed for the in-memory backend.
    #[clap(long, env = "POST_STATS_FIXTURE")]
    pub fixture: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    Memory,
    Mongo,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Collections {
    #[clap(long = "user-collection", env = "POST_STATS_USER_COLLECTION", default_value = "users")]
    pub users: String,

    #[clap(long = "post-collection", env = "POST_STATS_POST_COLLECTION", default_value = "posts")]
    pub posts: String,

    #[clap(long = "saves-collection", env = "POST_STATS_SAVES_COLLECTION", default_value = "saves")]
    pub saves: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("configuration is incomplete: `{0}` is required")]
    Missing(&'static str),
    #[error("configuration is invalid: `{0}` must not be empty")]
    Empty(&'static str),
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.user_id.as_str().is_empty() {
            return Err(ConfigError::Empty("user-id"));
        }

        match self.backend {
            Backend::Mongo => {
                if self.mongo_uri.is_none() {
                    return Err(ConfigError::Missing("mongo-uri"));
                }
                if self.fixture.is_some() {
                    tracing::warn!("`fixture` is ignored with the mongo backend");
                }
            },
            Backend::Memory => (),
        }

        let Collections { users, posts, saves } = &self.collections;
        for (name, value) in [
            ("user-collection", users),
            ("post-collection", posts),
            ("saves-collection", saves),
        ] {
            if value.is_empty() {
                return Err(ConfigError::Empty(name));
            }
        }

        Ok(())
    }
}
