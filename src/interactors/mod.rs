pub mod post;
pub mod user;

use anyhow::{anyhow, Error};

use crate::repositories::RepositoryError;

fn user_err_fmt(e: RepositoryError) -> Error {
    match e {
        RepositoryError::NotFound => anyhow!("cannot find user. not registered?"),
        e => anyhow!("repository error: {}", e),
    }
}

fn post_err_fmt(e: RepositoryError) -> Error {
    match e {
        RepositoryError::NotFound => anyhow!("cannot find post."),
        e => anyhow!("repository error: {}", e),
    }
}

fn save_err_fmt(e: RepositoryError) -> Error {
    match e {
        RepositoryError::NotFound => anyhow!("cannot find saved record. already removed?"),
        e => anyhow!("repository error: {}", e),
    }
}
