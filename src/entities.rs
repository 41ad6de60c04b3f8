use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type Date = DateTime<Utc>;

macro_rules! id_type {
    ($n:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $n(pub String);

        impl $n {
            pub fn new_v4() -> Self { Self(::uuid::Uuid::new_v4().to_string()) }

            pub fn as_str(&self) -> &str { self.0.as_str() }
        }

        impl fmt::Display for $n {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
        }

        impl From<&str> for $n {
            fn from(s: &str) -> Self { Self(s.to_string()) }
        }

        impl From<String> for $n {
            fn from(s: String) -> Self { Self(s) }
        }

        impl ::core::str::FromStr for $n {
            type Err = ::core::convert::Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> { Ok(Self(s.to_string())) }
        }
    };
}

id_type!(UserId);
id_type!(PostId);
id_type!(SavedRecordId);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub username: String,
}

/// the acting user, joined with the saved records that point at them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: UserId,
    pub name: String,
    pub username: String,
    pub saves: Vec<SavedRecord>,
}

impl CurrentUser {
    pub fn from_parts(User { id, name, username }: User, saves: Vec<SavedRecord>) -> Self {
        Self {
            id,
            name,
            username,
            saves,
        }
    }

    /// first saved record pointing at `post_id`.
    /// the store may hold more than one; only the first is meaningful here.
    pub fn saved_record_for(&self, post_id: &PostId) -> Option<&SavedRecord> {
        self.saves.iter().find(|r| &r.post == post_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: PostId,
    pub creator: UserId,
    pub caption: String,
    pub image: ImageRef,
    pub location: String,
    pub tags: Vec<String>,
    pub likers: HashSet<UserId>,
    pub created: Date,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedRecord {
    pub id: SavedRecordId,
    pub user: UserId,
    pub post: PostId,
    pub created: Date,
}

impl SavedRecord {
    pub fn new(user: UserId, post: PostId) -> Self {
        Self {
            id: SavedRecordId::new_v4(),
            user,
            post,
            created: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("duplicated liker: {0}")]
pub struct DuplicateLiker(pub UserId);

/// builds a liker set from a stored list, rejecting duplicates instead of collapsing them.
pub fn likers_from_vec(
    likers: impl IntoIterator<Item = UserId>,
) -> Result<HashSet<UserId>, DuplicateLiker> {
    let mut set = HashSet::new();

    for id in likers {
        if set.contains(&id) {
            return Err(DuplicateLiker(id));
        }
        set.insert(id);
    }

    Ok(set)
}
