use super::{RepositoryError, Result as RepoResult};

/// the single element matching `is_target`, mutably.
pub fn find_mut<T, P>(items: &mut [T], is_target: P) -> RepoResult<&mut T>
where
    T: ::core::fmt::Debug,
    P: Fn(&T) -> bool,
{
    let mut matched = items.iter_mut().filter(|e| is_target(&**e)).collect::<Vec<_>>();

    tracing::trace!("matched - {:?}", matched);

    match matched.len() {
        1 => Ok(matched.remove(0)),
        n => Err(unique_err(n)),
    }
}

pub fn find_ref<T, P>(items: &[T], is_target: P) -> RepoResult<&T>
where
    T: ::core::fmt::Debug,
    P: Fn(&T) -> bool,
{
    let mut matched = items.iter().filter(|e| is_target(*e)).collect::<Vec<_>>();

    tracing::trace!("matched - {:?}", matched);

    match matched.len() {
        1 => Ok(matched.remove(0)),
        n => Err(unique_err(n)),
    }
}

fn unique_err(matched: usize) -> RepositoryError {
    match matched {
        0 => RepositoryError::NotFound,
        n => RepositoryError::NoUnique { matched: n as u32 },
    }
}

/// removes the single element matching `is_target`.
pub fn remove_one<T>(v: &mut Vec<T>, is_target: impl Fn(&T) -> bool) -> RepoResult<T> {
    let mut indexes: Vec<_> = v
        .iter()
        .enumerate()
        .filter_map(|(i, e)| match is_target(e) {
            true => Some(i),
            false => None,
        })
        .collect();

    match indexes.len() {
        1 => Ok(v.remove(indexes.remove(0))),
        n => Err(unique_err(n)),
    }
}
