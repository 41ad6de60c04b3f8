pub(crate) trait LetChain {
    fn let_<F, R>(self, f: F) -> R
    where
        Self: Sized,
        F: FnOnce(Self) -> R;
}
impl<T> LetChain for T {
    #[inline]
    fn let_<F, R>(self, f: F) -> R
    where
        Self: Sized,
        F: FnOnce(Self) -> R,
    {
        f(self)
    }
}

pub(crate) trait AlsoChain {
    fn also_<F, R>(self, f: F) -> Self
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> R;
}
impl<T> AlsoChain for T {
    #[inline]
    fn also_<F, R>(mut self, f: F) -> Self
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> R,
    {
        f(&mut self);
        self
    }
}

/// drops an error after logging it. for results nobody is allowed to act on.
pub(crate) trait SwallowErr<T> {
    fn swallow(self, what: &str) -> Option<T>;
}
impl<T, E: ::core::fmt::Display> SwallowErr<T> for Result<T, E> {
    fn swallow(self, what: &str) -> Option<T> {
        match self {
            Ok(o) => Some(o),
            Err(e) => {
                tracing::warn!("{} failed (ignored): {}", what, e);
                None
            },
        }
    }
}
