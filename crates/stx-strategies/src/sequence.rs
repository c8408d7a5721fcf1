//! Single-use, pull-based lazy sequences.
//!
//! A [`Seq`] is an iterator of `Result<T, SearchError>`. It is fused after
//! the first error: once an `Err` has been produced the sequence is over,
//! so a cancelled or failed search never yields further values.

use std::any::Any;
use std::error::Error;
use std::fmt;
use thiserror::Error;

/// Errors that abort a search.
///
/// Search failure is not an error; it is an empty sequence.
#[derive(Debug, Error)]
pub enum SearchError {
    /// A cancellation signal was observed while advancing.
    #[error("search cancelled")]
    Cancelled,
    /// An unexpected condition that must terminate the request.
    #[error(transparent)]
    Fatal(Box<dyn Error + Send + Sync>),
}

impl SearchError {
    pub fn fatal(err: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        SearchError::Fatal(err.into())
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, SearchError::Cancelled)
    }
}

pub struct Seq<T> {
    inner: Box<dyn Iterator<Item = Result<T, SearchError>>>,
    done: bool,
}

impl<T> fmt::Debug for Seq<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Seq").field("done", &self.done).finish_non_exhaustive()
    }
}

impl<T: 'static> Seq<T> {
    pub fn new(iter: impl Iterator<Item = Result<T, SearchError>> + 'static) -> Self {
        Seq {
            inner: Box::new(iter),
            done: false,
        }
    }

    pub fn empty() -> Self {
        Seq::new(std::iter::empty())
    }

    pub fn of(value: T) -> Self {
        Seq::new(std::iter::once(Ok(value)))
    }

    /// A sequence over already-known values.
    pub fn values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: 'static,
    {
        Seq::new(values.into_iter().map(Ok))
    }

    pub fn error(err: SearchError) -> Self {
        Seq::new(std::iter::once(Err(err)))
    }

    /// Defers building the sequence until the first element is requested.
    pub fn lazy(build: impl FnOnce() -> Seq<T> + 'static) -> Self {
        let mut build = Some(build);
        let mut current: Option<Seq<T>> = None;
        Seq::new(std::iter::from_fn(move || {
            if let Some(build) = build.take() {
                current = Some(build());
            }
            current.as_mut().and_then(Iterator::next)
        }))
    }

    pub fn chain(self, other: Seq<T>) -> Seq<T> {
        Seq::new(self.chain_iter(other))
    }

    fn chain_iter(self, other: Seq<T>) -> impl Iterator<Item = Result<T, SearchError>> {
        let mut first = Some(self);
        let mut second = other;
        std::iter::from_fn(move || {
            if let Some(seq) = first.as_mut() {
                match seq.next() {
                    Some(Err(err)) => {
                        first = None;
                        second = Seq::empty();
                        return Some(Err(err));
                    }
                    Some(ok) => return Some(ok),
                    None => first = None,
                }
            }
            second.next()
        })
    }

    /// Applies `f` to every value and concatenates the results.
    pub fn flat_map<U: 'static>(self, mut f: impl FnMut(T) -> Seq<U> + 'static) -> Seq<U> {
        let mut outer = self;
        let mut current: Option<Seq<U>> = None;
        Seq::new(std::iter::from_fn(move || {
            loop {
                if let Some(inner) = current.as_mut() {
                    match inner.next() {
                        Some(item) => return Some(item),
                        None => current = None,
                    }
                }
                match outer.next()? {
                    Ok(value) => current = Some(f(value)),
                    Err(err) => return Some(Err(err)),
                }
            }
        }))
    }

    pub fn map<U: 'static>(self, mut f: impl FnMut(T) -> U + 'static) -> Seq<U> {
        Seq::new(self.map_iter(move |value| Ok(f(value))))
    }

    fn map_iter<U>(
        self,
        mut f: impl FnMut(T) -> Result<U, SearchError> + 'static,
    ) -> impl Iterator<Item = Result<U, SearchError>> {
        let mut this = self;
        std::iter::from_fn(move || Some(this.next()?.and_then(&mut f)))
    }

    pub fn filter(self, mut keep: impl FnMut(&T) -> bool + 'static) -> Seq<T> {
        let mut this = self;
        Seq::new(std::iter::from_fn(move || {
            loop {
                match this.next()? {
                    Ok(value) if !keep(&value) => continue,
                    item => return Some(item),
                }
            }
        }))
    }

    pub fn take(self, n: usize) -> Seq<T> {
        Seq::new(Iterator::take(self, n))
    }

    /// Checks `is_cancelled` before every advance.
    pub fn interruptible(self, is_cancelled: impl Fn() -> bool + 'static) -> Seq<T> {
        let mut this = self;
        let mut stopped = false;
        Seq::new(std::iter::from_fn(move || {
            if stopped {
                return None;
            }
            if is_cancelled() {
                stopped = true;
                return Some(Err(SearchError::Cancelled));
            }
            this.next()
        }))
    }

    /// Keeps `guard` alive for as long as the sequence is.
    pub fn keep_alive(self, guard: impl Any) -> Seq<T> {
        let mut this = self;
        Seq::new(std::iter::from_fn(move || {
            let _guard = &guard;
            this.next()
        }))
    }

    /// Pulls the first value, returning it with the rest of the sequence.
    pub fn uncons(mut self) -> Result<Option<(T, Seq<T>)>, SearchError> {
        match self.next() {
            None => Ok(None),
            Some(Err(err)) => Err(err),
            Some(Ok(first)) => Ok(Some((first, self))),
        }
    }

    /// Forces the whole sequence.
    pub fn collect_all(self) -> Result<Vec<T>, SearchError> {
        self.collect()
    }
}

impl<T> Iterator for Seq<T> {
    type Item = Result<T, SearchError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.inner.next() {
            Some(Ok(value)) => Some(Ok(value)),
            Some(Err(err)) => {
                self.done = true;
                Some(Err(err))
            }
            None => {
                self.done = true;
                None
            }
        }
    }
}

impl<T: 'static> FromIterator<T> for Seq<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Seq::values(iter.into_iter().collect::<Vec<_>>())
    }
}

#[cfg(test)]
#[path = "../tests/sequence_tests.rs"]
mod tests;
