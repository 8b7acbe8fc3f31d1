//! Pagination types and traits
//!
//! Defines the page source abstraction and the policies a paginator is
//! configured with.

use crate::error::Result;
use async_trait::async_trait;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Default capacity of the intent queue
pub const DEFAULT_QUEUE_CAPACITY: usize = 32;

/// Capacity of the transition broadcast buffer
pub const TRANSITION_BUFFER: usize = 64;

/// A source of single pages
///
/// Implementations must tolerate being called again with the same key after a
/// failure. Retry and backoff, if any, belong here and not in the paginator.
#[async_trait]
pub trait PageSource<K, T>: Send + Sync {
    /// Fetch the page identified by `key`
    async fn fetch(&self, key: K) -> Result<Vec<T>>;
}

#[async_trait]
impl<K, T, F, Fut> PageSource<K, T> for F
where
    K: Send + 'static,
    T: Send + 'static,
    F: Fn(K) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<T>>> + Send + 'static,
{
    async fn fetch(&self, key: K) -> Result<Vec<T>> {
        (self)(key).await
    }
}

/// Derives the key of the page after `used_key`; `None` means no further page
pub type NextKeyFn<K, T> = Arc<dyn Fn(&K, &[T]) -> Option<K> + Send + Sync>;

/// Custom end-of-data predicate over (next key, fetched page)
pub type ReachedEndFn<K, T> = Arc<dyn Fn(Option<&K>, &[T]) -> bool + Send + Sync>;

/// When a successfully fetched page marks the end of the list
///
/// Pick one signal per paginator. `ShortPage(n)` covers the empty page too,
/// so it never needs to be combined with `EmptyPage`.
pub enum EndCondition<K, T> {
    /// Stop when the fetched page is empty
    EmptyPage,
    /// Stop when the fetched page holds fewer than `n` items
    ShortPage(usize),
    /// Stop when the next-key function returned `None`
    NoNextKey,
    /// Caller-supplied predicate
    Custom(ReachedEndFn<K, T>),
}

impl<K, T> EndCondition<K, T> {
    /// Create a custom end condition
    pub fn custom(f: impl Fn(Option<&K>, &[T]) -> bool + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(f))
    }

    /// Evaluate the condition for a fetched page
    pub fn reached(&self, next_key: Option<&K>, page: &[T]) -> bool {
        match self {
            Self::EmptyPage => page.is_empty(),
            Self::ShortPage(size) => page.len() < *size,
            Self::NoNextKey => next_key.is_none(),
            Self::Custom(f) => f(next_key, page),
        }
    }
}

impl<K, T> Default for EndCondition<K, T> {
    fn default() -> Self {
        Self::EmptyPage
    }
}

impl<K, T> Clone for EndCondition<K, T> {
    fn clone(&self) -> Self {
        match self {
            Self::EmptyPage => Self::EmptyPage,
            Self::ShortPage(size) => Self::ShortPage(*size),
            Self::NoNextKey => Self::NoNextKey,
            Self::Custom(f) => Self::Custom(Arc::clone(f)),
        }
    }
}

impl<K, T> fmt::Debug for EndCondition<K, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPage => f.write_str("EmptyPage"),
            Self::ShortPage(size) => f.debug_tuple("ShortPage").field(size).finish(),
            Self::NoNextKey => f.write_str("NoNextKey"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Which kind of fetch an intent dispatches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    /// Replaces the visible sequence
    Refresh,
    /// Appends to the visible sequence
    LoadMore,
}

impl FetchKind {
    /// Whether this fetch replaces the list
    pub fn is_refresh(self) -> bool {
        matches!(self, Self::Refresh)
    }
}

impl fmt::Display for FetchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Refresh => f.write_str("refresh"),
            Self::LoadMore => f.write_str("load_more"),
        }
    }
}

/// A user or observer intent, queued for the worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    Refresh,
    LoadMore,
    Retry,
    /// Reap a fetch invalidated by `Paginator::cancel`
    Cancel,
    Shutdown,
}
