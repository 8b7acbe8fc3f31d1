//! Paged list lifecycle state
//!
//! `PageState` is the only value a consumer ever observes. It is pure data:
//! the paginator builds a new one for every transition and publishes it whole.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One point in the lifecycle of a paged list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageState<T> {
    /// No items have ever been fetched; the first fetch is in flight or pending
    Loading,
    /// A fetch completed and there is nothing to show
    Empty,
    /// The latest first-page or refresh fetch failed; no items are available
    Error(String),
    /// Items present, nothing in flight, more pages may exist
    Idle(Vec<T>),
    /// A refresh is in flight; the stale items are still shown
    Refreshing(Vec<T>),
    /// A load-more fetch is in flight
    LoadingMore(Vec<T>),
    /// The latest load-more fetch failed; items are retained
    LoadMoreFailed(Vec<T>),
    /// Every page has been fetched
    EndReached(Vec<T>),
}

impl<T> Default for PageState<T> {
    fn default() -> Self {
        Self::Loading
    }
}

impl<T> PageState<T> {
    /// Create an error state
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(message.into())
    }

    /// The tag of this state without its payload
    pub fn kind(&self) -> StateKind {
        match self {
            Self::Loading => StateKind::Loading,
            Self::Empty => StateKind::Empty,
            Self::Error(_) => StateKind::Error,
            Self::Idle(_) => StateKind::Idle,
            Self::Refreshing(_) => StateKind::Refreshing,
            Self::LoadingMore(_) => StateKind::LoadingMore,
            Self::LoadMoreFailed(_) => StateKind::LoadMoreFailed,
            Self::EndReached(_) => StateKind::EndReached,
        }
    }

    /// Accumulated items, or an empty slice when the state carries none
    pub fn items(&self) -> &[T] {
        match self {
            Self::Idle(items)
            | Self::Refreshing(items)
            | Self::LoadingMore(items)
            | Self::LoadMoreFailed(items)
            | Self::EndReached(items) => items,
            Self::Loading | Self::Empty | Self::Error(_) => &[],
        }
    }

    /// Consume the state, returning its items
    pub fn into_items(self) -> Vec<T> {
        match self {
            Self::Idle(items)
            | Self::Refreshing(items)
            | Self::LoadingMore(items)
            | Self::LoadMoreFailed(items)
            | Self::EndReached(items) => items,
            Self::Loading | Self::Empty | Self::Error(_) => Vec::new(),
        }
    }

    /// Message of a fatal error, if this is one
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            _ => None,
        }
    }

    /// Whether the state carries a list of items
    pub fn is_loaded(&self) -> bool {
        self.kind().is_loaded()
    }

    /// First load in flight, nothing on screen yet
    pub fn is_initial_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Refresh in flight with content already on screen
    pub fn is_content_refreshing(&self) -> bool {
        matches!(self, Self::Refreshing(_))
    }

    /// Load-more in flight
    pub fn is_loading_more(&self) -> bool {
        matches!(self, Self::LoadingMore(_))
    }

    /// Only `Idle` and `LoadMoreFailed` accept a load-more
    pub fn can_load_more(&self) -> bool {
        matches!(self, Self::Idle(_) | Self::LoadMoreFailed(_))
    }

    /// Fatal error, nothing on screen
    pub fn has_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Latest load-more failed; items kept
    pub fn is_load_more_error(&self) -> bool {
        matches!(self, Self::LoadMoreFailed(_))
    }

    /// Loaded, and there is nothing to show
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Every page has been fetched
    pub fn is_end_reached(&self) -> bool {
        matches!(self, Self::EndReached(_))
    }
}

/// Payload-free tag of a [`PageState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateKind {
    /// See [`PageState::Loading`]
    Loading,
    /// See [`PageState::Empty`]
    Empty,
    /// See [`PageState::Error`]
    Error,
    /// See [`PageState::Idle`]
    Idle,
    /// See [`PageState::Refreshing`]
    Refreshing,
    /// See [`PageState::LoadingMore`]
    LoadingMore,
    /// See [`PageState::LoadMoreFailed`]
    LoadMoreFailed,
    /// See [`PageState::EndReached`]
    EndReached,
}

impl StateKind {
    /// Stable lowercase name, used in logs and CLI output
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Empty => "empty",
            Self::Error => "error",
            Self::Idle => "idle",
            Self::Refreshing => "refreshing",
            Self::LoadingMore => "loading_more",
            Self::LoadMoreFailed => "load_more_failed",
            Self::EndReached => "end_reached",
        }
    }

    /// Whether states of this kind carry items
    pub fn is_loaded(self) -> bool {
        matches!(
            self,
            Self::Idle
                | Self::Refreshing
                | Self::LoadingMore
                | Self::LoadMoreFailed
                | Self::EndReached
        )
    }

    /// Whether the paginator may publish `next` directly after `self`.
    ///
    /// `LoadingMore -> Refreshing` is the preemption edge: a refresh cancels an
    /// in-flight load-more. A fetch that resolves into a state which already
    /// shows an end condition on the first page goes straight to `EndReached`.
    pub fn can_transition_to(self, next: StateKind) -> bool {
        use StateKind::{
            Empty, EndReached, Error, Idle, LoadMoreFailed, Loading, LoadingMore, Refreshing,
        };

        match (self, next) {
            (Loading, Idle | Empty | EndReached | Error) => true,
            (Empty | Error, Loading) => true,
            (Idle | LoadMoreFailed, LoadingMore) => true,
            (Idle | LoadMoreFailed | EndReached | LoadingMore, Refreshing) => true,
            (LoadingMore, Idle | Empty | EndReached | LoadMoreFailed) => true,
            (Refreshing, Idle | Empty | EndReached | Error) => true,
            _ => false,
        }
    }
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
