//! Pagination module
//!
//! Turns a single-page fetch into a stateful, cancellable, resumable paged
//! list.
//!
//! # Overview
//!
//! - `PageState` - the immutable lifecycle value consumers render from
//! - `Paginator` - the engine: serializes refresh / load-more / retry intents
//!   through one worker task and publishes every resulting state
//! - `PageSource` - the single-page fetch contract the engine drives
//! - `EndCondition` - how a fetched page signals the end of the list

mod paginator;
mod state;
mod types;

pub use paginator::{Paginator, PaginatorBuilder};
pub use state::{PageState, StateKind};
pub use types::{
    EndCondition, FetchKind, NextKeyFn, PageSource, ReachedEndFn, DEFAULT_QUEUE_CAPACITY,
    TRANSITION_BUFFER,
};
