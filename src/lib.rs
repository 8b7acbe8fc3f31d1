// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]

//! # subtrack
//!
//! Generic pagination coordinator for incrementally loaded lists.
//!
//! A [`Paginator`] owns one paged list. Callers send intents (refresh,
//! load more, retry, cancel) and observe a single [`PageState`] value that
//! is republished whole on every transition. Only the most recently
//! dispatched fetch may change the visible state; results of superseded or
//! cancelled fetches are dropped.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use subtrack::{Paginator, PageState, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let source = |page: u32| async move { fetch_page(page).await };
//!     let paginator = Paginator::builder(1, source, |page: &u32, _: &[Item]| Some(page + 1))
//!         .spawn();
//!
//!     let first = paginator.wait_for(|s| !s.is_initial_loading()).await?;
//!     if first.can_load_more() {
//!         paginator.load_more().await?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Paginator handle (Clone)                                    │
//! │  refresh() load_more() retry() cancel()   state() subscribe()│
//! └───────────────┬──────────────────────────────────▲───────────┘
//!                 │ mpsc intents                     │ watch + broadcast
//! ┌───────────────▼──────────────────────────────────┴───────────┐
//! │  Worker task: serializes intents, owns key + generation      │
//! └───────────────┬──────────────────────────────────▲───────────┘
//!                 │ spawn fetch(key)                 │ (generation, result)
//! ┌───────────────▼──────────────────────────────────┴───────────┐
//! │  PageSource: closure, InMemoryCatalog, HttpCatalog           │
//! └──────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Paged list state machine and coordinator
pub mod pagination;

/// Product catalog page sources
pub mod catalog;

/// Product feed over a catalog
pub mod feed;

/// Feed configuration files
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};

pub use config::FeedConfig;
pub use feed::{ProductsFeed, ProductsState};
pub use pagination::{EndCondition, PageSource, PageState, Paginator, StateKind};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
