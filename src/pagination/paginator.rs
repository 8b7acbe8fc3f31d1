//! Paginator engine
//!
//! A `Paginator` is a cheap, cloneable handle onto a single worker task. The
//! worker owns the cursor and the current state; every intent reaches it
//! through a bounded queue and is handled one at a time, so no lock guards
//! either value.
//!
//! Each fetch runs in its own task and reports back tagged with a generation
//! number. Only a completion whose generation is still the latest dispatched
//! one is applied, which keeps superseded and cancelled fetches from ever
//! publishing.

use super::state::PageState;
use super::types::{
    Action, EndCondition, FetchKind, NextKeyFn, PageSource, DEFAULT_QUEUE_CAPACITY,
    TRANSITION_BUFFER,
};
use crate::error::{Error, Result};
use futures::stream::BoxStream;
use futures::{FutureExt, StreamExt};
use std::fmt;
use std::marker::PhantomData;
use std::ops::ControlFlow;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

// ============================================================================
// Handle
// ============================================================================

/// Handle onto a running paginator
///
/// Clones share the same worker. The worker stops when every handle has been
/// dropped or [`Paginator::shutdown`] is called; an in-flight fetch is aborted
/// either way.
pub struct Paginator<K, T> {
    actions: mpsc::Sender<Action>,
    state: watch::Receiver<PageState<T>>,
    transitions: broadcast::WeakSender<PageState<T>>,
    generation: Arc<AtomicU64>,
    _key: PhantomData<fn() -> K>,
}

impl<K, T> Clone for Paginator<K, T> {
    fn clone(&self) -> Self {
        Self {
            actions: self.actions.clone(),
            state: self.state.clone(),
            transitions: self.transitions.clone(),
            generation: Arc::clone(&self.generation),
            _key: PhantomData,
        }
    }
}

impl<K, T> fmt::Debug for Paginator<K, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Paginator")
            .field("state", &self.state.borrow().kind())
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl<K, T> Paginator<K, T>
where
    K: Clone + fmt::Debug + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    /// Start configuring a paginator
    pub fn builder(
        initial_key: K,
        source: impl PageSource<K, T> + 'static,
        next_key: impl Fn(&K, &[T]) -> Option<K> + Send + Sync + 'static,
    ) -> PaginatorBuilder<K, T> {
        PaginatorBuilder {
            initial_key,
            source: Arc::new(source),
            next_key: Arc::new(next_key),
            end_condition: EndCondition::default(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }

    /// Snapshot of the latest published state
    pub fn state(&self) -> PageState<T> {
        self.state.borrow().clone()
    }

    /// Latest-value receiver; a new subscriber sees the current state at once
    pub fn subscribe(&self) -> watch::Receiver<PageState<T>> {
        self.state.clone()
    }

    /// Every transition published after this call, in order
    ///
    /// An observer that falls more than the buffer behind skips the oldest
    /// transitions and keeps going. The stream ends once the worker has
    /// stopped; it is empty if the worker is already gone.
    pub fn transitions(&self) -> BoxStream<'static, PageState<T>> {
        let Some(sender) = self.transitions.upgrade() else {
            return futures::stream::empty().boxed();
        };
        let rx = sender.subscribe();
        drop(sender);
        futures::stream::unfold(rx, |mut rx| async move {
            loop {
                match rx.recv().await {
                    Ok(state) => return Some((state, rx)),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Transition observer lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        })
        .boxed()
    }

    /// Wait until the published state satisfies `predicate`
    pub async fn wait_for(
        &self,
        mut predicate: impl FnMut(&PageState<T>) -> bool,
    ) -> Result<PageState<T>> {
        let mut rx = self.state.clone();
        let state = rx
            .wait_for(|state| predicate(state))
            .await
            .map_err(|_| Error::Closed)?;
        Ok(state.clone())
    }

    /// Queue a refresh, dropping it if the queue is full
    pub fn try_refresh(&self) -> Result<()> {
        self.try_send(Action::Refresh)
    }

    /// Queue a load-more, dropping it if the queue is full
    pub fn try_load_more(&self) -> Result<()> {
        self.try_send(Action::LoadMore)
    }

    /// Queue a retry, dropping it if the queue is full
    pub fn try_retry(&self) -> Result<()> {
        self.try_send(Action::Retry)
    }

    /// Queue a refresh, waiting for queue capacity
    pub async fn refresh(&self) -> Result<()> {
        self.send(Action::Refresh).await
    }

    /// Queue a load-more, waiting for queue capacity
    pub async fn load_more(&self) -> Result<()> {
        self.send(Action::LoadMore).await
    }

    /// Queue a retry, waiting for queue capacity
    pub async fn retry(&self) -> Result<()> {
        self.send(Action::Retry).await
    }

    /// Cancel the fetch in flight, if any, keeping the last published state
    ///
    /// Takes effect immediately: the in-flight generation is invalidated
    /// before this returns, so its outcome can no longer be applied. The
    /// worker aborts the task itself when it next runs.
    pub fn cancel(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(generation, "Cancelling in-flight fetch");
        // Best effort: a full queue means the worker will reap the stale task
        // when it handles the next intent anyway.
        let _ = self.actions.try_send(Action::Cancel);
    }

    /// Stop the worker after the intents already queued
    pub async fn shutdown(&self) -> Result<()> {
        self.send(Action::Shutdown).await
    }

    /// Wait until the worker has stopped
    pub async fn closed(&self) {
        self.actions.closed().await;
    }

    /// Whether the worker has stopped
    pub fn is_closed(&self) -> bool {
        self.actions.is_closed()
    }

    fn try_send(&self, action: Action) -> Result<()> {
        self.actions.try_send(action).map_err(|e| match e {
            mpsc::error::TrySendError::Full(action) => {
                debug!(?action, "Action queue full, dropping intent");
                Error::QueueFull
            }
            mpsc::error::TrySendError::Closed(_) => Error::Closed,
        })
    }

    async fn send(&self, action: Action) -> Result<()> {
        self.actions.send(action).await.map_err(|_| Error::Closed)
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`Paginator`]
pub struct PaginatorBuilder<K, T> {
    initial_key: K,
    source: Arc<dyn PageSource<K, T>>,
    next_key: NextKeyFn<K, T>,
    end_condition: EndCondition<K, T>,
    queue_capacity: usize,
}

impl<K, T> PaginatorBuilder<K, T>
where
    K: Clone + fmt::Debug + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    /// Set the end-of-data condition (default: empty page)
    #[must_use]
    pub fn end_condition(mut self, end_condition: EndCondition<K, T>) -> Self {
        self.end_condition = end_condition;
        self
    }

    /// Set the intent queue capacity (minimum 1)
    #[must_use]
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    /// Spawn the worker and issue the first load
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn(self) -> Paginator<K, T> {
        let (actions_tx, actions_rx) = mpsc::channel(self.queue_capacity);
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(PageState::Loading);
        let (transitions_tx, _) = broadcast::channel(TRANSITION_BUFFER);
        // Only the worker holds a strong sender
        let weak_transitions = transitions_tx.downgrade();
        let generation = Arc::new(AtomicU64::new(0));

        info!(
            initial_key = ?self.initial_key,
            end_condition = ?self.end_condition,
            queue_capacity = self.queue_capacity,
            "Starting paginator"
        );

        let worker = Worker {
            key: Some(self.initial_key.clone()),
            initial_key: self.initial_key,
            source: self.source,
            next_key: self.next_key,
            end_condition: self.end_condition,
            current: PageState::Loading,
            state: state_tx,
            transitions: transitions_tx,
            generation: Arc::clone(&generation),
            in_flight: None,
            completions: completions_tx,
        };
        tokio::spawn(worker.run(actions_rx, completions_rx));

        Paginator {
            actions: actions_tx,
            state: state_rx,
            transitions: weak_transitions,
            generation,
            _key: PhantomData,
        }
    }
}

// ============================================================================
// Worker
// ============================================================================

/// Outcome of a dispatched fetch
struct Completion<T> {
    generation: u64,
    outcome: Result<Vec<T>>,
}

/// The fetch currently owned by the worker
struct InFlight<K> {
    generation: u64,
    kind: FetchKind,
    key: K,
    task: JoinHandle<()>,
}

/// Single consumer of the action queue; sole writer of the state
struct Worker<K, T> {
    initial_key: K,
    key: Option<K>,
    source: Arc<dyn PageSource<K, T>>,
    next_key: NextKeyFn<K, T>,
    end_condition: EndCondition<K, T>,
    current: PageState<T>,
    state: watch::Sender<PageState<T>>,
    transitions: broadcast::Sender<PageState<T>>,
    generation: Arc<AtomicU64>,
    in_flight: Option<InFlight<K>>,
    completions: mpsc::UnboundedSender<Completion<T>>,
}

impl<K, T> Worker<K, T>
where
    K: Clone + fmt::Debug + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    async fn run(
        mut self,
        mut actions: mpsc::Receiver<Action>,
        mut completions: mpsc::UnboundedReceiver<Completion<T>>,
    ) {
        // Implicit first load
        self.on_refresh();

        // Queued intents are handled before fetch completions, so an intent
        // issued while a fetch is pending is judged against that fetch.
        loop {
            tokio::select! {
                biased;

                action = actions.recv() => match action {
                    Some(action) => {
                        if self.handle(action).is_break() {
                            break;
                        }
                    }
                    None => break,
                },
                Some(completion) = completions.recv() => self.resolve(completion),
            }
        }

        if let Some(in_flight) = self.in_flight.take() {
            in_flight.task.abort();
        }
        info!("Paginator stopped");
    }

    fn handle(&mut self, action: Action) -> ControlFlow<()> {
        self.reap_cancelled();
        match action {
            Action::Refresh => self.on_refresh(),
            Action::LoadMore => self.on_load_more(),
            Action::Retry => self.on_retry(),
            Action::Cancel => {}
            Action::Shutdown => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    fn on_refresh(&mut self) {
        if self
            .in_flight
            .as_ref()
            .is_some_and(|in_flight| in_flight.kind.is_refresh())
        {
            debug!("Refresh already in flight, ignoring");
            return;
        }
        self.key = Some(self.initial_key.clone());
        self.dispatch(FetchKind::Refresh);
    }

    fn on_load_more(&mut self) {
        // A load-more that was cancelled leaves `LoadingMore` published with
        // nothing in flight; that one may be resumed.
        let resumable = self.current.is_loading_more() && self.in_flight.is_none();
        if !self.current.can_load_more() && !resumable {
            debug!(state = %self.current.kind(), "Load more not possible, ignoring");
            return;
        }
        if self.key.is_none() {
            debug!("No next key, ignoring load more");
            return;
        }
        self.dispatch(FetchKind::LoadMore);
    }

    fn on_retry(&mut self) {
        if self.current.has_error() {
            self.on_refresh();
        } else if self.current.is_load_more_error() {
            self.on_load_more();
        } else {
            debug!(state = %self.current.kind(), "Nothing to retry");
        }
    }

    /// Publish the provisional state and start fetching with the stored key
    fn dispatch(&mut self, kind: FetchKind) {
        let Some(key) = self.key.clone() else {
            return;
        };

        if let Some(previous) = self.in_flight.take() {
            previous.task.abort();
            debug!(
                generation = previous.generation,
                kind = %previous.kind,
                "Superseded in-flight fetch"
            );
        }
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let provisional = match kind {
            FetchKind::Refresh if self.current.is_loaded() => {
                PageState::Refreshing(self.current.items().to_vec())
            }
            FetchKind::Refresh => PageState::Loading,
            FetchKind::LoadMore => PageState::LoadingMore(self.current.items().to_vec()),
        };
        if provisional.kind() != self.current.kind() {
            self.publish(provisional);
        }

        debug!(generation, %kind, ?key, "Dispatching fetch");
        let source = Arc::clone(&self.source);
        let completions = self.completions.clone();
        let fetch_key = key.clone();
        let task = tokio::spawn(async move {
            let outcome = AssertUnwindSafe(source.fetch(fetch_key))
                .catch_unwind()
                .await
                .unwrap_or_else(|_| Err(Error::fetch("page source panicked")));
            // The worker may already be gone; nothing to report to then.
            let _ = completions.send(Completion {
                generation,
                outcome,
            });
        });

        self.in_flight = Some(InFlight {
            generation,
            kind,
            key,
            task,
        });
    }

    /// Apply a completion if it belongs to the latest dispatched fetch
    fn resolve(&mut self, completion: Completion<T>) {
        let live = self.generation.load(Ordering::SeqCst);
        let in_flight = match self.in_flight.take() {
            Some(in_flight)
                if in_flight.generation == completion.generation
                    && completion.generation == live =>
            {
                in_flight
            }
            other => {
                self.in_flight = other;
                debug!(
                    generation = completion.generation,
                    live, "Discarding outcome of superseded fetch"
                );
                return;
            }
        };

        let next = match completion.outcome {
            Ok(page) => self.on_page(in_flight.kind, &in_flight.key, page),
            Err(e) => self.on_failure(in_flight.kind, &e),
        };
        self.publish(next);
    }

    fn on_page(&mut self, kind: FetchKind, used_key: &K, page: Vec<T>) -> PageState<T> {
        let next = (self.next_key)(used_key, &page);
        let end = self.end_condition.reached(next.as_ref(), &page);
        debug!(
            %kind,
            key = ?used_key,
            fetched = page.len(),
            next_key = ?next,
            end,
            "Page fetched"
        );
        self.key = next;

        let merged = match kind {
            FetchKind::Refresh => page,
            FetchKind::LoadMore => {
                let mut items = self.current.items().to_vec();
                items.extend(page);
                items
            }
        };

        if merged.is_empty() {
            PageState::Empty
        } else if end {
            PageState::EndReached(merged)
        } else {
            PageState::Idle(merged)
        }
    }

    fn on_failure(&mut self, kind: FetchKind, error: &Error) -> PageState<T> {
        warn!(%kind, error = %error, "Fetch failed");
        match kind {
            FetchKind::Refresh => PageState::error(error.to_string()),
            // Cursor stays put so a retry asks for the same page
            FetchKind::LoadMore => PageState::LoadMoreFailed(self.current.items().to_vec()),
        }
    }

    /// Drop the in-flight fetch if `cancel` invalidated its generation
    fn reap_cancelled(&mut self) {
        let live = self.generation.load(Ordering::SeqCst);
        if self
            .in_flight
            .as_ref()
            .is_some_and(|in_flight| in_flight.generation != live)
        {
            if let Some(cancelled) = self.in_flight.take() {
                cancelled.task.abort();
                debug!(generation = cancelled.generation, "Aborted cancelled fetch");
            }
        }
    }

    fn publish(&mut self, next: PageState<T>) {
        let from = self.current.kind();
        let to = next.kind();
        debug_assert!(
            from.can_transition_to(to),
            "illegal transition {from} -> {to}"
        );
        debug!(%from, %to, items = next.items().len(), "Publishing state");

        self.current = next;
        self.state.send_replace(self.current.clone());
        // No observers is fine
        let _ = self.transitions.send(self.current.clone());
    }
}
