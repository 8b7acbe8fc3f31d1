//! Product feed
//!
//! Wires a [`Paginator`] to a [`ProductsApi`]: pages are numbered from 1 and
//! a page shorter than the configured page size ends the listing.

use crate::catalog::{Product, ProductQuery, ProductsApi, SortOrder};
use crate::error::Result;
use crate::pagination::{EndCondition, PageState, Paginator, DEFAULT_QUEUE_CAPACITY};
use futures::stream::BoxStream;
use std::ops::Deref;
use std::sync::Arc;
use tokio::sync::watch;

/// Key of the first page
pub const FIRST_PAGE: u32 = 1;

/// What a products screen renders
#[derive(Debug, Clone, PartialEq)]
pub struct ProductsState {
    /// Paged list state
    pub pagination: PageState<Product>,
    /// Category filter in effect
    pub selected_category: Option<String>,
    /// Listing order in effect
    pub sort_order: SortOrder,
}

impl ProductsState {
    /// Products on screen, empty unless the list is loaded
    pub fn products(&self) -> &[Product] {
        self.pagination.items()
    }
}

impl Deref for ProductsState {
    type Target = PageState<Product>;

    fn deref(&self) -> &Self::Target {
        &self.pagination
    }
}

/// Paged product listing over a catalog
#[derive(Debug, Clone)]
pub struct ProductsFeed {
    paginator: Paginator<u32, Product>,
    query: ProductQuery,
}

impl ProductsFeed {
    /// Start a feed; the first page is requested immediately
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(api: Arc<dyn ProductsApi>, query: ProductQuery) -> Self {
        Self::with_queue_capacity(api, query, DEFAULT_QUEUE_CAPACITY)
    }

    /// Start a feed with a custom intent queue capacity
    pub fn with_queue_capacity(
        api: Arc<dyn ProductsApi>,
        query: ProductQuery,
        queue_capacity: usize,
    ) -> Self {
        let fetch_query = query.clone();
        let source = move |page: u32| {
            let api = Arc::clone(&api);
            let query = fetch_query.clone();
            async move { api.get_products(page, &query).await.map(|p| p.products) }
        };

        let paginator = Paginator::builder(FIRST_PAGE, source, |page: &u32, _: &[Product]| {
            page.checked_add(1)
        })
        .end_condition(EndCondition::ShortPage(query.page_size as usize))
        .queue_capacity(queue_capacity)
        .spawn();

        Self { paginator, query }
    }

    /// Current screen state
    pub fn state(&self) -> ProductsState {
        self.wrap(self.paginator.state())
    }

    /// Wrap a pagination state with this feed's filter settings
    pub fn wrap(&self, pagination: PageState<Product>) -> ProductsState {
        ProductsState {
            pagination,
            selected_category: self.query.category.clone(),
            sort_order: self.query.sort,
        }
    }

    /// Listing options sent with every page request
    pub fn query(&self) -> &ProductQuery {
        &self.query
    }

    /// Underlying paginator
    pub fn paginator(&self) -> &Paginator<u32, Product> {
        &self.paginator
    }

    /// Latest-value receiver of the pagination state
    pub fn subscribe(&self) -> watch::Receiver<PageState<Product>> {
        self.paginator.subscribe()
    }

    /// Every pagination state published from now on
    pub fn transitions(&self) -> BoxStream<'static, PageState<Product>> {
        self.paginator.transitions()
    }

    /// Pull-to-refresh; dropped if the intent queue is full
    pub fn refresh(&self) -> Result<()> {
        self.paginator.try_refresh()
    }

    /// Scrolled near the end; dropped if the intent queue is full
    pub fn load_more(&self) -> Result<()> {
        self.paginator.try_load_more()
    }

    /// Retry the last failed fetch
    pub fn retry(&self) -> Result<()> {
        self.paginator.try_retry()
    }

    /// Drop the in-flight fetch, keeping what is on screen
    pub fn cancel(&self) {
        self.paginator.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;
    use pretty_assertions::assert_eq;

    fn feed(total: usize, query: ProductQuery) -> ProductsFeed {
        ProductsFeed::new(Arc::new(InMemoryCatalog::generate(total)), query)
    }

    async fn wait_for_count(feed: &ProductsFeed, count: usize) -> ProductsState {
        let state = feed
            .paginator()
            .wait_for(|s| s.items().len() == count && !s.is_loading_more())
            .await
            .unwrap();
        feed.wrap(state)
    }

    #[tokio::test]
    async fn test_feed_pages_until_short_page() {
        let feed = feed(45, ProductQuery::new());

        let state = wait_for_count(&feed, 20).await;
        assert!(state.can_load_more());
        assert_eq!(state.products()[0].id, 1);

        feed.load_more().unwrap();
        let state = wait_for_count(&feed, 40).await;
        assert!(state.can_load_more());

        feed.load_more().unwrap();
        let state = wait_for_count(&feed, 45).await;
        assert!(state.is_end_reached());
        assert_eq!(state.products().last().map(|p| p.id), Some(45));
    }

    #[tokio::test]
    async fn test_feed_exact_multiple_ends_on_empty_page() {
        let feed = feed(40, ProductQuery::new());
        wait_for_count(&feed, 20).await;

        feed.load_more().unwrap();
        let state = wait_for_count(&feed, 40).await;
        assert!(state.can_load_more());

        feed.load_more().unwrap();
        let state = feed
            .paginator()
            .wait_for(PageState::is_end_reached)
            .await
            .unwrap();
        assert_eq!(state.items().len(), 40);
    }

    #[tokio::test]
    async fn test_feed_carries_filters() {
        let query = ProductQuery::new()
            .with_category("Sports")
            .with_sort(SortOrder::PriceDesc);
        let feed = feed(100, query);

        let state = wait_for_count(&feed, 20).await;
        assert_eq!(state.selected_category.as_deref(), Some("Sports"));
        assert_eq!(state.sort_order, SortOrder::PriceDesc);
        assert!(state.products().iter().all(|p| p.category == "Sports"));
        // 20 sports products in a page of 20: the page is full, not the end
        assert!(state.can_load_more());
    }

    #[tokio::test]
    async fn test_feed_empty_catalog() {
        let feed = feed(0, ProductQuery::new());
        let state = feed.paginator().wait_for(PageState::is_empty).await.unwrap();
        let state = feed.wrap(state);
        assert!(state.products().is_empty());
        assert!(!state.can_load_more());
    }
}
