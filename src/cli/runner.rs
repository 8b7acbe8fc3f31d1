//! CLI runner - executes commands

use crate::catalog::{Product, ProductsPage};
use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::{FeedConfig, SourceConfig};
use crate::error::{Error, Result, ResultExt};
use crate::feed::ProductsFeed;
use crate::pagination::PageState;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Browse { max_pages } => self.browse(*max_pages).await,
            Commands::Page { page } => self.page(*page).await,
            Commands::Validate => self.validate(),
        }
    }

    /// Load the config file, or the defaults when none is given, then apply
    /// command-line overrides
    fn load_config(&self) -> Result<FeedConfig> {
        let mut config = match &self.cli.config {
            Some(path) => {
                debug!(path = %path.display(), "Loading feed config");
                FeedConfig::from_file(path)?
            }
            None => FeedConfig::default(),
        };
        if let Some(sort) = self.cli.sort {
            debug!(%sort, "Overriding sort order");
            config.sort = sort;
        }
        Ok(config)
    }

    /// Page through the feed, one load-more per resolved state
    async fn browse(&self, max_pages: Option<u32>) -> Result<()> {
        if max_pages == Some(0) {
            return Err(Error::invalid_value("max-pages", "must be greater than zero"));
        }

        let config = self.load_config()?;
        let feed = ProductsFeed::with_queue_capacity(
            config.build_catalog()?,
            config.query(),
            config.queue_capacity,
        );
        let mut states = feed.subscribe();
        let mut pages = 0u32;
        let mut printed = 0usize;

        loop {
            let state = states.borrow_and_update().clone();
            if !is_resolved(&state) {
                states.changed().await.map_err(|_| Error::Closed)?;
                continue;
            }

            pages += 1;
            self.print_state(&state, printed);
            printed = state.items().len();

            match &state {
                PageState::Idle(_) if max_pages.is_some_and(|max| pages >= max) => {
                    info!(pages, items = printed, "Page limit reached");
                    break;
                }
                PageState::Idle(_) => {
                    feed.paginator().load_more().await?;
                    states.changed().await.map_err(|_| Error::Closed)?;
                }
                PageState::Error(message) => {
                    let message = message.clone();
                    feed.paginator().shutdown().await?;
                    return Err(Error::fetch(message));
                }
                PageState::LoadMoreFailed(_) => {
                    warn!(pages, items = printed, "Stopped after a failed page");
                    break;
                }
                _ => break,
            }
        }

        feed.paginator().shutdown().await?;
        Ok(())
    }

    /// Fetch one page without a paginator
    async fn page(&self, page: u32) -> Result<()> {
        let config = self.load_config()?;
        let catalog = config.build_catalog()?;
        let result = catalog
            .get_products(page, &config.query())
            .await
            .with_context(|| format!("Failed to fetch page {page}"))?;
        self.print_page(page, &result);
        Ok(())
    }

    /// Validate the config file
    fn validate(&self) -> Result<()> {
        let config = self.load_config()?;
        let source = match &config.source {
            SourceConfig::Memory { total, .. } => {
                format!("in-memory catalog of {total} products")
            }
            SourceConfig::Http { base_url, .. } => {
                format!("HTTP catalog at {base_url}")
            }
        };

        match self.cli.format {
            OutputFormat::Json => self.output_message(&json!({
                "valid": true,
                "page_size": config.page_size,
                "queue_capacity": config.queue_capacity,
                "category": config.category,
                "sort": config.sort.as_str(),
                "source": source,
            })),
            OutputFormat::Text => println!(
                "Config is valid: {source}, {} products per page, sort {}",
                config.page_size, config.sort
            ),
        }
        Ok(())
    }

    /// Print a resolved state; `seen` items were printed before
    fn print_state(&self, state: &PageState<Product>, seen: usize) {
        let items = state.items();
        let fresh = items.get(seen..).unwrap_or_default();

        match self.cli.format {
            OutputFormat::Json => self.output_message(&json!({
                "state": state.kind(),
                "items": items.len(),
                "error": state.error_message(),
                "products": fresh,
            })),
            OutputFormat::Text => {
                match state.error_message() {
                    Some(message) => println!("[{}] {message}", state.kind()),
                    None => println!("[{}] {} items", state.kind(), items.len()),
                }
                for product in fresh {
                    print_product(product);
                }
            }
        }
    }

    fn print_page(&self, page: u32, result: &ProductsPage) {
        match self.cli.format {
            OutputFormat::Json => self.output_message(&json!({
                "page": page,
                "totalCount": result.total_count,
                "hasMore": result.has_more,
                "products": result.products,
            })),
            OutputFormat::Text => {
                println!(
                    "Page {page}: {} of {} products{}",
                    result.products.len(),
                    result.total_count,
                    if result.has_more { ", more available" } else { "" }
                );
                for product in &result.products {
                    print_product(product);
                }
            }
        }
    }

    /// Output a JSON message
    fn output_message(&self, msg: &Value) {
        println!("{}", serde_json::to_string(msg).unwrap_or_default());
    }
}

/// A state the paginator settles in until the next intent
fn is_resolved<T>(state: &PageState<T>) -> bool {
    !(state.is_initial_loading() || state.is_loading_more() || state.is_content_refreshing())
}

fn print_product(product: &Product) {
    println!(
        "  #{:<4} {:<28} {:>8.2}  {}{}",
        product.id,
        product.name,
        product.price,
        product.category,
        if product.in_stock { "" } else { " (out of stock)" }
    );
}
