//! In-memory catalog
//!
//! Serves a fixed product list with optional simulated latency. Useful for
//! demos and as a deterministic page source in tests.

use super::types::{check_page, Product, ProductQuery, ProductsApi, ProductsPage, SortOrder};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use std::time::Duration;
use tracing::debug;

/// Number of products in a generated catalog
pub const DEFAULT_CATALOG_SIZE: usize = 100;

const CATEGORIES: [&str; 5] = ["Electronics", "Clothing", "Books", "Home", "Sports"];

/// Product catalog held in memory
#[derive(Debug, Clone)]
pub struct InMemoryCatalog {
    products: Vec<Product>,
    latency: Duration,
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::generate(DEFAULT_CATALOG_SIZE)
    }
}

impl InMemoryCatalog {
    /// Create a catalog over the given products, in listing order
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products,
            latency: Duration::ZERO,
        }
    }

    /// Create a catalog of `count` generated products
    pub fn generate(count: usize) -> Self {
        Self::new(generate_products(count))
    }

    /// Delay every page by `latency`
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// All products, in catalog order
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Number of products in the catalog
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog has no products
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Products matching `query`, filtered then sorted
    fn listing(&self, query: &ProductQuery) -> Vec<&Product> {
        let mut listing: Vec<&Product> = self
            .products
            .iter()
            .filter(|p| {
                query
                    .category
                    .as_deref()
                    .map_or(true, |c| p.category.eq_ignore_ascii_case(c))
            })
            .collect();

        match query.sort {
            SortOrder::Default => {}
            SortOrder::NameAsc => listing.sort_by(|a, b| a.name.cmp(&b.name)),
            SortOrder::NameDesc => listing.sort_by(|a, b| b.name.cmp(&a.name)),
            SortOrder::PriceAsc => listing.sort_by(|a, b| a.price.total_cmp(&b.price)),
            SortOrder::PriceDesc => listing.sort_by(|a, b| b.price.total_cmp(&a.price)),
            SortOrder::CreatedAsc => listing.sort_by_key(|p| p.created_at),
            SortOrder::CreatedDesc => listing.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        }
        listing
    }
}

#[async_trait]
impl ProductsApi for InMemoryCatalog {
    async fn get_products(&self, page: u32, query: &ProductQuery) -> Result<ProductsPage> {
        check_page(page, query)?;
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let listing = self.listing(query);
        let page_size = query.page_size as usize;
        let start = (page as usize - 1).saturating_mul(page_size);
        let end = start.saturating_add(page_size).min(listing.len());

        let products: Vec<Product> = if start < listing.len() {
            listing[start..end].iter().map(|p| (*p).clone()).collect()
        } else {
            Vec::new()
        };

        debug!(
            page,
            page_size,
            returned = products.len(),
            total = listing.len(),
            "Served in-memory page"
        );

        Ok(ProductsPage {
            has_more: end < listing.len(),
            total_count: listing.len(),
            products,
        })
    }
}

/// Generate a deterministic product list
///
/// Categories rotate, prices wrap at 500, every seventh product is out of
/// stock and creation dates cycle through July 2025.
pub fn generate_products(count: usize) -> Vec<Product> {
    let first_day = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap_or_default();

    (0..count)
        .map(|index| {
            let number = index + 1;
            Product {
                id: number as u64,
                name: format!("Product {number}"),
                description: format!(
                    "This is a detailed description for product {number}. \
                     It contains all the important information about this product."
                ),
                price: (10.0 + index as f64 * 5.5) % 500.0,
                image_url: Some(format!("https://example.com/product{number}.jpg")),
                category: CATEGORIES[index % CATEGORIES.len()].to_string(),
                in_stock: index % 7 != 0,
                created_at: first_day + Days::new((index % 30) as u64),
            }
        })
        .collect()
}
