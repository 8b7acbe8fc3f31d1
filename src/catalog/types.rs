//! Catalog types and traits
//!
//! Product records, query options and the page-oriented catalog contract.

use crate::error::{Error, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default number of products per page
pub const PAGE_SIZE: u32 = 20;

/// A product as served by a catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Catalog-wide identifier
    pub id: u64,
    /// Display name
    pub name: String,
    /// Short description
    pub description: String,
    /// Unit price
    pub price: f64,
    /// Optional picture
    #[serde(default)]
    pub image_url: Option<String>,
    /// Category name, compared case-insensitively when filtering
    pub category: String,
    /// Missing in a payload means in stock
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
    /// Listing date
    pub created_at: NaiveDate,
}

fn default_in_stock() -> bool {
    true
}

/// Sort order options for product listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Catalog order
    #[default]
    Default,
    /// Name, A to Z
    NameAsc,
    /// Name, Z to A
    NameDesc,
    /// Cheapest first
    PriceAsc,
    /// Most expensive first
    PriceDesc,
    /// Oldest first
    CreatedAsc,
    /// Newest first
    CreatedDesc,
}

impl SortOrder {
    /// Query-string form
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::NameAsc => "name_asc",
            Self::NameDesc => "name_desc",
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::CreatedAsc => "created_asc",
            Self::CreatedDesc => "created_desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "default" => Ok(Self::Default),
            "name_asc" => Ok(Self::NameAsc),
            "name_desc" => Ok(Self::NameDesc),
            "price_asc" => Ok(Self::PriceAsc),
            "price_desc" => Ok(Self::PriceDesc),
            "created_asc" => Ok(Self::CreatedAsc),
            "created_desc" => Ok(Self::CreatedDesc),
            other => Err(Error::invalid_value("sort", format!("unknown sort order '{other}'"))),
        }
    }
}

/// Options applied to every page of a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductQuery {
    /// Products per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Only products of this category
    #[serde(default)]
    pub category: Option<String>,
    /// Listing order
    #[serde(default)]
    pub sort: SortOrder,
}

fn default_page_size() -> u32 {
    PAGE_SIZE
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            page_size: PAGE_SIZE,
            category: None,
            sort: SortOrder::Default,
        }
    }
}

impl ProductQuery {
    /// Create a query with the default page size
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page size
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Restrict to a category
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the sort order
    #[must_use]
    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }
}

/// One page of a listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductsPage {
    /// Products on this page
    pub products: Vec<Product>,
    /// Products matching the query across all pages
    pub total_count: usize,
    /// Whether a later page holds more products
    pub has_more: bool,
}

/// A catalog that serves products one page at a time
///
/// Pages are numbered from 1. Pages past the end are empty.
#[async_trait]
pub trait ProductsApi: Send + Sync {
    /// Fetch page `page` of the listing described by `query`
    async fn get_products(&self, page: u32, query: &ProductQuery) -> Result<ProductsPage>;
}

/// Reject page numbers and sizes a catalog cannot serve
pub(crate) fn check_page(page: u32, query: &ProductQuery) -> Result<()> {
    if page == 0 {
        return Err(Error::InvalidPage { page });
    }
    if query.page_size == 0 {
        return Err(Error::invalid_value("page_size", "must be greater than zero"));
    }
    Ok(())
}
