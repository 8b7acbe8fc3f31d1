//! Catalog module
//!
//! Page sources for product listings.
//!
//! # Overview
//!
//! - `ProductsApi` - page-oriented catalog contract (pages numbered from 1)
//! - `InMemoryCatalog` - generated or fixed products with simulated latency
//! - `HttpCatalog` - remote listing endpoint over HTTP

mod http;
mod memory;
mod types;

pub use http::{HttpCatalog, DEFAULT_TIMEOUT};
pub use memory::{generate_products, InMemoryCatalog, DEFAULT_CATALOG_SIZE};
pub use types::{Product, ProductQuery, ProductsApi, ProductsPage, SortOrder, PAGE_SIZE};

#[cfg(test)]
mod tests;
