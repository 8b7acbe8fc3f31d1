//! HTTP catalog
//!
//! Fetches product pages from a remote listing endpoint:
//! `GET {base_url}/products?page=N&page_size=M[&category=C][&sort=S]`,
//! answered with a JSON `ProductsPage`.

use super::types::{check_page, ProductQuery, ProductsApi, ProductsPage, SortOrder};
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Product catalog behind an HTTP endpoint
///
/// Performs exactly one request per page; retry policy is left to callers.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    client: Client,
    base_url: Url,
}

impl HttpCatalog {
    /// Create a catalog for `base_url` with the default timeout
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a catalog for `base_url` with a request timeout
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(format!("subtrack/{}", env!("CARGO_PKG_VERSION")))
            .build()?;
        Self::with_client(client, base_url)
    }

    /// Create a catalog using an existing client
    pub fn with_client(client: Client, base_url: &str) -> Result<Self> {
        let mut base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::invalid_value(
                "base_url",
                format!("'{base_url}' cannot be used as a base URL"),
            ));
        }
        // Keep the last path segment when joining "products"
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { client, base_url })
    }

    /// Base URL with a trailing slash
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Listing URL for one page
    pub fn products_url(&self, page: u32, query: &ProductQuery) -> Result<Url> {
        let mut url = self.base_url.join("products")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("page", &page.to_string());
            pairs.append_pair("page_size", &query.page_size.to_string());
            if let Some(category) = &query.category {
                pairs.append_pair("category", category);
            }
            if query.sort != SortOrder::Default {
                pairs.append_pair("sort", query.sort.as_str());
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl ProductsApi for HttpCatalog {
    async fn get_products(&self, page: u32, query: &ProductQuery) -> Result<ProductsPage> {
        check_page(page, query)?;
        let url = self.products_url(page, query)?;
        debug!(%url, "Fetching products page");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), page, "Products request failed");
            return Err(Error::http_status(status.as_u16(), body));
        }

        Ok(response.json::<ProductsPage>().await?)
    }
}
