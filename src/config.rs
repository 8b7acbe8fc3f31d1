//! Feed configuration
//!
//! A feed is described by a small YAML (or JSON) document:
//!
//! ```yaml
//! page_size: 20
//! queue_capacity: 32
//! category: Books
//! sort: price_asc
//! source:
//!   type: http
//!   base_url: https://shop.example.com/api
//!   timeout_secs: 10
//! ```
//!
//! Every field is optional; the default source is a generated in-memory
//! catalog.

use crate::catalog::{
    HttpCatalog, InMemoryCatalog, ProductQuery, ProductsApi, SortOrder, DEFAULT_CATALOG_SIZE,
    PAGE_SIZE,
};
use crate::error::{Error, Result};
use crate::pagination::DEFAULT_QUEUE_CAPACITY;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

// ============================================================================
// Feed Config
// ============================================================================

/// Complete feed configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Products per page; a shorter page ends the listing
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Capacity of the paginator's intent queue
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Only list this category
    #[serde(default)]
    pub category: Option<String>,

    /// Listing order
    #[serde(default)]
    pub sort: SortOrder,

    /// Where pages come from
    #[serde(default)]
    pub source: SourceConfig,
}

fn default_page_size() -> u32 {
    PAGE_SIZE
}

fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            queue_capacity: default_queue_capacity(),
            category: None,
            sort: SortOrder::Default,
            source: SourceConfig::default(),
        }
    }
}

// ============================================================================
// Source Config
// ============================================================================

/// Page source selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceConfig {
    /// Generated in-memory catalog
    Memory {
        /// Number of generated products
        #[serde(default = "default_total")]
        total: usize,
        /// Simulated latency per page
        #[serde(default)]
        latency_ms: u64,
    },

    /// Remote listing endpoint
    Http {
        /// Base URL; pages are fetched from `{base_url}/products`
        base_url: String,
        /// Request timeout
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
}

fn default_total() -> usize {
    DEFAULT_CATALOG_SIZE
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self::Memory {
            total: default_total(),
            latency_ms: 0,
        }
    }
}

// ============================================================================
// Loading
// ============================================================================

impl FeedConfig {
    /// Load a config file; `.json` files are parsed as JSON, anything else as YAML
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                Error::config(format!(
                    "Failed to read config file '{}': {e}",
                    path.display()
                ))
            }
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json(&content)
        } else {
            Self::from_yaml(&content)
        }
    }

    /// Parse and validate a YAML config
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values serde cannot
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::invalid_value("page_size", "must be greater than zero"));
        }
        if self.queue_capacity == 0 {
            return Err(Error::invalid_value(
                "queue_capacity",
                "must be greater than zero",
            ));
        }
        if let SourceConfig::Http {
            base_url,
            timeout_secs,
        } = &self.source
        {
            Url::parse(base_url)
                .map_err(|e| Error::invalid_value("source.base_url", e.to_string()))?;
            if *timeout_secs == 0 {
                return Err(Error::invalid_value(
                    "source.timeout_secs",
                    "must be greater than zero",
                ));
            }
        }
        Ok(())
    }

    /// Listing options for every page
    pub fn query(&self) -> ProductQuery {
        ProductQuery {
            page_size: self.page_size,
            category: self.category.clone(),
            sort: self.sort,
        }
    }

    /// Build the configured catalog
    pub fn build_catalog(&self) -> Result<Arc<dyn ProductsApi>> {
        let catalog: Arc<dyn ProductsApi> = match &self.source {
            SourceConfig::Memory { total, latency_ms } => Arc::new(
                InMemoryCatalog::generate(*total).with_latency(Duration::from_millis(*latency_ms)),
            ),
            SourceConfig::Http {
                base_url,
                timeout_secs,
            } => Arc::new(HttpCatalog::with_timeout(
                base_url,
                Duration::from_secs(*timeout_secs),
            )?),
        };
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_default_config() {
        let config = FeedConfig::default();
        assert_eq!(config.page_size, 20);
        assert_eq!(config.queue_capacity, 32);
        assert_eq!(
            config.source,
            SourceConfig::Memory {
                total: 100,
                latency_ms: 0
            }
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config = FeedConfig::from_yaml("{}").unwrap();
        assert_eq!(config, FeedConfig::default());
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r"
page_size: 10
category: Books
sort: price_desc
source:
  type: http
  base_url: https://shop.example.com/api
";
        let config = FeedConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.page_size, 10);
        assert_eq!(config.sort, SortOrder::PriceDesc);
        assert_eq!(
            config.source,
            SourceConfig::Http {
                base_url: "https://shop.example.com/api".to_string(),
                timeout_secs: 30
            }
        );

        let query = config.query();
        assert_eq!(query.page_size, 10);
        assert_eq!(query.category.as_deref(), Some("Books"));
    }

    #[test]
    fn test_parse_json() {
        let json = r#"{"page_size": 5, "source": {"type": "memory", "total": 12, "latency_ms": 50}}"#;
        let config = FeedConfig::from_json(json).unwrap();
        assert_eq!(config.page_size, 5);
        assert_eq!(
            config.source,
            SourceConfig::Memory {
                total: 12,
                latency_ms: 50
            }
        );
    }

    #[test]
    fn test_validate_rejects_zero_page_size() {
        let err = FeedConfig::from_yaml("page_size: 0").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid config value for 'page_size': must be greater than zero"
        );
    }

    #[test]
    fn test_validate_rejects_zero_queue_capacity() {
        assert_err!(FeedConfig::from_yaml("queue_capacity: 0"));
    }

    #[test]
    fn test_validate_rejects_bad_base_url() {
        let yaml = "source:\n  type: http\n  base_url: not a url\n";
        let err = FeedConfig::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, Error::InvalidConfigValue { ref field, .. } if field == "source.base_url"));
    }

    #[test]
    fn test_unknown_source_type() {
        let yaml = "source:\n  type: carrier_pigeon\n";
        assert!(matches!(
            FeedConfig::from_yaml(yaml),
            Err(Error::YamlParse(_))
        ));
    }

    #[test]
    fn test_from_file_by_extension() {
        let dir = tempdir().unwrap();

        let yaml_path = dir.path().join("feed.yaml");
        std::fs::write(&yaml_path, "page_size: 7\n").unwrap();
        assert_eq!(FeedConfig::from_file(&yaml_path).unwrap().page_size, 7);

        let json_path = dir.path().join("feed.json");
        std::fs::write(&json_path, r#"{"page_size": 9}"#).unwrap();
        assert_eq!(FeedConfig::from_file(&json_path).unwrap().page_size, 9);
    }

    #[test]
    fn test_from_file_missing() {
        let dir = tempdir().unwrap();
        let err = FeedConfig::from_file(dir.path().join("missing.yaml")).unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn test_build_memory_catalog() {
        let config = FeedConfig::from_yaml("source:\n  type: memory\n  total: 3\n").unwrap();
        let catalog = assert_ok!(config.build_catalog());
        let page = assert_ok!(catalog.get_products(1, &config.query()).await);
        assert_eq!(page.total_count, 3);
        assert!(!page.has_more);
    }
}
