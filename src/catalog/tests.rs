//! Tests for catalog module

use super::*;
use crate::error::Error;
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;
use test_case::test_case;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn ids(page: &ProductsPage) -> Vec<u64> {
    page.products.iter().map(|p| p.id).collect()
}

// ============================================================================
// Generated Catalog Tests
// ============================================================================

#[test]
fn test_generate_products() {
    let products = generate_products(100);
    assert_eq!(products.len(), 100);

    let first = &products[0];
    assert_eq!(first.id, 1);
    assert_eq!(first.name, "Product 1");
    assert_eq!(first.category, "Electronics");
    assert!(!first.in_stock);
    assert_eq!(first.created_at, NaiveDate::from_ymd_opt(2025, 7, 1).unwrap());
    assert_eq!(
        first.image_url.as_deref(),
        Some("https://example.com/product1.jpg")
    );

    let tenth = &products[9];
    assert_eq!(tenth.category, "Sports");
    assert!((tenth.price - 59.5).abs() < f64::EPSILON);
    assert!(tenth.in_stock);

    // Dates cycle through a 30-day window
    assert_eq!(products[30].created_at, first.created_at);
    assert!(products.iter().all(|p| p.price < 500.0));
}

#[test]
fn test_catalog_default_size() {
    let catalog = InMemoryCatalog::default();
    assert_eq!(catalog.len(), DEFAULT_CATALOG_SIZE);
    assert!(!catalog.is_empty());
    assert!(InMemoryCatalog::new(Vec::new()).is_empty());
}

// ============================================================================
// In-Memory Paging Tests
// ============================================================================

#[tokio::test]
async fn test_in_memory_pages() {
    let catalog = InMemoryCatalog::generate(45);
    let query = ProductQuery::new();

    let first = catalog.get_products(1, &query).await.unwrap();
    assert_eq!(ids(&first), (1..=20).collect::<Vec<_>>());
    assert_eq!(first.total_count, 45);
    assert!(first.has_more);

    let last = catalog.get_products(3, &query).await.unwrap();
    assert_eq!(ids(&last), (41..=45).collect::<Vec<_>>());
    assert!(!last.has_more);

    let past_end = catalog.get_products(4, &query).await.unwrap();
    assert!(past_end.products.is_empty());
    assert!(!past_end.has_more);
}

#[tokio::test]
async fn test_in_memory_category_filter() {
    let catalog = InMemoryCatalog::generate(100);
    let query = ProductQuery::new().with_category("books").with_page_size(50);

    let page = catalog.get_products(1, &query).await.unwrap();
    assert_eq!(page.total_count, 20);
    assert!(page.products.iter().all(|p| p.category == "Books"));
    assert_eq!(page.products[0].id, 3);
}

#[test_case(SortOrder::PriceAsc ; "price ascending")]
#[test_case(SortOrder::PriceDesc ; "price descending")]
#[test_case(SortOrder::NameAsc ; "name ascending")]
#[test_case(SortOrder::CreatedDesc ; "created descending")]
#[tokio::test]
async fn test_in_memory_sorting(sort: SortOrder) {
    let catalog = InMemoryCatalog::generate(100);
    let query = ProductQuery::new().with_sort(sort).with_page_size(100);
    let products = catalog.get_products(1, &query).await.unwrap().products;

    let sorted = products.windows(2).all(|w| match sort {
        SortOrder::PriceAsc => w[0].price <= w[1].price,
        SortOrder::PriceDesc => w[0].price >= w[1].price,
        SortOrder::NameAsc => w[0].name <= w[1].name,
        SortOrder::CreatedDesc => w[0].created_at >= w[1].created_at,
        _ => true,
    });
    assert!(sorted, "not sorted by {sort}");
}

#[tokio::test]
async fn test_in_memory_rejects_page_zero() {
    let catalog = InMemoryCatalog::generate(5);
    let err = catalog
        .get_products(0, &ProductQuery::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidPage { page: 0 }));

    let err = catalog
        .get_products(1, &ProductQuery::new().with_page_size(0))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidConfigValue { .. }));
}

#[tokio::test]
async fn test_in_memory_latency() {
    let catalog = InMemoryCatalog::generate(5).with_latency(Duration::from_millis(50));
    let started = tokio::time::Instant::now();
    catalog.get_products(1, &ProductQuery::new()).await.unwrap();
    assert!(started.elapsed() >= Duration::from_millis(50));
}

// ============================================================================
// SortOrder Tests
// ============================================================================

#[test_case("price_desc", SortOrder::PriceDesc ; "snake case")]
#[test_case("Name-Asc", SortOrder::NameAsc ; "kebab mixed case")]
#[test_case("default", SortOrder::Default ; "default")]
fn test_sort_order_parse(input: &str, expected: SortOrder) {
    assert_eq!(input.parse::<SortOrder>().unwrap(), expected);
}

#[test]
fn test_sort_order_parse_unknown() {
    let err = "sideways".parse::<SortOrder>().unwrap_err();
    assert!(err.to_string().contains("unknown sort order 'sideways'"));
}

#[test]
fn test_products_page_json_shape() {
    let page = ProductsPage {
        products: generate_products(1),
        total_count: 1,
        has_more: false,
    };
    let value = serde_json::to_value(&page).unwrap();
    assert_eq!(value["totalCount"], 1);
    assert_eq!(value["hasMore"], false);
    assert_eq!(value["products"][0]["inStock"], false);
    assert_eq!(value["products"][0]["createdAt"], "2025-07-01");
}

// ============================================================================
// HTTP Catalog Tests
// ============================================================================

#[test]
fn test_http_products_url() {
    let catalog = HttpCatalog::new("https://shop.example.com/api").unwrap();
    assert_eq!(catalog.base_url().as_str(), "https://shop.example.com/api/");

    let query = ProductQuery::new()
        .with_category("Home")
        .with_sort(SortOrder::PriceAsc);
    let url = catalog.products_url(2, &query).unwrap();
    assert_eq!(
        url.as_str(),
        "https://shop.example.com/api/products?page=2&page_size=20&category=Home&sort=price_asc"
    );
}

#[test]
fn test_http_invalid_base_url() {
    assert!(matches!(
        HttpCatalog::new("not a url"),
        Err(Error::InvalidUrl(_))
    ));
    assert!(matches!(
        HttpCatalog::new("mailto:shop@example.com"),
        Err(Error::InvalidConfigValue { .. })
    ));
}

#[tokio::test]
async fn test_http_get_products() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products"))
        .and(query_param("page", "1"))
        .and(query_param("page_size", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "products": [
                {
                    "id": 1,
                    "name": "Lamp",
                    "description": "Desk lamp",
                    "price": 19.5,
                    "category": "Home",
                    "createdAt": "2025-07-03"
                },
                {
                    "id": 2,
                    "name": "Kettle",
                    "description": "Electric kettle",
                    "price": 35.0,
                    "imageUrl": "https://example.com/kettle.jpg",
                    "category": "Home",
                    "inStock": false,
                    "createdAt": "2025-07-04"
                }
            ],
            "totalCount": 3,
            "hasMore": true
        })))
        .mount(&mock_server)
        .await;

    let catalog = HttpCatalog::new(&mock_server.uri()).unwrap();
    let page = catalog
        .get_products(1, &ProductQuery::new().with_page_size(2))
        .await
        .unwrap();

    assert_eq!(ids(&page), vec![1, 2]);
    assert_eq!(page.total_count, 3);
    assert!(page.has_more);
    assert!(page.products[0].in_stock);
    assert!(page.products[0].image_url.is_none());
    assert!(!page.products[1].in_stock);
}

#[tokio::test]
async fn test_http_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&mock_server)
        .await;

    let catalog = HttpCatalog::new(&mock_server.uri()).unwrap();
    let err = catalog
        .get_products(1, &ProductQuery::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::HttpStatus { status: 503, .. }));
    assert_eq!(err.to_string(), "HTTP 503: maintenance");
}

#[tokio::test]
async fn test_http_malformed_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .mount(&mock_server)
        .await;

    let catalog = HttpCatalog::new(&mock_server.uri()).unwrap();
    let err = catalog
        .get_products(1, &ProductQuery::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Http(_)));
}
