//! Helpers for integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;

use serde_json::{Value, json};
use storefront_sync::domain::types::StorefrontUrl;
use storefront_sync::repository::CsvRepository;
use storefront_sync::services::fetch::{FeedFetcher, FetchError, parse_feed};
use tempfile::TempDir;

/// CSV datasets inside a temporary directory.
pub struct TestDataset {
    dir: TempDir,
}

impl TestDataset {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn products_path(&self) -> PathBuf {
        self.dir.path().join("dataset").join("products.csv")
    }

    pub fn variants_path(&self) -> PathBuf {
        self.dir.path().join("dataset").join("variants.csv")
    }

    pub fn repository(&self) -> CsvRepository {
        CsvRepository::new(self.products_path(), self.variants_path())
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

/// Feed bodies served by URL, parsed the way the HTTP fetcher parses them.
pub struct FixtureFeeds {
    bodies: HashMap<String, String>,
}

impl FixtureFeeds {
    pub fn new() -> Self {
        Self {
            bodies: HashMap::new(),
        }
    }

    pub fn with(mut self, url: &str, body: Value) -> Self {
        self.bodies.insert(url.to_string(), body.to_string());
        self
    }
}

impl FeedFetcher for FixtureFeeds {
    fn fetch_products(&self, url: &StorefrontUrl) -> Result<Vec<Value>, FetchError> {
        let body = self.bodies.get(url.as_str()).ok_or(FetchError::Status {
            url: url.to_string(),
            status: 404,
        })?;
        parse_feed(body).map_err(|reason| FetchError::Parse {
            url: url.to_string(),
            reason,
        })
    }
}

pub fn url(value: &str) -> StorefrontUrl {
    StorefrontUrl::new(value).expect("valid storefront url")
}

pub fn variant(id: i64, product_id: i64, position: i64) -> Value {
    json!({
        "id": id,
        "title": "250g / Whole Bean",
        "option1": "250g",
        "option2": "Whole Bean",
        "option3": null,
        "sku": format!("SKU-{id}"),
        "requires_shipping": true,
        "taxable": true,
        "available": position % 2 == 1,
        "price": "11.50",
        "grams": 250,
        "compare_at_price": null,
        "position": position,
        "product_id": product_id,
        "created_at": "2024-05-01T08:00:00+01:00",
        "updated_at": "2024-05-02T08:00:00+01:00"
    })
}

pub fn product(id: i64, variant_count: i64) -> Value {
    let variants: Vec<Value> = (1..=variant_count)
        .map(|position| variant(id * 1000 + position, id, position))
        .collect();
    json!({
        "id": id,
        "title": format!("Single Origin {id}"),
        "handle": format!("single-origin-{id}"),
        "body_html": "<p>Notes of <b>cherry</b>, cocoa</p>",
        "published_at": "2024-05-01T08:00:00+01:00",
        "created_at": "2024-05-01T08:00:00+01:00",
        "updated_at": "2024-05-02T08:00:00+01:00",
        "vendor": "Test Roastery",
        "product_type": "Coffee",
        "tags": ["filter", "light roast"],
        "variants": variants
    })
}

pub fn feed(products: Vec<Value>) -> Value {
    json!({ "products": products })
}
