//! Product catalog sources.
//!
//! The remote source speaks the DummyJSON `/products` shape:
//!   { "products": [ { "id": 1, "title": "...", "category": "...", "brand": "...",
//!                     "price": 9.99, "rating": 4.94, ... } ], "total": 194, ... }
//!
//! Loading never fails: any error is logged and yields an empty catalog, which
//! downstream enrichment treats as "nothing matched".

use anyhow::{Context, Result};
use salescope_core::CatalogEntry;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_CATALOG_URL: &str = "https://dummyjson.com/products";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct RawProduct {
    id: Option<u64>,
    title: Option<String>,
    category: Option<String>,
    brand: Option<String>,
    price: Option<f64>,
    rating: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CatalogDocument {
    Envelope {
        #[serde(default)]
        products: Vec<RawProduct>,
    },
    Bare(Vec<RawProduct>),
}

/// Parse a catalog document: either the `{ "products": [...] }` envelope or a bare array.
/// Products without an `id` are skipped.
pub fn parse_catalog_json(json: &str) -> Result<Vec<CatalogEntry>> {
    let doc: CatalogDocument = serde_json::from_str(json).context("parse catalog json")?;
    let products = match doc {
        CatalogDocument::Envelope { products } => products,
        CatalogDocument::Bare(products) => products,
    };

    Ok(products
        .into_iter()
        .filter_map(|p| {
            Some(CatalogEntry {
                id: p.id?,
                title: p.title,
                category: p.category,
                brand: p.brand,
                price: p.price,
                rating: p.rating,
            })
        })
        .collect())
}

#[derive(Debug, Clone)]
pub struct HttpCatalog {
    pub url: String,
    /// Sent as `?limit=`; `None` leaves the server default.
    pub limit: Option<usize>,
    pub timeout: Duration,
}

impl Default for HttpCatalog {
    fn default() -> Self {
        Self {
            url: DEFAULT_CATALOG_URL.to_string(),
            limit: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl HttpCatalog {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// One bounded request; retries are left to the caller.
    pub async fn fetch(&self) -> Result<Vec<CatalogEntry>> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .context("build http client")?;

        let mut req = client.get(&self.url);
        if let Some(limit) = self.limit {
            req = req.query(&[("limit", limit)]);
        }

        let resp = req
            .send()
            .await
            .with_context(|| format!("GET {}", self.url))?;
        let status = resp.status();
        let text = resp.text().await.context("read catalog response")?;
        if !status.is_success() {
            anyhow::bail!("catalog request failed: {} {}", status, text);
        }

        parse_catalog_json(&text)
    }
}

#[derive(Debug, Clone)]
pub enum CatalogSource {
    Remote(HttpCatalog),
    /// A JSON file in the same shape as the remote response.
    File(PathBuf),
    Disabled,
}

impl CatalogSource {
    async fn try_load(&self) -> Result<Vec<CatalogEntry>> {
        match self {
            CatalogSource::Remote(http) => http.fetch().await,
            CatalogSource::File(path) => {
                let json = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("read {}", path.display()))?;
                parse_catalog_json(&json)
            }
            CatalogSource::Disabled => Ok(Vec::new()),
        }
    }

    /// Load the catalog, substituting an empty one on any failure.
    pub async fn load(&self) -> Vec<CatalogEntry> {
        match self.try_load().await {
            Ok(entries) => {
                info!(count = entries.len(), source = %self.describe(), "loaded product catalog");
                entries
            }
            Err(e) => {
                warn!(error = %format!("{e:#}"), source = %self.describe(), "catalog unavailable, continuing without enrichment");
                Vec::new()
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            CatalogSource::Remote(http) => http.url.clone(),
            CatalogSource::File(path) => path.display().to_string(),
            CatalogSource::Disabled => "disabled".to_string(),
        }
    }
}
