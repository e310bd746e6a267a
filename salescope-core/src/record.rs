//! Record types shared by every pipeline stage.

use serde::{Deserialize, Serialize};

/// One sales line item after parsing.
///
/// `date` is kept as the raw `YYYY-MM-DD` string; ordering and grouping
/// compare it lexicographically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_id: String,
    pub date: String,
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub customer_id: String,
    pub region: String,
}

impl Transaction {
    /// `quantity * unit_price`, unrounded.
    pub fn amount(&self) -> f64 {
        self.quantity as f64 * self.unit_price
    }
}

/// A product record from the external catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub rating: Option<f64>,
}

impl CatalogEntry {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            title: None,
            category: None,
            brand: None,
            price: None,
            rating: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }
}

/// A transaction merged with catalog metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedTransaction {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub api_category: Option<String>,
    pub api_brand: Option<String>,
    pub api_rating: Option<f64>,
    /// True iff a catalog entry was found for the numeric product id.
    pub api_match: bool,
}

impl EnrichedTransaction {
    /// Carry a transaction through with no catalog data.
    pub fn unmatched(transaction: Transaction) -> Self {
        Self {
            transaction,
            api_category: None,
            api_brand: None,
            api_rating: None,
            api_match: false,
        }
    }

    pub fn matched(transaction: Transaction, entry: &CatalogEntry) -> Self {
        Self {
            transaction,
            api_category: entry.category.clone(),
            api_brand: entry.brand.clone(),
            api_rating: entry.rating,
            api_match: true,
        }
    }
}
