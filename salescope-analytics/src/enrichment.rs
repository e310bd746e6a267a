//! Enrichment engine: join transactions to the product catalog by numeric id.

use anyhow::{Context, Result};
use salescope_core::{CatalogEntry, EnrichedTransaction, Transaction, format_decimal};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use tracing::{info, warn};

/// Header of the persisted enriched file.
pub const ENRICHED_COLUMNS: [&str; 12] = [
    "TransactionID",
    "Date",
    "ProductID",
    "ProductName",
    "Quantity",
    "UnitPrice",
    "CustomerID",
    "Region",
    "API_Category",
    "API_Brand",
    "API_Rating",
    "API_Match",
];

pub type CatalogMapping = HashMap<u64, CatalogEntry>;

/// Index catalog entries by id. Later duplicates replace earlier ones.
pub fn build_catalog_mapping(entries: impl IntoIterator<Item = CatalogEntry>) -> CatalogMapping {
    entries.into_iter().map(|e| (e.id, e)).collect()
}

/// Concatenate every ASCII digit in a product id: `P101` → 101, `PX1Y2` → 12.
pub fn extract_numeric_id(product_id: &str) -> Option<u64> {
    let digits: String = product_id.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// One output per input, in input order.
pub fn enrich(transactions: &[Transaction], mapping: &CatalogMapping) -> Vec<EnrichedTransaction> {
    let enriched: Vec<_> = transactions
        .iter()
        .map(|tx| {
            match extract_numeric_id(&tx.product_id).and_then(|id| mapping.get(&id)) {
                Some(entry) => EnrichedTransaction::matched(tx.clone(), entry),
                None => EnrichedTransaction::unmatched(tx.clone()),
            }
        })
        .collect();

    info!(
        total = enriched.len(),
        matched = enriched.iter().filter(|e| e.api_match).count(),
        "enriched transactions"
    );
    enriched
}

/// Catalog text goes out unquoted, so the delimiter and line breaks become spaces.
fn opt(value: &Option<String>) -> String {
    let Some(v) = value else {
        return String::new();
    };
    if v.contains(['|', '\n', '\r']) {
        warn!(value = %v, "catalog value contains a delimiter or line break, replacing");
        v.replace(['|', '\n', '\r'], " ")
    } else {
        v.clone()
    }
}

fn enriched_row(e: &EnrichedTransaction) -> [String; 12] {
    let tx = &e.transaction;
    [
        tx.transaction_id.clone(),
        tx.date.clone(),
        tx.product_id.clone(),
        tx.product_name.clone(),
        tx.quantity.to_string(),
        format_decimal(tx.unit_price),
        tx.customer_id.clone(),
        tx.region.clone(),
        opt(&e.api_category),
        opt(&e.api_brand),
        e.api_rating.map(format_decimal).unwrap_or_default(),
        if e.api_match { "True" } else { "False" }.to_string(),
    ]
}

/// Write the enriched set as a pipe-delimited file, creating parent directories.
pub fn write_enriched(path: impl AsRef<Path>, enriched: &[EnrichedTransaction]) -> Result<()> {
    let path = path.as_ref();
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }

    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b'|')
        .quote_style(csv::QuoteStyle::Never)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    wtr.write_record(ENRICHED_COLUMNS)?;
    for e in enriched {
        wtr.write_record(enriched_row(e))?;
    }
    wtr.flush().with_context(|| format!("write {}", path.display()))?;

    info!(path = %path.display(), rows = enriched.len(), "saved enriched data");
    Ok(())
}

/// Match statistics over an enriched set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichmentStats {
    pub total: usize,
    pub enriched: usize,
    /// Percent of transactions matched, 0 for an empty set.
    pub success_rate: f64,
    /// Distinct product names that found no catalog entry, sorted.
    pub unenriched_products: Vec<String>,
}

impl EnrichmentStats {
    pub fn from_enriched(enriched: &[EnrichedTransaction]) -> Self {
        let total = enriched.len();
        let matched = enriched.iter().filter(|e| e.api_match).count();
        let success_rate = if total == 0 {
            0.0
        } else {
            matched as f64 / total as f64 * 100.0
        };
        let unenriched: BTreeSet<&str> = enriched
            .iter()
            .filter(|e| !e.api_match)
            .map(|e| e.transaction.product_name.as_str())
            .collect();

        Self {
            total,
            enriched: matched,
            success_rate,
            unenriched_products: unenriched.into_iter().map(String::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn txn(id: &str, product_id: &str, name: &str) -> Transaction {
        Transaction {
            transaction_id: id.to_string(),
            date: "2024-12-01".to_string(),
            product_id: product_id.to_string(),
            product_name: name.to_string(),
            quantity: 5,
            unit_price: 10.0,
            customer_id: "C1".to_string(),
            region: "North".to_string(),
        }
    }

    #[test]
    fn test_extract_numeric_id() {
        assert_eq!(extract_numeric_id("P101"), Some(101));
        assert_eq!(extract_numeric_id("PX1Y2"), Some(12));
        assert_eq!(extract_numeric_id("P007"), Some(7));
        assert_eq!(extract_numeric_id("PXYZ"), None);
        assert_eq!(extract_numeric_id(""), None);
        assert_eq!(extract_numeric_id("P99999999999999999999999"), None);
    }

    #[test]
    fn test_mapping_last_write_wins() {
        let mapping = build_catalog_mapping(vec![
            CatalogEntry::new(1).with_category("old"),
            CatalogEntry::new(2).with_category("other"),
            CatalogEntry::new(1).with_category("new"),
        ]);
        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping[&1].category.as_deref(), Some("new"));
    }

    #[test]
    fn test_enrich_matches_and_misses() {
        let txs = vec![txn("T1", "P101", "Laptop"), txn("T2", "P999", "Mouse"), txn("T3", "PXY", "Cable")];
        let mapping = build_catalog_mapping(vec![CatalogEntry::new(101).with_category("A")]);
        let out = enrich(&txs, &mapping);

        assert_eq!(out.len(), 3);
        assert!(out[0].api_match);
        assert_eq!(out[0].api_category.as_deref(), Some("A"));
        assert!(!out[1].api_match);
        assert!(out[1].api_category.is_none());
        assert!(!out[2].api_match);

        let ids: Vec<_> = out.iter().map(|e| e.transaction.transaction_id.as_str()).collect();
        assert_eq!(ids, vec!["T1", "T2", "T3"]);
    }

    #[test]
    fn test_enrich_with_empty_mapping() {
        let txs = vec![txn("T1", "P1", "A"), txn("T2", "P2", "B")];
        let out = enrich(&txs, &CatalogMapping::new());
        assert_eq!(out.len(), txs.len());
        assert!(out.iter().all(|e| !e.api_match));
    }

    #[test]
    fn test_write_enriched_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("enriched.txt");

        let mapping = build_catalog_mapping(vec![
            CatalogEntry::new(101).with_category("laptops").with_brand("Apple").with_rating(4.5),
        ]);
        let out = enrich(&[txn("T1", "P101", "Laptop"), txn("T2", "P5", "Mouse")], &mapping);
        write_enriched(&path, &out).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], ENRICHED_COLUMNS.join("|"));
        assert_eq!(lines[1], "T1|2024-12-01|P101|Laptop|5|10.0|C1|North|laptops|Apple|4.5|True");
        assert_eq!(lines[2], "T2|2024-12-01|P5|Mouse|5|10.0|C1|North||||False");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_write_enriched_replaces_delimiters_in_catalog_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("enriched.txt");

        let mapping = build_catalog_mapping(vec![
            CatalogEntry::new(101).with_category("home|office").with_brand("Acme\nCo\r"),
        ]);
        let out = enrich(&[txn("T1", "P101", "Laptop")], &mapping);
        write_enriched(&path, &out).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].split('|').count(), ENRICHED_COLUMNS.len());
        assert_eq!(lines[1], "T1|2024-12-01|P101|Laptop|5|10.0|C1|North|home office|Acme Co ||True");
    }

    #[test]
    fn test_stats() {
        let mapping = build_catalog_mapping(vec![CatalogEntry::new(1)]);
        let out = enrich(
            &[txn("T1", "P1", "A"), txn("T2", "P2", "Zed"), txn("T3", "P3", "Bee"), txn("T4", "P2", "Zed")],
            &mapping,
        );
        let stats = EnrichmentStats::from_enriched(&out);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.enriched, 1);
        assert_eq!(stats.success_rate, 25.0);
        assert_eq!(stats.unenriched_products, vec!["Bee", "Zed"]);

        let empty = EnrichmentStats::from_enriched(&[]);
        assert_eq!(empty.success_rate, 0.0);
    }
}
