use chrono::NaiveDate;
use salescope_analytics::{
    CatalogSource, PipelineOptions, ReportOptions, SalesAnalytics, build_catalog_mapping, enrich,
    low_performing_products, region_wise_sales, run_pipeline, top_products, total_revenue,
};
use salescope_core::{CatalogEntry, FilterOptions, validate_and_filter};
use salescope_ingest::{parse_sales_text, read_sales_file};
use std::io::Write;
use std::path::PathBuf;

fn sample_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("sample_data")
        .join("sales_data.txt")
}

fn accepted() -> Vec<salescope_core::Transaction> {
    let decoded = read_sales_file(sample_path()).unwrap();
    let batch = parse_sales_text(&decoded.text).unwrap();
    validate_and_filter(&batch.transactions, &FilterOptions::none()).accepted
}

/// Real-data regression: ingest → validate counts line up with the fixture.
#[test]
fn test_ingest_and_validate_sample() {
    let decoded = read_sales_file(sample_path()).unwrap();
    let batch = parse_sales_text(&decoded.text).unwrap();
    assert_eq!(batch.total_lines, 23);
    // T018 (price) and T019 (field count) never become transactions
    assert_eq!(batch.rejects.len(), 2);

    let out = validate_and_filter(&batch.transactions, &FilterOptions::none());
    assert_eq!(out.summary.total_input, 21);
    assert_eq!(out.rejected, 6);
    assert_eq!(out.accepted.len(), 15);
    assert_eq!(out.summary.final_count, out.accepted.len());
}

#[test]
fn test_region_filter_on_sample() {
    let decoded = read_sales_file(sample_path()).unwrap();
    let batch = parse_sales_text(&decoded.text).unwrap();
    let out = validate_and_filter(&batch.transactions, &FilterOptions::none().with_region("North"));
    assert_eq!(out.accepted.len(), 4);
    assert!(out.accepted.iter().all(|t| t.region == "North"));
    assert_eq!(out.summary.filtered_by_region, 11);
}

#[test]
fn test_analytics_properties_on_sample() {
    let txs = accepted();

    let regions = region_wise_sales(&txs);
    let sum: f64 = regions.iter().map(|r| r.total_sales).sum();
    assert!((sum - total_revenue(&txs)).abs() < 0.05);
    let pct: f64 = regions.iter().map(|r| r.percentage).sum();
    assert!((pct - 100.0).abs() <= 0.1);

    let all = top_products(&txs, usize::MAX);
    let top = top_products(&txs, 5);
    assert_eq!(top.len(), 5);
    let min_top = top.iter().map(|p| p.quantity).min().unwrap();
    assert!(all[5..].iter().all(|p| p.quantity <= min_top));
    assert_eq!(top[0].product, "Mouse");
    assert_eq!(top[0].quantity, 30);

    let low = low_performing_products(&txs, 10);
    for p in &all {
        assert_eq!(low.iter().any(|l| l.product == p.product), p.quantity < 10, "{}", p.product);
    }

    let opts = Default::default();
    assert_eq!(SalesAnalytics::compute(&txs, &opts), SalesAnalytics::compute(&txs, &opts));
}

#[test]
fn test_enrichment_is_one_to_one() {
    let txs = accepted();
    let empty = enrich(&txs, &build_catalog_mapping(Vec::new()));
    assert_eq!(empty.len(), txs.len());
    assert!(empty.iter().all(|e| !e.api_match));

    let mapping = build_catalog_mapping(vec![
        CatalogEntry::new(101).with_category("laptops").with_brand("Apple").with_rating(4.8),
        CatalogEntry::new(102).with_category("accessories"),
    ]);
    let enriched = enrich(&txs, &mapping);
    assert_eq!(enriched.len(), txs.len());
    assert_eq!(enriched.iter().filter(|e| e.api_match).count(), 5);
}

#[tokio::test]
async fn test_full_pipeline_writes_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let mut catalog = tempfile::NamedTempFile::new().unwrap();
    catalog
        .write_all(br#"{"products": [{"id": 101, "title": "Laptop", "category": "laptops", "brand": "Apple", "rating": 4.8}]}"#)
        .unwrap();

    let generated_at = NaiveDate::from_ymd_opt(2024, 12, 18).unwrap().and_hms_opt(9, 0, 0).unwrap();
    let options = PipelineOptions {
        enriched_path: dir.path().join("data").join("enriched_sales_data.txt"),
        report_path: dir.path().join("output").join("sales_report.txt"),
        report: ReportOptions::new(generated_at),
    };

    let txs = accepted();
    let out = run_pipeline(txs.clone(), &CatalogSource::File(catalog.path().to_path_buf()), &options)
        .await
        .unwrap();

    assert_eq!(out.analytics.transaction_count, 15);
    assert_eq!(out.enrichment.total, 15);
    assert_eq!(out.enrichment.enriched, 2);

    let enriched = std::fs::read_to_string(&options.enriched_path).unwrap();
    assert_eq!(enriched.lines().count(), 16);
    assert!(enriched.lines().nth(1).unwrap().ends_with("|laptops|Apple|4.8|True"));

    let report = std::fs::read_to_string(&options.report_path).unwrap();
    assert_eq!(report, out.report);
    assert!(report.contains("Records Processed: 15"));
    assert!(report.contains("Total Products Enriched: 2/15"));
}

#[tokio::test]
async fn test_pipeline_survives_catalog_outage_and_empty_input() {
    let dir = tempfile::tempdir().unwrap();
    let generated_at = NaiveDate::from_ymd_opt(2024, 12, 18).unwrap().and_hms_opt(9, 0, 0).unwrap();
    let options = PipelineOptions {
        enriched_path: dir.path().join("enriched.txt"),
        report_path: dir.path().join("report.txt"),
        report: ReportOptions::new(generated_at),
    };

    let missing = CatalogSource::File(dir.path().join("missing.json"));
    let out = run_pipeline(accepted(), &missing, &options).await.unwrap();
    assert_eq!(out.enrichment.enriched, 0);

    let out = run_pipeline(Vec::new(), &missing, &options).await.unwrap();
    assert_eq!(out.analytics.total_revenue, 0.0);
    assert!(out.report.contains("N/A"));
    let enriched = std::fs::read_to_string(&options.enriched_path).unwrap();
    assert_eq!(enriched.lines().count(), 1);
}
