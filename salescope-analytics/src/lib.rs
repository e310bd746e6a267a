//! salescope-analytics: analytics engine, catalog enrichment, and report rendering

pub mod analytics;
pub mod catalog;
pub mod enrichment;
pub mod pipeline;
pub mod report;

pub use analytics::{
    AnalyticsOptions, CustomerSummary, DailySales, PeakDay, ProductSales, RegionSales, SalesAnalytics,
    customer_analysis, daily_sales_trend, find_peak_sales_day, low_performing_products,
    region_average_transaction_value, region_wise_sales, top_products, total_revenue,
};
pub use catalog::{CatalogSource, HttpCatalog, parse_catalog_json};
pub use enrichment::{
    CatalogMapping, ENRICHED_COLUMNS, EnrichmentStats, build_catalog_mapping, enrich, extract_numeric_id,
    write_enriched,
};
pub use pipeline::{PipelineOptions, PipelineOutput, run_pipeline};
pub use report::{ReportOptions, generate_report, write_report};
