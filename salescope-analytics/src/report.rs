//! Plain-text sales report.
//!
//! Rendering is pure: the caller supplies the timestamp and display options,
//! and every view is recomputed from the transaction set passed in.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use salescope_core::{EnrichedTransaction, Transaction, format_currency};
use std::path::Path;
use tracing::info;

use crate::analytics::{AnalyticsOptions, SalesAnalytics, DEFAULT_LOW_PERFORMER_THRESHOLD, DEFAULT_TOP_N};
use crate::enrichment::EnrichmentStats;

const WIDTH: usize = 72;

#[derive(Debug, Clone, PartialEq)]
pub struct ReportOptions {
    pub generated_at: NaiveDateTime,
    pub currency_symbol: String,
    pub top_n: usize,
    pub low_performer_threshold: i64,
}

impl ReportOptions {
    pub fn new(generated_at: NaiveDateTime) -> Self {
        Self {
            generated_at,
            currency_symbol: "$".to_string(),
            top_n: DEFAULT_TOP_N,
            low_performer_threshold: DEFAULT_LOW_PERFORMER_THRESHOLD,
        }
    }

    pub fn with_currency_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.currency_symbol = symbol.into();
        self
    }

    pub(crate) fn analytics_options(&self) -> AnalyticsOptions {
        AnalyticsOptions {
            top_n: self.top_n,
            low_performer_threshold: self.low_performer_threshold,
        }
    }
}

fn heading(s: &mut String, title: &str) {
    s.push_str(&format!("\n{}\n{}\n", title, "-".repeat(WIDTH)));
}

/// Render the full report.
pub fn generate_report(
    transactions: &[Transaction],
    enriched: &[EnrichedTransaction],
    options: &ReportOptions,
) -> String {
    let a = SalesAnalytics::compute(transactions, &options.analytics_options());
    let stats = EnrichmentStats::from_enriched(enriched);
    let money = |v: f64| format_currency(&options.currency_symbol, v);

    let mut s = String::new();

    // Header
    s.push_str(&"=".repeat(WIDTH));
    s.push('\n');
    s.push_str(&format!("{:^width$}\n", "SALES ANALYTICS REPORT", width = WIDTH));
    s.push_str(&"=".repeat(WIDTH));
    s.push('\n');
    s.push_str(&format!("Generated: {}\n", options.generated_at.format("%Y-%m-%d %H:%M:%S")));
    s.push_str(&format!("Records Processed: {}\n", a.transaction_count));

    heading(&mut s, "OVERALL SUMMARY");
    let date_range = match &a.date_range {
        Some((min, max)) => format!("{min}..{max}"),
        None => "N/A".to_string(),
    };
    s.push_str(&format!("{:<24}{}\n", "Total Revenue:", money(a.total_revenue)));
    s.push_str(&format!("{:<24}{}\n", "Total Transactions:", a.transaction_count));
    s.push_str(&format!("{:<24}{}\n", "Average Order Value:", money(a.average_order_value)));
    s.push_str(&format!("{:<24}{}\n", "Date Range:", date_range));

    heading(&mut s, "REGION-WISE PERFORMANCE");
    s.push_str(&format!("{:<16}{:>20}{:>14}{:>16}\n", "Region", "Sales", "% of Total", "Transactions"));
    for r in &a.regions {
        s.push_str(&format!(
            "{:<16}{:>20}{:>13.2}%{:>16}\n",
            r.region,
            money(r.total_sales),
            r.percentage,
            r.transaction_count
        ));
    }

    heading(&mut s, &format!("TOP {} PRODUCTS", options.top_n));
    s.push_str(&format!("{:<6}{:<30}{:>12}{:>20}\n", "Rank", "Product Name", "Quantity", "Revenue"));
    for (i, p) in a.top_products.iter().enumerate() {
        s.push_str(&format!("{:<6}{:<30}{:>12}{:>20}\n", i + 1, p.product, p.quantity, money(p.revenue)));
    }

    heading(&mut s, &format!("TOP {} CUSTOMERS", options.top_n));
    s.push_str(&format!("{:<6}{:<18}{:>22}{:>14}\n", "Rank", "Customer ID", "Total Spent", "Order Count"));
    for (i, c) in a.customers.iter().take(options.top_n).enumerate() {
        s.push_str(&format!(
            "{:<6}{:<18}{:>22}{:>14}\n",
            i + 1,
            c.customer_id,
            money(c.total_spent),
            c.purchase_count
        ));
    }

    heading(&mut s, "DAILY SALES TREND");
    s.push_str(&format!("{:<14}{:>20}{:>16}{:>20}\n", "Date", "Revenue", "Transactions", "Unique Customers"));
    for d in &a.daily {
        s.push_str(&format!(
            "{:<14}{:>20}{:>16}{:>20}\n",
            d.date,
            money(d.revenue),
            d.transaction_count,
            d.unique_customers
        ));
    }

    heading(&mut s, "PRODUCT PERFORMANCE ANALYSIS");
    match &a.peak_day {
        Some(peak) => s.push_str(&format!(
            "Best Selling Day: {} ({} across {} transactions)\n",
            peak.date,
            money(peak.revenue),
            peak.transaction_count
        )),
        None => s.push_str("Best Selling Day: N/A\n"),
    }
    s.push_str(&format!(
        "\nLow Performing Products (quantity < {}):\n",
        options.low_performer_threshold
    ));
    if a.low_performers.is_empty() {
        s.push_str("  None\n");
    }
    for p in &a.low_performers {
        s.push_str(&format!("  - {}: {} units, {}\n", p.product, p.quantity, money(p.revenue)));
    }
    s.push_str("\nAverage Transaction Value per Region:\n");
    if a.region_averages.is_empty() {
        s.push_str("  None\n");
    }
    for (region, avg) in &a.region_averages {
        s.push_str(&format!("  {:<16}{:>20}\n", region, money(*avg)));
    }

    heading(&mut s, "API ENRICHMENT SUMMARY");
    s.push_str(&format!("Total Products Enriched: {}/{}\n", stats.enriched, stats.total));
    s.push_str(&format!("Success Rate: {:.1}%\n", stats.success_rate));
    s.push_str("Products Not Enriched:\n");
    if stats.unenriched_products.is_empty() {
        s.push_str("  None\n");
    }
    for name in &stats.unenriched_products {
        s.push_str(&format!("  - {name}\n"));
    }

    s.push('\n');
    s.push_str(&"=".repeat(WIDTH));
    s.push('\n');
    s
}

pub fn write_report(path: impl AsRef<Path>, report: &str) -> Result<()> {
    let path = path.as_ref();
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    std::fs::write(path, report).with_context(|| format!("write {}", path.display()))?;
    info!(path = %path.display(), bytes = report.len(), "saved report");
    Ok(())
}
