//! Validated transactions → {analytics, enrichment} → report.
//!
//! Analytics and enrichment are independent folds over the same immutable
//! set, so they run on the blocking pool side by side and are joined once
//! before anything is written.

use anyhow::{Context, Result};
use salescope_core::Transaction;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::analytics::SalesAnalytics;
use crate::catalog::CatalogSource;
use crate::enrichment::{EnrichmentStats, build_catalog_mapping, enrich, write_enriched};
use crate::report::{ReportOptions, generate_report, write_report};

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub enriched_path: PathBuf,
    pub report_path: PathBuf,
    pub report: ReportOptions,
}

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub analytics: SalesAnalytics,
    pub enrichment: EnrichmentStats,
    pub report: String,
}

pub async fn run_pipeline(
    accepted: Vec<Transaction>,
    catalog: &CatalogSource,
    options: &PipelineOptions,
) -> Result<PipelineOutput> {
    let txs: Arc<[Transaction]> = accepted.into();
    info!(transactions = txs.len(), "running analytics and enrichment");

    let analytics_txs = Arc::clone(&txs);
    let analytics_opts = options.report.analytics_options();
    let analytics =
        tokio::task::spawn_blocking(move || SalesAnalytics::compute(&analytics_txs, &analytics_opts));

    let mapping = build_catalog_mapping(catalog.load().await);
    let enrich_txs = Arc::clone(&txs);
    let enrichment = tokio::task::spawn_blocking(move || enrich(&enrich_txs, &mapping));

    let (analytics, enriched) = tokio::try_join!(analytics, enrichment).context("pipeline stage panicked")?;

    write_enriched(&options.enriched_path, &enriched)?;
    let report = generate_report(&txs, &enriched, &options.report);
    write_report(&options.report_path, &report)?;

    Ok(PipelineOutput {
        analytics,
        enrichment: EnrichmentStats::from_enriched(&enriched),
        report,
    })
}
