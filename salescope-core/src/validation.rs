//! Validation & filter engine.
//!
//! Every record goes through the structural checks in a fixed order and stops
//! at the first failure. Structurally valid records then pass through the
//! optional region and amount filters. Nothing here returns an error: bad
//! records are counted and dropped.

use crate::record::Transaction;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::{debug, info};

/// Why a record did not make it into the accepted set.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RejectReason {
    #[error("missing required field {0}")]
    MissingField(&'static str),
    #[error("transaction id {0:?} does not start with 'T'")]
    BadTransactionId(String),
    #[error("product id {0:?} does not start with 'P'")]
    BadProductId(String),
    #[error("customer id {0:?} does not start with 'C'")]
    BadCustomerId(String),
    #[error("quantity must be positive, got {0}")]
    NonPositiveQuantity(i64),
    #[error("unit price must be positive, got {0}")]
    NonPositiveUnitPrice(f64),
    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },
    #[error("quantity {0:?} is not an integer")]
    InvalidQuantity(String),
    #[error("unit price {0:?} is not a number")]
    InvalidUnitPrice(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectKind {
    /// Parsed, but failed a validation rule.
    Structural,
    /// Numeric conversion failed or the row had the wrong shape.
    Parse,
}

impl RejectReason {
    pub fn kind(&self) -> RejectKind {
        match self {
            RejectReason::FieldCount { .. }
            | RejectReason::InvalidQuantity(_)
            | RejectReason::InvalidUnitPrice(_) => RejectKind::Parse,
            _ => RejectKind::Structural,
        }
    }
}

/// Optional filters applied after structural validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub region: Option<String>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
}

impl FilterOptions {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_amount_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_amount = min;
        self.max_amount = max;
        self
    }

    fn region_filter(&self) -> Option<&str> {
        self.region.as_deref().filter(|r| !r.is_empty())
    }
}

/// Per-stage counts; `final_count` always equals the accepted length.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSummary {
    pub total_input: usize,
    pub invalid: usize,
    pub filtered_by_region: usize,
    pub filtered_by_amount: usize,
    pub final_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationOutcome {
    pub accepted: Vec<Transaction>,
    pub rejected: usize,
    pub summary: FilterSummary,
}

/// Regions and amount range seen across all input, before any filtering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetProfile {
    pub regions: BTreeSet<String>,
    pub amount_range: Option<(f64, f64)>,
}

fn require(value: &str, field: &'static str) -> Result<(), RejectReason> {
    if value.trim().is_empty() {
        Err(RejectReason::MissingField(field))
    } else {
        Ok(())
    }
}

/// Structural checks for one record, short-circuiting at the first failure.
///
/// Checks run in this order:
///
/// 1. `TransactionID`, `Date`, `ProductID`, `ProductName`, `CustomerID` and
///    `Region` must each be non-empty after trimming ([`RejectReason::MissingField`]).
/// 2. `TransactionID` starts with `T`, `ProductID` with `P`, `CustomerID` with `C`.
/// 3. `Quantity > 0`, then `UnitPrice > 0` (NaN fails).
pub fn validate_record(tx: &Transaction) -> Result<(), RejectReason> {
    require(&tx.transaction_id, "TransactionID")?;
    require(&tx.date, "Date")?;
    require(&tx.product_id, "ProductID")?;
    require(&tx.product_name, "ProductName")?;
    require(&tx.customer_id, "CustomerID")?;
    require(&tx.region, "Region")?;

    if !tx.transaction_id.starts_with('T') {
        return Err(RejectReason::BadTransactionId(tx.transaction_id.clone()));
    }
    if !tx.product_id.starts_with('P') {
        return Err(RejectReason::BadProductId(tx.product_id.clone()));
    }
    if !tx.customer_id.starts_with('C') {
        return Err(RejectReason::BadCustomerId(tx.customer_id.clone()));
    }
    if tx.quantity <= 0 {
        return Err(RejectReason::NonPositiveQuantity(tx.quantity));
    }
    // Written so that NaN is rejected too.
    if !(tx.unit_price > 0.0) {
        return Err(RejectReason::NonPositiveUnitPrice(tx.unit_price));
    }
    Ok(())
}

pub fn profile_dataset(txs: &[Transaction]) -> DatasetProfile {
    let regions = txs
        .iter()
        .filter(|t| !t.region.is_empty())
        .map(|t| t.region.clone())
        .collect();

    let amount_range = txs
        .iter()
        .filter(|t| t.quantity != 0 && t.unit_price != 0.0)
        .map(Transaction::amount)
        .fold(None, |range: Option<(f64, f64)>, a| match range {
            None => Some((a, a)),
            Some((lo, hi)) => Some((lo.min(a), hi.max(a))),
        });

    DatasetProfile {
        regions,
        amount_range,
    }
}

/// Split `transactions` into the accepted set and counts of what was dropped.
pub fn validate_and_filter(transactions: &[Transaction], filters: &FilterOptions) -> ValidationOutcome {
    let profile = profile_dataset(transactions);
    info!(regions = ?profile.regions, "available regions");
    if let Some((lo, hi)) = profile.amount_range {
        info!(min = lo, max = hi, "transaction amount range");
    }

    let mut summary = FilterSummary {
        total_input: transactions.len(),
        ..FilterSummary::default()
    };
    let mut accepted = Vec::with_capacity(transactions.len());

    for tx in transactions {
        if let Err(reason) = validate_record(tx) {
            debug!(transaction_id = %tx.transaction_id, %reason, "rejected");
            summary.invalid += 1;
            continue;
        }

        if let Some(region) = filters.region_filter() {
            if tx.region != region {
                summary.filtered_by_region += 1;
                continue;
            }
        }

        let amount = tx.amount();
        let below = filters.min_amount.is_some_and(|min| amount < min);
        let above = filters.max_amount.is_some_and(|max| amount > max);
        if below || above {
            summary.filtered_by_amount += 1;
            continue;
        }

        accepted.push(tx.clone());
    }

    summary.final_count = accepted.len();
    info!(
        after_validation = summary.total_input - summary.invalid,
        after_region = summary.total_input - summary.invalid - summary.filtered_by_region,
        final_count = summary.final_count,
        "validation complete"
    );

    ValidationOutcome {
        accepted,
        rejected: summary.invalid,
        summary,
    }
}
