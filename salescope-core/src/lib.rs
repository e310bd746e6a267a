//! salescope-core: record model, validation, and formatting helpers

pub mod clock;
pub mod money;
pub mod record;
pub mod validation;

pub use money::{format_amount, format_currency, format_decimal, percentage, round2};
pub use record::{CatalogEntry, EnrichedTransaction, Transaction};
pub use validation::{
    DatasetProfile, FilterOptions, FilterSummary, RejectKind, RejectReason, ValidationOutcome,
    profile_dataset, validate_and_filter, validate_record,
};
