use salescope_core::{RejectKind, RejectReason, Transaction};

/// Column order of the sales extract.
pub const SALES_COLUMNS: [&str; 8] = [
    "TransactionID",
    "Date",
    "ProductID",
    "ProductName",
    "Quantity",
    "UnitPrice",
    "CustomerID",
    "Region",
];

/// Text content of an input file plus the encoding it was decoded with.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedText {
    pub text: String,
    pub encoding: &'static str,
}

/// A data line that could not be turned into a Transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct LineReject {
    /// 1-based line number in the input text (header included).
    pub line_number: u64,
    pub reason: RejectReason,
    pub raw: String,
}

/// Output of parsing a whole extract.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedBatch {
    pub transactions: Vec<Transaction>,
    pub rejects: Vec<LineReject>,
    /// Non-blank data lines seen (header excluded).
    pub total_lines: usize,
}

/// Parse + structural validation, no filters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleaningReport {
    pub total_records: usize,
    /// `parse_rejects + structural_rejects`.
    pub invalid_records: usize,
    pub parse_rejects: usize,
    pub structural_rejects: usize,
    pub valid: Vec<Transaction>,
}

impl CleaningReport {
    pub(crate) fn count_reject(&mut self, reason: &RejectReason) {
        self.invalid_records += 1;
        match reason.kind() {
            RejectKind::Parse => self.parse_rejects += 1,
            RejectKind::Structural => self.structural_rejects += 1,
        }
    }
}
