//! Pipe-delimited sales extract parser.
//!
//! Expected layout:
//!   TransactionID|Date|ProductID|ProductName|Quantity|UnitPrice|CustomerID|Region
//!   T001|2024-12-01|P101|Laptop|2|45000|C001|North
//!
//! Parsing only cleans and converts; business rules live in
//! `salescope_core::validation`.

use anyhow::Result;
use regex::Regex;
use salescope_core::{RejectReason, Transaction, validate_record};
use tracing::{debug, info};

use crate::types::{CleaningReport, LineReject, ParsedBatch, SALES_COLUMNS};

fn parse_fields(fields: &[&str]) -> Result<Transaction, RejectReason> {
    if fields.len() != SALES_COLUMNS.len() {
        return Err(RejectReason::FieldCount {
            expected: SALES_COLUMNS.len(),
            found: fields.len(),
        });
    }

    let quantity_raw = fields[4].replace(',', "");
    let quantity: i64 = quantity_raw
        .trim()
        .parse()
        .map_err(|_| RejectReason::InvalidQuantity(fields[4].trim().to_string()))?;

    let price_raw = fields[5].replace(',', "");
    let unit_price: f64 = price_raw
        .trim()
        .parse()
        .map_err(|_| RejectReason::InvalidUnitPrice(fields[5].trim().to_string()))?;
    if !unit_price.is_finite() {
        return Err(RejectReason::InvalidUnitPrice(fields[5].trim().to_string()));
    }

    Ok(Transaction {
        transaction_id: fields[0].trim().to_string(),
        date: fields[1].trim().to_string(),
        product_id: fields[2].trim().to_string(),
        product_name: fields[3].replace(',', "").trim().to_string(),
        quantity,
        unit_price,
        customer_id: fields[6].trim().to_string(),
        region: fields[7].trim().to_string(),
    })
}

/// Parse a single data line.
pub fn parse_line(line: &str) -> Result<Transaction, RejectReason> {
    let fields: Vec<&str> = line.split('|').collect();
    parse_fields(&fields)
}

/// Parse a whole extract. Blank lines are skipped, as is a leading header row.
pub fn parse_sales_text(text: &str) -> Result<ParsedBatch> {
    let header_re = Regex::new(r"(?i)^\s*TransactionID\s*\|")?;

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'|')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(text.as_bytes());

    let mut batch = ParsedBatch::default();
    let mut first = true;

    for result in rdr.records() {
        let record = result?;
        let fields: Vec<&str> = record.iter().collect();
        let raw = fields.join("|");

        if raw.trim().is_empty() {
            continue;
        }
        if first {
            first = false;
            if header_re.is_match(&raw) {
                continue;
            }
        }

        batch.total_lines += 1;
        match parse_fields(&fields) {
            Ok(tx) => batch.transactions.push(tx),
            Err(reason) => {
                let line_number = record.position().map(|p| p.line()).unwrap_or(0);
                debug!(line_number, %reason, "unparseable line");
                batch.rejects.push(LineReject {
                    line_number,
                    reason,
                    raw,
                });
            }
        }
    }

    Ok(batch)
}

/// Parse, then drop every record that fails structural validation.
pub fn clean_sales_data(text: &str) -> Result<CleaningReport> {
    let batch = parse_sales_text(text)?;
    let mut report = CleaningReport {
        total_records: batch.total_lines,
        valid: Vec::with_capacity(batch.transactions.len()),
        ..Default::default()
    };
    for reject in &batch.rejects {
        report.count_reject(&reject.reason);
    }

    for tx in batch.transactions {
        match validate_record(&tx) {
            Ok(()) => report.valid.push(tx),
            Err(reason) => {
                debug!(transaction_id = %tx.transaction_id, %reason, "invalid record");
                report.count_reject(&reason);
            }
        }
    }

    info!(
        total = report.total_records,
        invalid = report.invalid_records,
        parse = report.parse_rejects,
        structural = report.structural_rejects,
        valid = report.valid.len(),
        "cleaned sales data"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
TransactionID|Date|ProductID|ProductName|Quantity|UnitPrice|CustomerID|Region
T001|2024-12-01|P101|Laptop|2|45,000|C001|North

T002|2024-12-01|P102|Mouse,Wireless|10|500|C002|South
T003|2024-12-02|P103|Keyboard|abc|1500|C003|East
T004|2024-12-02|P104|Monitor|1|12000|C004
X005|2024-12-03|P105|Webcam|3|2500|C005|West
T006|2024-12-03|P106|Headphones|0|1500|C006|North
";

    #[test]
    fn test_parse_line_cleans_fields() {
        let tx = parse_line(" T002 |2024-12-01|P102|Mouse,Wireless|1,000|1,500.50|C002| South ").unwrap();
        assert_eq!(tx.transaction_id, "T002");
        assert_eq!(tx.product_name, "MouseWireless");
        assert_eq!(tx.quantity, 1000);
        assert_eq!(tx.unit_price, 1500.5);
        assert_eq!(tx.region, "South");
    }

    #[test]
    fn test_parse_line_rejects() {
        assert_eq!(
            parse_line("T1|2024-12-01|P1|X|1|1|C1"),
            Err(RejectReason::FieldCount { expected: 8, found: 7 })
        );
        assert_eq!(
            parse_line("T1|2024-12-01|P1|X|two|1|C1|North"),
            Err(RejectReason::InvalidQuantity("two".into()))
        );
        assert_eq!(
            parse_line("T1|2024-12-01|P1|X|2|free|C1|North"),
            Err(RejectReason::InvalidUnitPrice("free".into()))
        );
    }

    #[test]
    fn test_parse_line_rejects_non_finite_price() {
        for price in ["inf", "infinity", "-inf", "NaN", "1e999"] {
            let line = format!("T1|2024-12-01|P1|X|2|{price}|C1|North");
            assert_eq!(
                parse_line(&line),
                Err(RejectReason::InvalidUnitPrice(price.into())),
                "price {price}"
            );
        }
        assert!(parse_line("T1|2024-12-01|P1|X|2|1e3|C1|North").is_ok());
    }

    #[test]
    fn test_parse_sales_text_skips_header_and_blanks() {
        let batch = parse_sales_text(SAMPLE).unwrap();
        assert_eq!(batch.total_lines, 6);
        assert_eq!(batch.transactions.len(), 4);
        assert_eq!(batch.rejects.len(), 2);
        assert_eq!(batch.total_lines, batch.transactions.len() + batch.rejects.len());

        assert_eq!(batch.transactions[0].unit_price, 45000.0);
        assert_eq!(batch.transactions[1].product_name, "MouseWireless");

        let keyboard = &batch.rejects[0];
        assert_eq!(keyboard.line_number, 5);
        assert_eq!(keyboard.reason, RejectReason::InvalidQuantity("abc".into()));
        assert!(keyboard.raw.starts_with("T003|"));
    }

    #[test]
    fn test_parse_sales_text_without_header() {
        let batch = parse_sales_text("T001|2024-12-01|P101|Laptop|2|45000|C001|North\n").unwrap();
        assert_eq!(batch.transactions.len(), 1);
        assert!(parse_sales_text("").unwrap().transactions.is_empty());
    }

    #[test]
    fn test_clean_sales_data_counts() {
        let report = clean_sales_data(SAMPLE).unwrap();
        assert_eq!(report.total_records, 6);
        // keyboard + monitor (parse), X005 + zero quantity (validation)
        assert_eq!(report.invalid_records, 4);
        assert_eq!(report.parse_rejects, 2);
        assert_eq!(report.structural_rejects, 2);
        let ids: Vec<_> = report.valid.iter().map(|t| t.transaction_id.as_str()).collect();
        assert_eq!(ids, vec!["T001", "T002"]);
    }
}
