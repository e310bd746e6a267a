//! salescope-ingest: encoding-tolerant reading and parsing of pipe-delimited sales extracts.

pub mod parsers;
pub mod reader;
pub mod types;

pub use parsers::{clean_sales_data, parse_line, parse_sales_text};
pub use reader::{decode_bytes, read_sales_file};
pub use types::{CleaningReport, DecodedText, LineReject, ParsedBatch, SALES_COLUMNS};
