pub mod pipe_delimited;

pub use pipe_delimited::{clean_sales_data, parse_line, parse_sales_text};
