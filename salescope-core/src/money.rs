//! Rounding and display helpers for currency and percentages.
//!
//! All rounding is half away from zero at 2 decimal places.

/// Round to 2 decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `part / whole * 100`, rounded to 2 decimals; 0 when `whole` is 0.
pub fn percentage(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        return 0.0;
    }
    round2(part / whole * 100.0)
}

/// Fixed 2-decimal formatting with `,` thousands separators: `1234567.891` → `1,234,567.89`.
pub fn format_amount(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part}")
}

/// Currency with a leading symbol, e.g. `$1,500.00`.
pub fn format_currency(symbol: &str, value: f64) -> String {
    let body = format_amount(value);
    match body.strip_prefix('-') {
        Some(rest) => format!("-{symbol}{rest}"),
        None => format!("{symbol}{body}"),
    }
}

/// Shortest round-trip decimal that always shows a fractional part
/// (`15000` → `15000.0`, `4.94` → `4.94`).
pub fn format_decimal(value: f64) -> String {
    format!("{value:?}")
}
