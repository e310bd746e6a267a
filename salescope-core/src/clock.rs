//! Report timestamps in a configured IANA timezone.

use anyhow::Result;
use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;

pub fn parse_timezone(tz: &str) -> Result<Tz> {
    tz.parse()
        .map_err(|_| anyhow::anyhow!("invalid timezone: {tz}"))
}

/// Convert a UTC instant to wall-clock time in `tz` (e.g. "Asia/Kolkata").
pub fn to_local(instant: DateTime<Utc>, tz: &str) -> Result<NaiveDateTime> {
    let tz = parse_timezone(tz)?;
    Ok(instant.with_timezone(&tz).naive_local())
}

/// Current wall-clock time in `tz`.
pub fn now_in(tz: &str) -> Result<NaiveDateTime> {
    to_local(Utc::now(), tz)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_to_local_kolkata() {
        let utc = Utc.with_ymd_and_hms(2024, 12, 18, 9, 0, 0).unwrap();
        let local = to_local(utc, "Asia/Kolkata").unwrap();
        assert_eq!(local.format("%Y-%m-%d %H:%M:%S").to_string(), "2024-12-18 14:30:00");
    }

    #[test]
    fn test_invalid_timezone() {
        assert!(parse_timezone("Mars/Olympus").is_err());
        assert!(now_in("UTC").is_ok());
    }
}
