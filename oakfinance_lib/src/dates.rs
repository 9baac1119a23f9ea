//! Date parsing shared by the normalizer and the reference loaders.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Parses the date formats NetFile and the reference CSVs use.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS[.fff]`, full RFC 3339 and
/// `MM/DD/YYYY`. Anything with a time component keeps only its date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%m/%d/%Y") {
        return Some(date);
    }
    // Fall back to a leading ISO date followed by anything.
    raw.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}

pub(crate) fn parse_opt_date(raw: Option<&str>) -> Option<NaiveDate> {
    raw.and_then(parse_date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn accepts_known_formats() {
        assert_eq!(parse_date("2022-06-01"), Some(ymd(2022, 6, 1)));
        assert_eq!(parse_date("2022-07-29T16:02:11"), Some(ymd(2022, 7, 29)));
        assert_eq!(parse_date("2022-07-29T16:02:11.250"), Some(ymd(2022, 7, 29)));
        assert_eq!(parse_date("2022-07-29T16:02:11-07:00"), Some(ymd(2022, 7, 29)));
        assert_eq!(parse_date("12/31/2022"), Some(ymd(2022, 12, 31)));
        assert_eq!(parse_date("2022-07-29 00:00:00"), Some(ymd(2022, 7, 29)));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("   "), None);
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date("2022-13-45"), None);
    }
}
