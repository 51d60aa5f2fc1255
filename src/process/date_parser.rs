// src/process/date_parser.rs
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

use crate::record::CellValue;

/// Text values treated as "no value" (compared case-insensitively, after trimming).
const NULL_SENTINELS: [&str; 4] = ["", "nan", "nat", "none"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

// month-first before day-first for slashes
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%d.%m.%Y",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
];

/// Formats without a day; parsed with a synthetic `|1` day appended.
const YEAR_MONTH_FORMATS: &[&str] = &["%Y-%m", "%Y/%m", "%m.%Y", "%B %Y"];

pub fn is_null_sentinel(s: &str) -> bool {
    let s = s.trim();
    NULL_SENTINELS.iter().any(|n| s.eq_ignore_ascii_case(n))
}

/// `MM.YYYY` also reads as a decimal number.
fn is_month_dot_year(s: &str) -> bool {
    let all_digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
    match s.split_once('.') {
        Some((m, y)) => (1..=2).contains(&m.len()) && y.len() == 4 && all_digits(m) && all_digits(y),
        None => false,
    }
}

/// Parse a free-form date or date/time string.
///
/// Accepts ISO-8601 / RFC 3339, `YYYY-MM-DD`, `YYYY/MM/DD`, `DD.MM.YYYY`,
/// `MM/DD/YYYY` (falling back to `DD/MM/YYYY`), English month-name forms and
/// year-month forms. Bare numbers are rejected: a quantity is not a date.
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    // cheap rejections before trying every format
    if is_null_sentinel(s) || !s.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    if s.parse::<f64>().is_ok() && !is_month_dot_year(s) {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    let padded = format!("{}|1", s);
    for fmt in YEAR_MONTH_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(&padded, &format!("{}|%d", fmt)) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Month number (1–12) encoded by a cell, if any. Never fails: anything
/// that is not a date/time degrades to `None`.
pub fn infer_from_value(value: &CellValue) -> Option<u32> {
    match value {
        CellValue::DateTime(dt) => Some(dt.month()),
        CellValue::Text(s) => parse_datetime(s).map(|dt| dt.month()),
        CellValue::Null | CellValue::Bool(_) | CellValue::Int(_) | CellValue::Float(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn parses_common_date_shapes() {
        let cases = [
            ("2024-03-15", 3),
            ("2024-03-15T10:20:30", 3),
            ("2024-03-15 10:20:30.250", 3),
            ("2024-11-02T08:00:00+03:00", 11),
            ("2024/07/01 12:00:00", 7),
            ("2024/07/01", 7),
            ("15.03.2024", 3),
            ("15.03.2024 09:30", 3),
            ("12/25/2023", 12),
            ("25/12/2023", 12),
            ("March 15, 2024", 3),
            ("15 Mar 2024", 3),
            ("2024-05", 5),
            ("09.2024", 9),
            ("  2024-01-31  ", 1),
        ];
        for (input, month) in cases {
            assert_eq!(infer_from_value(&text(input)), Some(month), "{}", input);
        }
    }

    #[test]
    fn month_dot_year_is_not_a_number() {
        assert_eq!(infer_from_value(&text("09.2024")), Some(9));
        assert_eq!(infer_from_value(&text("1.2025")), Some(1));
        assert_eq!(infer_from_value(&text("12.2023")), Some(12));
        assert!(is_month_dot_year("09.2024"));
        assert!(!is_month_dot_year("9.5"));
        assert!(!is_month_dot_year("100.2024"));
    }

    #[test]
    fn native_datetimes_yield_their_month() {
        let dt = NaiveDate::from_ymd_opt(2023, 8, 9)
            .unwrap()
            .and_hms_opt(13, 0, 0)
            .unwrap();
        assert_eq!(infer_from_value(&CellValue::DateTime(dt)), Some(8));
    }

    #[test]
    fn null_sentinels_are_null() {
        for s in ["", "   ", "nan", "NaN", "NAT", "None", "none "] {
            assert!(is_null_sentinel(s), "{:?}", s);
            assert_eq!(infer_from_value(&text(s)), None);
        }
    }

    #[test]
    fn non_dates_are_null() {
        for s in [
            "Acme", "12", "100.5", "3.14", "1.5", "2024", "13.2024", "31.02.2024", "2024-13-01",
            "Январь 2024",
        ] {
            assert_eq!(infer_from_value(&text(s)), None, "{}", s);
        }
        assert_eq!(infer_from_value(&CellValue::Int(3)), None);
        assert_eq!(infer_from_value(&CellValue::Float(45366.0)), None);
        assert_eq!(infer_from_value(&CellValue::Bool(true)), None);
        assert_eq!(infer_from_value(&CellValue::Null), None);
    }
}
