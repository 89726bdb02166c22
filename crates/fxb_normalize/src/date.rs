//! Date normalization for values of unknown format.
//!
//! Payloads deliver dates as ISO strings, ISO timestamps, space-separated
//! date-times, or already in display form. Parsing tries a fixed, ordered
//! format list; year-first patterns come before `dd/mm/yyyy` so ISO-like
//! strings are not misread as locale dates. Anything unparseable is carried
//! through unchanged.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::Parsed;

/// Sentinel for absent dates (and absent requesters, by convention).
pub const NA_TEXT: &str = "N/A";

/// Display rendering of every successfully parsed date.
const DISPLAY_FORMAT: &str = "%d/%m/%Y";

/// Format list tried in order at field-normalization time.
const ISO_FIRST: [&str; 4] = [
    "%Y-%m-%d",
    "%Y-%m-%dT%H:%M:%S%.3fZ",
    "%Y-%m-%d %H:%M:%S",
    "%d/%m/%Y",
];

/// Format list for re-parsing already-normalized display dates, e.g. when
/// bucketing a timeline. `dd/mm/yyyy` wins first here.
const DISPLAY_FIRST: [&str; 4] = [
    "%d/%m/%Y",
    "%Y-%m-%d",
    "%Y-%m-%dT%H:%M:%S%.3fZ",
    "%Y-%m-%d %H:%M:%S",
];

/// Which end of the format list `dd/mm/yyyy` sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatOrder {
    /// Year-first patterns before `dd/mm/yyyy`: raw upstream values.
    IsoFirst,
    /// `dd/mm/yyyy` first: values this crate already rendered.
    DisplayFirst,
}

impl FormatOrder {
    fn formats(self) -> &'static [&'static str] {
        match self {
            FormatOrder::IsoFirst => &ISO_FIRST,
            FormatOrder::DisplayFirst => &DISPLAY_FIRST,
        }
    }
}

/// Normalizes an arbitrary date value to `dd/mm/yyyy` display form.
///
/// Absent or blank input yields [`NA_TEXT`]; unparseable text is returned
/// trimmed but otherwise unchanged. Never fails.
pub fn normalize_date(raw: &Value) -> String {
    let Some(text) = coerce_text(raw) else {
        return NA_TEXT.to_string();
    };
    match parse_date_text(&text, FormatOrder::IsoFirst) {
        Parsed::Value(date) => date.format(DISPLAY_FORMAT).to_string(),
        Parsed::Fallback(original) => original,
    }
}

/// Parses date text against the ordered format list, falling back to a
/// generic RFC 3339 parse. First match wins.
pub fn parse_date_text(text: &str, order: FormatOrder) -> Parsed<NaiveDate> {
    let trimmed = text.trim();
    for format in order.formats() {
        if let Ok(date_time) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Parsed::Value(date_time.date());
        }
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Parsed::Value(date);
        }
    }
    // Generic calendar parse for well-formed timestamps the fixed list
    // misses, e.g. offsets other than Z.
    if let Ok(date_time) = DateTime::parse_from_rfc3339(trimmed) {
        return Parsed::Value(date_time.date_naive());
    }
    Parsed::Fallback(trimmed.to_string())
}

fn coerce_text(raw: &Value) -> Option<String> {
    match raw {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn iso_date_renders_as_display_form() {
        assert_eq!(normalize_date(&json!("2024-03-05")), "05/03/2024");
    }

    #[test]
    fn iso_timestamp_with_millis_renders_as_display_form() {
        assert_eq!(
            normalize_date(&json!("2024-03-05T10:00:00.000Z")),
            "05/03/2024"
        );
    }

    #[test]
    fn space_separated_datetime_parses() {
        assert_eq!(normalize_date(&json!("2024-12-31 23:59:59")), "31/12/2024");
    }

    #[test]
    fn display_form_passes_through_reformatted() {
        assert_eq!(normalize_date(&json!("15/01/2024")), "15/01/2024");
    }

    #[test]
    fn offset_timestamp_uses_generic_parse() {
        assert_eq!(
            normalize_date(&json!("2024-03-05T10:00:00+02:00")),
            "05/03/2024"
        );
    }

    #[test]
    fn absent_values_become_sentinel() {
        assert_eq!(normalize_date(&Value::Null), NA_TEXT);
        assert_eq!(normalize_date(&json!("")), NA_TEXT);
        assert_eq!(normalize_date(&json!("   ")), NA_TEXT);
        assert_eq!(normalize_date(&json!({"nested": true})), NA_TEXT);
    }

    #[test]
    fn unparseable_text_is_returned_trimmed() {
        assert_eq!(normalize_date(&json!("not-a-date")), "not-a-date");
        assert_eq!(normalize_date(&json!("  mañana  ")), "mañana");
    }

    #[test]
    fn numbers_coerce_to_text_and_fall_through() {
        assert_eq!(normalize_date(&json!(20240105)), "20240105");
    }

    #[test]
    fn display_first_order_prefers_day_month() {
        // 05/03/2024 must read as 5 March, not fail against year-first formats.
        let parsed = parse_date_text("05/03/2024", FormatOrder::DisplayFirst);
        assert_eq!(
            parsed,
            Parsed::Value(NaiveDate::from_ymd_opt(2024, 3, 5).expect("valid date"))
        );
    }

    #[test]
    fn invalid_calendar_dates_fall_back() {
        assert_eq!(
            parse_date_text("2024-02-31", FormatOrder::IsoFirst),
            Parsed::Fallback("2024-02-31".into())
        );
    }
}
