//! Currency amount normalization.
//!
//! Monetary values arrive as numbers, or as strings in either regional
//! (`1.500,00`) or international (`1,500.00` / `1500.00`) notation, often
//! with a currency marker. The decimal separator is decided by position:
//! when both `.` and `,` are present, whichever appears last in the string
//! is the decimal separator.

use serde_json::Value;

use crate::Parsed;

/// Normalizes an arbitrary value to a numeric amount. Numbers pass through;
/// strings are cleaned and parsed; everything else is 0. Never fails.
pub fn normalize_amount(raw: &Value) -> f64 {
    match raw {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => parse_amount_text(s).value_or(0.0),
        _ => 0.0,
    }
}

/// Parses amount text after stripping the currency marker and whitespace.
///
/// Separator handling:
/// - both `.` and `,`, with `,` last: `.` is thousands grouping, `,` is the
///   decimal separator (`1.500,00` -> `1500.00`);
/// - only `,`: decimal separator (`1500,00` -> `1500.00`);
/// - only `.`, or neither: already parseable, left as-is.
pub fn parse_amount_text(text: &str) -> Parsed<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, 'R' | '$') && !c.is_whitespace())
        .collect();

    let last_comma = cleaned.rfind(',');
    let last_dot = cleaned.rfind('.');
    let decimalized = match (last_comma, last_dot) {
        (Some(comma), Some(dot)) if comma > dot => {
            cleaned.replace('.', "").replace(',', ".")
        }
        (Some(_), None) => cleaned.replace(',', "."),
        _ => cleaned,
    };

    match decimalized.parse::<f64>() {
        Ok(value) => Parsed::Value(value),
        Err(_) => Parsed::Fallback(text.trim().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_pass_through() {
        assert_eq!(normalize_amount(&json!(1500)), 1500.0);
        assert_eq!(normalize_amount(&json!(12.75)), 12.75);
        assert_eq!(normalize_amount(&json!(-3)), -3.0);
    }

    #[test]
    fn regional_notation_parses() {
        assert_eq!(normalize_amount(&json!("1.234,56")), 1234.56);
        assert_eq!(normalize_amount(&json!("1234,56")), 1234.56);
        assert_eq!(normalize_amount(&json!("R$ 1.500,00")), 1500.0);
    }

    #[test]
    fn international_notation_parses() {
        assert_eq!(normalize_amount(&json!("1234.56")), 1234.56);
        assert_eq!(normalize_amount(&json!("1500")), 1500.0);
    }

    #[test]
    fn currency_marker_and_whitespace_are_stripped() {
        assert_eq!(normalize_amount(&json!(" R$  42,10 ")), 42.1);
        assert_eq!(normalize_amount(&json!("$99.90")), 99.9);
    }

    #[test]
    fn garbage_and_absent_values_are_zero() {
        assert_eq!(normalize_amount(&json!("abc")), 0.0);
        assert_eq!(normalize_amount(&Value::Null), 0.0);
        assert_eq!(normalize_amount(&json!(true)), 0.0);
        assert_eq!(normalize_amount(&json!([1, 2])), 0.0);
        assert_eq!(normalize_amount(&json!("")), 0.0);
    }

    #[test]
    fn mixed_separators_with_dot_last_fail_closed() {
        // Ambiguous notation is not guessed at; the strict parse fails and
        // the amount defaults to zero.
        assert_eq!(normalize_amount(&json!("1,234.56")), 0.0);
    }

    #[test]
    fn normalization_is_idempotent_on_its_own_output() {
        for raw in ["1.234,56", "1234.56", "987", "R$ 10,50"] {
            let first = normalize_amount(&json!(raw));
            let second = normalize_amount(&json!(first.to_string()));
            assert_eq!(first, second, "re-normalizing {raw} changed the value");
        }
    }
}
