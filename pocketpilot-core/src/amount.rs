//! Amount parsing for free-text replies.
//!
//! Deliberately lexical: strip everything that cannot be part of a number,
//! drop thousands separators, parse what is left. Sign is preserved; callers
//! decide whether non-positive values are acceptable.

/// Tolerance used when comparing currency amounts (one cent).
pub const AMOUNT_TOLERANCE: f64 = 0.01;

/// Parse a user-typed amount like "$1,234.50" or "45".
///
/// Returns `None` for empty input, input without digits, or anything that
/// does not survive as a finite number.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-'))
        .filter(|c| *c != ',')
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// `parse_amount`, keeping only strictly positive values.
pub fn parse_positive_amount(raw: &str) -> Option<f64> {
    parse_amount(raw).filter(|v| *v > 0.0)
}

/// Round to whole cents.
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Compact rendering for quick replies: "50", "37.5", "12.25".
pub fn format_plain_amount(amount: f64) -> String {
    let fixed = format!("{:.2}", round_cents(amount));
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount_with_separators() {
        assert_eq!(parse_amount("1,234.50"), Some(1234.50));
        assert_eq!(parse_amount("$45"), Some(45.0));
        assert_eq!(parse_amount(" 25.60 "), Some(25.60));
    }

    #[test]
    fn test_parse_amount_keeps_sign() {
        assert_eq!(parse_amount("-5"), Some(-5.0));
        assert_eq!(parse_positive_amount("-5"), None);
        assert_eq!(parse_positive_amount("0"), None);
    }

    #[test]
    fn test_parse_amount_without_digits() {
        for raw in ["", "groceries", "skip", "-", "..", "n/a"] {
            assert_eq!(parse_amount(raw), None, "input {raw:?}");
        }
    }

    #[test]
    fn test_parse_amount_rejects_garbled_numbers() {
        assert_eq!(parse_amount("1.2.3"), None);
        assert_eq!(parse_amount("5-5"), None);
    }

    #[test]
    fn test_format_plain_amount() {
        assert_eq!(format_plain_amount(50.0), "50");
        assert_eq!(format_plain_amount(37.5), "37.5");
        assert_eq!(format_plain_amount(12.254), "12.25");
        assert_eq!(format_plain_amount(-0.001), "0");
    }
}
